use std::path::Path;

use crate::audio::domain::audio_reader::AudioReader;
use crate::audio::domain::audio_segment::AudioSegment;

/// Probes and decodes mp3/wav uploads using ffmpeg-next.
pub struct FfmpegAudioReader;

impl AudioReader for FfmpegAudioReader {
    fn probe_duration(&self, path: &Path) -> Result<f64, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let ictx = ffmpeg_next::format::input(path)?;

        // Container duration is in AV_TIME_BASE units; fall back to the audio
        // stream's own duration when the container doesn't report one.
        let container = ictx.duration();
        if container > 0 {
            return Ok(container as f64 / f64::from(ffmpeg_next::ffi::AV_TIME_BASE));
        }

        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Audio)
            .ok_or_else(|| format!("No audio stream in {}", path.display()))?;
        let seconds = stream.duration() as f64 * f64::from(stream.time_base());
        if seconds > 0.0 {
            Ok(seconds)
        } else {
            Err(format!("Could not determine duration of {}", path.display()).into())
        }
    }

    fn read_audio(
        &self,
        path: &Path,
        target_sample_rate: u32,
    ) -> Result<Option<AudioSegment>, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let mut ictx = ffmpeg_next::format::input(path)?;

        let audio_stream = match ictx.streams().best(ffmpeg_next::media::Type::Audio) {
            Some(stream) => stream,
            None => return Ok(None),
        };

        let audio_stream_index = audio_stream.index();
        let codec_ctx =
            ffmpeg_next::codec::context::Context::from_parameters(audio_stream.parameters())?;
        let mut decoder = codec_ctx.decoder().audio()?;

        let mut resampler = ffmpeg_next::software::resampling::Context::get(
            decoder.format(),
            decoder.channel_layout(),
            decoder.rate(),
            ffmpeg_next::format::Sample::F32(ffmpeg_next::format::sample::Type::Planar),
            ffmpeg_next::ChannelLayout::MONO,
            target_sample_rate,
        )?;

        let mut all_samples: Vec<f32> = Vec::new();
        let mut decoded_frame = ffmpeg_next::util::frame::audio::Audio::empty();
        let mut resampled_frame = ffmpeg_next::util::frame::audio::Audio::empty();

        for (stream, packet) in ictx.packets() {
            if stream.index() != audio_stream_index {
                continue;
            }

            decoder.send_packet(&packet)?;
            while decoder.receive_frame(&mut decoded_frame).is_ok() {
                resampler.run(&decoded_frame, &mut resampled_frame)?;
                extract_f32_samples(&resampled_frame, &mut all_samples);
            }
        }

        decoder.send_eof()?;
        while decoder.receive_frame(&mut decoded_frame).is_ok() {
            resampler.run(&decoded_frame, &mut resampled_frame)?;
            extract_f32_samples(&resampled_frame, &mut all_samples);
        }

        // The resampler may still hold buffered samples.
        if let Ok(Some(delay)) = resampler.flush(&mut resampled_frame) {
            if delay.output > 0 {
                extract_f32_samples(&resampled_frame, &mut all_samples);
            }
        }

        log::debug!(
            "Decoded {} samples at {target_sample_rate} Hz from {}",
            all_samples.len(),
            path.display()
        );
        Ok(Some(AudioSegment::new(all_samples, target_sample_rate, 1)))
    }
}

/// Extract f32 samples from a planar mono resampled frame.
fn extract_f32_samples(frame: &ffmpeg_next::util::frame::audio::Audio, out: &mut Vec<f32>) {
    let num_samples = frame.samples();
    if num_samples == 0 {
        return;
    }
    out.extend_from_slice(&frame.plane::<f32>(0)[..num_samples]);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_file() -> &'static Path {
        if cfg!(windows) {
            Path::new("Z:\\nonexistent\\song.mp3")
        } else {
            Path::new("/nonexistent/song.mp3")
        }
    }

    #[test]
    fn test_read_audio_nonexistent_file() {
        assert!(FfmpegAudioReader.read_audio(missing_file(), 16000).is_err());
    }

    #[test]
    fn test_probe_duration_nonexistent_file() {
        assert!(FfmpegAudioReader.probe_duration(missing_file()).is_err());
    }
}
