mod player;
mod render;
mod session;
mod settings;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use lyric_sync_core::audio::domain::audio_reader::AudioReader;
use lyric_sync_core::audio::infrastructure::ffmpeg_audio_reader::FfmpegAudioReader;
use lyric_sync_core::audio::infrastructure::whisper_recognizer::WhisperRecognizer;
use lyric_sync_core::pipeline::import_logger::LogImportLogger;
use lyric_sync_core::pipeline::import_songs_use_case::ImportSongsUseCase;
use lyric_sync_core::session::domain::app_state::AppState;
use lyric_sync_core::session::domain::song::Song;
use lyric_sync_core::shared::model_resolver;
use lyric_sync_core::shared::scratch_dir::ScratchDir;
use lyric_sync_core::sync::domain::clock::SystemClock;
use lyric_sync_core::sync::domain::sync_frame::HighlightMode;

use render::TerminalRenderer;
use session::InteractiveSession;
use settings::Settings;

/// Transcribe songs into timed lyrics and follow them during playback.
#[derive(Parser)]
#[command(name = "lyric-sync")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Spoken language of the songs (e.g. en, de).
    #[arg(long, global = true)]
    language: Option<String>,

    /// Whisper model size: tiny, base, small, medium, large-v3, ...
    #[arg(long, global = true)]
    model: Option<String>,

    /// Run Whisper on the CPU only.
    #[arg(long, global = true)]
    no_gpu: bool,

    /// Milliseconds between display refreshes during playback.
    #[arg(long, global = true)]
    poll_interval_ms: Option<u64>,

    /// Highlight rule: position or text.
    #[arg(long, global = true)]
    highlight: Option<HighlightMode>,

    /// Directory where imported audio is stored.
    #[arg(long, global = true)]
    scratch_dir: Option<PathBuf>,

    /// Do not hand the audio to the system player.
    #[arg(long, global = true)]
    no_open_audio: bool,

    /// Stop refreshing once the track ends instead of waiting for Enter.
    #[arg(long, global = true)]
    stop_at_end: bool,

    /// Lines shown around the active line (0 = all).
    #[arg(long, global = true)]
    context_lines: Option<usize>,

    /// Persist the given options as the new defaults.
    #[arg(long, global = true)]
    save_settings: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Transcribe an mp3/wav file into timed lyric text.
    Transcribe {
        audio: PathBuf,

        /// Write the lyrics here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Play an audio file alongside an existing lyric file.
    Sync { audio: PathBuf, lyrics: PathBuf },
    /// Interactive playlist: import, select, play, export.
    Session {
        /// Files to import before the prompt appears.
        files: Vec<PathBuf>,
    },
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = apply_overrides(Settings::load(), &cli);
    validate(&cli, &settings)?;

    if cli.save_settings {
        let path = settings.save()?;
        log::info!("Settings saved to {}", path.display());
    }

    match cli.command {
        Command::Transcribe { audio, output } => run_transcribe(&audio, output.as_deref(), &settings),
        Command::Sync { audio, lyrics } => run_sync(&audio, &lyrics, &settings),
        Command::Session { files } => {
            let input = session::spawn_stdin_reader();
            let mut session =
                InteractiveSession::new(AppState::new(), settings, input, Box::new(build_importer));
            session.run(files)
        }
    }
}

fn apply_overrides(mut settings: Settings, cli: &Cli) -> Settings {
    if let Some(language) = &cli.language {
        settings.language = language.clone();
    }
    if let Some(model) = &cli.model {
        settings.whisper_model = model.clone();
    }
    if cli.no_gpu {
        settings.use_gpu = false;
    }
    if let Some(ms) = cli.poll_interval_ms {
        settings.poll_interval_ms = ms;
    }
    if let Some(mode) = cli.highlight {
        settings.highlight_mode = mode;
    }
    if let Some(dir) = &cli.scratch_dir {
        settings.scratch_dir = Some(dir.clone());
    }
    if cli.no_open_audio {
        settings.open_audio = false;
    }
    if cli.stop_at_end {
        settings.stop_at_end = true;
    }
    if let Some(n) = cli.context_lines {
        settings.context_lines = n;
    }
    settings
}

fn run_transcribe(
    audio: &Path,
    output: Option<&Path>,
    settings: &Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    let name = file_name(audio)?;
    let mut importer = build_importer(settings)?;
    let song = importer.process(audio, &name)?;

    match output {
        Some(path) => {
            fs::write(path, song.lyrics_text())?;
            log::info!(
                "Wrote {} lyric lines to {}",
                song.track().len(),
                path.display()
            );
        }
        None => println!("{}", song.lyrics_text()),
    }
    Ok(())
}

fn run_sync(
    audio: &Path,
    lyrics: &Path,
    settings: &Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = fs::read_to_string(lyrics)?;
    let duration = FfmpegAudioReader.probe_duration(audio)?;
    let song = Song::new(file_name(audio)?, audio, duration, text)?;

    let mut state = AppState::new();
    state.add_song(song);
    state.select(0)?;

    let input = session::spawn_stdin_reader();
    let renderer = TerminalRenderer::from_env(settings.context_lines);
    session::play_selected(&mut state, settings, &renderer, &input, Arc::new(SystemClock))
}

fn build_importer(settings: &Settings) -> Result<ImportSongsUseCase, Box<dyn std::error::Error>> {
    log::info!("Resolving Whisper model: {}", settings.whisper_model);
    let model_path = model_resolver::resolve_whisper(
        &settings.whisper_model,
        None,
        Some(Box::new(download_progress)),
    )?;
    eprintln!();

    let recognizer = WhisperRecognizer::new(&model_path, settings.use_gpu)?;
    let scratch = ScratchDir::resolve(settings.scratch_dir.as_deref());
    log::debug!("Storing uploads in {}", scratch.root().display());

    Ok(ImportSongsUseCase::new(
        Box::new(FfmpegAudioReader),
        Box::new(recognizer),
        scratch,
        settings.language.clone(),
        Box::new(LogImportLogger::new()),
    ))
}

fn validate(cli: &Cli, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    match &cli.command {
        Command::Transcribe { audio, .. } => require_file(audio)?,
        Command::Sync { audio, lyrics } => {
            require_file(audio)?;
            require_file(lyrics)?;
        }
        Command::Session { .. } => {}
    }
    if !(50..=5000).contains(&settings.poll_interval_ms) {
        return Err(format!(
            "Poll interval must be between 50 and 5000 ms, got {}",
            settings.poll_interval_ms
        )
        .into());
    }
    if settings.language.trim().is_empty() {
        return Err("Language must not be empty".into());
    }
    Ok(())
}

fn require_file(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !path.is_file() {
        return Err(format!("Input file not found: {}", path.display()).into());
    }
    Ok(())
}

fn file_name(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| format!("Not a file name: {}", path.display()).into())
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading Whisper model... {pct}%");
    } else {
        eprint!("\rDownloading Whisper model... {downloaded} bytes");
    }
}
