use std::collections::HashMap;
use std::fmt;
use std::time::Instant;

/// Steps a single upload goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ImportStage {
    Saving,
    Probing,
    Transcribing,
    Formatting,
}

impl fmt::Display for ImportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportStage::Saving => write!(f, "Saving file"),
            ImportStage::Probing => write!(f, "Reading audio metadata"),
            ImportStage::Transcribing => write!(f, "Transcribing"),
            ImportStage::Formatting => write!(f, "Building lyrics"),
        }
    }
}

/// Observer for import batches.
///
/// Keeps the use case independent of how status is shown (log lines,
/// terminal output, nothing at all in tests).
pub trait ImportLogger: Send {
    /// A file entered a new stage.
    fn stage(&mut self, name: &str, stage: ImportStage);

    fn completed(&mut self, name: &str, line_count: usize);

    /// The name was already in the playlist.
    fn duplicate(&mut self, name: &str);

    fn failed(&mut self, name: &str, error: &str);

    /// Emit an end-of-batch summary. Default: no-op.
    fn summary(&self) {}
}

/// Discards all events.
pub struct NullImportLogger;

impl ImportLogger for NullImportLogger {
    fn stage(&mut self, _name: &str, _stage: ImportStage) {}
    fn completed(&mut self, _name: &str, _line_count: usize) {}
    fn duplicate(&mut self, _name: &str) {}
    fn failed(&mut self, _name: &str, _error: &str) {}
}

/// Forwards events to the `log` crate and times each stage.
pub struct LogImportLogger {
    current: Option<(ImportStage, Instant)>,
    timings: HashMap<ImportStage, Vec<f64>>,
    completed: usize,
    duplicates: usize,
    failed: usize,
}

impl LogImportLogger {
    pub fn new() -> Self {
        Self {
            current: None,
            timings: HashMap::new(),
            completed: 0,
            duplicates: 0,
            failed: 0,
        }
    }

    fn close_stage(&mut self) {
        if let Some((stage, started)) = self.current.take() {
            let ms = started.elapsed().as_secs_f64() * 1000.0;
            self.timings.entry(stage).or_default().push(ms);
        }
    }

    pub fn timings_for(&self, stage: ImportStage) -> Option<&[f64]> {
        self.timings.get(&stage).map(|v| v.as_slice())
    }

    /// Returns the formatted summary string, or `None` if nothing happened.
    pub fn summary_string(&self) -> Option<String> {
        let total = self.completed + self.duplicates + self.failed;
        if total == 0 {
            return None;
        }

        let mut lines = vec![format!(
            "Import summary: {} imported, {} already present, {} failed",
            self.completed, self.duplicates, self.failed
        )];

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let Some(durations) = self.timings_for(*stage) else {
                continue;
            };
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = total_ms / durations.len() as f64;
            lines.push(format!(
                "  {:24}: avg {avg_ms:8.0}ms  total {total_ms:8.0}ms",
                stage.to_string()
            ));
        }

        Some(lines.join("\n"))
    }
}

impl Default for LogImportLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportLogger for LogImportLogger {
    fn stage(&mut self, name: &str, stage: ImportStage) {
        self.close_stage();
        self.current = Some((stage, Instant::now()));
        log::info!("{name}: {stage}...");
    }

    fn completed(&mut self, name: &str, line_count: usize) {
        self.close_stage();
        self.completed += 1;
        log::info!("Processed {name} ({line_count} lyric lines)");
    }

    fn duplicate(&mut self, name: &str) {
        self.duplicates += 1;
        log::info!("{name} is already in the playlist, skipping");
    }

    fn failed(&mut self, name: &str, error: &str) {
        self.current = None;
        self.failed += 1;
        log::error!("Error processing {name}: {error}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("{text}");
        }
    }
}
