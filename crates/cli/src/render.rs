use lyric_sync_core::sync::domain::sync_frame::SyncFrame;

const CLEAR: &str = "\x1b[2J\x1b[H";
const HIGHLIGHT: &str = "\x1b[1;7m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

const BAR_WIDTH: usize = 40;

/// Draws sync frames as plain terminal text.
pub struct TerminalRenderer {
    /// Lines shown on each side of the active line; 0 shows all.
    context_lines: usize,
    color: bool,
}

impl TerminalRenderer {
    pub fn new(context_lines: usize, color: bool) -> Self {
        Self {
            context_lines,
            color,
        }
    }

    /// Color unless `NO_COLOR` is set.
    pub fn from_env(context_lines: usize) -> Self {
        Self::new(context_lines, std::env::var_os("NO_COLOR").is_none())
    }

    pub fn render(&self, title: &str, frame: &SyncFrame) -> String {
        let mut out = String::new();
        if self.color {
            out.push_str(CLEAR);
        }
        out.push_str(&format!("Now Playing: {title}\n"));
        out.push_str(&format!(
            "{} {}\n\n",
            progress_bar(frame.progress, BAR_WIDTH),
            frame.elapsed_label
        ));

        let (start, end) = self.visible_range(frame);
        for line in &frame.lines[start..end] {
            let text = &line.text;
            match (line.highlighted, self.color) {
                (true, true) => out.push_str(&format!("{HIGHLIGHT}> {text}{RESET}\n")),
                (true, false) => out.push_str(&format!("> {text}\n")),
                (false, true) => out.push_str(&format!("{DIM}  {text}{RESET}\n")),
                (false, false) => out.push_str(&format!("  {text}\n")),
            }
        }
        out.push_str("\n(press Enter to stop)\n");
        out
    }

    fn visible_range(&self, frame: &SyncFrame) -> (usize, usize) {
        let len = frame.lines.len();
        if self.context_lines == 0 {
            return (0, len);
        }
        let center = frame.active_index.unwrap_or(0);
        let start = center.saturating_sub(self.context_lines);
        let end = (center + self.context_lines + 1).min(len);
        (start.min(end), end)
    }
}

/// `[#####-----]` filled to `progress` (clamped to `[0, 1]`).
pub fn progress_bar(progress: f64, width: usize) -> String {
    let filled = (progress.clamp(0.0, 1.0) * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}
