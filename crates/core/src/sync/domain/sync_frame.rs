use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which lines get highlighted alongside the active one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightMode {
    /// Only the active line, by position.
    #[default]
    Position,
    /// Every line whose text equals the active line's text.
    Text,
}

impl HighlightMode {
    pub const ALL: &[HighlightMode] = &[HighlightMode::Position, HighlightMode::Text];
}

impl fmt::Display for HighlightMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HighlightMode::Position => write!(f, "position"),
            HighlightMode::Text => write!(f, "text"),
        }
    }
}

impl FromStr for HighlightMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "position" => Ok(HighlightMode::Position),
            "text" => Ok(HighlightMode::Text),
            other => Err(format!(
                "Highlight mode must be 'position' or 'text', got '{other}'"
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HighlightedLine {
    pub text: String,
    pub highlighted: bool,
}

/// Everything a render host needs for one poll tick.
#[derive(Clone, Debug, PartialEq)]
pub struct SyncFrame {
    /// Fraction of the track played, in `[0, 1]`.
    pub progress: f64,
    /// `MM:SS / MM:SS`.
    pub elapsed_label: String,
    /// Text of the active line, empty before the first line.
    pub active_line: String,
    pub active_index: Option<usize>,
    pub lines: Vec<HighlightedLine>,
}

impl SyncFrame {
    pub fn is_complete(&self) -> bool {
        self.progress >= 1.0
    }
}
