/// A lyric line that becomes active `offset` seconds into the track.
#[derive(Clone, Debug, PartialEq)]
pub struct LyricLine {
    pub offset: f64,
    pub text: String,
}

impl LyricLine {
    pub fn new(offset: f64, text: impl Into<String>) -> Self {
        Self {
            offset,
            text: text.into(),
        }
    }
}

/// Lyric lines in playback order.
///
/// The order is positional: lines are kept exactly as they were supplied,
/// and the sync rules assume offsets are non-decreasing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LyricTrack {
    lines: Vec<LyricLine>,
}

impl LyricTrack {
    pub fn new(lines: Vec<LyricLine>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[LyricLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn is_ascending(&self) -> bool {
        self.lines.windows(2).all(|w| w[0].offset <= w[1].offset)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LyricLine> {
        self.lines.iter()
    }
}

impl From<Vec<LyricLine>> for LyricTrack {
    fn from(lines: Vec<LyricLine>) -> Self {
        Self::new(lines)
    }
}

impl<'a> IntoIterator for &'a LyricTrack {
    type Item = &'a LyricLine;
    type IntoIter = std::slice::Iter<'a, LyricLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(offsets: &[f64]) -> LyricTrack {
        offsets
            .iter()
            .map(|o| LyricLine::new(*o, format!("at {o}")))
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn test_empty_track() {
        let t = LyricTrack::default();
        assert!(t.is_empty());
        assert_eq!(t.len(), 0);
        assert!(t.is_ascending());
    }

    #[test]
    fn test_lines_keep_supplied_order() {
        let t = track(&[3.0, 1.0, 2.0]);
        let offsets: Vec<f64> = t.iter().map(|l| l.offset).collect();
        assert_eq!(offsets, vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn test_is_ascending() {
        assert!(track(&[0.0, 0.0, 1.5, 9.0]).is_ascending());
        assert!(!track(&[0.0, 2.0, 1.0]).is_ascending());
    }
}
