use crate::lrc::{self, LrcMetadata, LyricLine, ParseDiagnostics};

/// Parsed lyrics for one song plus the playback cursor.
///
/// The cursor remembers the last matched line and only drives change
/// detection; every [`query`](Self::query) re-derives the active line from
/// scratch, so seeking backwards still resolves correctly.
#[derive(Debug, Clone, Default)]
pub struct LyricTrack {
    lines: Vec<LyricLine>,
    metadata: LrcMetadata,
    current_index: Option<usize>,
}

/// Result of a playback query
#[derive(Debug, Clone, PartialEq)]
pub struct LyricMatch {
    pub text: String,
    pub time: f64,
    pub index: usize,
    /// True when the resolved line differs from the previous query's line
    pub is_new: bool,
}

impl LyricTrack {
    /// Create an empty track
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an LRC document into a new track
    #[must_use]
    pub fn parse(input: &str) -> (Self, ParseDiagnostics) {
        lrc::parse(input)
    }

    /// Lines must already be sorted by time
    pub(crate) fn from_parts(lines: Vec<LyricLine>, metadata: LrcMetadata) -> Self {
        Self {
            lines,
            metadata,
            current_index: None,
        }
    }

    /// Replace the contents with a freshly parsed document and reset the cursor
    pub fn load(&mut self, input: &str) -> ParseDiagnostics {
        let (track, diagnostics) = lrc::parse(input);
        *self = track;
        diagnostics
    }

    /// Drop all lines and metadata and reset the cursor
    pub fn clear(&mut self) {
        self.lines.clear();
        self.metadata = LrcMetadata::default();
        self.current_index = None;
    }

    /// Forget the last matched line so the next match reports `is_new`
    pub fn reset_cursor(&mut self) {
        self.current_index = None;
    }

    #[must_use]
    pub fn lines(&self) -> &[LyricLine] {
        &self.lines
    }

    #[must_use]
    pub const fn metadata(&self) -> &LrcMetadata {
        &self.metadata
    }

    /// Index of the last matched line, `None` before anything matched
    #[must_use]
    pub const fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Find the line active at `position_secs` without touching the cursor.
    ///
    /// The active line is the last one whose time is at or before the
    /// position. NaN positions match nothing.
    #[must_use]
    pub fn line_index_at(&self, position_secs: f64) -> Option<usize> {
        let after = self.lines.partition_point(|line| line.time <= position_secs);
        after.checked_sub(1)
    }

    /// Resolve the active line and advance the cursor.
    ///
    /// Returns `None` when the position precedes the first line; the cursor
    /// is left as it was in that case.
    pub fn query(&mut self, position_secs: f64) -> Option<LyricMatch> {
        let index = self.line_index_at(position_secs)?;
        let is_new = self.current_index != Some(index);
        self.current_index = Some(index);

        let line = &self.lines[index];
        Some(LyricMatch {
            text: line.text.clone(),
            time: line.time,
            index,
            is_new,
        })
    }

    /// Lines around `index` for a scrolling display
    #[must_use]
    pub fn window(&self, index: usize, before: usize, after: usize) -> &[LyricLine] {
        if self.lines.is_empty() {
            return &[];
        }
        let index = index.min(self.lines.len() - 1);
        let start = index.saturating_sub(before);
        let end = index.saturating_add(after).saturating_add(1).min(self.lines.len());
        &self.lines[start..end]
    }
}
