//! LRC lyric sheet parsing.
//!
//! Two line shapes are recognized: ID tags (`[ar:Artist]`) and timed lyrics
//! (`[mm:ss.cc]text`, exactly two digits per field). Anything else is dropped
//! without error and only shows up in [`ParseDiagnostics`].

use crate::track::LyricTrack;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// A single timed line of lyrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricLine {
    /// Start time in seconds from the beginning of the track
    pub time: f64,
    /// Line text, empty for a deliberate blank
    pub text: String,
}

impl LyricLine {
    pub fn new(time: f64, text: impl Into<String>) -> Self {
        Self {
            time,
            text: text.into(),
        }
    }

    /// Start time as a [`Duration`], saturating at zero for negative or NaN times
    #[must_use]
    pub fn start_time(&self) -> Duration {
        crate::time::secs_to_duration(self.time)
    }

    /// Whether this line is an intentional blank
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.is_empty()
    }
}

/// LRC metadata from ID tags, keyed by the tag name as written
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LrcMetadata {
    tags: BTreeMap<String, String>,
}

impl LrcMetadata {
    /// Store a tag value; a repeated key overwrites the earlier value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.tags.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.get("ti")
    }

    #[must_use]
    pub fn artist(&self) -> Option<&str> {
        self.get("ar")
    }

    #[must_use]
    pub fn album(&self) -> Option<&str> {
        self.get("al")
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Counters describing what a parse pass saw
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseDiagnostics {
    /// Number of input lines, blank ones included
    pub total_lines: usize,
    pub blank_lines: usize,
    pub metadata_tags: usize,
    pub lyric_lines: usize,
    /// Lines matching neither shape
    pub skipped_lines: usize,
}

/// Parse an LRC document into a fresh [`LyricTrack`].
///
/// Never fails: unrecognized lines are skipped and counted.
#[must_use]
pub fn parse(input: &str) -> (LyricTrack, ParseDiagnostics) {
    let mut metadata = LrcMetadata::default();
    let mut lines = Vec::new();
    let mut diagnostics = ParseDiagnostics::default();

    for line in input.lines() {
        diagnostics.total_lines += 1;

        let line = line.trim();
        if line.is_empty() {
            diagnostics.blank_lines += 1;
            continue;
        }

        // ID tag first, timed lyric second
        if let Some((key, value)) = parse_id_tag(line) {
            metadata.insert(key, value);
            diagnostics.metadata_tags += 1;
            continue;
        }

        if let Some(lyric) = parse_timed_line(line) {
            lines.push(lyric);
            diagnostics.lyric_lines += 1;
            continue;
        }

        diagnostics.skipped_lines += 1;
    }

    // Vec::sort_by is stable, so equal timestamps keep input order
    lines.sort_by(|a, b| a.time.total_cmp(&b.time));

    (LyricTrack::from_parts(lines, metadata), diagnostics)
}

/// Parse a whole-line ID tag like `[ti:Title]`.
///
/// A bare timestamp (`[00:05.00]` with no text) has the same outer shape
/// and is left for the timed-line parser.
fn parse_id_tag(line: &str) -> Option<(&str, &str)> {
    let content = line.strip_prefix('[')?.strip_suffix(']')?;
    let (key, value) = content.split_once(':')?;

    if key.is_empty() || !key.chars().all(is_word_char) {
        return None;
    }

    if parse_timestamp(content).is_some() {
        return None;
    }

    Some((key, value.trim()))
}

const fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Parse a timed lyric like `[01:02.34]Hello world`
fn parse_timed_line(line: &str) -> Option<LyricLine> {
    let rest = line.strip_prefix('[')?;
    let (stamp, text) = rest.split_once(']')?;
    let time = parse_timestamp(stamp)?;

    Some(LyricLine::new(time, text.trim()))
}

/// Parse `mm:ss.cc` into seconds
fn parse_timestamp(stamp: &str) -> Option<f64> {
    let (minutes, rest) = stamp.split_once(':')?;
    let (seconds, centis) = rest.split_once('.')?;

    let minutes = two_digits(minutes)?;
    let seconds = two_digits(seconds)?;
    let centis = two_digits(centis)?;

    Some(f64::from(minutes) * 60.0 + f64::from(seconds) + f64::from(centis) / 100.0)
}

fn two_digits(field: &str) -> Option<u32> {
    if field.len() != 2 || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_parse_sorts_and_collects_metadata() {
        let (track, diagnostics) = parse("[ar:Test]\n[00:01.50]Hello\n[00:00.00]World");

        assert_eq!(
            track.lines(),
            &[LyricLine::new(0.0, "World"), LyricLine::new(1.5, "Hello")]
        );
        assert_eq!(track.metadata().artist(), Some("Test"));
        assert_eq!(track.metadata().len(), 1);
        assert_eq!(diagnostics.metadata_tags, 1);
        assert_eq!(diagnostics.lyric_lines, 2);
        assert_eq!(diagnostics.skipped_lines, 0);
    }

    #[test]
    fn test_timestamp_arithmetic() {
        for mm in [0_u32, 1, 7, 59, 99] {
            for ss in [0_u32, 1, 30, 59] {
                for cc in [0_u32, 1, 50, 99] {
                    let line = format!("[{mm:02}:{ss:02}.{cc:02}]x");
                    let parsed = parse_timed_line(&line).unwrap();
                    let expected =
                        f64::from(mm) * 60.0 + f64::from(ss) + f64::from(cc) / 100.0;
                    assert!(approx_eq(parsed.time, expected), "{line}");
                }
            }
        }
    }

    #[test]
    fn test_plain_text_is_dropped() {
        let (track, diagnostics) = parse("plain text\n[00:02.00]Line");
        assert_eq!(track.lines().len(), 1);
        assert_eq!(track.lines()[0].text, "Line");
        assert_eq!(diagnostics.skipped_lines, 1);
    }

    #[test]
    fn test_empty_input() {
        let (track, diagnostics) = parse("");
        assert!(track.is_empty());
        assert!(track.metadata().is_empty());
        assert_eq!(diagnostics, ParseDiagnostics::default());
    }

    #[test]
    fn test_metadata_only() {
        let (track, _) = parse("[ti:Happy Birthday]\n[ar:Everyone]\n[al:Party]");
        assert!(track.is_empty());
        assert_eq!(track.metadata().title(), Some("Happy Birthday"));
        assert_eq!(track.metadata().artist(), Some("Everyone"));
        assert_eq!(track.metadata().album(), Some("Party"));
    }

    #[test]
    fn test_repeated_tag_last_wins() {
        let (track, diagnostics) = parse("[ar:First]\n[ar:Second]");
        assert_eq!(track.metadata().artist(), Some("Second"));
        assert_eq!(diagnostics.metadata_tags, 2);
    }

    #[test]
    fn test_tag_value_is_trimmed() {
        let (track, _) = parse("   [ti:   Spaced Out  ]   ");
        assert_eq!(track.metadata().title(), Some("Spaced Out"));
    }

    #[test]
    fn test_empty_text_line_is_blank_lyric() {
        let (track, diagnostics) = parse("[00:05.00]\n[00:06.00]   ");
        assert_eq!(track.lines().len(), 2);
        assert!(track.lines()[0].is_blank());
        assert!(track.lines()[1].is_blank());
        assert_eq!(diagnostics.metadata_tags, 0);
    }

    #[test]
    fn test_numeric_key_tag_is_metadata() {
        let (track, diagnostics) = parse("[12:intro]\n[00:05.00]\n[00:06.00]Go");
        assert_eq!(track.metadata().get("12"), Some("intro"));
        assert_eq!(diagnostics.metadata_tags, 1);
        assert_eq!(diagnostics.skipped_lines, 0);
        assert_eq!(track.len(), 2);
        assert!(track.lines()[0].is_blank());
    }

    #[test]
    fn test_lyric_text_is_trimmed() {
        let (track, _) = parse("[00:05.00]   Happy birthday to you   ");
        assert_eq!(track.lines()[0].text, "Happy birthday to you");
    }

    #[test]
    fn test_rejects_loose_timestamps() {
        let input = "[0:05.00]one digit minute\n\
                     [00:5.00]one digit second\n\
                     [00:05.0]one digit centis\n\
                     [00:05.000]three digit centis\n\
                     [00:05:00]colon separator\n\
                     [aa:bb.cc]letters";
        let (track, diagnostics) = parse(input);
        assert!(track.is_empty());
        assert_eq!(diagnostics.skipped_lines, 6);
    }

    #[test]
    fn test_stable_sort_on_equal_times() {
        let (track, _) = parse("[00:03.00]b\n[00:01.00]first\n[00:01.00]second");
        let texts: Vec<_> = track.lines().iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, ["first", "second", "b"]);
    }

    #[test]
    fn test_blank_lines_counted() {
        let input = "\n[00:05.00]First\n\n   \n[00:10.00]Second\n";
        let (track, diagnostics) = parse(input);
        assert_eq!(track.lines().len(), 2);
        assert_eq!(diagnostics.blank_lines, 3);
        assert_eq!(diagnostics.total_lines, 5);
    }

    #[test]
    fn test_crlf_input() {
        let (track, _) = parse("[ti:Song]\r\n[00:01.00]One\r\n[00:02.00]Two\r\n");
        assert_eq!(track.metadata().title(), Some("Song"));
        assert_eq!(track.lines().len(), 2);
        assert_eq!(track.lines()[1].text, "Two");
    }

    #[test]
    fn test_cjk_lyrics() {
        let (track, _) = parse("[00:05.00]生日快乐");
        assert_eq!(track.lines()[0].text, "生日快乐");
    }

    #[test]
    fn test_stacked_timestamps_keep_inner_tag_as_text() {
        // Only the first timestamp is read
        let (track, _) = parse("[00:05.00][00:15.00]Repeated");
        assert_eq!(track.lines().len(), 1);
        assert!(approx_eq(track.lines()[0].time, 5.0));
        assert_eq!(track.lines()[0].text, "[00:15.00]Repeated");
    }

    #[test]
    fn test_start_time_duration() {
        assert_eq!(LyricLine::new(1.5, "x").start_time().as_millis(), 1500);
        assert_eq!(LyricLine::new(-3.0, "x").start_time(), Duration::ZERO);
    }
}
