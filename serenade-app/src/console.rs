//! Terminal rendering of the greeting and lyric lines.

use serenade_core::{DurationExt, SyncEvent, Theme, TrackInfo};
use std::fmt::Write;
use std::time::Duration;

const RESET: &str = "\x1b[0m";
const DIM: &str = "\x1b[2m";

/// Formats output for the active theme
#[derive(Debug, Clone)]
pub struct Console {
    accent: Option<(u8, u8, u8)>,
    color: bool,
}

impl Console {
    pub const fn new(color: bool) -> Self {
        Self {
            accent: None,
            color,
        }
    }

    /// Switch to `theme`'s accent and build its greeting card
    pub fn banner(&mut self, theme: &Theme) -> String {
        self.accent = theme.accent_rgb();

        let mut out = String::new();
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", self.accented(&format!("✦ {} ✦", theme.name)));
        let _ = writeln!(out, "{}", theme.greeting);
        let _ = write!(
            out,
            "{}",
            self.dimmed(&format!("{} by {}", theme.track.title, theme.track.artist))
        );
        out
    }

    /// Text to print for a sync event, if any
    pub fn render(&self, event: &SyncEvent) -> Option<String> {
        match event {
            SyncEvent::LineChanged {
                text,
                index: Some(_),
                position,
            } => Some(format!(
                "{} {}",
                self.dimmed(&format!("[{}]", position.to_lrc_clock())),
                self.accented(text)
            )),
            SyncEvent::LineChanged {
                text, index: None, ..
            } => Some(self.dimmed(text)),
            SyncEvent::LyricsNotFound { .. } => {
                Some(self.dimmed("(no lyrics for this song, just enjoy the music)"))
            }
            SyncEvent::PlaybackPaused { position } => {
                Some(self.dimmed(&format!("paused at {}", position.to_lrc_clock())))
            }
            SyncEvent::PlaybackResumed { position } => {
                Some(self.dimmed(&format!("playing from {}", position.to_lrc_clock())))
            }
            SyncEvent::SeekOccurred { position } => {
                Some(self.dimmed(&format!("jumped to {}", position.to_lrc_clock())))
            }
            _ => None,
        }
    }

    /// One-line summary of the turntable
    pub fn status(&self, track: Option<&TrackInfo>, playing: bool, position: Duration) -> String {
        let Some(track) = track else {
            return self.dimmed("nothing on the turntable");
        };
        let verb = if playing { "playing" } else { "paused" };
        self.dimmed(&format!(
            "{verb} {} by {} at {} / {}",
            track.title,
            track.artist,
            position.to_lrc_clock(),
            track.duration.to_lrc_clock()
        ))
    }

    fn accented(&self, text: &str) -> String {
        match (self.color, self.accent) {
            (true, Some((r, g, b))) => format!("\x1b[1;38;2;{r};{g};{b}m{text}{RESET}"),
            _ => text.to_string(),
        }
    }

    fn dimmed(&self, text: &str) -> String {
        if self.color {
            format!("{DIM}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serenade_core::builtin_themes;

    #[test]
    fn test_banner_plain() {
        let theme = &builtin_themes()[1];
        let mut console = Console::new(false);
        let banner = console.banner(theme);
        assert!(banner.contains("✦ Retro Vinyl ✦"));
        assert!(banner.contains(&theme.greeting));
        assert!(banner.contains("Birthday Groove by The Party Band"));
        assert!(!banner.contains('\x1b'));
    }

    #[test]
    fn test_banner_uses_accent() {
        let theme = &builtin_themes()[1];
        let mut console = Console::new(true);
        let banner = console.banner(theme);
        // #C0392B
        assert!(banner.contains("38;2;192;57;43m"));
    }

    #[test]
    fn test_status() {
        let console = Console::new(false);
        let track = builtin_themes()[0].track_info();
        assert_eq!(
            console.status(Some(&track), true, Duration::from_millis(12_500)),
            "playing Happy Birthday (Acoustic) by The Party Band at 00:12.50 / 00:48.00"
        );
        assert_eq!(
            console.status(None, false, Duration::ZERO),
            "nothing on the turntable"
        );
    }

    #[test]
    fn test_render_lines() {
        let console = Console::new(false);
        let line = SyncEvent::LineChanged {
            text: "Happy birthday to you".to_string(),
            index: Some(0),
            position: Duration::from_millis(1500),
        };
        assert_eq!(
            console.render(&line).unwrap(),
            "[00:01.50] Happy birthday to you"
        );

        let filler = SyncEvent::LineChanged {
            text: "♪".to_string(),
            index: None,
            position: Duration::ZERO,
        };
        assert_eq!(console.render(&filler).unwrap(), "♪");

        assert!(console
            .render(&SyncEvent::PositionSync {
                position: Duration::ZERO
            })
            .is_none());
    }
}
