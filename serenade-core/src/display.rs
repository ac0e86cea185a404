//! The render step between the playback clock and whatever draws lyrics.

use crate::track::LyricTrack;

/// Default placeholder shown while no lyric line is active
pub const DEFAULT_FILLER_TEXT: &str = "♪ now playing ♪";

/// What the display is currently showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    /// Filler text: no track, no lyrics, or before the first line
    Filler,
    /// The line at this index is active
    Line(usize),
}

/// Outcome of one clock tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayUpdate {
    /// Text that should be on screen after this tick
    pub text: String,
    pub state: DisplayState,
    /// Whether the display state differs from the previous tick
    pub changed: bool,
}

/// Two-state lyric display driven by playback ticks.
///
/// Holds the loaded [`LyricTrack`] (if any) and reports at most one change
/// per distinguishable state, so consumers can redraw only on `changed`.
#[derive(Debug, Clone)]
pub struct LyricDisplay {
    track: Option<LyricTrack>,
    filler: String,
    state: DisplayState,
    text: String,
}

impl LyricDisplay {
    pub fn new(filler: impl Into<String>) -> Self {
        let filler = filler.into();
        Self {
            track: None,
            text: filler.clone(),
            filler,
            state: DisplayState::Filler,
        }
    }

    /// Install lyrics for the current song.
    ///
    /// A track with no lyric lines counts as no lyrics at all.
    pub fn load(&mut self, mut track: LyricTrack) {
        if track.is_empty() {
            self.clear();
            return;
        }
        track.reset_cursor();
        self.track = Some(track);
        self.show_filler();
    }

    /// Forget the current lyrics and fall back to the filler
    pub fn clear(&mut self) {
        self.track = None;
        self.show_filler();
    }

    fn show_filler(&mut self) {
        self.state = DisplayState::Filler;
        self.text.clone_from(&self.filler);
    }

    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.track.is_some()
    }

    #[must_use]
    pub const fn track(&self) -> Option<&LyricTrack> {
        self.track.as_ref()
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub const fn state(&self) -> DisplayState {
        self.state
    }

    #[must_use]
    pub fn filler(&self) -> &str {
        &self.filler
    }

    /// Advance the display to `position_secs`.
    pub fn tick(&mut self, position_secs: f64) -> DisplayUpdate {
        let matched = self.track.as_mut().and_then(|t| t.query(position_secs));

        let (state, text) = match matched {
            Some(m) => {
                let text = if m.text.is_empty() {
                    self.filler.clone()
                } else {
                    m.text
                };
                (DisplayState::Line(m.index), text)
            }
            None => (DisplayState::Filler, self.filler.clone()),
        };

        let changed = state != self.state;
        if changed {
            self.state = state;
            self.text.clone_from(&text);
        }

        DisplayUpdate {
            text: self.text.clone(),
            state: self.state,
            changed,
        }
    }
}

impl Default for LyricDisplay {
    fn default() -> Self {
        Self::new(DEFAULT_FILLER_TEXT)
    }
}
