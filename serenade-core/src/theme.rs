//! Theme catalog: each theme pairs a greeting with one song.

use crate::error::{CoreError, Result};
use crate::playback::TrackInfo;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// A switchable look-and-sound for the greeting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub id: String,
    pub name: String,
    pub greeting: String,
    /// Accent colour as `#RRGGBB`
    #[serde(default = "default_accent")]
    pub accent: String,
    pub track: ThemeTrack,
}

/// Song attached to a theme
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeTrack {
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub audio: String,
    pub lyrics: String,
    pub duration_secs: u32,
}

fn default_accent() -> String {
    "#FFFFFF".to_string()
}

impl Theme {
    /// Track info for the turntable; the track id is the theme id
    #[must_use]
    pub fn track_info(&self) -> TrackInfo {
        TrackInfo::new(
            &self.id,
            &self.track.title,
            &self.track.artist,
            Duration::from_secs(u64::from(self.track.duration_secs)),
        )
        .with_audio(&self.track.audio)
        .with_lyrics(&self.track.lyrics)
    }

    /// Parse the accent colour into RGB
    #[must_use]
    pub fn accent_rgb(&self) -> Option<(u8, u8, u8)> {
        let hex = self.accent.strip_prefix('#').unwrap_or(&self.accent);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some((r, g, b))
    }
}

/// The three themes that ship with the app
#[must_use]
pub fn builtin_themes() -> Vec<Theme> {
    vec![
        Theme {
            id: "sunrise".to_string(),
            name: "Warm Sunrise".to_string(),
            greeting: "Happy birthday! May your year glow like a sunrise.".to_string(),
            accent: "#FFB347".to_string(),
            track: ThemeTrack {
                title: "Happy Birthday (Acoustic)".to_string(),
                artist: "The Party Band".to_string(),
                audio: "audio/sunrise.mp3".to_string(),
                lyrics: "lyrics/sunrise.lrc".to_string(),
                duration_secs: 48,
            },
        },
        Theme {
            id: "vinyl".to_string(),
            name: "Retro Vinyl".to_string(),
            greeting: "Another spin around the sun. Happy birthday!".to_string(),
            accent: "#C0392B".to_string(),
            track: ThemeTrack {
                title: "Birthday Groove".to_string(),
                artist: "The Party Band".to_string(),
                audio: "audio/vinyl.mp3".to_string(),
                lyrics: "lyrics/vinyl.lrc".to_string(),
                duration_secs: 52,
            },
        },
        Theme {
            id: "starlight".to_string(),
            name: "Starlight".to_string(),
            greeting: "Make a wish under the stars. Happy birthday!".to_string(),
            accent: "#6C5CE7".to_string(),
            track: ThemeTrack {
                title: "Wish Upon a Candle".to_string(),
                artist: "The Party Band".to_string(),
                audio: "audio/starlight.mp3".to_string(),
                lyrics: "lyrics/starlight.lrc".to_string(),
                duration_secs: 45,
            },
        },
    ]
}

/// Ordered, non-empty set of themes with unique ids
#[derive(Debug, Clone)]
pub struct ThemeCatalog {
    themes: Vec<Theme>,
}

impl ThemeCatalog {
    /// Build a catalog, rejecting an empty list or duplicate ids
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigInvalid`] if the list is empty or ids repeat.
    pub fn new(themes: Vec<Theme>) -> Result<Self> {
        if themes.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "at least one theme is required".to_string(),
            });
        }

        for (i, theme) in themes.iter().enumerate() {
            if themes[..i].iter().any(|t| t.id == theme.id) {
                return Err(CoreError::ConfigInvalid {
                    message: format!("duplicate theme id: {}", theme.id),
                });
            }
        }

        Ok(Self { themes })
    }

    /// Catalog of [`builtin_themes`]
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            themes: builtin_themes(),
        }
    }

    /// Look up a theme by id
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownTheme`] if no theme has this id.
    pub fn get(&self, id: &str) -> Result<&Theme> {
        self.themes
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| CoreError::UnknownTheme { id: id.to_string() })
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.themes.iter().any(|t| t.id == id)
    }

    #[must_use]
    pub fn first(&self) -> &Theme {
        &self.themes[0]
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.themes.iter().map(|t| t.id.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.themes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }

    /// The theme after `id`, wrapping around; unknown ids yield the first theme
    #[must_use]
    pub fn next_after(&self, id: &str) -> &Theme {
        self.themes
            .iter()
            .position(|t| t.id == id)
            .map_or_else(|| self.first(), |i| &self.themes[(i + 1) % self.themes.len()])
    }

    /// Pick the first known id among the candidates, else the first theme
    #[must_use]
    pub fn resolve<'a>(&self, candidates: impl IntoIterator<Item = &'a str>) -> &Theme {
        for id in candidates {
            match self.get(id) {
                Ok(theme) => return theme,
                Err(e) => warn!("{e}, ignoring"),
            }
        }
        self.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_has_three_unique_themes() {
        let catalog = ThemeCatalog::new(builtin_themes()).unwrap();
        assert_eq!(catalog.len(), 3);
        let ids: Vec<_> = catalog.ids().collect();
        assert_eq!(ids, ["sunrise", "vinyl", "starlight"]);
    }

    #[test]
    fn test_rejects_empty_and_duplicates() {
        assert!(matches!(
            ThemeCatalog::new(Vec::new()),
            Err(CoreError::ConfigInvalid { .. })
        ));

        let mut themes = builtin_themes();
        themes.push(themes[0].clone());
        assert!(matches!(
            ThemeCatalog::new(themes),
            Err(CoreError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn test_get_unknown() {
        let catalog = ThemeCatalog::builtin();
        assert!(catalog.get("vinyl").is_ok());
        assert!(matches!(
            catalog.get("disco"),
            Err(CoreError::UnknownTheme { id }) if id == "disco"
        ));
    }

    #[test]
    fn test_next_after_wraps() {
        let catalog = ThemeCatalog::builtin();
        assert_eq!(catalog.next_after("sunrise").id, "vinyl");
        assert_eq!(catalog.next_after("vinyl").id, "starlight");
        assert_eq!(catalog.next_after("starlight").id, "sunrise");
        assert_eq!(catalog.next_after("disco").id, "sunrise");
    }

    #[test]
    fn test_resolve_prefers_first_known() {
        let catalog = ThemeCatalog::builtin();
        assert_eq!(catalog.resolve(["disco", "starlight", "vinyl"]).id, "starlight");
        assert_eq!(catalog.resolve(["disco"]).id, "sunrise");
        assert_eq!(catalog.resolve(Vec::<&str>::new()).id, "sunrise");
    }

    #[test]
    fn test_track_info_uses_theme_id() {
        let catalog = ThemeCatalog::builtin();
        let track = catalog.get("vinyl").unwrap().track_info();
        assert_eq!(track.id, "vinyl");
        assert_eq!(track.title, "Birthday Groove");
        assert_eq!(track.lyrics, "lyrics/vinyl.lrc");
        assert_eq!(track.duration, Duration::from_secs(52));
    }

    #[test]
    fn test_accent_rgb() {
        let mut theme = ThemeCatalog::builtin().first().clone();
        assert_eq!(theme.accent_rgb(), Some((0xFF, 0xB3, 0x47)));

        theme.accent = "not a colour".to_string();
        assert_eq!(theme.accent_rgb(), None);
    }

    #[test]
    fn test_bundled_lyrics_fit_their_songs() {
        let assets = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../assets");
        for theme in builtin_themes() {
            let raw = std::fs::read_to_string(assets.join(&theme.track.lyrics)).unwrap();
            let (track, diagnostics) = crate::track::LyricTrack::parse(&raw);

            assert!(!track.is_empty(), "{} has no lyrics", theme.id);
            assert_eq!(diagnostics.skipped_lines, 0, "{}", theme.id);
            assert_eq!(track.metadata().title(), Some(theme.track.title.as_str()));
            let last = track.lines().last().unwrap();
            assert!(last.time < f64::from(theme.track.duration_secs), "{}", theme.id);
        }
    }
}
