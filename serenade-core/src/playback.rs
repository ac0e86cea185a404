use std::time::{Duration, Instant};

/// Current state of the turntable
#[derive(Debug, Clone)]
pub struct PlaybackState {
    /// Whether the record is spinning
    pub is_playing: bool,
    /// Loaded track (None when stopped)
    pub track: Option<TrackInfo>,
    /// Playback position at `updated_at`
    pub position: Duration,
    /// Total track duration
    pub duration: Duration,
    /// When this state was captured (for interpolation)
    pub updated_at: Instant,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            is_playing: false,
            track: None,
            position: Duration::ZERO,
            duration: Duration::ZERO,
            updated_at: Instant::now(),
        }
    }
}

impl PlaybackState {
    #[must_use]
    pub fn new(
        is_playing: bool,
        track: Option<TrackInfo>,
        position: Duration,
        duration: Duration,
    ) -> Self {
        Self {
            is_playing,
            track,
            position,
            duration,
            updated_at: Instant::now(),
        }
    }

    /// Position now, extrapolated from `updated_at` while spinning
    #[must_use]
    pub fn interpolated_position(&self) -> Duration {
        if !self.is_playing {
            return self.position;
        }

        let interpolated = self.position + self.updated_at.elapsed();

        // A zero duration means the length is unknown
        if self.duration.is_zero() {
            interpolated
        } else {
            interpolated.min(self.duration)
        }
    }

    /// Whether `other` holds a different record (compared by id)
    #[must_use]
    pub fn track_changed(&self, other: &Self) -> bool {
        match (&self.track, &other.track) {
            (Some(a), Some(b)) => a.id != b.id,
            (None, None) => false,
            _ => true,
        }
    }

    /// Whether the record started or stopped spinning
    #[must_use]
    pub const fn playback_state_changed(&self, other: &Self) -> bool {
        self.is_playing != other.is_playing
    }

    /// Whether `other`'s position is further than `threshold` from where
    /// this state predicts the needle to be
    #[must_use]
    pub fn seek_occurred(&self, other: &Self, threshold: Duration) -> bool {
        if self.track_changed(other) {
            return false;
        }

        let predicted = self.interpolated_position();
        let reported = other.position;
        reported.max(predicted) - reported.min(predicted) > threshold
    }
}

/// A song the turntable can play
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo {
    /// Stable identifier, unique within a theme catalog
    pub id: String,
    pub title: String,
    pub artist: String,
    /// Audio location (URL or path)
    pub audio: String,
    /// LRC lyric sheet location (URL or path)
    pub lyrics: String,
    pub duration: Duration,
}

impl TrackInfo {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            audio: String::new(),
            lyrics: String::new(),
            duration,
        }
    }

    #[must_use]
    pub fn with_audio(mut self, location: impl Into<String>) -> Self {
        self.audio = location.into();
        self
    }

    #[must_use]
    pub fn with_lyrics(mut self, location: impl Into<String>) -> Self {
        self.lyrics = location.into();
        self
    }
}
