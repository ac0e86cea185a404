//! Time and duration conversion utilities.
//!
//! Lyric timestamps are plain `f64` seconds while the playback clock works in
//! [`Duration`]; these helpers convert between the two with explicit
//! saturation instead of panicking.

use std::time::Duration;

/// Extension trait for safe Duration conversions.
pub trait DurationExt {
    /// Convert duration to milliseconds as u64, saturating at `u64::MAX`.
    fn as_millis_u64(&self) -> u64;

    /// Format as an LRC style `mm:ss.cc` clock.
    ///
    /// Minutes are not wrapped, so an hour shows as `60:00.00`.
    fn to_lrc_clock(&self) -> String;
}

impl DurationExt for Duration {
    fn as_millis_u64(&self) -> u64 {
        u64::try_from(self.as_millis()).unwrap_or(u64::MAX)
    }

    fn to_lrc_clock(&self) -> String {
        let centis = self.as_millis_u64() / 10;
        let minutes = centis / 6000;
        let seconds = (centis / 100) % 60;
        let hundredths = centis % 100;
        format!("{minutes:02}:{seconds:02}.{hundredths:02}")
    }
}

/// Convert seconds to a [`Duration`].
///
/// Negative and NaN values become zero; values too large for a `Duration`
/// saturate at `Duration::MAX`.
#[must_use]
pub fn secs_to_duration(secs: f64) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}
