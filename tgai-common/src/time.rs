//! Timestamp utilities

use chrono::{DateTime, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Duration in milliseconds of `frames` frames at `sample_rate`
///
/// Returns 0 for a zero sample rate instead of dividing by zero.
pub fn frames_to_ms(frames: usize, sample_rate: u32) -> u64 {
    if sample_rate == 0 {
        return 0;
    }
    (frames as u64 * 1000) / sample_rate as u64
}
