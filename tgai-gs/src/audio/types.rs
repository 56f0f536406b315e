//! Core audio data types
//!
//! Defines the decoded buffer handed from the decoder to the output device.

use crate::error::{Error, Result};

/// AudioBuffer holds one decoded utterance ready for playback.
///
/// **Format:**
/// - Samples are f32 in [-1.0, 1.0)
/// - Planar: one `Vec<f32>` per channel, all the same length
/// - Sample rate is metadata supplied by the caller; it is never resampled here
///
/// Immutable after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl AudioBuffer {
    /// Create a buffer from planar channel data.
    ///
    /// # Errors
    /// - No channels, zero sample rate, or channels of unequal length
    pub fn from_planar(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self> {
        if channels.is_empty() {
            return Err(Error::Decode("Audio buffer needs at least one channel".to_string()));
        }
        if sample_rate == 0 {
            return Err(Error::Decode("Audio buffer sample rate must be non-zero".to_string()));
        }
        let frames = channels[0].len();
        if channels.iter().any(|c| c.len() != frames) {
            return Err(Error::Decode("Audio buffer channels differ in length".to_string()));
        }

        Ok(Self {
            channels,
            sample_rate,
        })
    }

    /// Number of channels
    pub fn channel_count(&self) -> u16 {
        self.channels.len() as u16
    }

    /// Frames per channel
    pub fn frame_count(&self) -> usize {
        self.channels[0].len()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Samples for one channel, or None if out of range
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(|c| c.as_slice())
    }

    /// All channels in planar layout
    pub fn planar(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// True if the buffer holds no frames
    pub fn is_empty(&self) -> bool {
        self.frame_count() == 0
    }

    /// Get duration in milliseconds
    pub fn duration_ms(&self) -> u64 {
        tgai_common::time::frames_to_ms(self.frame_count(), self.sample_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_creation() {
        let buffer = AudioBuffer::from_planar(vec![vec![0.5, -0.5], vec![0.25, -0.25]], 24000).unwrap();

        assert_eq!(buffer.channel_count(), 2);
        assert_eq!(buffer.frame_count(), 2);
        assert_eq!(buffer.sample_rate(), 24000);
        assert_eq!(buffer.channel(1), Some(&[0.25, -0.25][..]));
        assert!(buffer.channel(2).is_none());
    }

    #[test]
    fn test_buffer_duration() {
        // 24000 frames = 1 second at 24kHz
        let buffer = AudioBuffer::from_planar(vec![vec![0.0; 24000]], 24000).unwrap();
        assert_eq!(buffer.duration_ms(), 1000);
    }

    #[test]
    fn test_buffer_rejects_bad_shapes() {
        assert!(AudioBuffer::from_planar(vec![], 24000).is_err());
        assert!(AudioBuffer::from_planar(vec![vec![0.0]], 0).is_err());
        assert!(AudioBuffer::from_planar(vec![vec![0.0], vec![]], 24000).is_err());
    }

    #[test]
    fn test_empty_buffer() {
        let buffer = AudioBuffer::from_planar(vec![Vec::new()], 24000).unwrap();
        assert!(buffer.is_empty());
        assert_eq!(buffer.duration_ms(), 0);
    }
}
