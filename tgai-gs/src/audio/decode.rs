//! Speech payload decoding
//!
//! Converts the base64 payload returned by the synthesis API into a planar
//! float `AudioBuffer`:
//!
//! base64 → raw bytes → signed 16-bit little-endian PCM → f32 / 32768.0
//!
//! **Truncation policy:** a trailing partial frame (an odd byte, or an
//! incomplete multi-channel frame) is discarded, never reported as an error.

use crate::audio::AudioBuffer;
use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tracing::debug;

/// Sample rate of synthesized speech (Hz)
pub const DEFAULT_SAMPLE_RATE: u32 = 24000;

/// Channel count of synthesized speech (mono)
pub const DEFAULT_CHANNELS: u16 = 1;

/// Bytes per PCM16 sample
const BYTES_PER_SAMPLE: usize = 2;

/// PCM16 full-scale divisor
const PCM16_SCALE: f32 = 32768.0;

/// Decode a standard-alphabet base64 string into raw bytes.
///
/// Padding is honored per the standard algorithm. Any invalid character,
/// length, or padding yields `Error::Decode`.
pub fn decode_base64(encoded: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(encoded.trim())
        .map_err(|e| Error::Decode(format!("Invalid base64 audio payload: {}", e)))
}

/// Reinterpret raw bytes as interleaved PCM16 LE and de-interleave into channels.
///
/// `frame_count = (len / 2) / channels`; channel `c` of frame `i` is
/// `raw[i * channels + c] / 32768.0`.
///
/// # Errors
/// - `channels == 0` or `sample_rate == 0`
pub fn pcm16_to_buffer(bytes: &[u8], sample_rate: u32, channels: u16) -> Result<AudioBuffer> {
    if channels == 0 {
        return Err(Error::Decode("Channel count must be at least 1".to_string()));
    }
    if sample_rate == 0 {
        return Err(Error::Decode("Sample rate must be non-zero".to_string()));
    }

    let num_channels = channels as usize;
    let frame_bytes = BYTES_PER_SAMPLE * num_channels;
    let frame_count = (bytes.len() / BYTES_PER_SAMPLE) / num_channels;

    let dropped = bytes.len() - frame_count * frame_bytes;
    if dropped > 0 {
        debug!(
            "Discarding {} trailing byte(s) of partial frame ({} bytes, {} channel(s))",
            dropped,
            bytes.len(),
            channels
        );
    }

    let mut planar: Vec<Vec<f32>> = (0..num_channels)
        .map(|_| Vec::with_capacity(frame_count))
        .collect();

    for frame in bytes[..frame_count * frame_bytes].chunks_exact(frame_bytes) {
        for (ch, sample) in frame.chunks_exact(BYTES_PER_SAMPLE).enumerate() {
            let value = i16::from_le_bytes([sample[0], sample[1]]);
            planar[ch].push(value as f32 / PCM16_SCALE);
        }
    }

    AudioBuffer::from_planar(planar, sample_rate)
}

/// Decode a base64 PCM16 payload into an `AudioBuffer`.
pub fn decode_audio(encoded: &str, sample_rate: u32, channels: u16) -> Result<AudioBuffer> {
    let bytes = decode_base64(encoded)?;
    let buffer = pcm16_to_buffer(&bytes, sample_rate, channels)?;

    debug!(
        "Decoded {} bytes into {} frame(s) x {} channel(s) at {}Hz",
        bytes.len(),
        buffer.frame_count(),
        buffer.channel_count(),
        buffer.sample_rate()
    );

    Ok(buffer)
}

/// Decode with the synthesis defaults (24000 Hz mono).
pub fn decode_pcm16(encoded: &str) -> Result<AudioBuffer> {
    decode_audio(encoded, DEFAULT_SAMPLE_RATE, DEFAULT_CHANNELS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pcm_bytes(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    #[test]
    fn test_decode_base64_padding() {
        assert_eq!(decode_base64("AQI=").unwrap(), vec![1, 2]);
        assert_eq!(decode_base64("AQID").unwrap(), vec![1, 2, 3]);
        assert_eq!(decode_base64("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_decode_base64_rejects_invalid_characters() {
        let err = decode_base64("AQ*D").unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn test_mono_samples_are_normalized() {
        let bytes = pcm_bytes(&[0, 16384, -32768, 32767]);
        let buffer = pcm16_to_buffer(&bytes, 24000, 1).unwrap();

        assert_eq!(buffer.frame_count(), 4);
        let ch = buffer.channel(0).unwrap();
        assert_eq!(ch[0], 0.0);
        assert_eq!(ch[1], 0.5);
        assert_eq!(ch[2], -1.0);
        assert_eq!(ch[3], 32767.0 / 32768.0);
        assert!(ch[3] < 1.0);
    }

    #[test]
    fn test_stereo_deinterleave() {
        let bytes = pcm_bytes(&[100, -100, 200, -200]);
        let buffer = pcm16_to_buffer(&bytes, 24000, 2).unwrap();

        assert_eq!(buffer.frame_count(), 2);
        assert_eq!(buffer.channel(0).unwrap(), &[100.0 / 32768.0, 200.0 / 32768.0]);
        assert_eq!(buffer.channel(1).unwrap(), &[-100.0 / 32768.0, -200.0 / 32768.0]);
    }

    #[test]
    fn test_odd_byte_is_truncated() {
        let bytes = [0u8; 7];
        let buffer = pcm16_to_buffer(&bytes, 24000, 1).unwrap();
        assert_eq!(buffer.frame_count(), 3);
    }

    #[test]
    fn test_partial_stereo_frame_is_truncated() {
        // 3 samples with 2 channels: one full frame, one orphan sample
        let bytes = pcm_bytes(&[1, 2, 3]);
        let buffer = pcm16_to_buffer(&bytes, 24000, 2).unwrap();
        assert_eq!(buffer.frame_count(), 1);
        assert_eq!(buffer.channel(1).unwrap(), &[2.0 / 32768.0]);
    }

    #[test]
    fn test_zero_channels_rejected() {
        assert!(matches!(pcm16_to_buffer(&[0, 0], 24000, 0), Err(Error::Decode(_))));
        assert!(matches!(pcm16_to_buffer(&[0, 0], 0, 1), Err(Error::Decode(_))));
    }

    #[test]
    fn test_decode_pcm16_uses_defaults() {
        let encoded = STANDARD.encode(pcm_bytes(&[1000; 48]));
        let buffer = decode_pcm16(&encoded).unwrap();

        assert_eq!(buffer.sample_rate(), DEFAULT_SAMPLE_RATE);
        assert_eq!(buffer.channel_count(), DEFAULT_CHANNELS);
        assert_eq!(buffer.frame_count(), 48);
        assert_eq!(buffer.duration_ms(), 2);
    }
}
