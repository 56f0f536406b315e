//! Audio resampling using rubato
//!
//! Guard used by the output device when it cannot open a stream at the
//! buffer's own sample rate. The decoder itself never resamples.

use crate::audio::AudioBuffer;
use crate::error::{Error, Result};
use rubato::{FastFixedIn, PolynomialDegree, Resampler as RubatoResampler};
use tracing::debug;

/// Resample a buffer to `output_rate`.
///
/// Returns a copy if the buffer is already at `output_rate` or holds no frames.
pub fn resample(buffer: &AudioBuffer, output_rate: u32) -> Result<AudioBuffer> {
    let input_rate = buffer.sample_rate();

    if input_rate == output_rate || buffer.is_empty() {
        debug!("Sample rate already at {}Hz, skipping resample", input_rate);
        return AudioBuffer::from_planar(buffer.planar().to_vec(), output_rate);
    }

    if output_rate == 0 {
        return Err(Error::PlaybackDevice("Device sample rate is zero".to_string()));
    }

    debug!(
        "Resampling from {}Hz to {}Hz ({} channels)",
        input_rate,
        output_rate,
        buffer.channel_count()
    );

    let input_frames = buffer.frame_count();

    // One chunk covering the whole utterance
    let mut resampler = FastFixedIn::<f32>::new(
        output_rate as f64 / input_rate as f64,
        1.0,
        PolynomialDegree::Septic,
        input_frames,
        buffer.channel_count() as usize,
    )
    .map_err(|e| Error::PlaybackDevice(format!("Failed to create resampler: {}", e)))?;

    let planar_output = resampler
        .process(buffer.planar(), None)
        .map_err(|e| Error::PlaybackDevice(format!("Resampling failed: {}", e)))?;

    debug!(
        "Resampled {} input frames to {} output frames",
        input_frames,
        planar_output.first().map(|c| c.len()).unwrap_or(0)
    );

    AudioBuffer::from_planar(planar_output, output_rate)
}
