//! Audio subsystem: payload decoding, resampling guard, device output

pub mod decode;
pub mod output;
pub mod resampler;
pub mod types;

pub use decode::{decode_audio, decode_base64, decode_pcm16, pcm16_to_buffer};
pub use output::{Completion, CpalOpener, CpalOutput, DeviceOpener, OutputDevice};
pub use types::AudioBuffer;
