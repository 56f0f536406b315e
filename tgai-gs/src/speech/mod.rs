//! Speech playback: synthesis collaborator and playback controller

pub mod controller;

use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;

pub use controller::{PcmFormat, PlayOutcome, SpeechController};

/// Synthesis collaborator.
///
/// Turns text into a base64 PCM16 payload. `Ok(None)` means the service
/// answered but returned no audio.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Option<String>>;
}

/// What the controller is doing right now
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PlaybackState {
    Idle,
    Playing { message_id: String },
}

impl PlaybackState {
    pub fn from_active(active: Option<String>) -> Self {
        match active {
            Some(message_id) => PlaybackState::Playing { message_id },
            None => PlaybackState::Idle,
        }
    }
}
