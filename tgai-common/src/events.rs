//! Event types for the TGAI event system
//!
//! Events are broadcast inside a service and serialized for SSE transmission.

use serde::{Deserialize, Serialize};

/// TGAI event types
///
/// All events use this central enum for type safety and exhaustive matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GuideEvent {
    /// Speech playback started for a message
    ///
    /// Triggers:
    /// - SSE: Highlight the "now speaking" button for `message_id`
    SpeechStarted {
        /// Message whose text is being spoken
        message_id: String,
        /// Frames per channel submitted to the output device
        frames: usize,
        /// Playback length in milliseconds
        duration_ms: u64,
        /// When playback started
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Speech playback reached its natural end
    SpeechFinished {
        /// Message that finished speaking
        message_id: String,
        /// When playback finished
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Speech could not be synthesized, decoded, or played
    ///
    /// The active speaker has already been cleared when this is sent.
    SpeechFailed {
        /// Message that failed
        message_id: String,
        /// Human-readable failure reason
        error: String,
        /// When the failure was detected
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl GuideEvent {
    /// Event name used for the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            GuideEvent::SpeechStarted { .. } => "SpeechStarted",
            GuideEvent::SpeechFinished { .. } => "SpeechFinished",
            GuideEvent::SpeechFailed { .. } => "SpeechFailed",
        }
    }

    /// Message the event refers to
    pub fn message_id(&self) -> &str {
        match self {
            GuideEvent::SpeechStarted { message_id, .. }
            | GuideEvent::SpeechFinished { message_id, .. }
            | GuideEvent::SpeechFailed { message_id, .. } => message_id,
        }
    }
}
