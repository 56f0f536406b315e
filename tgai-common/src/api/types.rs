//! Shared API request/response types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ========================================
// Guide Chat Types
// ========================================

/// Traveler budget tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Budget {
    Budget,
    MidRange,
    Luxury,
}

impl Budget {
    pub fn as_str(&self) -> &'static str {
        match self {
            Budget::Budget => "budget",
            Budget::MidRange => "mid-range",
            Budget::Luxury => "luxury",
        }
    }
}

/// Traveler preferences folded into the guide's system instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    pub budget: Budget,
    pub interests: Vec<String>,
    pub duration: String,
    pub language: String,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            budget: Budget::MidRange,
            interests: vec!["Culture".to_string(), "Food".to_string()],
            duration: "3 days".to_string(),
            language: "English".to_string(),
        }
    }
}

/// Author of a chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

/// One earlier turn of the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

/// Traveler position used for maps grounding
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

/// Source citation returned alongside a generated answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingLink {
    pub title: String,
    pub uri: String,
}

/// POST /api/v1/chat request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuideRequest {
    pub prompt: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
    #[serde(default)]
    pub preferences: UserPreferences,
    #[serde(default)]
    pub location: Option<GeoLocation>,
}

/// POST /api/v1/chat response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuideReply {
    /// Server-assigned id; pass it back as `message_id` to speak this reply
    pub message_id: Uuid,
    pub text: String,
    #[serde(default)]
    pub links: Vec<GroundingLink>,
}

// ========================================
// Speech Types
// ========================================

/// POST /api/v1/speech/play request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeakRequest {
    pub text: String,
    pub message_id: String,
}

/// Result of a play request that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeakStatus {
    Started,
    AlreadyPlaying,
}

/// POST /api/v1/speech/play response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeakResponse {
    pub status: SpeakStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frames: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

/// GET /api/v1/speech/state response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeakingResponse {
    pub speaking: Option<String>,
}

/// JSON body returned with every non-2xx response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
