//! Tour guide chat with Search and Maps grounding

use super::client::GeminiClient;
use super::types::{
    Content, GenerateContentRequest, GenerateContentResponse, LatLng, RetrievalConfig, Tool,
    ToolConfig,
};
use crate::error::{Error, Result};
use tgai_common::api::{ChatRole, ChatTurn, GuideReply, GuideRequest, GroundingLink, UserPreferences};
use tracing::info;
use uuid::Uuid;

/// Number of most recent history turns sent with each prompt
pub const MAX_HISTORY_TURNS: usize = 10;

pub const FALLBACK_REPLY: &str = "I'm sorry, I couldn't process that request.";

const GUIDELINES: [&str; 6] = [
    "Provide specific, actionable advice.",
    "Use Google Maps grounding for restaurants, hotels, and attractions.",
    "Use Google Search grounding for events, current weather, and tickets.",
    "If the user asks for a local phrase, provide the translation and phonetic pronunciation.",
    "Always suggest logical itineraries.",
    "Include emojis to make it engaging.",
];

pub fn system_instruction(prefs: &UserPreferences) -> String {
    let mut out = String::from(
        "You are a world-class AI Tour Guide.\n\
         Your tone is friendly, knowledgeable, and enthusiastic.\n\
         Current User Preferences:\n",
    );
    out.push_str(&format!("- Budget: {}\n", prefs.budget.as_str()));
    out.push_str(&format!("- Interests: {}\n", prefs.interests.join(", ")));
    out.push_str(&format!("- Preferred Duration: {}\n", prefs.duration));
    out.push_str(&format!("- Language: {}\n", prefs.language));
    out.push_str("\nGuidelines:\n");
    for (i, line) in GUIDELINES.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, line));
    }
    out
}

fn role_name(role: ChatRole) -> &'static str {
    match role {
        ChatRole::User => "user",
        ChatRole::Model => "model",
    }
}

pub fn chat_request(request: &GuideRequest) -> GenerateContentRequest {
    let skip = request.history.len().saturating_sub(MAX_HISTORY_TURNS);
    let mut contents: Vec<Content> = request
        .history
        .iter()
        .skip(skip)
        .map(|turn: &ChatTurn| Content::text(Some(role_name(turn.role)), turn.text.clone()))
        .collect();
    contents.push(Content::text(Some("user"), request.prompt.clone()));

    GenerateContentRequest {
        contents,
        system_instruction: Some(Content::text(None, system_instruction(&request.preferences))),
        tools: vec![Tool::google_search(), Tool::google_maps()],
        tool_config: request.location.map(|loc| ToolConfig {
            retrieval_config: RetrievalConfig {
                lat_lng: LatLng {
                    latitude: loc.latitude,
                    longitude: loc.longitude,
                },
            },
        }),
        generation_config: None,
    }
}

/// Web and Maps grounding sources of the first candidate
pub fn extract_links(response: &GenerateContentResponse) -> Vec<GroundingLink> {
    let Some(metadata) = response
        .candidates
        .first()
        .and_then(|c| c.grounding_metadata.as_ref())
    else {
        return Vec::new();
    };

    metadata
        .grounding_chunks
        .iter()
        .filter_map(|chunk| chunk.web.as_ref().or(chunk.maps.as_ref()))
        .filter_map(|source| {
            let uri = source.uri.clone()?;
            let title = source.title.clone().unwrap_or_else(|| uri.clone());
            Some(GroundingLink { title, uri })
        })
        .collect()
}

impl GeminiClient {
    /// Answer a guide chat prompt
    pub async fn guide_reply(&self, request: &GuideRequest) -> Result<GuideReply> {
        if request.prompt.trim().is_empty() {
            return Err(Error::BadRequest("prompt must not be empty".to_string()));
        }

        let body = chat_request(request);
        let response = self.generate_content(&self.chat_model, &body).await?;

        let text = response.text().unwrap_or_else(|| FALLBACK_REPLY.to_string());
        let links = extract_links(&response);
        let message_id = Uuid::new_v4();

        info!(message_id = %message_id, links = links.len(), "Guide reply generated");

        Ok(GuideReply {
            message_id,
            text,
            links,
        })
    }
}
