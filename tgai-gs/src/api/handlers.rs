//! HTTP request handlers

use crate::api::server::AppContext;
use crate::audio::CpalOutput;
use crate::error::{Error, Result};
use crate::speech::PlayOutcome;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use tgai_common::api::{
    GuideReply, GuideRequest, SpeakRequest, SpeakResponse, SpeakStatus, SpeakingResponse,
};
use tracing::info;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
    git_hash: String,
    build_timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct DeviceListResponse {
    devices: Vec<String>,
}

// ============================================================================
// Health Endpoint
// ============================================================================

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        module: "tgai-gs".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: env!("GIT_HASH").to_string(),
        build_timestamp: env!("BUILD_TIMESTAMP").to_string(),
    })
}

// ============================================================================
// Guide Chat
// ============================================================================

/// POST /api/v1/chat
pub async fn chat(
    State(ctx): State<AppContext>,
    Json(request): Json<GuideRequest>,
) -> Result<Json<GuideReply>> {
    let reply = ctx.gemini.guide_reply(&request).await?;
    Ok(Json(reply))
}

// ============================================================================
// Speech Playback
// ============================================================================

/// POST /api/v1/speech/play
///
/// 202 when playback started, 200 when the message is already speaking.
pub async fn speech_play(
    State(ctx): State<AppContext>,
    Json(request): Json<SpeakRequest>,
) -> Result<(StatusCode, Json<SpeakResponse>)> {
    if request.message_id.trim().is_empty() {
        return Err(Error::BadRequest("message_id must not be empty".to_string()));
    }
    if request.text.trim().is_empty() {
        return Err(Error::BadRequest("text must not be empty".to_string()));
    }

    info!(message_id = %request.message_id, "Speech play requested");

    match ctx.controller.play(&request.text, &request.message_id).await? {
        PlayOutcome::Started { frames, duration_ms } => Ok((
            StatusCode::ACCEPTED,
            Json(SpeakResponse {
                status: SpeakStatus::Started,
                frames: Some(frames),
                duration_ms: Some(duration_ms),
            }),
        )),
        PlayOutcome::AlreadyPlaying => Ok((
            StatusCode::OK,
            Json(SpeakResponse {
                status: SpeakStatus::AlreadyPlaying,
                frames: None,
                duration_ms: None,
            }),
        )),
    }
}

/// GET /api/v1/speech/state
pub async fn speech_state(State(ctx): State<AppContext>) -> Json<SpeakingResponse> {
    Json(SpeakingResponse {
        speaking: ctx.controller.active_id(),
    })
}

// ============================================================================
// Audio Device Endpoints
// ============================================================================

/// GET /api/v1/audio/devices
pub async fn audio_devices() -> Result<Json<DeviceListResponse>> {
    let devices = tokio::task::spawn_blocking(CpalOutput::list_devices)
        .await
        .map_err(|e| Error::Internal(format!("Device enumeration task failed: {}", e)))??;
    info!("Found {} audio devices", devices.len());
    Ok(Json(DeviceListResponse { devices }))
}
