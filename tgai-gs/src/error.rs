//! Error types for tgai-gs
//!
//! Defines module-specific error types using thiserror for clear error propagation.
//! `IntoResponse` maps each kind to an HTTP status for the API layer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tgai_common::api::ErrorResponse;
use thiserror::Error;

/// Main error type for tgai-gs
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP server errors
    #[error("HTTP server error: {0}")]
    Http(String),

    /// Malformed base64 or PCM payload
    #[error("Audio decode error: {0}")]
    Decode(String),

    /// Speech synthesis failed or returned no audio
    #[error("Speech synthesis error: {0}")]
    Synthesis(String),

    /// Output device unavailable or submission failed
    #[error("Playback device error: {0}")]
    PlaybackDevice(String),

    /// Outbound request could not be sent or its response read
    #[error("Network error: {0}")]
    Network(String),

    /// Gemini API returned a non-success status
    #[error("Upstream API error {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Invalid request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience Result type using tgai-gs Error
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Short machine-readable error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Error::Config(_) => "config_error",
            Error::Http(_) => "http_error",
            Error::Decode(_) => "decode_error",
            Error::Synthesis(_) => "synthesis_error",
            Error::PlaybackDevice(_) => "playback_device_error",
            Error::Network(_) => "network_error",
            Error::Upstream { .. } => "upstream_error",
            Error::BadRequest(_) => "bad_request",
            Error::Internal(_) => "internal_error",
        }
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::Decode(_)
            | Error::Synthesis(_)
            | Error::Network(_)
            | Error::Upstream { .. } => {
                StatusCode::BAD_GATEWAY
            }
            Error::PlaybackDevice(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::Config(_) | Error::Http(_) | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<tgai_common::Error> for Error {
    fn from(err: tgai_common::Error) -> Self {
        match err {
            tgai_common::Error::Config(msg) => Error::Config(msg),
            tgai_common::Error::Io(e) => Error::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.code().to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
