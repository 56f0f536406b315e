//! HTTP server setup and routing
//!
//! Axum router for guide chat, speech playback control, and SSE.

use crate::error::{Error, Result};
use crate::gemini::GeminiClient;
use crate::speech::SpeechController;
use crate::state::SharedState;
use axum::{
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppContext {
    pub state: Arc<SharedState>,
    pub controller: Arc<SpeechController>,
    pub gemini: Arc<GeminiClient>,
}

/// Build the router with all routes attached to `ctx`
pub fn create_router(ctx: AppContext) -> Router {
    Router::new()
        .route("/health", get(super::handlers::health))
        .nest(
            "/api/v1",
            Router::new()
                // Guide chat
                .route("/chat", post(super::handlers::chat))
                // Speech playback
                .route("/speech/play", post(super::handlers::speech_play))
                .route("/speech/state", get(super::handlers::speech_state))
                // Audio devices
                .route("/audio/devices", get(super::handlers::audio_devices))
                // SSE event stream
                .route("/events", get(super::sse::event_stream)),
        )
        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
        // Browser UI is served from another origin
        .layer(CorsLayer::permissive())
}

/// Run the HTTP API server until `shutdown` resolves
pub async fn run<F>(port: u16, ctx: AppContext, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(ctx);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Http(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| Error::Http(format!("Server error: {}", e)))?;

    info!("Server shutdown complete");
    Ok(())
}
