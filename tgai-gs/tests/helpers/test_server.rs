//! Programmatic service instances for integration tests
//!
//! - TestService: full router over fake synthesis and output collaborators
//! - GeminiStub: local HTTP server standing in for the Gemini REST API

use super::fakes::{CountingOpener, FakeDevice, FakeSynthesizer};
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use http::{Method, Request};
use http_body_util::BodyExt;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::AtomicUsize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tgai_common::events::GuideEvent;
use tgai_gs::api::{create_router, AppContext};
use tgai_gs::config::GeminiConfig;
use tgai_gs::gemini::GeminiClient;
use tgai_gs::speech::{PcmFormat, SpeechController};
use tgai_gs::state::SharedState;
use tokio::sync::broadcast;
use tower::ServiceExt;

/// Controller wired to in-memory fakes
pub struct TestController {
    pub controller: Arc<SpeechController>,
    pub synthesizer: Arc<FakeSynthesizer>,
    pub device: Arc<FakeDevice>,
    pub opens: Arc<AtomicUsize>,
    pub state: Arc<SharedState>,
}

impl TestController {
    pub fn new(synthesizer: FakeSynthesizer) -> Self {
        let device = FakeDevice::new();
        let (opener, opens) = CountingOpener::new(device.clone());
        Self::with_opener(synthesizer, device, opener, opens)
    }

    pub fn with_opener(
        synthesizer: FakeSynthesizer,
        device: Arc<FakeDevice>,
        opener: CountingOpener,
        opens: Arc<AtomicUsize>,
    ) -> Self {
        let synthesizer = Arc::new(synthesizer);
        let state = Arc::new(SharedState::new());
        let controller = Arc::new(SpeechController::new(
            synthesizer.clone(),
            Box::new(opener),
            state.clone(),
            PcmFormat::default(),
        ));
        Self {
            controller,
            synthesizer,
            device,
            opens,
            state,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GuideEvent> {
        self.state.subscribe_events()
    }
}

/// Next event, failing the test if none arrives within a second
pub async fn next_event(rx: &mut broadcast::Receiver<GuideEvent>) -> GuideEvent {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

/// Router over a fake controller and a Gemini client aimed at `gemini_base_url`
pub struct TestService {
    pub router: Router,
    pub fakes: TestController,
}

impl TestService {
    pub fn start(synthesizer: FakeSynthesizer, gemini_base_url: &str) -> Self {
        let fakes = TestController::new(synthesizer);
        let gemini = GeminiClient::new(&GeminiConfig {
            api_key: "test-key".to_string(),
            base_url: gemini_base_url.to_string(),
            ..Default::default()
        })
        .expect("client");

        let router = create_router(AppContext {
            state: fakes.state.clone(),
            controller: fakes.controller.clone(),
            gemini: Arc::new(gemini),
        });

        Self { router, fakes }
    }

    /// Send one request through the router
    pub async fn request(&self, method: Method, path: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }
}

/// One request received by the stub
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub call: String,
    pub api_key: Option<String>,
    pub body: Value,
}

#[derive(Default)]
struct StubState {
    calls: Mutex<Vec<RecordedCall>>,
    responses: Mutex<VecDeque<(StatusCode, Value)>>,
    delay: Mutex<Option<Duration>>,
}

/// Local stand-in for the Gemini REST API
pub struct GeminiStub {
    pub base_url: String,
    state: Arc<StubState>,
}

impl GeminiStub {
    pub async fn start() -> Self {
        let state = Arc::new(StubState::default());
        let app = Router::new()
            .route("/v1beta/models/:call", post(stub_generate))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/v1beta", addr),
            state,
        }
    }

    /// Queue the next response
    pub fn respond(&self, status: StatusCode, body: Value) {
        self.state.responses.lock().unwrap().push_back((status, body));
    }

    /// Hold every later response for `delay` before answering
    pub fn delay_responses(&self, delay: Duration) {
        *self.state.delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.calls.lock().unwrap().clone()
    }
}

async fn stub_generate(
    State(state): State<Arc<StubState>>,
    Path(call): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.calls.lock().unwrap().push(RecordedCall {
        call,
        api_key: headers
            .get("x-goog-api-key")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });

    let delay = *state.delay.lock().unwrap();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let (status, body) = state
        .responses
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or((StatusCode::OK, serde_json::json!({})));
    (status, Json(body))
}
