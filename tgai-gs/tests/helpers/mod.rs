//! Test helper modules for tgai-gs integration tests
//!
//! Provides reusable test infrastructure components:
//! - Fakes: synthesizer, output device, and opener doubles
//! - TestService: router over the fakes, driven with tower oneshot
//! - GeminiStub: local HTTP server for Gemini client tests

#![allow(dead_code)]

pub mod fakes;
pub mod test_server;

pub use fakes::{pcm_payload, CountingOpener, FakeDevice, FakeSynthesizer, Script};
pub use test_server::{next_event, GeminiStub, RecordedCall, TestController, TestService};
