//! Gemini API integration: guide chat and speech synthesis

pub mod client;
pub mod guide;
pub mod speech;
pub mod types;

pub use client::GeminiClient;
