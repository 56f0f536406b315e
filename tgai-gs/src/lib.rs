//! tgai-gs: tour guide speech service
//!
//! Answers guide chat prompts through Gemini and speaks descriptions aloud on
//! the local output device, one "currently speaking" message at a time.

pub mod api;
pub mod audio;
pub mod config;
pub mod error;
pub mod gemini;
pub mod speech;
pub mod state;

pub use error::{Error, Result};
