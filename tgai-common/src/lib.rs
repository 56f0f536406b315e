//! # TGAI Common Library
//!
//! Shared code for the tour guide services:
//! - Error type
//! - Configuration file resolution and TOML loading
//! - Event types (GuideEvent enum)
//! - API request/response types
//! - Timestamp helpers

pub mod api;
pub mod config;
pub mod error;
pub mod events;
pub mod time;

pub use error::{Error, Result};
