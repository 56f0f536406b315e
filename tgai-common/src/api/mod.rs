//! API module for shared HTTP API types
//!
//! This module contains ONLY plain serde types, with no HTTP framework
//! dependencies. The browser UI and `tgai-gs` agree on these shapes.

pub mod types;

pub use types::{
    Budget, ChatRole, ChatTurn, ErrorResponse, GeoLocation, GroundingLink, GuideReply,
    GuideRequest, SpeakRequest, SpeakResponse, SpeakStatus, SpeakingResponse, UserPreferences,
};
