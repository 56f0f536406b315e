//! Configuration for the guide service
//!
//! Sources, highest priority first:
//! 1. Command-line arguments / environment variables (applied in main.rs via clap)
//! 2. TOML configuration file (see `tgai_common::config::resolve_config_path`)
//! 3. Built-in defaults (code constants)

use crate::speech::PcmFormat;
use serde::Deserialize;
use std::path::Path;
use tgai_common::config::LoggingConfig;

/// Default HTTP port for tgai-gs
pub const DEFAULT_PORT: u16 = 5790;

/// Complete service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GuideConfig {
    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub gemini: GeminiConfig,

    #[serde(default)]
    pub audio: AudioConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for GuideConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            gemini: GeminiConfig::default(),
            audio: AudioConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl GuideConfig {
    /// Load from a TOML file, or defaults if `path` is None or missing
    pub fn load(path: Option<&Path>) -> crate::Result<Self> {
        Ok(tgai_common::config::load_toml(path)?)
    }
}

/// Gemini API settings
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    /// API key; empty means Gemini calls fail with a configuration error
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model used for guide chat replies
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Model used for speech synthesis
    #[serde(default = "default_tts_model")]
    pub tts_model: String,

    /// Prebuilt voice for speech synthesis
    #[serde(default = "default_voice_name")]
    pub voice_name: String,

    /// Connect timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            chat_model: default_chat_model(),
            tts_model: default_tts_model(),
            voice_name: default_voice_name(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Audio pipeline settings
#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    /// Sample rate of synthesized PCM (Hz)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Channel count of synthesized PCM
    #[serde(default = "default_channels")]
    pub channels: u16,

    /// Output device name (None = system default)
    #[serde(default)]
    pub device: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            channels: default_channels(),
            device: None,
        }
    }
}

impl AudioConfig {
    pub fn pcm_format(&self) -> PcmFormat {
        PcmFormat {
            sample_rate: self.sample_rate,
            channels: self.channels,
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_chat_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_tts_model() -> String {
    "gemini-2.5-flash-preview-tts".to_string()
}

fn default_voice_name() -> String {
    "Kore".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_sample_rate() -> u32 {
    crate::audio::decode::DEFAULT_SAMPLE_RATE
}

fn default_channels() -> u16 {
    crate::audio::decode::DEFAULT_CHANNELS
}
