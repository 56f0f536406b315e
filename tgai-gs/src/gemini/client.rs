//! Gemini REST client
//!
//! Thin wrapper over `models/{model}:generateContent`. Callers build the
//! request body; this module only handles transport, auth, and status.

use super::types::{GenerateContentRequest, GenerateContentResponse};
use crate::config::GeminiConfig;
use crate::error::{Error, Result};
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("tgai-gs/", env!("CARGO_PKG_VERSION"));
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini API client
pub struct GeminiClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    pub(crate) chat_model: String,
    pub(crate) tts_model: String,
    pub(crate) voice_name: String,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            // Connect only; a synthesis response may take arbitrarily long
            .connect_timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            chat_model: config.chat_model.clone(),
            tts_model: config.tts_model.clone(),
            voice_name: config.voice_name.clone(),
        })
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// POST a `generateContent` request to `model`
    pub async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        if !self.has_api_key() {
            return Err(Error::Config("Gemini API key is not configured".to_string()));
        }

        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        debug!(model, "Calling Gemini generateContent");

        let response = self
            .http_client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| Error::Network(format!("Invalid Gemini response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation_trims_base_url() {
        let config = GeminiConfig {
            base_url: "http://localhost:1234/v1beta/".to_string(),
            api_key: "k".to_string(),
            ..Default::default()
        };
        let client = GeminiClient::new(&config).unwrap();
        assert_eq!(client.base_url, "http://localhost:1234/v1beta");
        assert!(client.has_api_key());
    }

    #[tokio::test]
    async fn test_missing_key_is_config_error() {
        let client = GeminiClient::new(&GeminiConfig::default()).unwrap();
        let err = client
            .generate_content("m", &GenerateContentRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
