//! Text-to-speech through the Gemini TTS model

use super::client::GeminiClient;
use super::types::{
    Content, GenerateContentRequest, GenerationConfig, PrebuiltVoiceConfig, SpeechConfig,
    VoiceConfig,
};
use crate::error::Result;
use crate::speech::SpeechSynthesizer;
use async_trait::async_trait;

/// Wrap description text in the narration instruction
pub fn tts_prompt(text: &str) -> String {
    format!("Read this description in an engaging tour guide voice: {}", text)
}

pub fn tts_request(text: &str, voice_name: &str) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content::text(None, tts_prompt(text))],
        generation_config: Some(GenerationConfig {
            response_modalities: vec!["AUDIO".to_string()],
            speech_config: Some(SpeechConfig {
                voice_config: VoiceConfig {
                    prebuilt_voice_config: PrebuiltVoiceConfig {
                        voice_name: voice_name.to_string(),
                    },
                },
            }),
        }),
        ..Default::default()
    }
}

#[async_trait]
impl SpeechSynthesizer for GeminiClient {
    async fn synthesize(&self, text: &str) -> Result<Option<String>> {
        let request = tts_request(text, &self.voice_name);
        let response = self.generate_content(&self.tts_model, &request).await?;
        Ok(response.first_inline_data().map(str::to_string))
    }
}
