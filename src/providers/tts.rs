//! OpenAI speech synthesis backend

use async_trait::async_trait;
use reqwest::Client;

use crate::synth::SynthesisBackend;
use crate::{Error, Result};

const SPEECH_URL: &str = "https://api.openai.com/v1/audio/speech";

/// Synthesis backend returning MP3 bytes from the OpenAI speech API
pub struct OpenAiTtsBackend {
    client: Client,
    api_key: String,
    model: String,
    voice: String,
    speed: f32,
}

impl OpenAiTtsBackend {
    /// Create a new TTS backend
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing
    pub fn new(api_key: String, model: String, voice: String, speed: f32) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config("OpenAI API key required for TTS".to_string()));
        }
        Ok(Self {
            client: Client::new(),
            api_key,
            model,
            voice,
            speed,
        })
    }
}

#[async_trait]
impl SynthesisBackend for OpenAiTtsBackend {
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>> {
        #[derive(serde::Serialize)]
        struct SpeechRequest<'a> {
            model: &'a str,
            input: &'a str,
            voice: &'a str,
            speed: f32,
        }

        // The voices are multilingual; the language hint only informs logging
        tracing::debug!(language, chars = text.len(), "starting speech synthesis");

        let request = SpeechRequest {
            model: &self.model,
            input: text,
            voice: &self.voice,
            speed: self.speed,
        };

        let response = self
            .client
            .post(SPEECH_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Tts(format!("speech API error {status}: {body}")));
        }

        let audio = response.bytes().await?;
        Ok(audio.to_vec())
    }

    fn name(&self) -> &'static str {
        "openai-tts"
    }
}
