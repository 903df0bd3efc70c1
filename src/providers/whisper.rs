//! Whisper-backed speech recognition
//!
//! Whisper has no streaming interface, so the recognizer buffers the PCM
//! chunks it is fed and flushes them once, as a multipart WAV upload, on
//! finalize. Chunk-level partials are never produced.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;

use crate::audio;
use crate::transcribe::{Recognizer, RecognizerFactory};
use crate::{Error, Result};

const TRANSCRIPTIONS_URL: &str = "https://api.openai.com/v1/audio/transcriptions";

/// Mints Whisper recognizers
pub struct WhisperRecognizerFactory {
    client: Client,
    api_key: String,
    model: String,
    language: Option<String>,
}

impl WhisperRecognizerFactory {
    /// Create a new factory
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing; transcription is the one
    /// backend whose absence is fatal at startup
    pub fn new(api_key: String, model: String, language: Option<String>) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "OpenAI API key required for transcription".to_string(),
            ));
        }
        Ok(Self {
            client: Client::new(),
            api_key,
            model,
            language,
        })
    }
}

impl RecognizerFactory for WhisperRecognizerFactory {
    fn create(&self, sample_rate: u32) -> Result<Box<dyn Recognizer>> {
        Ok(Box::new(WhisperRecognizer {
            client: self.client.clone(),
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            language: self.language.clone(),
            sample_rate,
            pcm: Vec::new(),
        }))
    }

    fn name(&self) -> &'static str {
        "whisper"
    }
}

struct WhisperRecognizer {
    client: Client,
    api_key: String,
    model: String,
    language: Option<String>,
    sample_rate: u32,
    pcm: Vec<i16>,
}

#[async_trait]
impl Recognizer for WhisperRecognizer {
    async fn accept(&mut self, pcm: &[i16]) -> Result<Option<String>> {
        self.pcm.extend_from_slice(pcm);
        Ok(None)
    }

    async fn finalize(&mut self) -> Result<String> {
        if self.pcm.is_empty() {
            return Ok(String::new());
        }

        let wav = audio::pcm_to_wav(&self.pcm, self.sample_rate)?;
        tracing::debug!(audio_bytes = wav.len(), "starting Whisper transcription");

        let part = Part::bytes(wav)
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| Error::Stt(e.to_string()))?;

        let mut form = Form::new()
            .text("model", self.model.clone())
            .part("file", part);
        if let Some(lang) = &self.language {
            form = form.text("language", lang.clone());
        }

        let response = self
            .client
            .post(TRANSCRIPTIONS_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Stt(format!("Whisper API error {status}: {body}")));
        }

        let result: TranscriptionResponse = response.json().await?;
        Ok(result.text)
    }
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}
