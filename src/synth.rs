//! Speech synthesis
//!
//! Wraps a [`SynthesisBackend`] that returns encoded compressed audio and
//! decodes it to mono f32 samples. The output is always well-formed: a silent
//! waveform stands in for every failure mode, so callers never see an error
//! or a missing clip.

use std::sync::Arc;

use async_trait::async_trait;

use crate::audio;
use crate::Result;

/// Sample rate of substituted silent waveforms
pub const FALLBACK_SAMPLE_RATE: u32 = 44_100;

/// Silence duration for empty input text (a success, not a failure)
pub const EMPTY_TEXT_SILENCE_SECS: f32 = 0.5;

/// Silence duration substituted when synthesis fails
pub const FAILURE_SILENCE_SECS: f32 = 1.0;

/// A synthesized waveform: mono f32 samples at a native rate
#[derive(Debug, Clone)]
pub struct SynthesizedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl SynthesizedAudio {
    fn silence(duration_secs: f32) -> Self {
        Self {
            samples: audio::silence(duration_secs, FALLBACK_SAMPLE_RATE),
            sample_rate: FALLBACK_SAMPLE_RATE,
        }
    }

    /// Clip duration in seconds
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Backend that renders text as encoded audio (MP3 or WAV bytes)
#[async_trait]
pub trait SynthesisBackend: Send + Sync {
    /// Synthesize speech for the text in the given language
    ///
    /// # Errors
    ///
    /// Returns error if synthesis fails
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// Synthesizes a reply as audio, substituting silence on any failure
pub struct SpeechSynthesizer {
    backend: Option<Arc<dyn SynthesisBackend>>,
    language: String,
}

impl SpeechSynthesizer {
    /// Create a synthesizer around a backend with a fixed target language
    #[must_use]
    pub fn new(backend: Arc<dyn SynthesisBackend>, language: impl Into<String>) -> Self {
        Self {
            backend: Some(backend),
            language: language.into(),
        }
    }

    /// Create a permanently-degraded synthesizer (backend failed to load)
    ///
    /// Every non-empty synthesis yields the failure silence.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            backend: None,
            language: String::new(),
        }
    }

    /// Synthesize text to a waveform
    ///
    /// Empty text yields 0.5 s of silence (success); any synthesis or decode
    /// failure yields 1.0 s of silence. Never returns an error.
    pub async fn synthesize(&self, text: &str) -> SynthesizedAudio {
        if text.is_empty() {
            tracing::debug!("no text to synthesize, returning short silence");
            return SynthesizedAudio::silence(EMPTY_TEXT_SILENCE_SECS);
        }

        let Some(backend) = &self.backend else {
            tracing::warn!("synthesis backend unavailable, returning silence");
            return SynthesizedAudio::silence(FAILURE_SILENCE_SECS);
        };

        match self.synthesize_inner(backend, text).await {
            Ok(audio) => audio,
            Err(e) => {
                tracing::warn!(backend = backend.name(), error = %e, "synthesis failed, returning silence");
                SynthesizedAudio::silence(FAILURE_SILENCE_SECS)
            }
        }
    }

    async fn synthesize_inner(
        &self,
        backend: &Arc<dyn SynthesisBackend>,
        text: &str,
    ) -> Result<SynthesizedAudio> {
        let encoded = backend.synthesize(text, &self.language).await?;
        let decoded = audio::decode_encoded(&encoded)?;
        tracing::debug!(
            samples = decoded.samples.len(),
            sample_rate = decoded.sample_rate,
            "speech synthesized"
        );
        Ok(SynthesizedAudio {
            samples: decoded.samples,
            sample_rate: decoded.sample_rate,
        })
    }
}
