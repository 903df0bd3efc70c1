//! Configuration
//!
//! Loaded from a TOML file (explicit path or the platform config dir) with
//! every section defaulting sensibly; the API key comes from the
//! environment.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API key for the hosted model backends; falls back to OPENAI_API_KEY
    pub api_key: Option<String>,
    pub vision: VisionConfig,
    pub speech: SpeechConfig,
    pub scene: SceneConfig,
    pub reply: ReplyConfig,
}

/// Vision backend configuration (emotion + scene frames)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Model for emotion and object queries
    pub model: String,
    /// Max tokens for vision answers
    pub max_tokens: u32,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_tokens: 60,
        }
    }
}

/// Speech configuration (recognition + synthesis)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Transcription model
    pub stt_model: String,
    /// Language hint for recognition (ISO 639-1)
    pub stt_language: Option<String>,
    /// Synthesis model
    pub tts_model: String,
    /// Synthesis voice
    pub tts_voice: String,
    /// Synthesis speed multiplier
    pub tts_speed: f32,
    /// Target language for synthesized replies
    pub language: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            stt_model: "whisper-1".to_string(),
            stt_language: None,
            tts_model: "tts-1".to_string(),
            tts_voice: "alloy".to_string(),
            tts_speed: 1.0,
            language: "en".to_string(),
        }
    }
}

/// Scene analysis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Minimum detection confidence to keep
    pub min_confidence: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.5,
        }
    }
}

/// Reply generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplyConfig {
    /// Use the chat model instead of the templated echo
    pub use_model: bool,
    /// Chat model for generated replies
    pub model: String,
    /// Max tokens for generated replies
    pub max_tokens: u32,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            use_model: false,
            model: "gpt-4o-mini".to_string(),
            max_tokens: 128,
        }
    }
}

impl Config {
    /// Load configuration from an explicit path, the platform config dir,
    /// or defaults
    ///
    /// # Errors
    ///
    /// Returns error if an explicitly-given file is missing or malformed
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                Self::from_file(path)?
            }
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };

        if config.api_key.is_none() {
            config.api_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty());
        }

        Ok(config)
    }

    /// Resolved API key, empty when unset
    #[must_use]
    pub fn api_key(&self) -> String {
        self.api_key.clone().unwrap_or_default()
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "empath")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
