//! Error types for the empath gateway

use thiserror::Error;

/// Result type alias for empath operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the empath gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Audio decode/encode/resample error
    #[error("audio error: {0}")]
    Audio(String),

    /// Image frame error
    #[error("frame error: {0}")]
    Frame(String),

    /// Emotion classification error
    #[error("emotion error: {0}")]
    Emotion(String),

    /// Scene analysis error
    #[error("scene error: {0}")]
    Scene(String),

    /// Speech-to-text error
    #[error("STT error: {0}")]
    Stt(String),

    /// Text-to-speech error
    #[error("TTS error: {0}")]
    Tts(String),

    /// Reply generation error
    #[error("reply error: {0}")]
    Reply(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
