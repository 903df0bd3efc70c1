//! Empath Gateway - Multimodal interaction pipeline
//!
//! This library turns one camera frame and one microphone recording into a
//! spoken reply:
//! - Emotion classification and scene analysis from the frame
//! - Speech recognition from the recording
//! - An emotion-conditioned reply, then speech synthesis
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                    Inputs                         │
//! │        frame (image)    │    clip (audio)        │
//! └───────────┬─────────────────────┬────────────────┘
//!             │                     │
//! ┌───────────▼─────────┐ ┌─────────▼────────────────┐
//! │  emotion  │  scene  │ │      transcribe          │
//! └───────────┬─────────┘ └─────────┬────────────────┘
//!             │                     │
//! ┌───────────▼─────────────────────▼────────────────┐
//! │            respond  →  synth  →  WAV             │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! Every stage absorbs its own failures into sentinel values, so a pipeline
//! run always produces a complete, well-formed output.

pub mod audio;
pub mod config;
pub mod emotion;
pub mod error;
pub mod frame;
pub mod pipeline;
pub mod providers;
pub mod respond;
pub mod scene;
pub mod synth;
pub mod transcribe;

pub use audio::AudioInput;
pub use config::Config;
pub use emotion::{EmotionLabel, EmotionService};
pub use error::{Error, Result};
pub use frame::ImageInput;
pub use pipeline::{Pipeline, PipelineOutput};
pub use respond::ResponseGenerator;
pub use scene::{SceneAnalysis, SceneService};
pub use synth::{SpeechSynthesizer, SynthesizedAudio};
pub use transcribe::TranscriptionService;
