//! Concrete model backends
//!
//! HTTP-backed implementations of the trait seams the services consume.
//! Anything honoring the traits can replace these (local engines included).

mod chat;
mod tts;
mod vision;
mod whisper;

pub use chat::OpenAiReplyModel;
pub use tts::OpenAiTtsBackend;
pub use vision::{OpenAiEmotionModel, OpenAiObjectDetector};
pub use whisper::WhisperRecognizerFactory;
