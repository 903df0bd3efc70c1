//! Reply generation
//!
//! Composes a reply from recognized text and the detected emotion: a fixed
//! empathetic prefix plus a templated echo. A [`ReplyModel`] can replace the
//! echo body with a language-model completion without changing the contract;
//! the template remains the fallback when the model errors.

use std::sync::Arc;

use async_trait::async_trait;

use crate::emotion::EmotionLabel;
use crate::Result;

/// Reply when nothing usable was heard
pub const APOLOGY_REPLY: &str = "I could not hear you clearly. Could you please repeat that?";

/// Optional language-generation backend for reply bodies
#[async_trait]
pub trait ReplyModel: Send + Sync {
    /// Generate a reply body for the given text and emotion
    ///
    /// # Errors
    ///
    /// Returns error if generation fails
    async fn complete(&self, text: &str, emotion: EmotionLabel) -> Result<String>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// Generates the textual reply
pub struct ResponseGenerator {
    model: Option<Arc<dyn ReplyModel>>,
}

impl ResponseGenerator {
    /// Create a generator that uses the templated echo body
    #[must_use]
    pub const fn new() -> Self {
        Self { model: None }
    }

    /// Create a generator backed by a language model
    #[must_use]
    pub fn with_model(model: Arc<dyn ReplyModel>) -> Self {
        Self { model: Some(model) }
    }

    /// Compose a reply for recognized text and emotion
    ///
    /// Empty or whitespace-only text yields the fixed apology, independent of
    /// emotion. Never returns an error.
    pub async fn generate(&self, text: &str, emotion: EmotionLabel) -> String {
        let text = text.trim();
        if text.is_empty() {
            return APOLOGY_REPLY.to_string();
        }

        let prefix = Self::prefix_for(emotion);
        let body = match &self.model {
            Some(model) => match model.complete(text, emotion).await {
                Ok(completion) => completion,
                Err(e) => {
                    tracing::warn!(model = model.name(), error = %e, "reply model failed, using template");
                    Self::echo(text)
                }
            },
            None => Self::echo(text),
        };

        format!("{prefix}{body}")
    }

    /// The templated echo body
    fn echo(text: &str) -> String {
        format!("You said: \"{text}\"")
    }

    /// Fixed empathetic prefix per emotion; labels outside the closed
    /// seven-category mapping get an empty prefix
    #[must_use]
    pub const fn prefix_for(emotion: EmotionLabel) -> &'static str {
        match emotion {
            EmotionLabel::Happy => "You seem to be in a good mood! ",
            EmotionLabel::Sad => "Chin up. ",
            EmotionLabel::Angry => "Let's take a calming breath. ",
            EmotionLabel::Surprise => "You look surprised! ",
            EmotionLabel::Fear => "No need to worry. ",
            EmotionLabel::Disgust => "That seemed unpleasant... ",
            EmotionLabel::Neutral | EmotionLabel::Unknown | EmotionLabel::Failed => "",
        }
    }
}

impl Default for ResponseGenerator {
    fn default() -> Self {
        Self::new()
    }
}
