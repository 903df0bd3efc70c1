//! OpenAI chat backend for reply generation
//!
//! Optional replacement for the templated echo body in the response
//! generator; the generator falls back to the template if this errors.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::emotion::EmotionLabel;
use crate::respond::ReplyModel;
use crate::{Error, Result};

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

const SYSTEM_PROMPT: &str = "You are a friendly companion speaking with someone face to face. \
The user's message may mention what is visible around them and how they appear to feel. \
Reply warmly in one or two short sentences; your reply will be spoken aloud.";

/// Reply model backed by the OpenAI chat completions API
pub struct OpenAiReplyModel {
    client: Client,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiReplyModel {
    /// Create a new reply backend
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing
    pub fn new(api_key: String, model: String, max_tokens: u32) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "OpenAI API key required for reply generation".to_string(),
            ));
        }
        Ok(Self {
            client: Client::new(),
            api_key,
            model,
            max_tokens,
        })
    }
}

#[async_trait]
impl ReplyModel for OpenAiReplyModel {
    async fn complete(&self, text: &str, emotion: EmotionLabel) -> Result<String> {
        let user_message = format!("The user appears {emotion}. They said: {text}");

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_message,
                },
            ],
            max_tokens: Some(self.max_tokens),
        };

        let response = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Reply(format!("chat API error {status}: {body}")));
        }

        let result: ChatCompletionResponse = response.json().await?;

        result
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| Error::Reply("empty response from chat API".to_string()))
    }

    fn name(&self) -> &'static str {
        "openai-chat"
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_key_rejected() {
        assert!(OpenAiReplyModel::new(String::new(), "gpt-4o-mini".to_string(), 128).is_err());
    }
}
