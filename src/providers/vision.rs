//! OpenAI vision backends for emotion classification and object detection
//!
//! Both upload the frame as a base64 data URL to the chat completions API
//! and parse a constrained plain-text answer. Raw pixel frames are rejected;
//! these backends only ship encoded images.

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::emotion::{EmotionLabel, EmotionModel, EmotionScore};
use crate::frame::ImagePayload;
use crate::scene::{Detection, ObjectDetector};
use crate::{Error, Result};

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

const EMOTION_PROMPT: &str = "Look at the most prominent face in this image and answer with \
exactly one word from: happy, sad, angry, surprise, fear, disgust, neutral. \
If there is no visible face, answer exactly: none.";

const DETECTION_PROMPT: &str = "List the distinct object categories clearly visible in this \
image as lowercase singular nouns, comma-separated (e.g. person, laptop, cup). \
Only include objects you are confident about. If nothing notable is visible, answer exactly: none.";

/// Emotion classifier backed by OpenAI vision
pub struct OpenAiEmotionModel {
    client: Client,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiEmotionModel {
    /// Create a new emotion backend
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing
    pub fn new(api_key: String, model: String, max_tokens: u32) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "OpenAI API key required for emotion detection".to_string(),
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
impl EmotionModel for OpenAiEmotionModel {
    async fn classify(&self, image: &ImagePayload) -> Result<Vec<EmotionScore>> {
        let answer = ask_about_image(
            &self.client,
            &self.api_key,
            &self.model,
            self.max_tokens,
            EMOTION_PROMPT,
            image,
        )
        .await
        .map_err(|e| Error::Emotion(e.to_string()))?;

        let answer = answer.trim().trim_end_matches('.').to_lowercase();
        if answer == "none" {
            return Ok(Vec::new());
        }

        match EmotionLabel::parse(&answer) {
            Some(label) => Ok(vec![EmotionScore {
                label,
                confidence: 1.0,
            }]),
            None => Err(Error::Emotion(format!(
                "unrecognized classifier answer: {answer}"
            ))),
        }
    }

    fn name(&self) -> &'static str {
        "openai-emotion"
    }
}

/// Object detector backed by OpenAI vision
pub struct OpenAiObjectDetector {
    client: Client,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiObjectDetector {
    /// Create a new detection backend
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing
    pub fn new(api_key: String, model: String, max_tokens: u32) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "OpenAI API key required for scene analysis".to_string(),
            ));
        }
        Ok(Self {
            client: Client::new(),
            api_key,
            model,
            max_tokens,
        })
    }

    /// Parse the comma-separated answer into detections
    fn parse_answer(answer: &str) -> Vec<Detection> {
        let answer = answer.trim().trim_end_matches('.');
        if answer.eq_ignore_ascii_case("none") {
            return Vec::new();
        }
        answer
            .split(',')
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .map(|label| Detection {
                label: label.to_lowercase(),
                // The model only reports confident detections
                confidence: 1.0,
            })
            .collect()
    }
}

#[async_trait]
impl ObjectDetector for OpenAiObjectDetector {
    async fn detect(&self, image: &ImagePayload, _min_confidence: f32) -> Result<Vec<Detection>> {
        let answer = ask_about_image(
            &self.client,
            &self.api_key,
            &self.model,
            self.max_tokens,
            DETECTION_PROMPT,
            image,
        )
        .await
        .map_err(|e| Error::Scene(e.to_string()))?;

        Ok(Self::parse_answer(&answer))
    }

    fn name(&self) -> &'static str {
        "openai-detector"
    }
}

/// Send one image + prompt to the chat completions API and return the answer
async fn ask_about_image(
    client: &Client,
    api_key: &str,
    model: &str,
    max_tokens: u32,
    prompt: &str,
    image: &ImagePayload,
) -> Result<String> {
    let ImagePayload::Encoded { data, mime_type } = image else {
        return Err(Error::Frame(
            "raw pixel frames are not supported by the HTTP vision backend".to_string(),
        ));
    };

    let base64_data = base64::engine::general_purpose::STANDARD.encode(data);
    let data_url = format!("data:{mime_type};base64,{base64_data}");

    let request = ChatCompletionRequest {
        model: model.to_string(),
        messages: vec![Message {
            role: "user".to_string(),
            content: vec![
                ContentPart::Text {
                    text: prompt.to_string(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl { url: data_url },
                },
            ],
        }],
        max_tokens: Some(max_tokens),
    };

    let response = client
        .post(CHAT_COMPLETIONS_URL)
        .header("Authorization", format!("Bearer {api_key}"))
        .json(&request)
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Frame(format!("vision API error {status}: {body}")));
    }

    let result: ChatCompletionResponse = response.json().await?;

    result
        .choices
        .first()
        .and_then(|c| c.message.content.clone())
        .ok_or_else(|| Error::Frame("empty response from vision API".to_string()))
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: Vec<ContentPart>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
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
