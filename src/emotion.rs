//! Facial emotion detection
//!
//! Wraps an [`EmotionModel`] and maps every failure mode to an in-band
//! [`EmotionLabel`] sentinel. Nothing raises out of this service.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::frame::{self, ImageInput, ImagePayload};
use crate::Result;

/// Facial emotion categories, plus the two in-band sentinels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionLabel {
    Happy,
    Sad,
    Angry,
    Surprise,
    Fear,
    Disgust,
    Neutral,
    /// No usable input or no face found
    Unknown,
    /// The underlying classifier errored
    Failed,
}

impl EmotionLabel {
    /// Lowercase wire/display name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Sad => "sad",
            Self::Angry => "angry",
            Self::Surprise => "surprise",
            Self::Fear => "fear",
            Self::Disgust => "disgust",
            Self::Neutral => "neutral",
            Self::Unknown => "unknown",
            Self::Failed => "failed",
        }
    }

    /// Parse a classifier output label, case-insensitively
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "happy" => Some(Self::Happy),
            "sad" => Some(Self::Sad),
            "angry" | "anger" => Some(Self::Angry),
            "surprise" | "surprised" => Some(Self::Surprise),
            "fear" | "afraid" => Some(Self::Fear),
            "disgust" | "disgusted" => Some(Self::Disgust),
            "neutral" => Some(Self::Neutral),
            _ => None,
        }
    }
}

impl std::fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scored emotion category from the classifier
#[derive(Debug, Clone, Copy)]
pub struct EmotionScore {
    pub label: EmotionLabel,
    pub confidence: f32,
}

/// Backend that classifies the most prominent face in a frame
///
/// An empty score list means no face was found; that is not an error.
#[async_trait]
pub trait EmotionModel: Send + Sync {
    /// Score emotion categories for the frame
    ///
    /// # Errors
    ///
    /// Returns error if the classifier itself fails
    async fn classify(&self, image: &ImagePayload) -> Result<Vec<EmotionScore>>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// Detects the dominant facial emotion in a frame
pub struct EmotionService {
    model: Option<Arc<dyn EmotionModel>>,
}

impl EmotionService {
    /// Create a service around a loaded model
    #[must_use]
    pub fn new(model: Arc<dyn EmotionModel>) -> Self {
        Self { model: Some(model) }
    }

    /// Create a permanently-degraded service (model failed to load)
    ///
    /// Every call returns [`EmotionLabel::Failed`].
    #[must_use]
    pub const fn unavailable() -> Self {
        Self { model: None }
    }

    /// Detect the dominant emotion in a frame
    ///
    /// Absent or unusable input yields `Unknown`; classifier failure yields
    /// `Failed`. Never returns an error.
    pub async fn detect(&self, image: Option<&ImageInput>) -> EmotionLabel {
        let Some(model) = &self.model else {
            tracing::warn!("emotion model unavailable, returning failed sentinel");
            return EmotionLabel::Failed;
        };

        let payload = match frame::resolve(image) {
            Ok(payload) => payload,
            Err(issue) => {
                tracing::debug!(?issue, "no usable frame for emotion detection");
                return EmotionLabel::Unknown;
            }
        };

        match model.classify(&payload).await {
            Ok(scores) => {
                let dominant = scores
                    .iter()
                    .max_by(|a, b| a.confidence.total_cmp(&b.confidence));
                match dominant {
                    Some(score) => {
                        tracing::debug!(
                            emotion = %score.label,
                            confidence = score.confidence,
                            "dominant emotion detected"
                        );
                        score.label
                    }
                    None => {
                        tracing::debug!("no face found in frame");
                        EmotionLabel::Unknown
                    }
                }
            }
            Err(e) => {
                tracing::warn!(model = model.name(), error = %e, "emotion classification failed");
                EmotionLabel::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::PixelBuffer;
    use crate::Error;

    struct FixedModel(Vec<EmotionScore>);

    #[async_trait]
    impl EmotionModel for FixedModel {
        async fn classify(&self, _image: &ImagePayload) -> Result<Vec<EmotionScore>> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    struct FailingModel;

    #[async_trait]
    impl EmotionModel for FailingModel {
        async fn classify(&self, _image: &ImagePayload) -> Result<Vec<EmotionScore>> {
            Err(Error::Emotion("classifier exploded".to_string()))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    fn test_frame() -> ImageInput {
        ImageInput::Pixels(PixelBuffer {
            width: 4,
            height: 4,
            channels: 3,
            data: vec![128u8; 48],
        })
    }

    #[tokio::test]
    async fn test_absent_image_is_unknown() {
        let service = EmotionService::new(Arc::new(FixedModel(vec![EmotionScore {
            label: EmotionLabel::Happy,
            confidence: 0.9,
        }])));
        assert_eq!(service.detect(None).await, EmotionLabel::Unknown);
    }

    #[tokio::test]
    async fn test_dominant_emotion_wins() {
        let service = EmotionService::new(Arc::new(FixedModel(vec![
            EmotionScore {
                label: EmotionLabel::Sad,
                confidence: 0.2,
            },
            EmotionScore {
                label: EmotionLabel::Happy,
                confidence: 0.7,
            },
            EmotionScore {
                label: EmotionLabel::Neutral,
                confidence: 0.1,
            },
        ])));
        assert_eq!(
            service.detect(Some(&test_frame())).await,
            EmotionLabel::Happy
        );
    }

    #[tokio::test]
    async fn test_no_face_is_unknown() {
        let service = EmotionService::new(Arc::new(FixedModel(Vec::new())));
        assert_eq!(
            service.detect(Some(&test_frame())).await,
            EmotionLabel::Unknown
        );
    }

    #[tokio::test]
    async fn test_classifier_error_is_failed() {
        let service = EmotionService::new(Arc::new(FailingModel));
        assert_eq!(
            service.detect(Some(&test_frame())).await,
            EmotionLabel::Failed
        );
    }

    #[tokio::test]
    async fn test_unavailable_service_is_failed() {
        let service = EmotionService::unavailable();
        assert_eq!(
            service.detect(Some(&test_frame())).await,
            EmotionLabel::Failed
        );
    }

    #[test]
    fn test_label_parse() {
        assert_eq!(EmotionLabel::parse("Happy"), Some(EmotionLabel::Happy));
        assert_eq!(EmotionLabel::parse(" anger "), Some(EmotionLabel::Angry));
        assert_eq!(EmotionLabel::parse("bored"), None);
    }
}
