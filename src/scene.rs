//! Scene analysis around the speaker
//!
//! Wraps an [`ObjectDetector`] and reports detected object categories as a
//! structured list alongside a rendered sentence. Callers consume the list;
//! the sentence is display-only.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::frame::{self, FrameIssue, ImageInput, ImagePayload};
use crate::Result;

/// Default confidence threshold for keeping a detection
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.5;

/// One detection from the object detector
#[derive(Debug, Clone)]
pub struct Detection {
    /// Category label (e.g. "person", "laptop")
    pub label: String,
    pub confidence: f32,
}

/// Backend that detects object categories in a frame
#[async_trait]
pub trait ObjectDetector: Send + Sync {
    /// Detect objects with at least the given confidence
    ///
    /// # Errors
    ///
    /// Returns error if detection itself fails
    async fn detect(&self, image: &ImagePayload, min_confidence: f32) -> Result<Vec<Detection>>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// Why scene analysis degraded instead of observing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneFailure {
    FileMissing,
    NoInput,
    BadFormat,
    EmptyImage,
    ProcessingError,
    /// The detector never loaded; analysis is never attempted
    AnalyzerUnavailable,
}

impl SceneFailure {
    const fn message(self) -> &'static str {
        match self {
            Self::FileMissing => "scene analysis failed: file not found",
            Self::NoInput => "scene analysis failed: no input",
            Self::BadFormat => "scene analysis failed: bad input format",
            Self::EmptyImage => "scene analysis failed: empty image",
            Self::ProcessingError => "scene analysis failed: processing error",
            Self::AnalyzerUnavailable => "scene analyzer is unavailable",
        }
    }
}

impl From<FrameIssue> for SceneFailure {
    fn from(issue: FrameIssue) -> Self {
        match issue {
            FrameIssue::NoInput => Self::NoInput,
            FrameIssue::FileMissing => Self::FileMissing,
            FrameIssue::BadFormat => Self::BadFormat,
            FrameIssue::EmptyImage => Self::EmptyImage,
        }
    }
}

/// Outcome of analyzing one frame
#[derive(Debug, Clone)]
pub enum SceneAnalysis {
    /// Objects detected above threshold, deduplicated
    Observed { objects: Vec<String> },
    /// Analysis ran fine but nothing cleared the threshold
    Empty,
    /// Analysis could not run; the cause is in-band, never an error
    Degraded(SceneFailure),
}

impl SceneAnalysis {
    /// Structured list of detected object categories
    #[must_use]
    pub fn objects(&self) -> &[String] {
        match self {
            Self::Observed { objects } => objects,
            _ => &[],
        }
    }

    /// Human-readable sentence for prompts and logs
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            Self::Observed { objects } => {
                format!("Detected nearby: {}.", objects.join(", "))
            }
            Self::Empty => "Nothing notable detected nearby.".to_string(),
            Self::Degraded(failure) => failure.message().to_string(),
        }
    }

    /// Whether any objects were observed
    #[must_use]
    pub fn has_objects(&self) -> bool {
        !self.objects().is_empty()
    }
}

/// Analyzes the surroundings visible in a frame
pub struct SceneService {
    detector: Option<Arc<dyn ObjectDetector>>,
    min_confidence: f32,
}

impl SceneService {
    /// Create a service around a loaded detector
    #[must_use]
    pub fn new(detector: Arc<dyn ObjectDetector>) -> Self {
        Self {
            detector: Some(detector),
            min_confidence: DEFAULT_MIN_CONFIDENCE,
        }
    }

    /// Create a permanently-degraded service (detector failed to load)
    ///
    /// Every call short-circuits to [`SceneFailure::AnalyzerUnavailable`].
    #[must_use]
    pub const fn unavailable() -> Self {
        Self {
            detector: None,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
        }
    }

    /// Override the detection confidence threshold
    #[must_use]
    pub const fn with_min_confidence(mut self, min_confidence: f32) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    /// Analyze the scene in a frame
    ///
    /// Never returns an error; every failure is a [`SceneAnalysis::Degraded`]
    /// variant with its cause.
    pub async fn analyze(&self, image: Option<&ImageInput>) -> SceneAnalysis {
        let Some(detector) = &self.detector else {
            return SceneAnalysis::Degraded(SceneFailure::AnalyzerUnavailable);
        };

        let payload = match frame::resolve(image) {
            Ok(payload) => payload,
            Err(issue) => {
                tracing::debug!(?issue, "no usable frame for scene analysis");
                return SceneAnalysis::Degraded(issue.into());
            }
        };

        match detector.detect(&payload, self.min_confidence).await {
            Ok(detections) => {
                // Set semantics: duplicates collapse, order is not significant
                let objects: BTreeSet<String> = detections
                    .into_iter()
                    .filter(|d| d.confidence >= self.min_confidence)
                    .map(|d| d.label)
                    .collect();

                if objects.is_empty() {
                    tracing::debug!("no objects above threshold");
                    SceneAnalysis::Empty
                } else {
                    tracing::debug!(count = objects.len(), "objects detected");
                    SceneAnalysis::Observed {
                        objects: objects.into_iter().collect(),
                    }
                }
            }
            Err(e) => {
                tracing::warn!(detector = detector.name(), error = %e, "object detection failed");
                SceneAnalysis::Degraded(SceneFailure::ProcessingError)
            }
        }
    }
}
