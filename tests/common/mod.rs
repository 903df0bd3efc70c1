//! Shared test fakes for pipeline integration tests
//!
//! Every backend seam gets an in-process fake so the full pipeline runs
//! without network access or audio hardware.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use empath_gateway::audio::{samples_to_wav, AudioInput};
use empath_gateway::emotion::{EmotionLabel, EmotionModel, EmotionScore};
use empath_gateway::frame::{ImageInput, ImagePayload};
use empath_gateway::respond::ReplyModel;
use empath_gateway::scene::{Detection, ObjectDetector};
use empath_gateway::synth::SynthesisBackend;
use empath_gateway::transcribe::{Recognizer, RecognizerFactory};
use empath_gateway::Result;

/// Emotion model that always reports one label
pub struct FixedEmotionModel(pub EmotionLabel);

#[async_trait]
impl EmotionModel for FixedEmotionModel {
    async fn classify(&self, _image: &ImagePayload) -> Result<Vec<EmotionScore>> {
        Ok(vec![EmotionScore {
            label: self.0,
            confidence: 0.9,
        }])
    }

    fn name(&self) -> &'static str {
        "fixed-emotion"
    }
}

/// Detector that always reports the same labels at the given confidence
pub struct FixedDetector(pub Vec<(&'static str, f32)>);

#[async_trait]
impl ObjectDetector for FixedDetector {
    async fn detect(&self, _image: &ImagePayload, _min_confidence: f32) -> Result<Vec<Detection>> {
        Ok(self
            .0
            .iter()
            .map(|(label, confidence)| Detection {
                label: (*label).to_string(),
                confidence: *confidence,
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "fixed-detector"
    }
}

/// Factory minting recognizers that ignore audio and return a scripted text
pub struct ScriptedRecognizerFactory(pub &'static str);

impl RecognizerFactory for ScriptedRecognizerFactory {
    fn create(&self, _sample_rate: u32) -> Result<Box<dyn Recognizer>> {
        Ok(Box::new(ScriptedRecognizer(self.0)))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

struct ScriptedRecognizer(&'static str);

#[async_trait]
impl Recognizer for ScriptedRecognizer {
    async fn accept(&mut self, _pcm: &[i16]) -> Result<Option<String>> {
        Ok(None)
    }

    async fn finalize(&mut self) -> Result<String> {
        Ok(self.0.to_string())
    }
}

/// Synthesis backend returning a short real WAV at 22.05 kHz
pub struct WavSynthesisBackend;

impl WavSynthesisBackend {
    pub const SAMPLE_RATE: u32 = 22_050;
}

#[async_trait]
impl SynthesisBackend for WavSynthesisBackend {
    async fn synthesize(&self, _text: &str, _language: &str) -> Result<Vec<u8>> {
        let samples: Vec<f32> = (0..2205)
            .map(|i| {
                let t = i as f32 / Self::SAMPLE_RATE as f32;
                0.3 * (2.0 * std::f32::consts::PI * 440.0 * t).sin()
            })
            .collect();
        samples_to_wav(&samples, Self::SAMPLE_RATE)
    }

    fn name(&self) -> &'static str {
        "wav-fake"
    }
}

/// Reply model that counts invocations and records the last input text
pub struct RecordingReplyModel {
    pub calls: AtomicUsize,
    pub last_text: Mutex<String>,
    pub reply: &'static str,
}

impl RecordingReplyModel {
    pub fn new(reply: &'static str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            last_text: Mutex::new(String::new()),
            reply,
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReplyModel for RecordingReplyModel {
    async fn complete(&self, text: &str, _emotion: EmotionLabel) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_text.lock().unwrap() = text.to_string();
        Ok(self.reply.to_string())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// A small encoded frame input (content is irrelevant to the fakes)
pub fn test_frame() -> ImageInput {
    ImageInput::Encoded {
        data: vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 1, 2, 3],
        mime_type: "image/png".to_string(),
    }
}

/// One second of 440 Hz speech-stand-in audio at 16 kHz mono
pub fn test_clip() -> AudioInput {
    let sample_rate = 16_000u32;
    let samples: Vec<f32> = (0..sample_rate)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            0.5 * (2.0 * std::f32::consts::PI * 440.0 * t).sin()
        })
        .collect();
    AudioInput::Samples {
        data: samples,
        sample_rate,
        channels: 1,
    }
}
