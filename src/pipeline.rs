//! The interaction pipeline
//!
//! Strictly linear per invocation: emotion → scene → transcript, one branch
//! on transcript length, then synthesis. Every callee absorbs its own
//! failures into sentinel values, so [`Pipeline::run`] cannot fail and
//! performs no error handling of its own. Preserving that invariant is part
//! of the contract.

use crate::audio::AudioInput;
use crate::emotion::{EmotionLabel, EmotionService};
use crate::frame::ImageInput;
use crate::respond::ResponseGenerator;
use crate::scene::{SceneAnalysis, SceneService};
use crate::synth::{SpeechSynthesizer, SynthesizedAudio};
use crate::transcribe::TranscriptionService;

/// Minimum trimmed transcript length for the responded branch
pub const MIN_TRANSCRIPT_CHARS: usize = 3;

/// Generic degraded reply when the scene offers nothing to anchor on
pub const REPEAT_REPLY: &str = "I did not quite catch that. Could you say that again?";

/// Everything one invocation produces
///
/// All four fields are always well-formed; failure is encoded in sentinel
/// values, never signaled through this type.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub emotion: EmotionLabel,
    /// Raw transcript, possibly empty, even on the degraded branch
    pub transcript: String,
    pub reply: String,
    pub audio: SynthesizedAudio,
}

/// Sequences the services over one (frame, clip) pair
pub struct Pipeline {
    emotion: EmotionService,
    scene: SceneService,
    transcriber: TranscriptionService,
    responder: ResponseGenerator,
    synthesizer: SpeechSynthesizer,
}

impl Pipeline {
    /// Assemble a pipeline from its services
    #[must_use]
    pub fn new(
        emotion: EmotionService,
        scene: SceneService,
        transcriber: TranscriptionService,
        responder: ResponseGenerator,
        synthesizer: SpeechSynthesizer,
    ) -> Self {
        Self {
            emotion,
            scene,
            transcriber,
            responder,
            synthesizer,
        }
    }

    /// Run one invocation end to end
    ///
    /// Both inputs may be absent; the result is then fully degraded but still
    /// well-formed.
    pub async fn run(
        &self,
        image: Option<ImageInput>,
        audio: Option<AudioInput>,
    ) -> PipelineOutput {
        let emotion = self.emotion.detect(image.as_ref()).await;
        tracing::info!(emotion = %emotion, "emotion stage complete");

        let scene = self.scene.analyze(image.as_ref()).await;
        tracing::info!(scene = %scene.summary(), "scene stage complete");

        let transcript = self.transcriber.transcribe(audio.as_ref()).await;

        let reply = if transcript.trim().chars().count() < MIN_TRANSCRIPT_CHARS {
            tracing::info!(transcript = %transcript, "no usable speech, taking degraded branch");
            Self::degraded_reply(&scene)
        } else {
            let combined = match &scene {
                SceneAnalysis::Observed { .. } => {
                    format!("{} The user said: \"{}\"", scene.summary(), transcript)
                }
                _ => transcript.clone(),
            };
            self.responder.generate(&combined, emotion).await
        };

        let audio_out = self.synthesizer.synthesize(&reply).await;

        PipelineOutput {
            emotion,
            transcript,
            reply,
            audio: audio_out,
        }
    }

    /// Build the degraded-branch reply from the structured scene analysis
    ///
    /// The response generator is deliberately not involved here.
    fn degraded_reply(scene: &SceneAnalysis) -> String {
        let objects = scene.objects();
        if objects.is_empty() {
            REPEAT_REPLY.to_string()
        } else {
            format!(
                "I did not quite catch that. Were you asking about the {} nearby?",
                objects.join(", ")
            )
        }
    }
}
