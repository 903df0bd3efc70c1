//! End-to-end pipeline integration tests
//!
//! Runs the full pipeline over faked backends; no network, no hardware.

use std::sync::Arc;

use empath_gateway::emotion::{EmotionLabel, EmotionService};
use empath_gateway::pipeline::{Pipeline, REPEAT_REPLY};
use empath_gateway::respond::ResponseGenerator;
use empath_gateway::scene::SceneService;
use empath_gateway::synth::SpeechSynthesizer;
use empath_gateway::transcribe::TranscriptionService;

mod common;

use common::{
    test_clip, test_frame, FixedDetector, FixedEmotionModel, RecordingReplyModel,
    ScriptedRecognizerFactory, WavSynthesisBackend,
};

fn pipeline_with(
    emotion: EmotionService,
    scene: SceneService,
    transcript: &'static str,
    responder: ResponseGenerator,
) -> Pipeline {
    Pipeline::new(
        emotion,
        scene,
        TranscriptionService::new(Arc::new(ScriptedRecognizerFactory(transcript))),
        responder,
        SpeechSynthesizer::new(Arc::new(WavSynthesisBackend), "en"),
    )
}

#[tokio::test]
async fn test_no_inputs_degrades_fully() {
    let pipeline = pipeline_with(
        EmotionService::new(Arc::new(FixedEmotionModel(EmotionLabel::Happy))),
        SceneService::new(Arc::new(FixedDetector(vec![("person", 0.9)]))),
        "never reached",
        ResponseGenerator::new(),
    );

    let output = pipeline.run(None, None).await;

    // No frame reaches the model, so the fixed label never surfaces
    assert_eq!(output.emotion, EmotionLabel::Unknown);
    assert_eq!(output.transcript, "");
    assert_eq!(output.reply, REPEAT_REPLY);
    // The reply is non-empty, so real synthesis ran
    assert_eq!(output.audio.sample_rate, WavSynthesisBackend::SAMPLE_RATE);
    assert!(!output.audio.samples.is_empty());
}

#[tokio::test]
async fn test_happy_frame_with_speech() {
    let pipeline = pipeline_with(
        EmotionService::new(Arc::new(FixedEmotionModel(EmotionLabel::Happy))),
        SceneService::new(Arc::new(FixedDetector(Vec::new()))),
        "hello there",
        ResponseGenerator::new(),
    );

    let output = pipeline.run(Some(test_frame()), Some(test_clip())).await;

    assert_eq!(output.emotion, EmotionLabel::Happy);
    assert_eq!(output.transcript, "hello there");
    assert_eq!(
        output.reply,
        "You seem to be in a good mood! You said: \"hello there\""
    );
    assert!(!output.audio.samples.is_empty());
}

#[tokio::test]
async fn test_scene_context_reaches_reply_model() {
    let model = RecordingReplyModel::new("Nice workspace you have there.");
    let pipeline = pipeline_with(
        EmotionService::new(Arc::new(FixedEmotionModel(EmotionLabel::Neutral))),
        SceneService::new(Arc::new(FixedDetector(vec![
            ("laptop", 0.8),
            ("person", 0.9),
        ]))),
        "what do you see",
        ResponseGenerator::with_model(model.clone()),
    );

    let output = pipeline.run(Some(test_frame()), Some(test_clip())).await;

    assert_eq!(output.reply, "Nice workspace you have there.");
    assert_eq!(model.call_count(), 1);
    let prompt = model.last_text.lock().unwrap().clone();
    assert!(prompt.contains("laptop"));
    assert!(prompt.contains("person"));
    assert!(prompt.contains("what do you see"));
}

#[tokio::test]
async fn test_short_transcript_asks_about_objects() {
    let pipeline = pipeline_with(
        EmotionService::new(Arc::new(FixedEmotionModel(EmotionLabel::Sad))),
        SceneService::new(Arc::new(FixedDetector(vec![
            ("person", 0.9),
            ("laptop", 0.8),
            ("cup", 0.3),
        ]))),
        "hm",
        ResponseGenerator::new(),
    );

    let output = pipeline.run(Some(test_frame()), Some(test_clip())).await;

    // The transcript is kept even though it was too short to respond to
    assert_eq!(output.transcript, "hm");
    assert!(output.reply.contains("laptop"));
    assert!(output.reply.contains("person"));
    // Below the confidence threshold
    assert!(!output.reply.contains("cup"));
}

#[tokio::test]
async fn test_degraded_branch_never_calls_reply_model() {
    let model = RecordingReplyModel::new("should not appear");
    let pipeline = pipeline_with(
        EmotionService::new(Arc::new(FixedEmotionModel(EmotionLabel::Angry))),
        SceneService::new(Arc::new(FixedDetector(vec![("chair", 0.7)]))),
        "",
        ResponseGenerator::with_model(model.clone()),
    );

    let output = pipeline.run(Some(test_frame()), None).await;

    assert_eq!(model.call_count(), 0);
    assert!(output.reply.contains("chair"));
}

#[tokio::test]
async fn test_unavailable_backends_still_complete() {
    let pipeline = Pipeline::new(
        EmotionService::unavailable(),
        SceneService::unavailable(),
        TranscriptionService::new(Arc::new(ScriptedRecognizerFactory("hello there"))),
        ResponseGenerator::new(),
        SpeechSynthesizer::unavailable(),
    );

    let output = pipeline.run(Some(test_frame()), Some(test_clip())).await;

    assert_eq!(output.emotion, EmotionLabel::Failed);
    assert_eq!(output.transcript, "hello there");
    // Neutral-tier emotion adds no prefix
    assert_eq!(output.reply, "You said: \"hello there\"");
    // Synthesis fell back to one second of silence
    assert!((output.audio.duration_secs() - 1.0).abs() < 1e-3);
    assert!(output.audio.samples.iter().all(|s| *s == 0.0));
}
