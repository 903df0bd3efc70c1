use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use empath_gateway::providers::{
    OpenAiEmotionModel, OpenAiObjectDetector, OpenAiReplyModel, OpenAiTtsBackend,
    WhisperRecognizerFactory,
};
use empath_gateway::{
    audio, AudioInput, Config, EmotionService, ImageInput, Pipeline, ResponseGenerator,
    SceneService, SpeechSynthesizer, SynthesizedAudio, TranscriptionService,
};

/// Empath - Multimodal interaction pipeline
#[derive(Parser)]
#[command(name = "empath", version, about)]
struct Cli {
    /// Camera frame to analyze (png/jpeg/gif/webp)
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// Microphone recording to transcribe (wav/mp3)
    #[arg(short, long)]
    audio: Option<PathBuf>,

    /// Where to write the synthesized reply
    #[arg(short, long, default_value = "reply.wav")]
    output: PathBuf,

    /// Config file (defaults to the platform config dir)
    #[arg(short, long, env = "EMPATH_CONFIG")]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Test speech synthesis end to end
    TestTts {
        /// Text to speak
        #[arg(default_value = "Hello! This is a test of the text to speech system.")]
        text: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,empath_gateway=info",
        1 => "info,empath_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(Command::TestTts { text }) = cli.command {
        return test_tts(&config, &text, &cli.output).await;
    }

    let pipeline = build_pipeline(&config)?;

    tracing::info!(
        image = ?cli.image,
        audio = ?cli.audio,
        "starting interaction"
    );

    let image = cli.image.map(ImageInput::Path);
    let audio = cli.audio.map(AudioInput::Path);

    let output = pipeline.run(image, audio).await;

    println!("Emotion:    {}", output.emotion);
    println!("Transcript: {}", output.transcript);
    println!("Reply:      {}", output.reply);

    write_wav(&cli.output, &output.audio)?;
    println!("Reply audio written to {}", cli.output.display());

    Ok(())
}

/// Wire the hosted backends into a pipeline
///
/// Vision backends degrade to sentinel services when they cannot be built;
/// transcription is required, so its backend failing is fatal.
fn build_pipeline(config: &Config) -> anyhow::Result<Pipeline> {
    let api_key = config.api_key();

    let emotion = match OpenAiEmotionModel::new(
        api_key.clone(),
        config.vision.model.clone(),
        config.vision.max_tokens,
    ) {
        Ok(model) => EmotionService::new(Arc::new(model)),
        Err(e) => {
            tracing::warn!(error = %e, "emotion backend unavailable");
            EmotionService::unavailable()
        }
    };

    let scene = match OpenAiObjectDetector::new(
        api_key.clone(),
        config.vision.model.clone(),
        config.vision.max_tokens,
    ) {
        Ok(detector) => SceneService::new(Arc::new(detector))
            .with_min_confidence(config.scene.min_confidence),
        Err(e) => {
            tracing::warn!(error = %e, "scene backend unavailable");
            SceneService::unavailable()
        }
    };

    let factory = WhisperRecognizerFactory::new(
        api_key.clone(),
        config.speech.stt_model.clone(),
        config.speech.stt_language.clone(),
    )?;
    let transcriber = TranscriptionService::new(Arc::new(factory));

    let responder = if config.reply.use_model {
        match OpenAiReplyModel::new(
            api_key.clone(),
            config.reply.model.clone(),
            config.reply.max_tokens,
        ) {
            Ok(model) => ResponseGenerator::with_model(Arc::new(model)),
            Err(e) => {
                tracing::warn!(error = %e, "reply backend unavailable, using templated replies");
                ResponseGenerator::new()
            }
        }
    } else {
        ResponseGenerator::new()
    };

    let synthesizer = match OpenAiTtsBackend::new(
        api_key,
        config.speech.tts_model.clone(),
        config.speech.tts_voice.clone(),
        config.speech.tts_speed,
    ) {
        Ok(backend) => SpeechSynthesizer::new(Arc::new(backend), config.speech.language.clone()),
        Err(e) => {
            tracing::warn!(error = %e, "synthesis backend unavailable");
            SpeechSynthesizer::unavailable()
        }
    };

    Ok(Pipeline::new(
        emotion,
        scene,
        transcriber,
        responder,
        synthesizer,
    ))
}

/// Synthesize a fixed line and write it out
async fn test_tts(config: &Config, text: &str, output: &PathBuf) -> anyhow::Result<()> {
    println!("Synthesizing: \"{text}\"");

    let backend = OpenAiTtsBackend::new(
        config.api_key(),
        config.speech.tts_model.clone(),
        config.speech.tts_voice.clone(),
        config.speech.tts_speed,
    )?;
    let synthesizer = SpeechSynthesizer::new(Arc::new(backend), config.speech.language.clone());

    let audio = synthesizer.synthesize(text).await;
    println!(
        "Got {:.2}s of audio at {} Hz",
        audio.duration_secs(),
        audio.sample_rate
    );

    write_wav(output, &audio)?;
    println!("Written to {}", output.display());

    Ok(())
}

/// Write synthesized audio as a 16-bit mono WAV file
fn write_wav(path: &PathBuf, audio: &SynthesizedAudio) -> anyhow::Result<()> {
    let wav = audio::samples_to_wav(&audio.samples, audio.sample_rate)?;
    std::fs::write(path, wav)?;
    Ok(())
}
