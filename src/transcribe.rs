//! Speech transcription
//!
//! Normalizes arbitrary input audio to the strict physical format the
//! recognizer requires (mono, 16 kHz, 16-bit integer PCM in an uncompressed
//! WAV), then feeds it in fixed-size chunks. The scratch WAV lives in a
//! [`tempfile::NamedTempFile`], so it is deleted on every exit path.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use crate::audio::{self, AudioInput, DecodedAudio};
use crate::{Error, Result};

/// Sample rate the recognizer requires
pub const RECOGNIZER_SAMPLE_RATE: u32 = 16_000;

/// Frames fed to the recognizer per chunk
pub const CHUNK_FRAMES: usize = 4000;

/// Prefix for scratch WAV files (used by cleanup checks)
pub const SCRATCH_PREFIX: &str = "empath-stt-";

/// A per-request speech recognizer fed with fixed-size PCM chunks
///
/// Each accepted chunk may yield a finalized partial result once enough audio
/// has accumulated; [`Recognizer::finalize`] flushes any trailing text.
#[async_trait]
pub trait Recognizer: Send {
    /// Accept one chunk of 16-bit PCM frames
    ///
    /// # Errors
    ///
    /// Returns error if recognition fails
    async fn accept(&mut self, pcm: &[i16]) -> Result<Option<String>>;

    /// Flush and return any remaining text
    ///
    /// # Errors
    ///
    /// Returns error if recognition fails
    async fn finalize(&mut self) -> Result<String>;
}

/// Mints a fresh [`Recognizer`] per transcription request
pub trait RecognizerFactory: Send + Sync {
    /// Create a recognizer for audio at the given sample rate
    ///
    /// # Errors
    ///
    /// Returns error if the recognizer cannot be constructed
    fn create(&self, sample_rate: u32) -> Result<Box<dyn Recognizer>>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// Transcribes speech to text, absorbing every failure into an empty string
pub struct TranscriptionService {
    factory: Arc<dyn RecognizerFactory>,
    scratch_dir: Option<PathBuf>,
}

impl TranscriptionService {
    /// Create a transcription service
    #[must_use]
    pub fn new(factory: Arc<dyn RecognizerFactory>) -> Self {
        Self {
            factory,
            scratch_dir: None,
        }
    }

    /// Place scratch files in a specific directory instead of the system
    /// temp dir
    #[must_use]
    pub fn with_scratch_dir(mut self, dir: PathBuf) -> Self {
        self.scratch_dir = Some(dir);
        self
    }

    /// Transcribe audio to text
    ///
    /// Absence, a nonexistent path, or any decode/encode/recognition failure
    /// yields an empty string. Never returns an error.
    pub async fn transcribe(&self, input: Option<&AudioInput>) -> String {
        let Some(input) = input else {
            tracing::debug!("no audio input");
            return String::new();
        };

        if let AudioInput::Path(path) = input {
            if !path.exists() {
                tracing::debug!(path = %path.display(), "audio path does not exist");
                return String::new();
            }
        }

        match self.transcribe_inner(input).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(backend = self.factory.name(), error = %e, "transcription failed");
                String::new()
            }
        }
    }

    async fn transcribe_inner(&self, input: &AudioInput) -> Result<String> {
        // 1. Decode to mono f32 at native rate
        let decoded = match input {
            AudioInput::Path(path) => audio::decode_file(path)?,
            AudioInput::Samples {
                data,
                sample_rate,
                channels,
            } => DecodedAudio {
                samples: audio::downmix_to_mono(data, *channels),
                sample_rate: *sample_rate,
            },
        };

        // 2. Resample to the recognizer rate (no-op if already there)
        let samples = audio::resample(
            &decoded.samples,
            decoded.sample_rate,
            RECOGNIZER_SAMPLE_RATE,
        )?;

        // 3. Quantize to 16-bit PCM and re-encode as a scratch WAV.
        // NamedTempFile deletes the file when dropped, on every exit path.
        let pcm = audio::quantize_i16(&samples);
        let wav_bytes = audio::pcm_to_wav(&pcm, RECOGNIZER_SAMPLE_RATE)?;

        let mut builder = tempfile::Builder::new();
        builder.prefix(SCRATCH_PREFIX).suffix(".wav");
        let scratch = match &self.scratch_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        std::fs::write(scratch.path(), &wav_bytes)?;

        // 4. Reopen and verify the physical format before feeding the
        // recognizer; a mismatch aborts rather than handing over bad data.
        let mut reader = hound::WavReader::open(scratch.path())
            .map_err(|e| Error::Stt(format!("scratch WAV unreadable: {e}")))?;
        let spec = reader.spec();
        if spec.channels != 1
            || spec.bits_per_sample != 16
            || spec.sample_format != hound::SampleFormat::Int
        {
            return Err(Error::Stt(format!(
                "scratch WAV format mismatch: channels={}, bits={}, format={:?}",
                spec.channels, spec.bits_per_sample, spec.sample_format
            )));
        }

        let frames: Vec<i16> = reader
            .samples::<i16>()
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| Error::Stt(format!("scratch WAV read error: {e}")))?;

        // 5. Feed fixed-size chunks; collect partials in processing order
        let mut recognizer = self.factory.create(spec.sample_rate)?;
        let mut parts: Vec<String> = Vec::new();

        for chunk in frames.chunks(CHUNK_FRAMES) {
            if let Some(text) = recognizer.accept(chunk).await? {
                if !text.is_empty() {
                    parts.push(text);
                }
            }
        }

        let tail = recognizer.finalize().await?;
        if !tail.is_empty() {
            parts.push(tail);
        }

        let transcript = parts.join(" ").trim().to_string();
        tracing::info!(transcript = %transcript, "transcription complete");
        Ok(transcript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Emits one partial per accepted chunk and a fixed tail on finalize
    struct ScriptedRecognizer {
        partials: Vec<String>,
        tail: String,
        accepted: usize,
    }

    #[async_trait]
    impl Recognizer for ScriptedRecognizer {
        async fn accept(&mut self, pcm: &[i16]) -> Result<Option<String>> {
            assert!(pcm.len() <= CHUNK_FRAMES);
            let part = self.partials.get(self.accepted).cloned();
            self.accepted += 1;
            Ok(part)
        }

        async fn finalize(&mut self) -> Result<String> {
            Ok(self.tail.clone())
        }
    }

    struct ScriptedFactory {
        partials: Vec<String>,
        tail: String,
    }

    impl RecognizerFactory for ScriptedFactory {
        fn create(&self, sample_rate: u32) -> Result<Box<dyn Recognizer>> {
            assert_eq!(sample_rate, RECOGNIZER_SAMPLE_RATE);
            Ok(Box::new(ScriptedRecognizer {
                partials: self.partials.clone(),
                tail: self.tail.clone(),
                accepted: 0,
            }))
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    struct FailingRecognizer;

    #[async_trait]
    impl Recognizer for FailingRecognizer {
        async fn accept(&mut self, _pcm: &[i16]) -> Result<Option<String>> {
            Err(Error::Stt("recognizer exploded".to_string()))
        }

        async fn finalize(&mut self) -> Result<String> {
            Err(Error::Stt("recognizer exploded".to_string()))
        }
    }

    struct FailingFactory;

    impl RecognizerFactory for FailingFactory {
        fn create(&self, _sample_rate: u32) -> Result<Box<dyn Recognizer>> {
            Ok(Box::new(FailingRecognizer))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    fn speech_input(duration_secs: f32, sample_rate: u32, channels: u16) -> AudioInput {
        let frames = (sample_rate as f32 * duration_secs) as usize;
        let mut data = Vec::with_capacity(frames * channels as usize);
        for i in 0..frames {
            let t = i as f32 / sample_rate as f32;
            let s = (2.0 * std::f32::consts::PI * 220.0 * t).sin() * 0.4;
            for _ in 0..channels {
                data.push(s);
            }
        }
        AudioInput::Samples {
            data,
            sample_rate,
            channels,
        }
    }

    fn scratch_files(dir: &std::path::Path) -> Vec<PathBuf> {
        std::fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(SCRATCH_PREFIX))
            })
            .collect()
    }

    #[tokio::test]
    async fn test_absent_audio_is_empty() {
        let service = TranscriptionService::new(Arc::new(ScriptedFactory {
            partials: vec!["never".to_string()],
            tail: String::new(),
        }));
        assert_eq!(service.transcribe(None).await, "");
    }

    #[tokio::test]
    async fn test_nonexistent_path_is_empty() {
        let service = TranscriptionService::new(Arc::new(ScriptedFactory {
            partials: Vec::new(),
            tail: String::new(),
        }));
        let input = AudioInput::Path("/nonexistent/clip.wav".into());
        assert_eq!(service.transcribe(Some(&input)).await, "");
    }

    #[tokio::test]
    async fn test_partials_joined_in_order() {
        let service = TranscriptionService::new(Arc::new(ScriptedFactory {
            partials: vec!["hello".to_string(), "there".to_string()],
            tail: "friend".to_string(),
        }));
        // 1s of 16kHz mono = 16000 frames = 4 chunks of 4000
        let input = speech_input(1.0, RECOGNIZER_SAMPLE_RATE, 1);
        assert_eq!(
            service.transcribe(Some(&input)).await,
            "hello there friend"
        );
    }

    #[tokio::test]
    async fn test_stereo_high_rate_is_normalized() {
        // 44.1kHz stereo must be downmixed and resampled before chunking;
        // the scripted factory asserts the recognizer sees 16kHz.
        let service = TranscriptionService::new(Arc::new(ScriptedFactory {
            partials: Vec::new(),
            tail: "ok".to_string(),
        }));
        let input = speech_input(0.5, 44_100, 2);
        assert_eq!(service.transcribe(Some(&input)).await, "ok");
    }

    #[tokio::test]
    async fn test_recognizer_failure_is_empty_string() {
        let service = TranscriptionService::new(Arc::new(FailingFactory));
        let input = speech_input(0.5, RECOGNIZER_SAMPLE_RATE, 1);
        assert_eq!(service.transcribe(Some(&input)).await, "");
    }

    #[tokio::test]
    async fn test_scratch_file_removed_on_success() {
        let dir = tempfile::tempdir().unwrap();
        let service = TranscriptionService::new(Arc::new(ScriptedFactory {
            partials: Vec::new(),
            tail: "done".to_string(),
        }))
        .with_scratch_dir(dir.path().to_path_buf());

        let input = speech_input(0.5, RECOGNIZER_SAMPLE_RATE, 1);
        assert_eq!(service.transcribe(Some(&input)).await, "done");
        assert!(scratch_files(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_scratch_file_removed_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let service = TranscriptionService::new(Arc::new(FailingFactory))
            .with_scratch_dir(dir.path().to_path_buf());

        let input = speech_input(0.5, RECOGNIZER_SAMPLE_RATE, 1);
        assert_eq!(service.transcribe(Some(&input)).await, "");
        assert!(scratch_files(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_wav_file_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.wav");
        let samples: Vec<f32> = (0..8000)
            .map(|i| (i as f32 / 100.0).sin() * 0.5)
            .collect();
        let wav = audio::samples_to_wav(&samples, RECOGNIZER_SAMPLE_RATE).unwrap();
        std::fs::write(&path, wav).unwrap();

        let service = TranscriptionService::new(Arc::new(ScriptedFactory {
            partials: vec!["from".to_string(), "file".to_string()],
            tail: String::new(),
        }));
        let input = AudioInput::Path(path);
        assert_eq!(service.transcribe(Some(&input)).await, "from file");
    }
}
