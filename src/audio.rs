//! Audio decode, downmix, resample, and encode
//!
//! Shared by the transcription boundary (which needs mono 16 kHz 16-bit PCM)
//! and the synthesis boundary (which decodes whatever the backend returns).

use std::io::Cursor;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// An audio clip as provided by the caller
#[derive(Debug, Clone)]
pub enum AudioInput {
    /// Path to an encoded audio file on disk
    Path(PathBuf),
    /// Already-decoded samples at a native rate, possibly interleaved
    Samples {
        data: Vec<f32>,
        sample_rate: u32,
        channels: u16,
    },
}

/// Decoded audio: mono f32 samples at a native rate
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

/// Decode an audio file by extension (WAV or MP3)
///
/// # Errors
///
/// Returns error if the file cannot be read or decoded
pub fn decode_file(path: &Path) -> Result<DecodedAudio> {
    let data = std::fs::read(path)?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    match ext.as_deref() {
        Some("wav") => decode_wav(&data),
        Some("mp3") => decode_mp3(&data),
        _ => decode_encoded(&data),
    }
}

/// Decode encoded audio bytes, sniffing the container
///
/// WAV data starts with a RIFF header; anything else is treated as MP3.
///
/// # Errors
///
/// Returns error if decoding fails
pub fn decode_encoded(data: &[u8]) -> Result<DecodedAudio> {
    if data.starts_with(b"RIFF") {
        decode_wav(data)
    } else {
        decode_mp3(data)
    }
}

/// Decode WAV bytes to mono f32 samples
///
/// # Errors
///
/// Returns error if the WAV data is malformed or uses an unsupported sample
/// format
pub fn decode_wav(data: &[u8]) -> Result<DecodedAudio> {
    let mut reader = hound::WavReader::new(Cursor::new(data))
        .map_err(|e| Error::Audio(format!("WAV decode error: {e}")))?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(|v| f32::from(v) / 32768.0))
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| Error::Audio(format!("WAV read error: {e}")))?,
        (hound::SampleFormat::Int, 32) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f32 / 2_147_483_648.0))
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| Error::Audio(format!("WAV read error: {e}")))?,
        (hound::SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| Error::Audio(format!("WAV read error: {e}")))?,
        (format, bits) => {
            return Err(Error::Audio(format!(
                "unsupported WAV sample format: {format:?}/{bits}-bit"
            )));
        }
    };

    Ok(DecodedAudio {
        samples: downmix_to_mono(&interleaved, spec.channels),
        sample_rate: spec.sample_rate,
    })
}

/// Decode MP3 bytes to mono f32 samples
///
/// # Errors
///
/// Returns error if MP3 decoding fails
pub fn decode_mp3(data: &[u8]) -> Result<DecodedAudio> {
    let mut decoder = minimp3::Decoder::new(Cursor::new(data));
    let mut samples: Vec<f32> = Vec::new();
    let mut sample_rate = 0u32;

    loop {
        match decoder.next_frame() {
            Ok(frame) => {
                sample_rate = frame.sample_rate as u32;
                if frame.channels == 2 {
                    for chunk in frame.data.chunks(2) {
                        let left = f32::from(chunk[0]) / 32768.0;
                        let right = f32::from(chunk.get(1).copied().unwrap_or(chunk[0])) / 32768.0;
                        samples.push((left + right) / 2.0);
                    }
                } else {
                    for &s in &frame.data {
                        samples.push(f32::from(s) / 32768.0);
                    }
                }
            }
            Err(minimp3::Error::Eof) => break,
            Err(e) => return Err(Error::Audio(format!("MP3 decode error: {e}"))),
        }
    }

    if samples.is_empty() || sample_rate == 0 {
        return Err(Error::Audio("MP3 stream contained no frames".to_string()));
    }

    Ok(DecodedAudio {
        samples,
        sample_rate,
    })
}

/// Downmix interleaved samples to mono by per-sample channel averaging
///
/// Mono input is returned unchanged.
#[must_use]
pub fn downmix_to_mono(interleaved: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    let channels = channels as usize;
    interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

/// Resample mono audio using an FFT resampler
///
/// A no-op when the rates already match.
///
/// # Errors
///
/// Returns error if the resampler cannot be constructed or fails
#[allow(clippy::cast_possible_truncation)]
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    use rubato::{FftFixedIn, Resampler};

    if from_rate == to_rate {
        return Ok(samples.to_vec());
    }

    let chunk_size = 1024;
    let sub_chunks = 2;

    let mut resampler =
        FftFixedIn::<f64>::new(from_rate as usize, to_rate as usize, chunk_size, sub_chunks, 1)
            .map_err(|e| Error::Audio(format!("resampler init failed: {e}")))?;

    let input: Vec<f64> = samples.iter().map(|&s| f64::from(s)).collect();
    let mut output = Vec::new();

    for chunk in input.chunks(chunk_size) {
        // Zero-pad the trailing partial chunk so no tail audio is dropped
        let buf: Vec<f64> = if chunk.len() == chunk_size {
            chunk.to_vec()
        } else {
            let mut padded = chunk.to_vec();
            padded.resize(chunk_size, 0.0);
            padded
        };
        let result = resampler
            .process(&[buf], None)
            .map_err(|e| Error::Audio(format!("resample failed: {e}")))?;
        output.extend_from_slice(&result[0]);
    }

    Ok(output.iter().map(|&s| s as f32).collect())
}

/// Quantize f32 samples in [-1, 1] to signed 16-bit PCM
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn quantize_i16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| (s * 32767.0).clamp(-32768.0, 32767.0) as i16)
        .collect()
}

/// Encode mono 16-bit PCM samples as WAV bytes
///
/// # Errors
///
/// Returns error if WAV encoding fails
pub fn pcm_to_wav(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| Error::Audio(e.to_string()))?;
        for &sample in samples {
            writer
                .write_sample(sample)
                .map_err(|e| Error::Audio(e.to_string()))?;
        }
        writer.finalize().map_err(|e| Error::Audio(e.to_string()))?;
    }

    Ok(cursor.into_inner())
}

/// Encode mono f32 samples as 16-bit WAV bytes
///
/// # Errors
///
/// Returns error if WAV encoding fails
pub fn samples_to_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    pcm_to_wav(&quantize_i16(samples), sample_rate)
}

/// Generate a fixed-duration silent waveform
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn silence(duration_secs: f32, sample_rate: u32) -> Vec<f32> {
    vec![0.0; (sample_rate as f32 * duration_secs) as usize]
}
