pub mod whisper;

use std::path::Path;

use async_trait::async_trait;
use hound::WavReader;
use serde::Deserialize;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info};

use crate::audio::extract_wav_16k;
use crate::config::Config;
use crate::error::{Result, VidsumError};
use crate::subtitle::srt::segments_to_srt;

use whisper::WhisperClient;

/// A timestamped span of recognized speech. Produced in model order, which
/// is not guaranteed to be sorted by start time.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// One chunk of the raw recognition output.
#[derive(Debug, Clone, Deserialize)]
pub struct RecognizedChunk {
    #[serde(default)]
    pub timestamp: Option<(f64, f64)>,
    #[serde(default)]
    pub text: String,
}

/// Raw output of the speech-recognition service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTranscription {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub chunks: Vec<RecognizedChunk>,
}

/// Complete transcription of one media file.
#[derive(Debug, Clone)]
pub struct Transcription {
    pub text: String,
    pub srt: String,
    pub segments: Vec<Segment>,
}

/// A speech-recognition backend. Takes decoded samples, never a file path,
/// so the backend does not transcode the input a second time.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    async fn recognize(&self, samples: &[f32], sample_rate: u32) -> Result<RawTranscription>;
    fn name(&self) -> &'static str;
}

/// Process-wide recognizer service.
///
/// The backing recognition service is expensive to reach and stateless per
/// call, so one client is built lazily on first use and kept for the process
/// lifetime with no invalidation. Inference calls are serialized; the
/// backend is not assumed safe for concurrent calls.
pub struct SharedRecognizer {
    cell: OnceCell<Box<dyn SpeechRecognizer>>,
    gate: Mutex<()>,
    endpoint: String,
    api_key: Option<String>,
}

impl SharedRecognizer {
    pub fn new(config: &Config) -> Self {
        Self {
            cell: OnceCell::new(),
            gate: Mutex::new(()),
            endpoint: config.asr_endpoint.clone(),
            api_key: config.api_key.clone(),
        }
    }

    /// Build a service around an already-constructed recognizer. Used to
    /// inject alternative backends.
    pub fn with_recognizer(recognizer: Box<dyn SpeechRecognizer>) -> Self {
        Self {
            cell: OnceCell::new_with(Some(recognizer)),
            gate: Mutex::new(()),
            endpoint: String::new(),
            api_key: None,
        }
    }

    pub async fn recognize(&self, samples: &[f32], sample_rate: u32) -> Result<RawTranscription> {
        let recognizer = self
            .cell
            .get_or_init(|| async {
                let mut client = WhisperClient::new(self.endpoint.clone());
                if let Some(ref key) = self.api_key {
                    client = client.with_api_key(key.clone());
                }
                info!("Initialized {} recognizer", client.name());
                Box::new(client) as Box<dyn SpeechRecognizer>
            })
            .await;

        let _serialized = self.gate.lock().await;
        recognizer.recognize(samples, sample_rate).await
    }
}

/// Transcribe a video or audio file: text, SRT rendering and timestamped
/// segments, or an error. Never a partial result.
pub async fn transcribe_media(
    input: &Path,
    recognizer: &SharedRecognizer,
    work_dir: &Path,
) -> Result<Transcription> {
    let wav_path = work_dir.join("speech_16k.wav");
    extract_wav_16k(input, &wav_path).await?;

    let decoded = read_wav_samples(&wav_path);
    let _ = std::fs::remove_file(&wav_path);
    let (samples, sample_rate) = decoded?;

    debug!(
        "Recognizing {} samples at {} Hz",
        samples.len(),
        sample_rate
    );
    let raw = recognizer.recognize(&samples, sample_rate).await?;

    let segments = chunks_to_segments(&raw.chunks);
    let srt = segments_to_srt(&segments);

    info!("Transcription produced {} segments", segments.len());

    Ok(Transcription {
        text: raw.text.trim().to_string(),
        srt,
        segments,
    })
}

/// Decode a WAV file into mono f32 samples.
fn read_wav_samples(path: &Path) -> Result<(Vec<f32>, u32)> {
    let reader = WavReader::open(path)
        .map_err(|e| VidsumError::Transcription(format!("Failed to open WAV file: {e}")))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => reader
            .into_samples::<i16>()
            .map(|s| s.unwrap_or(0) as f32 / i16::MAX as f32)
            .collect(),
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .map(|s| s.unwrap_or(0.0))
            .collect(),
    };

    let mono = if spec.channels > 1 {
        downmix(&samples, spec.channels as usize)
    } else {
        samples
    };

    Ok((mono, spec.sample_rate))
}

fn downmix(samples: &[f32], channels: usize) -> Vec<f32> {
    samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

/// Map recognition chunks to segments, skipping chunks with no timestamp or
/// no text.
fn chunks_to_segments(chunks: &[RecognizedChunk]) -> Vec<Segment> {
    chunks
        .iter()
        .filter_map(|chunk| {
            let (start, end) = chunk.timestamp?;
            let text = chunk.text.trim();
            if text.is_empty() {
                return None;
            }
            Some(Segment {
                start,
                end,
                text: text.to_string(),
            })
        })
        .collect()
}
