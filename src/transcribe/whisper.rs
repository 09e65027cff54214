use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::error::{Result, VidsumError};
use crate::transcribe::{RawTranscription, SpeechRecognizer};

/// Client for a Whisper-style recognition endpoint that accepts raw samples
/// as JSON and returns timestamped chunks.
pub struct WhisperClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct RecognizeRequest<'a> {
    array: &'a [f32],
    sampling_rate: u32,
}

impl WhisperClient {
    pub fn new(endpoint: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.api_key = Some(api_key);
        self
    }
}

#[async_trait]
impl SpeechRecognizer for WhisperClient {
    async fn recognize(&self, samples: &[f32], sample_rate: u32) -> Result<RawTranscription> {
        let request = RecognizeRequest {
            array: samples,
            sampling_rate: sample_rate,
        };

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();
        debug!("ASR service response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail: String = body.trim().chars().take(200).collect();
            return Err(VidsumError::Transcription(format!(
                "ASR service error ({status}): {detail}"
            )));
        }

        let raw: RawTranscription = response.json().await?;
        Ok(raw)
    }

    fn name(&self) -> &'static str {
        "whisper"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognize_request_shape() {
        let request = RecognizeRequest {
            array: &[0.0, 0.5],
            sampling_rate: 16000,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["sampling_rate"], 16000);
        assert_eq!(json["array"].as_array().unwrap().len(), 2);
    }
}
