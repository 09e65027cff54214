//! Voice synthesis for the narration track.

use std::path::Path;

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, VidsumError};

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` into an audio file at `output`. Runs to
    /// completion; no cancellation is exposed once started.
    async fn synthesize(&self, text: &str, output: &Path) -> Result<()>;
}

/// Client for a TTS endpoint returning base64-encoded audio content.
pub struct RemoteSynthesizer {
    client: reqwest::Client,
    endpoint: String,
    voice: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    voice: &'a str,
}

#[derive(Deserialize)]
struct SynthesisResponse {
    audio_content: String,
}

impl RemoteSynthesizer {
    pub fn new(endpoint: String, voice: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            voice,
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.api_key = Some(api_key);
        self
    }
}

#[async_trait]
impl SpeechSynthesizer for RemoteSynthesizer {
    async fn synthesize(&self, text: &str, output: &Path) -> Result<()> {
        info!(
            "Synthesizing narration ({} chars, voice {})",
            text.chars().count(),
            self.voice
        );

        let request = SynthesisRequest {
            text,
            voice: &self.voice,
        };
        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail: String = body.trim().chars().take(200).collect();
            return Err(VidsumError::Synthesis(format!(
                "TTS service error ({status}): {detail}"
            )));
        }

        let parsed: SynthesisResponse = response.json().await?;
        let audio = base64::engine::general_purpose::STANDARD
            .decode(parsed.audio_content.as_bytes())
            .map_err(|e| VidsumError::Synthesis(format!("invalid audio payload: {e}")))?;

        if audio.is_empty() {
            return Err(VidsumError::Synthesis(
                "service returned empty audio".to_string(),
            ));
        }

        tokio::fs::write(output, &audio).await?;
        debug!(
            "Narration audio written to {} ({} bytes)",
            output.display(),
            audio.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesis_request_shape() {
        let request = SynthesisRequest {
            text: "hello",
            voice: "en-US-GuyNeural",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["text"], "hello");
        assert_eq!(json["voice"], "en-US-GuyNeural");
    }

    #[test]
    fn test_synthesis_response_parses() {
        let parsed: SynthesisResponse =
            serde_json::from_str(r#"{"audio_content": "aGVsbG8="}"#).unwrap();
        let audio = base64::engine::general_purpose::STANDARD
            .decode(parsed.audio_content.as_bytes())
            .unwrap();
        assert_eq!(audio, b"hello");
    }
}
