//! Abstractive summarization of the transcript for the narration script.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, VidsumError};

/// Input cap sent to the summarization service.
const MAX_INPUT_CHARS: usize = 3000;

/// Excerpt length used when no summary can be produced.
const FALLBACK_EXCERPT_CHARS: usize = 500;

#[async_trait]
pub trait TextSummarizer: Send + Sync {
    async fn summarize(&self, text: &str) -> Result<String>;
}

/// Client for a summarization endpoint (text in, summary text out).
pub struct RemoteSummarizer {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct SummarizeRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct SummarizeResponse {
    summary_text: String,
}

impl RemoteSummarizer {
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
impl TextSummarizer for RemoteSummarizer {
    async fn summarize(&self, text: &str) -> Result<String> {
        let capped: String = text.chars().take(MAX_INPUT_CHARS).collect();
        let mut builder = self
            .client
            .post(&self.endpoint)
            .json(&SummarizeRequest { text: &capped });
        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail: String = body.trim().chars().take(200).collect();
            return Err(VidsumError::InsufficientContent(format!(
                "Summarization service error ({status}): {detail}"
            )));
        }

        let parsed: SummarizeResponse = response.json().await?;
        Ok(parsed.summary_text)
    }
}

/// Produce the narration script for a transcript.
///
/// Uses the summarization service when one is configured and it returns a
/// non-empty summary; otherwise falls back to a leading excerpt of the
/// transcript.
pub async fn summarize_transcript(
    summarizer: Option<&dyn TextSummarizer>,
    transcript: &str,
) -> String {
    if let Some(service) = summarizer {
        match service.summarize(transcript).await {
            Ok(summary) if !summary.trim().is_empty() => return summary,
            Ok(_) => debug!("Summarization service returned an empty summary"),
            Err(e) => warn!("Summarization failed, using transcript excerpt: {e}"),
        }
    }
    excerpt_fallback(transcript)
}

/// A leading excerpt of the transcript, used when no summary is available.
pub fn excerpt_fallback(transcript: &str) -> String {
    if transcript.chars().count() <= FALLBACK_EXCERPT_CHARS {
        return transcript.to_string();
    }
    let mut excerpt: String = transcript.chars().take(FALLBACK_EXCERPT_CHARS).collect();
    excerpt.push_str("...");
    excerpt
}
