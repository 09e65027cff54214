use thiserror::Error;

#[derive(Error, Debug)]
pub enum VidsumError {
    /// The ffmpeg binary is not on PATH. Kept as its own variant so callers
    /// can attach an installation hint instead of a generic failure message.
    #[error("ffmpeg not found")]
    FfmpegNotFound,

    #[error("{tool} failed: {detail}")]
    ToolFailed { tool: &'static str, detail: String },

    #[error("{tool} timed out after {seconds}s")]
    ToolTimeout { tool: &'static str, seconds: u64 },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    InsufficientContent(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Voice synthesis failed: {0}")]
    Synthesis(String),

    #[error("Download failed: {0}")]
    Download(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, VidsumError>;
