use std::path::Path;

use tracing::{debug, info};

use crate::error::{Result, VidsumError};
use crate::media::ffmpeg::{os_args, run_ffmpeg, EXTRACT_TIMEOUT_SECS};

/// Extract audio from a video/audio file as mono 16-bit PCM at 16kHz,
/// the input format the speech-recognition service expects.
///
/// The caller owns the written file and is responsible for deleting it. On
/// any failure the partially-written output is removed.
pub async fn extract_wav_16k(input: &Path, output: &Path) -> Result<()> {
    if !input.exists() {
        return Err(VidsumError::InvalidInput(format!(
            "Input file not found: {}",
            input.display()
        )));
    }

    info!("Extracting audio from {}", input.display());

    let mut args = os_args(["-y", "-v", "error", "-i"]);
    args.push(input.into());
    args.extend(os_args(["-vn", "-acodec", "pcm_s16le", "-ar", "16000", "-ac", "1"]));
    args.push(output.into());

    if let Err(e) = run_ffmpeg(args, EXTRACT_TIMEOUT_SECS).await {
        let _ = std::fs::remove_file(output);
        return Err(e);
    }

    if !output.exists() {
        return Err(VidsumError::ToolFailed {
            tool: "ffmpeg",
            detail: "output file was not created".to_string(),
        });
    }

    debug!("Audio extracted to {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_extract_missing_input() {
        let result = extract_wav_16k(
            Path::new("/nonexistent/file.mp4"),
            Path::new("/tmp/vidsum-test-out.wav"),
        )
        .await;
        match result {
            Err(VidsumError::InvalidInput(msg)) => assert!(msg.contains("nonexistent")),
            other => panic!("Expected InvalidInput, got: {other:?}"),
        }
    }
}
