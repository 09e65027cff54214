//! Duration reconciliation: align an assembled video with an independently
//! produced narration track.

use std::path::Path;

use tracing::{debug, info};

use crate::audio::measure_audio_duration;
use crate::error::{Result, VidsumError};
use crate::media::ffmpeg::{os_args, run_ffmpeg, ENCODE_TIMEOUT_SECS};
use crate::media::MediaHandle;

/// Attach a narration track to an assembled video, truncating whichever
/// stream is longer to the other's duration.
///
/// Narration length and selected-clip length are computed independently and
/// rarely match; hard truncation of the start-anchored prefix is
/// deterministic and avoids pitch/speed artifacts, so streams are never
/// stretched or compressed. An unmeasurable narration duration fails the
/// step rather than producing a silent video.
///
/// Consumes the video handle; its temp file is released when this returns.
pub async fn attach_narration(
    video: MediaHandle,
    narration: &Path,
    output: &Path,
) -> Result<f64> {
    let narration_duration = measure_audio_duration(narration);
    if narration_duration <= 0.0 {
        return Err(VidsumError::InsufficientContent(
            "Could not determine narration duration".to_string(),
        ));
    }

    let target = reconciled_duration(video.duration(), narration_duration);
    if target <= 0.0 {
        return Err(VidsumError::InsufficientContent(
            "Assembled video has no duration".to_string(),
        ));
    }

    debug!(
        "Reconciling video {:.2}s with narration {:.2}s -> {:.2}s",
        video.duration(),
        narration_duration,
        target
    );

    let mut args = os_args(["-y", "-v", "error", "-i"]);
    args.push(video.path().into());
    args.push("-i".into());
    args.push(narration.into());
    args.extend(os_args([
        "-map", "0:v:0", "-map", "1:a:0", "-c:v", "libx264", "-pix_fmt", "yuv420p", "-c:a", "aac",
        "-t",
    ]));
    args.push(format!("{target:.3}").into());
    args.push(output.into());

    run_ffmpeg(args, ENCODE_TIMEOUT_SECS).await?;

    info!(
        "Narrated video written to {} ({:.2}s)",
        output.display(),
        target
    );
    Ok(target)
}

/// The common duration both tracks are truncated to.
fn reconciled_duration(video_secs: f64, narration_secs: f64) -> f64 {
    video_secs.min(narration_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_longer_video_truncates_to_narration() {
        assert_eq!(reconciled_duration(12.0, 8.0), 8.0);
    }

    #[test]
    fn test_longer_narration_truncates_to_video() {
        assert_eq!(reconciled_duration(6.0, 8.0), 6.0);
    }

    #[tokio::test]
    async fn test_missing_narration_fails() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"x").unwrap();
        let handle = MediaHandle::new(file.into_temp_path(), 12.0);

        let result = attach_narration(
            handle,
            Path::new("/nonexistent/narration.mp3"),
            Path::new("/tmp/vidsum-test-reconciled.mp4"),
        )
        .await;
        match result {
            Err(VidsumError::InsufficientContent(msg)) => {
                assert!(msg.contains("narration duration"));
            }
            other => panic!("Expected InsufficientContent, got: {other:?}"),
        }
    }
}
