//! In-place re-encoding to a browser-safe codec/container.

use std::path::Path;

use tracing::{debug, warn};

use crate::media::ffmpeg::{os_args, run_ffmpeg, ENCODE_TIMEOUT_SECS};

/// What to do with the audio track during re-encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioPolicy {
    /// Drop the audio track. Used for keyframe-sampler output, which never
    /// carries meaningful audio.
    Strip,
    /// Re-encode the audio track as AAC.
    Keep,
}

/// Re-encode `path` in place to H.264/yuv420p with faststart metadata so it
/// plays in browsers.
///
/// The transcode target is a sibling temp file, swapped in only on success;
/// any failure leaves the original untouched so the caller still has a
/// usable, if less compatible, artifact. Returns whether the swap happened.
pub async fn transcode_for_web(path: &Path, audio: AudioPolicy) -> bool {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let target = match tempfile::Builder::new()
        .prefix("webenc_")
        .suffix(".mp4")
        .tempfile_in(dir)
    {
        Ok(file) => file.into_temp_path(),
        Err(e) => {
            warn!("Web transcode skipped, cannot create temp file: {e}");
            return false;
        }
    };

    let mut args = os_args(["-y", "-v", "error", "-i"]);
    args.push(path.into());
    args.extend(os_args([
        "-c:v",
        "libx264",
        "-pix_fmt",
        "yuv420p",
        "-movflags",
        "+faststart",
    ]));
    match audio {
        AudioPolicy::Strip => args.push("-an".into()),
        AudioPolicy::Keep => args.extend(os_args(["-c:a", "aac"])),
    }
    args.push(target.to_path_buf().into());

    match run_ffmpeg(args, ENCODE_TIMEOUT_SECS).await {
        Ok(()) => match target.persist(path) {
            Ok(_) => {
                debug!("Re-encoded {} for web playback", path.display());
                true
            }
            Err(e) => {
                warn!("Web transcode swap failed, keeping original: {}", e.error);
                false
            }
        },
        Err(e) => {
            warn!("Web transcode failed, keeping original: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_failed_transcode_leaves_original_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not_really_video.mp4");
        std::fs::write(&path, b"garbage that ffmpeg rejects").unwrap();

        let swapped = transcode_for_web(&path, AudioPolicy::Strip).await;
        assert!(!swapped);
        assert_eq!(
            std::fs::read(&path).unwrap(),
            b"garbage that ffmpeg rejects"
        );
    }
}
