//! Keyframe sampling: decimate a video to one frame per fixed interval and
//! rebuild a lower-cardinality video at the source resolution and rate.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info, warn};

use crate::error::{Result, VidsumError};
use crate::media::probe::probe_video;

/// Minimum plausible size for an input or output video file.
const MIN_FILE_SIZE: u64 = 1024;

/// Transient frame-read failures tolerated before aborting.
const MAX_READ_ERRORS: u32 = 10;

/// Statistics from one sampling run.
#[derive(Debug, Clone)]
pub struct SampleStats {
    pub original_duration: f64,
    pub summarized_duration: f64,
    pub saved_frames: u64,
    pub total_frames: u64,
    pub fps: u32,
}

/// Decimate `input` to one frame every `interval` frames, writing the
/// retained frames in order to `output`.
///
/// Preconditions are checked before any decoding: the input must exist, be
/// at least 1KB, have positive dimensions and a positive frame count. Up to
/// ten transient frame-read failures are tolerated; more abort the run
/// without discarding frames already written. The output must come out at
/// least 1KB or the whole call fails.
pub async fn sample_keyframes(input: &Path, output: &Path, interval: u32) -> Result<SampleStats> {
    if interval == 0 {
        return Err(VidsumError::InvalidInput(
            "Keyframe interval must be greater than 0".to_string(),
        ));
    }
    if !input.exists() {
        return Err(VidsumError::InvalidInput(format!(
            "Input video not found: {}",
            input.display()
        )));
    }

    let file_size = std::fs::metadata(input)?.len();
    if file_size < MIN_FILE_SIZE {
        return Err(VidsumError::InvalidInput(format!(
            "Input video file too small ({file_size} bytes), likely corrupted"
        )));
    }

    let info = probe_video(input).await?;
    if info.width == 0 || info.height == 0 {
        return Err(VidsumError::InvalidInput(format!(
            "Invalid video dimensions: {}x{}",
            info.width, info.height
        )));
    }
    if info.frame_count == 0 {
        return Err(VidsumError::InvalidInput(
            "Video has no frames or is corrupted".to_string(),
        ));
    }

    let fps = if info.fps >= 1.0 { info.fps.round() as u32 } else { 24 };
    let total_frames = info.frame_count;

    info!(
        "Sampling keyframes from {} ({}x{}, {} frames, every {})",
        input.display(),
        info.width,
        info.height,
        total_frames,
        interval
    );

    let job = DecimationJob {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        width: info.width,
        height: info.height,
        fps,
        total_frames,
        interval,
    };
    let saved_frames = tokio::task::spawn_blocking(move || job.run())
        .await
        .map_err(|e| VidsumError::ToolFailed {
            tool: "ffmpeg",
            detail: format!("frame decimation task failed: {e}"),
        })??;

    let output_size = std::fs::metadata(output).map(|m| m.len()).unwrap_or(0);
    if output_size < MIN_FILE_SIZE {
        let _ = std::fs::remove_file(output);
        return Err(VidsumError::ToolFailed {
            tool: "ffmpeg",
            detail: format!("failed to create a valid output video: {}", output.display()),
        });
    }

    let original_duration = total_frames as f64 / fps as f64;
    let summarized_duration = saved_frames as f64 / fps as f64;

    info!(
        "Kept {} of {} frames ({:.1}s -> {:.1}s)",
        saved_frames, total_frames, original_duration, summarized_duration
    );

    Ok(SampleStats {
        original_duration,
        summarized_duration,
        saved_frames,
        total_frames,
        fps,
    })
}

/// One decode/decimate/encode run over a pair of ffmpeg pipes.
struct DecimationJob {
    input: PathBuf,
    output: PathBuf,
    width: u32,
    height: u32,
    fps: u32,
    total_frames: u64,
    interval: u32,
}

enum FrameRead {
    Full,
    Eof,
    Failed,
}

impl DecimationJob {
    fn run(&self) -> Result<u64> {
        let mut decoder = Command::new("ffmpeg")
            .args(["-v", "error", "-i"])
            .arg(&self.input)
            .args(["-f", "rawvideo", "-pix_fmt", "rgb24", "pipe:1"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    VidsumError::FfmpegNotFound
                } else {
                    VidsumError::Io(e)
                }
            })?;

        let size = format!("{}x{}", self.width, self.height);
        let mut encoder = match Command::new("ffmpeg")
            .args(["-y", "-v", "error", "-f", "rawvideo", "-pix_fmt", "rgb24"])
            .args(["-s", &size, "-r", &self.fps.to_string(), "-i", "pipe:0"])
            .args(["-c:v", "mpeg4", "-q:v", "5"])
            .arg(&self.output)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                let _ = decoder.kill();
                let _ = decoder.wait();
                return Err(VidsumError::Io(e));
            }
        };

        let pumped = self.pump(&mut decoder, &mut encoder);

        // The encoder finalizes its container once stdin closes.
        drop(encoder.stdin.take());
        let _ = decoder.kill();
        let _ = decoder.wait();
        let encoder_status = encoder.wait();

        let saved_frames = pumped?;
        match encoder_status {
            Ok(status) if status.success() => Ok(saved_frames),
            Ok(status) => Err(VidsumError::ToolFailed {
                tool: "ffmpeg",
                detail: format!("frame encoder exited with status {status}"),
            }),
            Err(e) => Err(VidsumError::Io(e)),
        }
    }

    fn pump(
        &self,
        decoder: &mut std::process::Child,
        encoder: &mut std::process::Child,
    ) -> Result<u64> {
        let mut reader = decoder.stdout.take().ok_or_else(|| VidsumError::ToolFailed {
            tool: "ffmpeg",
            detail: "decoder stdout not captured".to_string(),
        })?;
        let mut sink = encoder.stdin.take().ok_or_else(|| VidsumError::ToolFailed {
            tool: "ffmpeg",
            detail: "encoder stdin not captured".to_string(),
        })?;

        let frame_size = self.width as usize * self.height as usize * 3;
        let mut frame = vec![0u8; frame_size];
        let mut frame_count: u64 = 0;
        let mut saved_frames: u64 = 0;
        let mut read_errors: u32 = 0;
        let interval = self.interval as u64;

        loop {
            match read_frame(&mut reader, &mut frame) {
                FrameRead::Full => {
                    if frame_count % interval == 0 {
                        sink.write_all(&frame)?;
                        saved_frames += 1;
                    }
                    frame_count += 1;
                }
                FrameRead::Eof => break,
                FrameRead::Failed => {
                    read_errors += 1;
                    if read_errors > MAX_READ_ERRORS {
                        warn!(
                            "Too many read errors ({read_errors}), stopping at frame {frame_count}"
                        );
                        break;
                    }
                    if frame_count >= self.total_frames {
                        break;
                    }
                }
            }
        }

        debug!(
            "Decimation read {} frames, kept {}, {} read errors",
            frame_count, saved_frames, read_errors
        );

        // Close our end so the encoder sees EOF.
        drop(sink);
        Ok(saved_frames)
    }
}

/// Read exactly one frame. A clean end-of-stream at a frame boundary is
/// `Eof`; a short read or IO error is `Failed`.
fn read_frame(reader: &mut impl Read, frame: &mut [u8]) -> FrameRead {
    let mut filled = 0;
    while filled < frame.len() {
        match reader.read(&mut frame[filled..]) {
            Ok(0) => {
                return if filled == 0 {
                    FrameRead::Eof
                } else {
                    FrameRead::Failed
                };
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(_) => return FrameRead::Failed,
        }
    }
    FrameRead::Full
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_frame_full_and_eof() {
        let data = vec![7u8; 12];
        let mut cursor = std::io::Cursor::new(data);
        let mut frame = [0u8; 6];

        assert!(matches!(read_frame(&mut cursor, &mut frame), FrameRead::Full));
        assert!(matches!(read_frame(&mut cursor, &mut frame), FrameRead::Full));
        assert!(matches!(read_frame(&mut cursor, &mut frame), FrameRead::Eof));
    }

    #[test]
    fn test_read_frame_partial_is_failure() {
        let data = vec![7u8; 4];
        let mut cursor = std::io::Cursor::new(data);
        let mut frame = [0u8; 6];
        assert!(matches!(
            read_frame(&mut cursor, &mut frame),
            FrameRead::Failed
        ));
    }

    #[test]
    fn test_retained_frame_arithmetic() {
        // 300 frames at interval 30 keep indices 0, 30, ..., 270.
        let retained = (0u64..300).filter(|i| i % 30 == 0).count();
        assert_eq!(retained, 10);
    }

    #[tokio::test]
    async fn test_sample_rejects_missing_input() {
        let result =
            sample_keyframes(Path::new("/nonexistent/v.mp4"), Path::new("/tmp/o.mp4"), 30).await;
        assert!(matches!(result, Err(VidsumError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_sample_rejects_tiny_input() {
        let dir = tempfile::tempdir().unwrap();
        let tiny = dir.path().join("tiny.mp4");
        std::fs::write(&tiny, b"not a video").unwrap();

        let result = sample_keyframes(&tiny, &dir.path().join("out.mp4"), 30).await;
        match result {
            Err(VidsumError::InvalidInput(msg)) => assert!(msg.contains("too small")),
            other => panic!("Expected InvalidInput, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_sample_rejects_zero_interval() {
        let result = sample_keyframes(Path::new("/tmp/in.mp4"), Path::new("/tmp/out.mp4"), 0).await;
        assert!(matches!(result, Err(VidsumError::InvalidInput(_))));
    }
}
