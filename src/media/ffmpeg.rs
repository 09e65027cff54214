use std::ffi::OsString;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, VidsumError};

/// Timeout for audio extraction runs.
pub const EXTRACT_TIMEOUT_SECS: u64 = 120;

/// Timeout for re-encoding, assembly and mux runs.
pub const ENCODE_TIMEOUT_SECS: u64 = 300;

/// Timeout for metadata probes.
pub const PROBE_TIMEOUT_SECS: u64 = 30;

/// Check if FFmpeg is installed and accessible.
pub fn check_ffmpeg() -> Result<()> {
    let output = std::process::Command::new("ffmpeg")
        .arg("-version")
        .output()
        .map_err(|_| VidsumError::FfmpegNotFound)?;

    if !output.status.success() {
        return Err(VidsumError::ToolFailed {
            tool: "ffmpeg",
            detail: "version check failed".to_string(),
        });
    }

    debug!("FFmpeg is available");
    Ok(())
}

/// Run an external tool to completion, capturing output.
///
/// A missing `ffmpeg` binary maps to the dedicated sentinel error; any other
/// spawn failure, non-zero exit or timeout surfaces as a tool error with a
/// truncated diagnostic. The child is killed if the timeout fires.
pub async fn run_tool(
    tool: &'static str,
    args: Vec<OsString>,
    timeout_secs: u64,
) -> Result<std::process::Output> {
    debug!(
        "Running {}: {}",
        tool,
        args.iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    );

    let child = Command::new(tool)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                if tool == "ffmpeg" || tool == "ffprobe" {
                    VidsumError::FfmpegNotFound
                } else {
                    VidsumError::ToolFailed {
                        tool,
                        detail: format!("{tool} not found on PATH"),
                    }
                }
            } else {
                VidsumError::Io(e)
            }
        })?;

    let wait = child.wait_with_output();
    let output = match tokio::time::timeout(Duration::from_secs(timeout_secs), wait).await {
        Ok(result) => result?,
        Err(_) => {
            // Dropping the wait future drops the child, which kills it.
            return Err(VidsumError::ToolTimeout {
                tool,
                seconds: timeout_secs,
            });
        }
    };

    if output.status.success() {
        Ok(output)
    } else {
        Err(VidsumError::ToolFailed {
            tool,
            detail: truncate_diagnostic(&output.stderr, &output.stdout, output.status.code()),
        })
    }
}

/// Run ffmpeg with the given arguments and timeout.
pub async fn run_ffmpeg(args: Vec<OsString>, timeout_secs: u64) -> Result<()> {
    run_tool("ffmpeg", args, timeout_secs).await.map(|_| ())
}

/// Build a diagnostic string from captured process output, truncated to 400
/// chars. Prefers stderr, falls back to stdout, then to the exit code.
pub fn truncate_diagnostic(stderr: &[u8], stdout: &[u8], code: Option<i32>) -> String {
    let text = if !stderr.is_empty() {
        String::from_utf8_lossy(stderr)
    } else {
        String::from_utf8_lossy(stdout)
    };
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return match code {
            Some(c) => format!("exited with status {c}"),
            None => "terminated by signal".to_string(),
        };
    }
    trimmed.chars().take(400).collect()
}

/// Convenience for building OsString argument vectors.
pub fn os_args<I, S>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    args.into_iter().map(Into::into).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_diagnostic_prefers_stderr() {
        let detail = truncate_diagnostic(b"boom", b"ignored", Some(1));
        assert_eq!(detail, "boom");
    }

    #[test]
    fn test_truncate_diagnostic_caps_length() {
        let long = vec![b'x'; 1000];
        let detail = truncate_diagnostic(&long, b"", Some(1));
        assert_eq!(detail.chars().count(), 400);
    }

    #[test]
    fn test_truncate_diagnostic_falls_back_to_status() {
        assert_eq!(truncate_diagnostic(b"", b"", Some(2)), "exited with status 2");
        assert_eq!(truncate_diagnostic(b"  ", b"", None), "terminated by signal");
    }

    #[tokio::test]
    async fn test_run_tool_missing_binary() {
        let result = run_tool("vidsum-no-such-tool", vec![], 5).await;
        match result {
            Err(VidsumError::ToolFailed { detail, .. }) => {
                assert!(detail.contains("not found"));
            }
            other => panic!("Expected ToolFailed, got: {other:?}"),
        }
    }
}
