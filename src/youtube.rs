//! YouTube input handling: URL/id parsing and source download.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::info;

use crate::error::{Result, VidsumError};
use crate::media::ffmpeg::{os_args, run_tool};

/// Timeout for a source download.
const DOWNLOAD_TIMEOUT_SECS: u64 = 600;

fn url_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:youtube\.com/watch\?v=|youtu\.be/)([a-zA-Z0-9_-]{11})")
            .expect("valid regex")
    })
}

fn bare_id_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z0-9_-]{11}$").expect("valid regex"))
}

/// Extract an 11-character video id from a YouTube URL or bare id string.
pub fn video_id_from_url(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if let Some(captures) = url_pattern().captures(input) {
        return Some(captures[1].to_string());
    }
    if bare_id_pattern().is_match(input) {
        return Some(input.to_string());
    }
    None
}

/// Download a YouTube video into `dest_dir` using yt-dlp. Returns the path
/// of the downloaded file, which lives in the caller's invocation-scoped
/// directory.
pub async fn download_video(url_or_id: &str, dest_dir: &Path) -> Result<PathBuf> {
    let id = video_id_from_url(url_or_id).ok_or_else(|| {
        VidsumError::Download("Invalid YouTube URL or video ID".to_string())
    })?;
    let url = format!("https://www.youtube.com/watch?v={id}");
    let output = dest_dir.join("source_video.mp4");

    info!("Downloading {} to {}", url, output.display());

    let mut args = os_args(["-f", "mp4", "--no-playlist", "-o"]);
    args.push(output.clone().into());
    args.push(url.into());

    run_tool("yt-dlp", args, DOWNLOAD_TIMEOUT_SECS).await?;

    if !output.is_file() {
        return Err(VidsumError::Download(
            "yt-dlp did not produce an output file".to_string(),
        ));
    }
    Ok(output)
}
