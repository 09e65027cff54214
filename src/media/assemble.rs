//! Clip assembly: cut the selected ranges out of one source and concatenate
//! them into a single stream.

use std::path::Path;

use tracing::{debug, info};

use crate::error::{Result, VidsumError};
use crate::media::ffmpeg::{os_args, run_ffmpeg, ENCODE_TIMEOUT_SECS};
use crate::media::probe::probe_video;
use crate::media::MediaHandle;
use crate::select::ClipRange;

/// Assemble the given ranges of a source video into one continuous stream.
///
/// The source is opened exactly once: a single ffmpeg invocation with one
/// input feeds every sub-range through a trim/concat filter graph. With
/// `strip_audio` the output carries no audio track, for the case where a
/// replacement narration track is attached afterwards; without it the
/// original audio of each range is kept.
///
/// The returned handle owns the assembled temp file; dropping it releases
/// the file on success and failure paths alike.
pub async fn assemble_clips(
    video: &Path,
    ranges: &[ClipRange],
    strip_audio: bool,
    work_dir: &Path,
) -> Result<MediaHandle> {
    if ranges.is_empty() {
        return Err(VidsumError::InvalidInput(
            "No clip ranges to assemble".to_string(),
        ));
    }

    info!(
        "Assembling {} clips from {} (strip_audio: {})",
        ranges.len(),
        video.display(),
        strip_audio
    );

    let output = tempfile::Builder::new()
        .prefix("assembled_")
        .suffix(".mp4")
        .tempfile_in(work_dir)?
        .into_temp_path();

    let filter = build_concat_filter(ranges, strip_audio);
    debug!("Concat filter: {}", filter);

    let mut args = os_args(["-y", "-v", "error", "-i"]);
    args.push(video.into());
    args.extend(os_args(["-filter_complex", filter.as_str()]));
    args.extend(os_args(["-map", "[outv]"]));
    if strip_audio {
        args.push("-an".into());
    } else {
        args.extend(os_args(["-map", "[outa]"]));
    }
    args.extend(os_args(["-c:v", "libx264", "-pix_fmt", "yuv420p"]));
    if !strip_audio {
        args.extend(os_args(["-c:a", "aac"]));
    }
    args.push(output.to_path_buf().into());

    run_ffmpeg(args, ENCODE_TIMEOUT_SECS).await?;

    let info = probe_video(&output).await?;
    debug!("Assembled stream duration: {:.2}s", info.duration);

    Ok(MediaHandle::new(output, info.duration))
}

/// Build the trim/concat filter graph for the given ranges.
fn build_concat_filter(ranges: &[ClipRange], strip_audio: bool) -> String {
    let mut chains = Vec::with_capacity(ranges.len() * 2 + 1);
    let mut concat_inputs = String::new();

    for (i, range) in ranges.iter().enumerate() {
        chains.push(format!(
            "[0:v]trim=start={:.3}:end={:.3},setpts=PTS-STARTPTS[v{i}]",
            range.start, range.end
        ));
        if strip_audio {
            concat_inputs.push_str(&format!("[v{i}]"));
        } else {
            chains.push(format!(
                "[0:a]atrim=start={:.3}:end={:.3},asetpts=PTS-STARTPTS[a{i}]",
                range.start, range.end
            ));
            concat_inputs.push_str(&format!("[v{i}][a{i}]"));
        }
    }

    let (audio_streams, outputs) = if strip_audio {
        (0, "[outv]".to_string())
    } else {
        (1, "[outv][outa]".to_string())
    };

    chains.push(format!(
        "{}concat=n={}:v=1:a={}{}",
        concat_inputs,
        ranges.len(),
        audio_streams,
        outputs
    ));

    chains.join(";")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_single_range_video_only() {
        let filter = build_concat_filter(&[ClipRange::new(1.0, 3.5)], true);
        assert_eq!(
            filter,
            "[0:v]trim=start=1.000:end=3.500,setpts=PTS-STARTPTS[v0];\
             [v0]concat=n=1:v=1:a=0[outv]"
        );
    }

    #[test]
    fn test_filter_two_ranges_with_audio() {
        let ranges = vec![ClipRange::new(0.0, 2.0), ClipRange::new(5.0, 7.0)];
        let filter = build_concat_filter(&ranges, false);
        assert!(filter.contains("[0:v]trim=start=0.000:end=2.000,setpts=PTS-STARTPTS[v0]"));
        assert!(filter.contains("[0:a]atrim=start=5.000:end=7.000,asetpts=PTS-STARTPTS[a1]"));
        assert!(filter.ends_with("[v0][a0][v1][a1]concat=n=2:v=1:a=1[outv][outa]"));
    }

    #[tokio::test]
    async fn test_assemble_rejects_empty_ranges() {
        let dir = tempfile::tempdir().unwrap();
        let result = assemble_clips(Path::new("in.mp4"), &[], false, dir.path()).await;
        assert!(matches!(result, Err(VidsumError::InvalidInput(_))));
    }
}
