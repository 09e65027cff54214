//! Top-level pipeline operations.
//!
//! Every operation returns a [`PipelineResult`] for all code paths: this is
//! the single place where internal errors are converted into the uniform
//! contract, and where temporary resources are scoped to one invocation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tempfile::TempDir;
use tracing::info;

use crate::config::Config;
use crate::error::{Result, VidsumError};
use crate::media::{
    assemble_clips, attach_narration, probe_video, sample_keyframes, transcode_for_web,
    AudioPolicy, SampleStats,
};
use crate::narrate::{
    summarize_transcript, RemoteSummarizer, RemoteSynthesizer, SpeechSynthesizer, TextSummarizer,
};
use crate::select::{
    even_coverage_windows, filter_important_segments, match_target_duration, merge_adjacent,
    ClipRange, SelectionConfig,
};
use crate::transcribe::{transcribe_media, SharedRecognizer, Transcription};
use crate::youtube;

/// Fixed artifact names, relative to the output directory.
pub const CAPTIONS_FILE: &str = "captions.srt";
pub const KEYFRAME_SUMMARY_FILE: &str = "summary_video.mp4";
pub const SMART_EDIT_FILE: &str = "smart_edit.mp4";
pub const NARRATED_SUMMARY_FILE: &str = "narrated_summary.mp4";

/// Minimum transcript length for smart editing.
const MIN_SMART_EDIT_CHARS: usize = 20;

/// Minimum transcript length for a narrated summary.
const MIN_NARRATION_CHARS: usize = 50;

/// Uniform result of every top-level operation. Exactly one of
/// success-with-artifact or failure-with-error holds.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub success: bool,
    pub artifact: Option<PathBuf>,
    pub descriptive_text: String,
    pub error: Option<String>,
}

impl PipelineResult {
    fn completed(artifact: PathBuf, descriptive_text: String) -> Self {
        Self {
            success: true,
            artifact: Some(artifact),
            descriptive_text,
            error: None,
        }
    }

    fn failed(error: String) -> Self {
        Self {
            success: false,
            artifact: None,
            descriptive_text: String::new(),
            error: Some(error),
        }
    }
}

/// One configured pipeline: the shared recognizer plus the optional
/// narration collaborators and the output directory.
pub struct Pipeline {
    config: Config,
    selection: SelectionConfig,
    recognizer: SharedRecognizer,
    summarizer: Option<Box<dyn TextSummarizer>>,
    synthesizer: Option<Box<dyn SpeechSynthesizer>>,
    output_dir: PathBuf,
    show_progress: bool,
}

impl Pipeline {
    pub fn new(config: Config, output_dir: PathBuf) -> Self {
        let recognizer = SharedRecognizer::new(&config);

        let summarizer = config.summarizer_endpoint.as_ref().map(|endpoint| {
            let mut client = RemoteSummarizer::new(endpoint.clone());
            if let Some(ref key) = config.api_key {
                client = client.with_api_key(key.clone());
            }
            Box::new(client) as Box<dyn TextSummarizer>
        });

        let synthesizer = config.tts_endpoint.as_ref().map(|endpoint| {
            let mut client = RemoteSynthesizer::new(endpoint.clone(), config.tts_voice.clone());
            if let Some(ref key) = config.api_key {
                client = client.with_api_key(key.clone());
            }
            Box::new(client) as Box<dyn SpeechSynthesizer>
        });

        Self {
            config,
            selection: SelectionConfig::default(),
            recognizer,
            summarizer,
            synthesizer,
            output_dir,
            show_progress: true,
        }
    }

    /// Build a pipeline around externally-constructed collaborator services.
    pub fn with_services(
        config: Config,
        output_dir: PathBuf,
        recognizer: SharedRecognizer,
        summarizer: Option<Box<dyn TextSummarizer>>,
        synthesizer: Option<Box<dyn SpeechSynthesizer>>,
    ) -> Self {
        Self {
            config,
            selection: SelectionConfig::default(),
            recognizer,
            summarizer,
            synthesizer,
            output_dir,
            show_progress: false,
        }
    }

    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Transcribe the input and write SRT captions.
    pub async fn caption(&self, input: &str) -> PipelineResult {
        match self.caption_inner(input).await {
            Ok((artifact, text)) => PipelineResult::completed(artifact, text),
            Err(e) => PipelineResult::failed(describe_error(&e)),
        }
    }

    /// Produce the keyframe-reduced summary video.
    pub async fn keyframes(&self, input: &str) -> PipelineResult {
        match self.keyframes_inner(input).await {
            Ok((artifact, text)) => PipelineResult::completed(artifact, text),
            Err(e) => PipelineResult::failed(describe_error(&e)),
        }
    }

    /// Produce the speech-preserving smart edit.
    pub async fn smart_edit(&self, input: &str) -> PipelineResult {
        match self.smart_edit_inner(input).await {
            Ok((artifact, text)) => PipelineResult::completed(artifact, text),
            Err(e) => PipelineResult::failed(describe_error(&e)),
        }
    }

    /// Produce the AI-narrated highlight video.
    pub async fn narrate(&self, input: &str) -> PipelineResult {
        match self.narrate_inner(input).await {
            Ok((artifact, text)) => PipelineResult::completed(artifact, text),
            Err(e) => PipelineResult::failed(describe_error(&e)),
        }
    }

    async fn caption_inner(&self, input: &str) -> Result<(PathBuf, String)> {
        crate::media::ffmpeg::check_ffmpeg()?;
        let work = TempDir::new()?;
        let source = self.resolve_input(input, work.path()).await?;

        let pb = self.stage_spinner("Transcribing...");
        let transcription = transcribe_media(&source, &self.recognizer, work.path()).await?;
        finish_spinner(pb, "Transcription complete");

        let artifact = self.artifact_path(CAPTIONS_FILE)?;
        std::fs::write(&artifact, &transcription.srt)?;
        info!("Captions written to {}", artifact.display());

        Ok((artifact, transcription.text))
    }

    async fn keyframes_inner(&self, input: &str) -> Result<(PathBuf, String)> {
        crate::media::ffmpeg::check_ffmpeg()?;
        let work = TempDir::new()?;
        let source = self.resolve_input(input, work.path()).await?;

        let artifact = self.artifact_path(KEYFRAME_SUMMARY_FILE)?;

        let pb = self.stage_spinner("Sampling keyframes...");
        let stats = sample_keyframes(&source, &artifact, self.config.keyframe_interval).await?;
        finish_spinner(
            pb,
            format!("Kept {} of {} frames", stats.saved_frames, stats.total_frames),
        );

        transcode_for_web(&artifact, AudioPolicy::Strip).await;

        let text = keyframe_summary_text(&stats, self.config.keyframe_interval);
        Ok((artifact, text))
    }

    async fn smart_edit_inner(&self, input: &str) -> Result<(PathBuf, String)> {
        crate::media::ffmpeg::check_ffmpeg()?;
        let work = TempDir::new()?;
        let source = self.resolve_input(input, work.path()).await?;

        let pb = self.stage_spinner("Analyzing video content...");
        let transcription = transcribe_media(&source, &self.recognizer, work.path()).await?;
        finish_spinner(
            pb,
            format!("Found {} speech segments", transcription.segments.len()),
        );

        if transcription.segments.is_empty()
            || transcription.text.trim().chars().count() < MIN_SMART_EDIT_CHARS
        {
            return Err(VidsumError::InsufficientContent(
                "Video has insufficient speech content for smart editing".to_string(),
            ));
        }

        let candidates = filter_important_segments(&transcription.segments, &self.selection);
        if candidates.is_empty() {
            return Err(VidsumError::InsufficientContent(
                "No key segments identified to keep".to_string(),
            ));
        }
        let merged = merge_adjacent(&candidates, self.selection.max_gap);
        info!(
            "Identified {} important segments, merged into {} sections",
            candidates.len(),
            merged.len()
        );

        let source_info = probe_video(&source).await?;

        let pb = self.stage_spinner("Creating edited video...");
        let assembled = assemble_clips(&source, &merged, false, work.path()).await?;
        let edited_duration = assembled.duration();

        let artifact = self.artifact_path(SMART_EDIT_FILE)?;
        assembled.persist(&artifact)?;
        transcode_for_web(&artifact, AudioPolicy::Keep).await;
        finish_spinner(pb, format!("Edited video: {edited_duration:.1}s"));

        let text = smart_edit_summary_text(source_info.duration, edited_duration, merged.len());
        Ok((artifact, text))
    }

    async fn narrate_inner(&self, input: &str) -> Result<(PathBuf, String)> {
        let synthesizer = self.synthesizer.as_deref().ok_or_else(|| {
            VidsumError::Config(
                "TTS endpoint not set. Export it with: export VIDSUM_TTS_ENDPOINT=http://..."
                    .to_string(),
            )
        })?;

        crate::media::ffmpeg::check_ffmpeg()?;
        let work = TempDir::new()?;
        let source = self.resolve_input(input, work.path()).await?;

        let pb = self.stage_spinner("Transcribing...");
        let transcription = transcribe_media(&source, &self.recognizer, work.path()).await?;
        finish_spinner(
            pb,
            format!("Found {} speech segments", transcription.segments.len()),
        );

        if transcription.text.trim().chars().count() < MIN_NARRATION_CHARS {
            return Err(VidsumError::InsufficientContent(
                "Transcript too short or empty. Use a video with clear speech".to_string(),
            ));
        }

        let pb = self.stage_spinner("Generating summary...");
        let script = summarize_transcript(self.summarizer.as_deref(), &transcription.text).await;
        finish_spinner(pb, "Summary ready");

        let narration_path = work.path().join("narration.mp3");
        let pb = self.stage_spinner("Creating voice-over narration...");
        synthesizer.synthesize(&script, &narration_path).await?;
        if !narration_path.is_file() {
            return Err(VidsumError::Synthesis(
                "Audio file was not created. Check your internet connection".to_string(),
            ));
        }
        finish_spinner(pb, "Voice-over ready");

        let narration_duration = crate::audio::measure_audio_duration(&narration_path);
        if narration_duration <= 0.0 {
            return Err(VidsumError::InsufficientContent(
                "Could not determine narration duration".to_string(),
            ));
        }
        info!("Narration duration: {narration_duration:.1}s");

        let source_info = probe_video(&source).await?;
        let ranges = self.select_narration_clips(&transcription, &source_info, narration_duration);
        if ranges.is_empty() {
            return Err(VidsumError::InsufficientContent(
                "No clips selected for the narrated summary".to_string(),
            ));
        }
        info!("Selected {} clips for narration", ranges.len());

        let pb = self.stage_spinner("Creating final video...");
        let assembled = assemble_clips(&source, &ranges, true, work.path()).await?;
        let artifact = self.artifact_path(NARRATED_SUMMARY_FILE)?;
        attach_narration(assembled, &narration_path, &artifact).await?;
        transcode_for_web(&artifact, AudioPolicy::Keep).await;
        finish_spinner(pb, "Narrated summary complete");

        Ok((artifact, script))
    }

    /// Pick clip ranges to cover the narration: segment-derived greedy
    /// matching when segments exist, even-coverage sampling otherwise.
    fn select_narration_clips(
        &self,
        transcription: &Transcription,
        source_info: &crate::media::VideoInfo,
        target_duration: f64,
    ) -> Vec<ClipRange> {
        if transcription.segments.is_empty() {
            return even_coverage_windows(source_info.duration, target_duration, &self.selection);
        }
        let ranges: Vec<ClipRange> = transcription
            .segments
            .iter()
            .filter(|s| s.end > s.start)
            .map(|s| ClipRange::new(s.start, s.end))
            .collect();
        match_target_duration(&ranges, target_duration, source_info.duration)
    }

    /// Resolve an input argument to a local file, downloading YouTube inputs
    /// into the invocation work directory.
    async fn resolve_input(&self, input: &str, work_dir: &Path) -> Result<PathBuf> {
        let path = Path::new(input);
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        if youtube::video_id_from_url(input).is_some() {
            let pb = self.stage_spinner("Downloading source video...");
            let downloaded = youtube::download_video(input, work_dir).await?;
            finish_spinner(pb, "Download complete");
            return Ok(downloaded);
        }
        Err(VidsumError::InvalidInput(format!(
            "Input file not found: {input}"
        )))
    }

    fn artifact_path(&self, name: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;
        Ok(self.output_dir.join(name))
    }

    fn stage_spinner(&self, message: &'static str) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    }
}

fn finish_spinner(pb: Option<ProgressBar>, message: impl Into<String>) {
    if let Some(pb) = pb {
        pb.finish_with_message(format!("✓ {}", message.into()));
    }
}

/// Convert an internal error into the user-facing message, attaching
/// remediation hints for the actionable cases.
fn describe_error(error: &VidsumError) -> String {
    match error {
        VidsumError::FfmpegNotFound => {
            "ffmpeg not found. Install it with: brew install ffmpeg (macOS) or \
             apt install ffmpeg (Linux)"
                .to_string()
        }
        VidsumError::Synthesis(msg) => {
            format!("Voice-over generation failed: {msg}. The synthesis service requires internet access")
        }
        other => other.to_string(),
    }
}

fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let mins = total / 60;
    let secs = total % 60;
    if mins > 0 {
        format!("{mins}m {secs}s")
    } else {
        format!("{secs}s")
    }
}

fn keyframe_summary_text(stats: &SampleStats, interval: u32) -> String {
    let reduction = if stats.original_duration > 0.0 {
        (stats.original_duration - stats.summarized_duration) / stats.original_duration * 100.0
    } else {
        0.0
    };
    format!(
        "Video summary statistics:\n\n\
         - Original duration: {} ({} frames)\n\
         - Summary duration: {} ({} keyframes)\n\
         - Reduction: {reduction:.1}% shorter\n\n\
         Key-frame extraction every {interval} frames preserves important visual \
         moments while reducing video length.",
        format_duration(stats.original_duration),
        stats.total_frames,
        format_duration(stats.summarized_duration),
        stats.saved_frames,
    )
}

fn smart_edit_summary_text(original: f64, edited: f64, sections: usize) -> String {
    let reduction = if original > 0.0 {
        (1.0 - edited / original) * 100.0
    } else {
        0.0
    };
    format!(
        "Smart edit complete.\n\n\
         Original duration: {original:.1} seconds\n\
         Edited duration: {edited:.1} seconds\n\
         Reduction: {reduction:.1}% shorter\n\n\
         Pauses, filler words and less important content were removed while \
         preserving the speaker's original voice.\n\n\
         Key segments kept: {sections}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_invariant() {
        let ok = PipelineResult::completed(PathBuf::from("out.mp4"), "done".to_string());
        assert!(ok.success && ok.artifact.is_some() && ok.error.is_none());

        let err = PipelineResult::failed("boom".to_string());
        assert!(!err.success && err.artifact.is_none());
        assert!(!err.error.as_deref().unwrap_or("").is_empty());
    }

    #[test]
    fn test_describe_error_ffmpeg_hint() {
        let msg = describe_error(&VidsumError::FfmpegNotFound);
        assert!(msg.contains("apt install ffmpeg"));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(42.7), "42s");
        assert_eq!(format_duration(90.0), "1m 30s");
        assert_eq!(format_duration(0.0), "0s");
    }

    #[test]
    fn test_keyframe_summary_text() {
        let stats = SampleStats {
            original_duration: 12.5,
            summarized_duration: 0.4,
            saved_frames: 10,
            total_frames: 300,
            fps: 24,
        };
        let text = keyframe_summary_text(&stats, 30);
        assert!(text.contains("300 frames"));
        assert!(text.contains("10 keyframes"));
        assert!(text.contains("every 30 frames"));
        assert!(text.contains("96.8% shorter"));
    }

    #[test]
    fn test_smart_edit_summary_text() {
        let text = smart_edit_summary_text(100.0, 40.0, 7);
        assert!(text.contains("100.0 seconds"));
        assert!(text.contains("60.0% shorter"));
        assert!(text.contains("Key segments kept: 7"));
    }

    #[tokio::test]
    async fn test_missing_input_fails_uniformly() {
        let pipeline = Pipeline::new(Config::default(), PathBuf::from("output"))
            .show_progress(false);
        let result = pipeline.caption("/nonexistent/video.mp4").await;
        assert!(!result.success);
        assert!(result.artifact.is_none());

        // Without ffmpeg installed the precheck fails first; either way the
        // failure is reported through the uniform contract.
        let error = result.error.as_deref().unwrap_or("");
        assert!(error.contains("Input file not found") || error.contains("ffmpeg not found"));
    }

    #[tokio::test]
    async fn test_narrate_requires_tts_configuration() {
        let pipeline = Pipeline::new(Config::default(), PathBuf::from("output"))
            .show_progress(false);
        let result = pipeline.narrate("/nonexistent/video.mp4").await;
        assert!(!result.success);
        assert!(result.error.as_deref().unwrap_or("").contains("TTS endpoint"));
    }
}
