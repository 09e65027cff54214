//! Audio duration measurement with layered fallbacks.
//!
//! Synthesized narration arrives in whatever codec/container the synthesis
//! backend produces, and no single measurement method handles them all. The
//! probes below are tried in order until one reports a positive duration.

use std::path::Path;

use hound::WavReader;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

/// A single strategy for measuring an audio file's duration.
pub trait DurationProbe {
    fn name(&self) -> &'static str;

    /// Attempt to measure, returning `None` when this strategy cannot.
    fn probe(&self, path: &Path) -> Option<f64>;
}

/// WAV frame-count / sample-rate computation.
struct WavHeaderProbe;

impl DurationProbe for WavHeaderProbe {
    fn name(&self) -> &'static str {
        "wav-header"
    }

    fn probe(&self, path: &Path) -> Option<f64> {
        let reader = WavReader::open(path).ok()?;
        let spec = reader.spec();
        if spec.sample_rate == 0 || spec.channels == 0 {
            return None;
        }
        let frames = reader.duration() as f64;
        Some(frames / spec.sample_rate as f64)
    }
}

/// Container-level duration query via ffprobe.
struct FfprobeDurationProbe;

impl DurationProbe for FfprobeDurationProbe {
    fn name(&self) -> &'static str {
        "ffprobe"
    }

    fn probe(&self, path: &Path) -> Option<f64> {
        let output = std::process::Command::new("ffprobe")
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(path)
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }
        String::from_utf8_lossy(&output.stdout).trim().parse().ok()
    }
}

/// Codec metadata reading (frame count and sample rate from the container
/// headers) for compressed formats such as MP3.
struct ContainerMetadataProbe;

impl DurationProbe for ContainerMetadataProbe {
    fn name(&self) -> &'static str {
        "container-metadata"
    }

    fn probe(&self, path: &Path) -> Option<f64> {
        let file = std::fs::File::open(path).ok()?;
        let stream = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                stream,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .ok()?;

        let track = probed.format.default_track()?;
        let frames = track.codec_params.n_frames? as f64;
        let rate = track.codec_params.sample_rate? as f64;
        if rate > 0.0 {
            Some(frames / rate)
        } else {
            None
        }
    }
}

/// Last resort: a rough byte-size estimate assuming ~128kbps, floored at
/// ten seconds.
struct ByteRateEstimate;

const ESTIMATE_BYTES_PER_SEC: f64 = 16000.0;
const ESTIMATE_FLOOR_SECS: f64 = 10.0;

impl DurationProbe for ByteRateEstimate {
    fn name(&self) -> &'static str {
        "byte-rate-estimate"
    }

    fn probe(&self, path: &Path) -> Option<f64> {
        let size = std::fs::metadata(path).ok()?.len();
        Some((size as f64 / ESTIMATE_BYTES_PER_SEC).max(ESTIMATE_FLOOR_SECS))
    }
}

fn probes() -> [&'static dyn DurationProbe; 4] {
    [
        &WavHeaderProbe,
        &FfprobeDurationProbe,
        &ContainerMetadataProbe,
        &ByteRateEstimate,
    ]
}

/// Measure an audio file's duration in seconds, trying each probe in order
/// until one returns a positive value. Returns 0.0 for a missing or empty
/// file.
pub fn measure_audio_duration(path: &Path) -> f64 {
    if !path.is_file() {
        debug!("Audio file not found: {}", path.display());
        return 0.0;
    }
    let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    if size == 0 {
        debug!("Audio file is empty: {}", path.display());
        return 0.0;
    }

    for probe in probes() {
        if let Some(duration) = probe.probe(path) {
            if duration > 0.0 {
                debug!(
                    "Audio duration ({}): {:.2}s for {}",
                    probe.name(),
                    duration,
                    path.display()
                );
                return duration;
            }
        }
    }

    0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{SampleFormat, WavSpec, WavWriter};

    fn write_test_wav(path: &Path, secs: u32) {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec).unwrap();
        for _ in 0..(16000 * secs) {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_wav_probe_computes_duration() {
        let dir = tempfile::tempdir().unwrap();
        let wav = dir.path().join("tone.wav");
        write_test_wav(&wav, 2);

        let duration = WavHeaderProbe.probe(&wav).unwrap();
        assert!((duration - 2.0).abs() < 0.01);
    }

    #[test]
    fn test_measure_missing_file_is_zero() {
        assert_eq!(measure_audio_duration(Path::new("/nonexistent/a.mp3")), 0.0);
    }

    #[test]
    fn test_measure_empty_file_is_zero() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty.mp3");
        std::fs::write(&empty, b"").unwrap();
        assert_eq!(measure_audio_duration(&empty), 0.0);
    }

    #[test]
    fn test_byte_rate_estimate_floors_at_ten_seconds() {
        let dir = tempfile::tempdir().unwrap();
        let small = dir.path().join("tiny.bin");
        std::fs::write(&small, vec![0u8; 1600]).unwrap();

        let estimate = ByteRateEstimate.probe(&small).unwrap();
        assert_eq!(estimate, 10.0);
    }

    #[test]
    fn test_byte_rate_estimate_scales_with_size() {
        let dir = tempfile::tempdir().unwrap();
        let big = dir.path().join("big.bin");
        std::fs::write(&big, vec![0u8; 320_000]).unwrap();

        let estimate = ByteRateEstimate.probe(&big).unwrap();
        assert!((estimate - 20.0).abs() < 0.01);
    }

    #[test]
    fn test_measure_falls_back_to_estimate_for_unknown_format() {
        let dir = tempfile::tempdir().unwrap();
        let opaque = dir.path().join("opaque.dat");
        std::fs::write(&opaque, vec![0u8; 4096]).unwrap();

        // Not a WAV, not probeable; the estimate floor applies.
        assert_eq!(measure_audio_duration(&opaque), 10.0);
    }
}
