pub mod coverage;
pub mod importance;

pub use coverage::{even_coverage_windows, match_target_duration};
pub use importance::{filter_important_segments, merge_adjacent};

/// A time interval of the source video selected for retention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipRange {
    pub start: f64,
    pub end: f64,
}

impl ClipRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Tuning knobs for segment selection. The coverage constants are empirical
/// defaults carried over from field use rather than derived values.
#[derive(Debug, Clone)]
pub struct SelectionConfig {
    /// Maximum gap bridged when merging adjacent clips (smart edit).
    pub max_gap: f64,
    /// Segments shorter than this are treated as noise.
    pub min_segment_secs: f64,
    /// Segments at or above this filler-word fraction are discarded.
    pub max_filler_ratio: f64,
    /// Segments with fewer trimmed characters than this are discarded.
    pub min_text_chars: usize,
    /// Length of each even-coverage window.
    pub window_secs: f64,
    /// Seconds of target duration per coverage window.
    pub secs_per_window: f64,
    /// Minimum number of coverage windows.
    pub min_windows: usize,
    /// Seconds of target duration per retained coverage window (list cap).
    pub secs_per_kept_window: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            max_gap: 1.5,
            min_segment_secs: 0.5,
            max_filler_ratio: 0.7,
            min_text_chars: 4,
            window_secs: 8.0,
            secs_per_window: 10.0,
            min_windows: 3,
            secs_per_kept_window: 5.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_range_duration() {
        let range = ClipRange::new(1.5, 4.0);
        assert!((range.duration() - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_default_selection_config() {
        let config = SelectionConfig::default();
        assert_eq!(config.max_gap, 1.5);
        assert_eq!(config.min_segment_secs, 0.5);
        assert_eq!(config.max_filler_ratio, 0.7);
        assert_eq!(config.window_secs, 8.0);
        assert_eq!(config.min_windows, 3);
    }
}
