//! Clip selection for the narrated-summary path: greedy target matching when
//! transcript segments exist, evenly-spread sampling windows when they do
//! not.

use super::{ClipRange, SelectionConfig};

/// Partition the source into evenly-spread windows approximating the target
/// duration. Used when no transcript segments are available.
///
/// Window count is `max(min_windows, target / secs_per_window)`; each window
/// runs `window_secs` from its interval start, clipped to the source end.
/// When the summed window length falls short of the target, every window is
/// scaled up proportionally (still clipped to the source end). The list is
/// then capped at `target / secs_per_kept_window` entries.
pub fn even_coverage_windows(
    source_duration: f64,
    target_duration: f64,
    config: &SelectionConfig,
) -> Vec<ClipRange> {
    if source_duration <= 0.0 || target_duration <= 0.0 {
        return Vec::new();
    }

    let num_windows = ((target_duration / config.secs_per_window) as usize).max(config.min_windows);
    let interval = source_duration / num_windows as f64;

    let mut windows: Vec<ClipRange> = (0..num_windows)
        .map(|i| {
            let start = i as f64 * interval;
            ClipRange::new(start, (start + config.window_secs).min(source_duration))
        })
        .collect();

    let total: f64 = windows.iter().map(|w| w.duration()).sum();
    if total > 0.0 && total < target_duration {
        let factor = target_duration / total;
        for window in &mut windows {
            window.end = (window.start + window.duration() * factor).min(source_duration);
        }
    }

    windows.truncate((target_duration / config.secs_per_kept_window) as usize);
    windows
}

/// Greedily accumulate segment-derived ranges up to the target duration.
///
/// Ranges are taken in start order; when the next full range would overshoot
/// the target, a partial prefix sized to land exactly on it is appended and
/// selection stops. When nothing can be selected the whole-video prefix
/// `(0, min(target, source))` is returned.
pub fn match_target_duration(
    ranges: &[ClipRange],
    target_duration: f64,
    source_duration: f64,
) -> Vec<ClipRange> {
    let mut sorted = ranges.to_vec();
    sorted.sort_by(|a, b| a.start.partial_cmp(&b.start).unwrap_or(std::cmp::Ordering::Equal));

    let mut selected = Vec::new();
    let mut total = 0.0;

    for range in sorted {
        let duration = range.duration();
        if total + duration <= target_duration {
            selected.push(range);
            total += duration;
        } else if total < target_duration {
            let remaining = target_duration - total;
            selected.push(ClipRange::new(range.start, range.start + remaining));
            break;
        } else {
            break;
        }
    }

    if selected.is_empty() {
        vec![ClipRange::new(0.0, target_duration.min(source_duration))]
    } else {
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total(ranges: &[ClipRange]) -> f64 {
        ranges.iter().map(|r| r.duration()).sum()
    }

    #[test]
    fn test_coverage_window_count_formula() {
        let config = SelectionConfig::default();

        // 15s target: 15/10 = 1, floored to the 3-window minimum.
        let windows = even_coverage_windows(90.0, 15.0, &config);
        assert_eq!(windows.len(), 3);

        // 60s target: 60/10 = 6 windows, capped at 60/5 = 12 (no-op).
        let windows = even_coverage_windows(300.0, 60.0, &config);
        assert_eq!(windows.len(), 6);
    }

    #[test]
    fn test_coverage_windows_are_window_secs_long() {
        let config = SelectionConfig::default();
        let windows = even_coverage_windows(90.0, 15.0, &config);
        for window in &windows {
            assert!((window.duration() - config.window_secs).abs() < 1e-9);
        }
    }

    #[test]
    fn test_coverage_clips_to_source_end() {
        let config = SelectionConfig::default();
        let windows = even_coverage_windows(20.0, 15.0, &config);
        for window in &windows {
            assert!(window.end <= 20.0);
        }
    }

    #[test]
    fn test_coverage_scales_up_when_short_of_target() {
        let mut config = SelectionConfig::default();
        config.window_secs = 2.0;

        // 3 windows x 2s = 6s < 30s target: each window scales by 5, clipped
        // to the source end.
        let windows = even_coverage_windows(300.0, 30.0, &config);
        assert_eq!(windows.len(), 3);
        for window in &windows {
            assert!((window.duration() - 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_coverage_cap_truncates_list() {
        let config = SelectionConfig::default();
        // 12s target: 3 windows built, capped at 12/5 = 2 entries.
        let windows = even_coverage_windows(90.0, 12.0, &config);
        assert_eq!(windows.len(), 2);
    }

    #[test]
    fn test_coverage_empty_inputs() {
        let config = SelectionConfig::default();
        assert!(even_coverage_windows(0.0, 15.0, &config).is_empty());
        assert!(even_coverage_windows(90.0, 0.0, &config).is_empty());
    }

    #[test]
    fn test_target_matching_accumulates_in_start_order() {
        let ranges = vec![
            ClipRange::new(10.0, 14.0),
            ClipRange::new(0.0, 4.0),
            ClipRange::new(20.0, 24.0),
        ];
        let selected = match_target_duration(&ranges, 8.0, 100.0);
        assert_eq!(
            selected,
            vec![ClipRange::new(0.0, 4.0), ClipRange::new(10.0, 14.0)]
        );
    }

    #[test]
    fn test_target_matching_appends_partial_prefix() {
        let ranges = vec![ClipRange::new(0.0, 4.0), ClipRange::new(10.0, 20.0)];
        let selected = match_target_duration(&ranges, 7.0, 100.0);
        assert_eq!(
            selected,
            vec![ClipRange::new(0.0, 4.0), ClipRange::new(10.0, 13.0)]
        );
        assert!((total(&selected) - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_target_matching_never_exceeds_target() {
        let ranges = vec![
            ClipRange::new(0.0, 3.0),
            ClipRange::new(5.0, 9.0),
            ClipRange::new(12.0, 18.0),
            ClipRange::new(20.0, 21.0),
        ];
        for target in [1.0, 4.0, 7.5, 11.0, 30.0] {
            let selected = match_target_duration(&ranges, target, 100.0);
            assert!(
                total(&selected) <= target + 1e-9,
                "target {target}: total {} exceeds",
                total(&selected)
            );
        }
    }

    #[test]
    fn test_target_matching_fallback_when_empty() {
        let selected = match_target_duration(&[], 15.0, 9.0);
        assert_eq!(selected, vec![ClipRange::new(0.0, 9.0)]);

        let selected = match_target_duration(&[], 15.0, 60.0);
        assert_eq!(selected, vec![ClipRange::new(0.0, 15.0)]);
    }
}
