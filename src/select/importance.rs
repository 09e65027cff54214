//! Importance filtering for the smart-edit path: keep segments that carry
//! meaningful content, drop noise and filler, then merge close neighbours so
//! the cut list does not produce choppy output.

use crate::transcribe::Segment;

use super::{ClipRange, SelectionConfig};

/// Words counted as filler when scoring a segment.
const FILLER_WORDS: &[&str] = &["um", "uh", "like", "you know", "so", "basically", "actually"];

/// Filter transcript segments down to the ranges worth keeping.
///
/// Discards segments shorter than the noise threshold, segments whose
/// filler-word fraction is at or above the cutoff, and segments with
/// effectively no text. Candidates are returned in segment order; no
/// re-sorting happens here.
pub fn filter_important_segments(
    segments: &[Segment],
    config: &SelectionConfig,
) -> Vec<ClipRange> {
    segments
        .iter()
        .filter_map(|seg| {
            let duration = seg.end - seg.start;
            if duration < config.min_segment_secs {
                return None;
            }

            let text = seg.text.trim().to_lowercase();
            let words: Vec<&str> = text.split_whitespace().collect();
            if words.is_empty() {
                return None;
            }

            let filler_count = words.iter().filter(|w| FILLER_WORDS.contains(w)).count();
            let filler_ratio = filler_count as f64 / words.len() as f64;

            if filler_ratio < config.max_filler_ratio
                && text.chars().count() >= config.min_text_chars
            {
                Some(ClipRange::new(seg.start, seg.end))
            } else {
                None
            }
        })
        .collect()
}

/// Merge clips that sit close together.
///
/// Sorts by start time and bridges gaps of at most `max_gap` seconds. The
/// output ranges are non-overlapping and each starts where one of the input
/// ranges started.
pub fn merge_adjacent(ranges: &[ClipRange], max_gap: f64) -> Vec<ClipRange> {
    let mut sorted = ranges.to_vec();
    sorted.sort_by(|a, b| a.start.partial_cmp(&b.start).unwrap_or(std::cmp::Ordering::Equal));

    let mut merged: Vec<ClipRange> = Vec::with_capacity(sorted.len());
    for range in sorted {
        match merged.last_mut() {
            Some(last) if range.start - last.end <= max_gap => {
                last.end = last.end.max(range.end);
            }
            _ => merged.push(range),
        }
    }
    merged
}
