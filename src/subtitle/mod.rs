pub mod srt;

pub use srt::{format_srt_time, segments_to_srt};
