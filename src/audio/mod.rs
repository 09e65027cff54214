pub mod duration;
pub mod extract;

pub use duration::{measure_audio_duration, DurationProbe};
pub use extract::extract_wav_16k;
