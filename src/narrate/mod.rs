pub mod summarize;
pub mod tts;

pub use summarize::{summarize_transcript, RemoteSummarizer, TextSummarizer};
pub use tts::{RemoteSynthesizer, SpeechSynthesizer};
