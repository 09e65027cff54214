use crate::error::{Result, VidsumError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_asr_endpoint() -> String {
    "http://127.0.0.1:9000/asr".to_string()
}

fn default_tts_voice() -> String {
    "en-US-GuyNeural".to_string()
}

fn default_keyframe_interval() -> u32 {
    30
}

/// Service endpoints and tuning knobs, loaded from
/// `~/.config/vidsum/config.toml` and overridden by `VIDSUM_*` environment
/// variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Speech-recognition inference endpoint. Accepts raw samples as JSON.
    #[serde(default = "default_asr_endpoint")]
    pub asr_endpoint: String,

    /// Abstractive summarization endpoint. When unset the narrated-summary
    /// path falls back to a leading excerpt of the transcript.
    #[serde(default)]
    pub summarizer_endpoint: Option<String>,

    /// Text-to-speech endpoint. Required for the narrated-summary path.
    #[serde(default)]
    pub tts_endpoint: Option<String>,

    /// Voice preset passed to the synthesis service.
    #[serde(default = "default_tts_voice")]
    pub tts_voice: String,

    /// Bearer token sent to all inference services when set.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Keyframe decimation interval (retain one frame every N).
    #[serde(default = "default_keyframe_interval")]
    pub keyframe_interval: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            asr_endpoint: default_asr_endpoint(),
            summarizer_endpoint: None,
            tts_endpoint: None,
            tts_voice: default_tts_voice(),
            api_key: None,
            keyframe_interval: default_keyframe_interval(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        // Load from config file if it exists
        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                let contents = std::fs::read_to_string(&config_path)?;
                if let Ok(file_config) = toml::from_str::<Config>(&contents) {
                    config = file_config;
                }
            }
        }

        // Override with environment variables
        if let Ok(endpoint) = std::env::var("VIDSUM_ASR_ENDPOINT") {
            config.asr_endpoint = endpoint;
        }
        if let Ok(endpoint) = std::env::var("VIDSUM_SUMMARIZER_ENDPOINT") {
            config.summarizer_endpoint = Some(endpoint);
        }
        if let Ok(endpoint) = std::env::var("VIDSUM_TTS_ENDPOINT") {
            config.tts_endpoint = Some(endpoint);
        }
        if let Ok(voice) = std::env::var("VIDSUM_TTS_VOICE") {
            config.tts_voice = voice;
        }
        if let Ok(key) = std::env::var("VIDSUM_API_KEY") {
            config.api_key = Some(key);
        }
        if let Ok(interval) = std::env::var("VIDSUM_KEYFRAME_INTERVAL") {
            if let Ok(i) = interval.parse() {
                config.keyframe_interval = i;
            }
        }

        Ok(config)
    }

    /// Check the settings a narrated summary needs before any expensive work.
    pub fn validate_for_narration(&self) -> Result<()> {
        if self.tts_endpoint.is_none() {
            return Err(VidsumError::Config(
                "TTS endpoint not set. Export it with: export VIDSUM_TTS_ENDPOINT=http://..."
                    .to_string(),
            ));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.asr_endpoint.is_empty() {
            return Err(VidsumError::Config(
                "ASR endpoint must not be empty".to_string(),
            ));
        }
        if self.keyframe_interval == 0 {
            return Err(VidsumError::Config(
                "Keyframe interval must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("vidsum").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.asr_endpoint, "http://127.0.0.1:9000/asr");
        assert_eq!(config.tts_voice, "en-US-GuyNeural");
        assert_eq!(config.keyframe_interval, 30);
        assert!(config.tts_endpoint.is_none());
    }

    #[test]
    fn test_validate_narration_requires_tts() {
        let mut config = Config::default();
        assert!(config.validate_for_narration().is_err());

        config.tts_endpoint = Some("http://localhost:5500/api/tts".to_string());
        assert!(config.validate_for_narration().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let mut config = Config::default();
        config.keyframe_interval = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_roundtrip_toml() {
        let config = Config::default();
        let serialized = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.asr_endpoint, config.asr_endpoint);
        assert_eq!(parsed.keyframe_interval, config.keyframe_interval);
    }
}
