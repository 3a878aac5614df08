use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;

use crate::session::Topic;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub audio: AudioConfig,
    pub openai: OpenAiConfig,
    pub speech: SpeechConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    /// Topic new sessions start with when none is requested
    #[serde(default)]
    pub default_topic: Topic,
    /// Where capture scratch files are written while a turn is decoded
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: PathBuf,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            default_topic: Topic::default(),
            scratch_dir: default_scratch_dir(),
        }
    }
}

fn default_scratch_dir() -> PathBuf {
    std::env::temp_dir().join("talkwithme")
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    /// Rate captures are resampled to before recognition; captures are always down-mixed to mono
    pub sample_rate: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000, // Speech recognition expects 16kHz
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    pub endpoint: String,
    pub api_key: String,
    pub api_version: String,
    pub deployment: String,
    #[serde(default = "default_feedback_temperature")]
    pub feedback_temperature: f32,
    /// Language the tutor writes the end-of-session feedback in
    #[serde(default = "default_feedback_language")]
    pub feedback_language: String,
}

fn default_feedback_language() -> String {
    "Korean".to_string()
}

fn default_feedback_temperature() -> f32 {
    0.7
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpeechConfig {
    pub key: String,
    pub region: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_voice")]
    pub voice: String,
}

fn default_language() -> String {
    "en-US".to_string()
}

fn default_voice() -> String {
    "en-US-JennyNeural".to_string()
}

impl Config {
    /// Load settings from `path` (extension optional), then let
    /// `TALKWITHME__SECTION__KEY` environment variables override them.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("TALKWITHME").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
