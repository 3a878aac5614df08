use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::topic::Topic;

/// Per-session settings handed to the controller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Topic the session opens with
    pub topic: Topic,

    /// Directory for capture scratch files (removed after each decode)
    pub scratch_dir: PathBuf,

    /// Sample rate the recognizer expects (16kHz)
    pub sample_rate: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            topic: Topic::default(),
            scratch_dir: std::env::temp_dir().join("talkwithme"),
            sample_rate: 16000, // Speech recognition expects 16kHz
        }
    }
}

impl SessionConfig {
    pub fn from_config(config: &crate::Config) -> Self {
        Self {
            topic: config.session.default_topic,
            scratch_dir: config.session.scratch_dir.clone(),
            sample_rate: config.audio.sample_rate,
        }
    }

    pub fn with_topic(mut self, topic: Topic) -> Self {
        self.topic = topic;
        self
    }
}
