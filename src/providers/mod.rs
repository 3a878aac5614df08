//! External capabilities the practice session depends on
//!
//! The session core only talks to these traits:
//! - `Transcriber`: speech recognition plus unscripted pronunciation assessment
//! - `ReplyGenerator`: next line of dialogue from the full history
//! - `Summarizer`: one feedback report from the dialogue (persona excluded)
//! - `Synthesizer`: reply text to playable audio
//!
//! `azure` holds the REST-backed implementations used by the binary.

pub mod azure;
mod error;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::audio::CapturedAudio;
use crate::session::Message;

pub use error::ProviderError;

/// Texts that mark a transcript as a failure report rather than speech
pub const ERROR_MARKERS: [&str; 4] = ["Error", "System Error", "오류", "시스템 에러"];

/// Recognized text and its pronunciation scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptResult {
    pub text: String,
    pub accuracy: Option<f64>,
    pub fluency: Option<f64>,
    pub pronunciation: Option<f64>,
}

impl TranscriptResult {
    pub fn new(text: impl Into<String>, accuracy: f64, fluency: f64, pronunciation: f64) -> Self {
        Self {
            text: text.into(),
            accuracy: Some(accuracy),
            fluency: Some(fluency),
            pronunciation: Some(pronunciation),
        }
    }

    /// Whether the text is a failure sentinel instead of a transcript
    pub fn is_error(&self) -> bool {
        let text = self.text.trim_start();
        ERROR_MARKERS.iter().any(|marker| text.starts_with(marker))
    }
}

#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Recognize one utterance (mono 16kHz PCM) and assess its pronunciation
    async fn transcribe_and_assess(
        &self,
        audio: &CapturedAudio,
    ) -> Result<TranscriptResult, ProviderError>;
}

#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    /// One chat completion over the ordered history, persona first
    async fn generate_reply(&self, history: &[Message]) -> Result<String, ProviderError>;
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Feedback report (overall assessment and grammar corrections) for the dialogue
    async fn summarize(&self, dialogue: &[Message]) -> Result<String, ProviderError>;
}

#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Spoken audio bytes (WAV) for `text`
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, ProviderError>;
}

/// The four capabilities a session needs, shareable across sessions
#[derive(Clone)]
pub struct Providers {
    pub transcriber: Arc<dyn Transcriber>,
    pub replier: Arc<dyn ReplyGenerator>,
    pub summarizer: Arc<dyn Summarizer>,
    pub synthesizer: Arc<dyn Synthesizer>,
}

impl Providers {
    /// Azure Speech for recognition and voice, Azure OpenAI for dialogue and feedback
    pub fn azure(config: &crate::Config) -> Result<Self, ProviderError> {
        let speech = Arc::new(azure::SpeechClient::new(&config.speech)?);
        let openai = Arc::new(azure::OpenAiClient::new(&config.openai)?);

        Ok(Self {
            transcriber: speech.clone(),
            replier: openai.clone(),
            summarizer: openai,
            synthesizer: speech,
        })
    }
}
