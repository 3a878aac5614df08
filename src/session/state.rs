use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::message::{Message, Role};
use super::report::FeedbackReport;
use super::score::ScoreRecord;
use super::topic::Topic;

/// Which view the session is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Conversing,
    Reporting,
}

/// Everything one practice session knows about itself
///
/// Owned by a single `SessionController`; the pipeline and the report
/// aggregator only see it by reference for the duration of a call.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub(crate) topic: Topic,
    pub(crate) messages: Vec<Message>,
    pub(crate) scores: Vec<ScoreRecord>,
    pub(crate) mode: Mode,
    pub(crate) feedback_report: Option<FeedbackReport>,
    pub(crate) turn_nonce: u64,
    pub(crate) started_at: DateTime<Utc>,
}

impl SessionState {
    /// Fresh state seeded with the topic's persona message
    pub fn new(topic: Topic) -> Self {
        Self {
            topic,
            messages: vec![topic.persona_message()],
            scores: Vec::new(),
            mode: Mode::Conversing,
            feedback_report: None,
            turn_nonce: 0,
            started_at: Utc::now(),
        }
    }

    /// Discard dialogue, scores and the cached report, and start over on `topic`
    pub(crate) fn wipe(&mut self, topic: Topic) {
        self.topic = topic;
        self.messages = vec![topic.persona_message()];
        self.scores.clear();
        self.mode = Mode::Conversing;
        self.feedback_report = None;
        self.turn_nonce += 1;
        self.started_at = Utc::now();
    }

    pub(crate) fn bump_nonce(&mut self) {
        self.turn_nonce += 1;
    }

    pub fn topic(&self) -> Topic {
        self.topic
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Dialogue without the leading persona instruction
    pub fn dialogue(&self) -> &[Message] {
        match self.messages.first() {
            Some(first) if first.role == Role::System => &self.messages[1..],
            _ => &self.messages,
        }
    }

    pub fn scores(&self) -> &[ScoreRecord] {
        &self.scores
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn feedback_report(&self) -> Option<&FeedbackReport> {
        self.feedback_report.as_ref()
    }

    pub fn turn_nonce(&self) -> u64 {
        self.turn_nonce
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn user_message_count(&self) -> usize {
        self.messages.iter().filter(|m| m.role == Role::User).count()
    }
}
