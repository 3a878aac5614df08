use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::message::Message;
use super::score::ScoreRecord;
use super::state::{Mode, SessionState};
use super::topic::Topic;

/// Everything the presentation layer needs to draw a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Current topic
    pub topic: Topic,

    /// Human-readable topic name
    pub topic_label: String,

    /// Conversing or reporting
    pub mode: Mode,

    /// Dialogue so far, persona instruction excluded
    pub dialogue: Vec<Message>,

    /// One record per recognized utterance
    pub scores: Vec<ScoreRecord>,

    /// Changes whenever the capture control must be re-armed
    pub turn_nonce: u64,

    /// Whether a feedback report has already been generated
    pub has_feedback: bool,

    /// When the current conversation began
    pub started_at: DateTime<Utc>,
}

impl From<&SessionState> for SessionSnapshot {
    fn from(state: &SessionState) -> Self {
        Self {
            topic: state.topic(),
            topic_label: state.topic().label().to_string(),
            mode: state.mode(),
            dialogue: state.dialogue().to_vec(),
            scores: state.scores().to_vec(),
            turn_nonce: state.turn_nonce(),
            has_feedback: state.feedback_report().is_some(),
            started_at: state.started_at(),
        }
    }
}
