//! Practice session core
//!
//! This module provides the `SessionController` abstraction that manages:
//! - Topic selection and the persona handed to the reply generator
//! - The conversing/reporting mode machine
//! - One turn at a time: recognition, scoring, reply, synthesis
//! - The end-of-session report, generated once and cached

mod config;
mod controller;
mod error;
mod message;
mod pipeline;
mod report;
mod score;
mod state;
mod stats;
mod topic;

pub use config::SessionConfig;
pub use controller::SessionController;
pub use error::SessionError;
pub use message::{Message, Role};
pub use pipeline::{CompletedTurn, TurnIssue, TurnOutcome, TurnPipeline};
pub use report::{
    average_pronunciation, FeedbackReport, GrammarCorrection, Report, ReportAggregator,
    ReportView, UtteranceScore,
};
pub use score::{ScoreRecord, Tier};
pub use state::{Mode, SessionState};
pub use stats::SessionSnapshot;
pub use topic::{ParseTopicError, Topic};
