use tracing::{debug, info};

use super::config::SessionConfig;
use super::error::SessionError;
use super::pipeline::{TurnOutcome, TurnPipeline};
use super::report::{ReportAggregator, ReportView};
use super::state::{Mode, SessionState};
use super::stats::SessionSnapshot;
use super::topic::Topic;
use crate::providers::Providers;

/// Owns one practice session and drives it between conversing and reporting
///
/// Every operation takes `&mut self`, so a session can never run two turns
/// at once or read its report while a turn is in flight.
pub struct SessionController {
    state: SessionState,
    pipeline: TurnPipeline,
    aggregator: ReportAggregator,
}

impl SessionController {
    pub fn new(config: SessionConfig, providers: Providers) -> Self {
        info!("Creating practice session on topic: {}", config.topic);

        let pipeline = TurnPipeline::new(
            providers.transcriber,
            providers.replier,
            providers.synthesizer,
            config.scratch_dir,
            config.sample_rate,
        );

        Self {
            state: SessionState::new(config.topic),
            pipeline,
            aggregator: ReportAggregator::new(providers.summarizer),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::from(&self.state)
    }

    /// Switch persona; any change wipes the dialogue, scores and report
    ///
    /// Returns whether the topic actually changed.
    pub fn select_topic(&mut self, topic: Topic) -> bool {
        if topic == self.state.topic {
            debug!("Topic {} already selected", topic);
            return false;
        }

        info!("Switching topic: {} -> {}", self.state.topic, topic);
        self.state.wipe(topic);
        true
    }

    /// Start the current topic over from scratch
    pub fn reset(&mut self) {
        info!("Resetting session on topic: {}", self.state.topic);
        let topic = self.state.topic;
        self.state.wipe(topic);
    }

    /// Returns whether the mode changed.
    pub fn enter_report_mode(&mut self) -> bool {
        if self.state.mode != Mode::Conversing {
            debug!("Already in report mode");
            return false;
        }

        info!(
            "Entering report mode after {} scored turns",
            self.state.scores.len()
        );
        self.state.mode = Mode::Reporting;
        true
    }

    /// Back to conversing; the cached report is dropped and the capture re-armed
    ///
    /// Returns whether the mode changed.
    pub fn exit_report_mode(&mut self) -> bool {
        if self.state.mode != Mode::Reporting {
            debug!("Not in report mode");
            return false;
        }

        info!("Leaving report mode");
        self.state.mode = Mode::Conversing;
        self.state.feedback_report = None;
        self.state.bump_nonce();
        true
    }

    pub async fn process_turn(&mut self, raw_audio: &[u8]) -> Result<TurnOutcome, SessionError> {
        if self.state.mode != Mode::Conversing {
            return Err(SessionError::NotConversing(self.state.mode));
        }

        Ok(self.pipeline.process_turn(&mut self.state, raw_audio).await)
    }

    pub async fn report(&mut self) -> Result<ReportView, SessionError> {
        if self.state.mode != Mode::Reporting {
            return Err(SessionError::NotReporting(self.state.mode));
        }

        Ok(self.aggregator.get_report(&mut self.state).await)
    }
}
