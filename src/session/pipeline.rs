use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::message::Message;
use super::score::{ScoreRecord, Tier};
use super::state::SessionState;
use crate::audio::decode_capture;
use crate::providers::{ReplyGenerator, Synthesizer, Transcriber};

/// Something that went wrong during a turn, as reported to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnIssue {
    /// Nothing was recorded; the user should try again
    TranscriptionFailed,
    /// The turn completed but the reply is an error message
    ReplyGenerationDegraded,
    /// The turn completed without reply audio
    SynthesisUnavailable,
}

/// A turn that made it through recognition
#[derive(Debug, Clone)]
pub struct CompletedTurn {
    pub user_text: String,
    pub score: ScoreRecord,
    pub tier: Tier,
    pub reply: String,
    pub reply_audio: Option<Vec<u8>>,
    pub issues: Vec<TurnIssue>,
    pub turn_nonce: u64,
}

#[derive(Debug, Clone)]
pub enum TurnOutcome {
    Completed(CompletedTurn),
    TranscriptionFailed { reason: String },
}

impl TurnOutcome {
    pub fn issues(&self) -> Vec<TurnIssue> {
        match self {
            TurnOutcome::Completed(turn) => turn.issues.clone(),
            TurnOutcome::TranscriptionFailed { .. } => vec![TurnIssue::TranscriptionFailed],
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, TurnOutcome::Completed(_))
    }
}

/// Runs one user turn: recognize, score, reply, voice the reply
pub struct TurnPipeline {
    transcriber: Arc<dyn Transcriber>,
    replier: Arc<dyn ReplyGenerator>,
    synthesizer: Arc<dyn Synthesizer>,
    scratch_dir: PathBuf,
    sample_rate: u32,
}

impl TurnPipeline {
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        replier: Arc<dyn ReplyGenerator>,
        synthesizer: Arc<dyn Synthesizer>,
        scratch_dir: PathBuf,
        sample_rate: u32,
    ) -> Self {
        Self {
            transcriber,
            replier,
            synthesizer,
            scratch_dir,
            sample_rate,
        }
    }

    /// Process one captured utterance against `state`
    ///
    /// Provider failures never surface as errors: a failed recognition leaves
    /// `state` untouched, a failed reply becomes the reply text, and a failed
    /// synthesis just yields no audio.
    pub async fn process_turn(&self, state: &mut SessionState, raw_audio: &[u8]) -> TurnOutcome {
        // Scratch capture file is gone by the time this returns
        let audio = match decode_capture(raw_audio, &self.scratch_dir, self.sample_rate) {
            Ok(audio) => audio,
            Err(e) => {
                warn!("Could not decode capture: {}", e);
                return TurnOutcome::TranscriptionFailed {
                    reason: e.to_string(),
                };
            }
        };
        debug!(
            "Decoded capture: {:.1}s at {}Hz",
            audio.duration_seconds(),
            audio.sample_rate
        );

        let transcript = match self.transcriber.transcribe_and_assess(&audio).await {
            Ok(result) if result.is_error() => {
                warn!("Recognizer reported an error: {}", result.text);
                return TurnOutcome::TranscriptionFailed {
                    reason: result.text,
                };
            }
            Ok(result) => result,
            Err(e) => {
                warn!("Transcription failed: {}", e);
                return TurnOutcome::TranscriptionFailed {
                    reason: e.to_string(),
                };
            }
        };

        let score = ScoreRecord {
            text: transcript.text.clone(),
            accuracy: transcript.accuracy.unwrap_or(0.0),
            fluency: transcript.fluency.unwrap_or(0.0),
            pronunciation: transcript.pronunciation.unwrap_or(0.0),
        };
        info!(
            "Turn heard \"{}\" (accuracy={:.0}, fluency={:.0}, pronunciation={:.0})",
            score.text, score.accuracy, score.fluency, score.pronunciation
        );

        state.messages.push(Message::user(transcript.text.clone()));
        state.scores.push(score.clone());

        let mut issues = Vec::new();

        let reply = match self.replier.generate_reply(&state.messages).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Reply generation failed: {}", e);
                issues.push(TurnIssue::ReplyGenerationDegraded);
                format!("Reply generation failed: {}", e)
            }
        };
        state.messages.push(Message::assistant(reply.clone()));

        let reply_audio = match self.synthesizer.synthesize(&reply).await {
            Ok(audio) if !audio.is_empty() => Some(audio),
            Ok(_) => {
                warn!("Synthesis returned no audio");
                issues.push(TurnIssue::SynthesisUnavailable);
                None
            }
            Err(e) => {
                warn!("Synthesis failed: {}", e);
                issues.push(TurnIssue::SynthesisUnavailable);
                None
            }
        };

        state.bump_nonce();

        TurnOutcome::Completed(CompletedTurn {
            user_text: transcript.text,
            tier: score.tier(),
            score,
            reply,
            reply_audio,
            issues,
            turn_nonce: state.turn_nonce,
        })
    }
}
