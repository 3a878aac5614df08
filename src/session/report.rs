use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};
use tracing::{info, warn};

use super::score::Tier;
use super::state::SessionState;
use crate::providers::Summarizer;

const MAX_CORRECTIONS: usize = 3;

static OVERALL_SECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)overall\s+feedback\W*(?P<body>.*?)(?:\n\s*2\.|\z)")
        .expect("Invalid overall-feedback regex")
});

static CORRECTION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?mi)user said:\s*"(?P<said>[^"\n]*)"\s*->\s*corrected:\s*"(?P<corrected>[^"\n]*)"(?:\s*\((?P<why>[^\n]*)\))?"#,
    )
    .expect("Invalid grammar-correction regex")
});

/// One sentence the tutor rewrote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarCorrection {
    pub said: String,
    pub corrected: String,
    pub explanation: Option<String>,
}

/// The tutor's written feedback, kept verbatim alongside whatever structure could be read from it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackReport {
    /// Exactly what the summarizer produced (or the failure message)
    pub text: String,

    /// The overall-assessment section, if one was found
    pub overall: Option<String>,

    /// Up to three grammar corrections
    pub corrections: Vec<GrammarCorrection>,

    /// Set when `text` is a summarizer failure rather than feedback
    pub failed: bool,
}

impl FeedbackReport {
    pub fn parse(text: impl Into<String>) -> Self {
        let text = text.into();

        let overall = OVERALL_SECTION
            .captures(&text)
            .and_then(|caps| caps.name("body"))
            .map(|body| {
                body.as_str()
                    .lines()
                    .map(|line| line.trim().trim_start_matches(['-', '*']).trim())
                    .filter(|line| !line.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .filter(|overall| !overall.is_empty());

        let corrections = CORRECTION_LINE
            .captures_iter(&text)
            .take(MAX_CORRECTIONS)
            .map(|caps| GrammarCorrection {
                said: caps["said"].trim().to_string(),
                corrected: caps["corrected"].trim().to_string(),
                explanation: caps
                    .name("why")
                    .map(|why| why.as_str().trim().to_string())
                    .filter(|why| !why.is_empty()),
            })
            .collect();

        Self {
            text,
            overall,
            corrections,
            failed: false,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            text: message.into(),
            overall: None,
            corrections: Vec::new(),
            failed: true,
        }
    }
}

/// Scores for one utterance, as shown in the report breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtteranceScore {
    /// 1-based position in the session
    pub index: usize,
    pub text: String,
    pub accuracy: f64,
    pub fluency: f64,
    pub pronunciation: f64,
    pub tier: Tier,
    pub tier_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub feedback: FeedbackReport,
    pub turn_count: usize,
    pub average_pronunciation: f64,
    pub breakdown: Vec<UtteranceScore>,
}

impl Report {
    /// Average pronunciation as displayed, one decimal place
    pub fn average_display(&self) -> String {
        format!("{:.1} / 100", self.average_pronunciation)
    }
}

/// What the report view shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReportView {
    /// Nothing has been scored yet; the summarizer is not consulted
    NoScoreData,
    Ready(Report),
}

/// Mean pronunciation score, `None` when nothing was scored
pub fn average_pronunciation(state: &SessionState) -> Option<f64> {
    let scores = state.scores();
    if scores.is_empty() {
        return None;
    }
    let total: f64 = scores.iter().map(|s| s.pronunciation).sum();
    Some(total / scores.len() as f64)
}

/// Builds the end-of-session report, asking the summarizer at most once per session
pub struct ReportAggregator {
    summarizer: Arc<dyn Summarizer>,
}

impl ReportAggregator {
    pub fn new(summarizer: Arc<dyn Summarizer>) -> Self {
        Self { summarizer }
    }

    pub async fn get_report(&self, state: &mut SessionState) -> ReportView {
        let Some(average) = average_pronunciation(state) else {
            info!("Report requested with no scored utterances");
            return ReportView::NoScoreData;
        };

        let feedback = if let Some(cached) = state.feedback_report.clone() {
            cached
        } else {
            info!(
                "Generating feedback report for {} dialogue messages",
                state.dialogue().len()
            );
            let feedback = match self.summarizer.summarize(state.dialogue()).await {
                Ok(text) => FeedbackReport::parse(text),
                Err(e) => {
                    warn!("Feedback generation failed: {}", e);
                    FeedbackReport::failed(format!("Feedback generation failed: {}", e))
                }
            };
            // Cached even on failure; only a reset or topic change clears it
            state.feedback_report = Some(feedback.clone());
            feedback
        };

        let breakdown = state
            .scores()
            .iter()
            .enumerate()
            .map(|(i, score)| {
                let tier = score.tier();
                UtteranceScore {
                    index: i + 1,
                    text: score.text.clone(),
                    accuracy: score.accuracy,
                    fluency: score.fluency,
                    pronunciation: score.pronunciation,
                    tier,
                    tier_label: tier.label().to_string(),
                }
            })
            .collect();

        ReportView::Ready(Report {
            feedback,
            turn_count: state.scores().len(),
            average_pronunciation: average,
            breakdown,
        })
    }
}
