use serde::{Deserialize, Serialize};

/// Pronunciation scores for one transcribed utterance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// What the recognizer heard
    pub text: String,

    /// Phoneme-level accuracy (0 to 100)
    pub accuracy: f64,

    /// Fluency (0 to 100)
    pub fluency: f64,

    /// Overall pronunciation score (0 to 100)
    pub pronunciation: f64,
}

impl ScoreRecord {
    pub fn tier(&self) -> Tier {
        Tier::for_score(self.pronunciation)
    }
}

/// Qualitative band derived from a pronunciation score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Excellent,
    Great,
    Good,
    NotBad,
    NeedsImprovement,
}

impl Tier {
    /// Lower bounds are inclusive, checked from the top band down.
    pub fn for_score(score: f64) -> Self {
        if score >= 90.0 {
            Tier::Excellent
        } else if score >= 80.0 {
            Tier::Great
        } else if score >= 70.0 {
            Tier::Good
        } else if score >= 60.0 {
            Tier::NotBad
        } else {
            Tier::NeedsImprovement
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::Excellent => "Excellent",
            Tier::Great => "Great",
            Tier::Good => "Good",
            Tier::NotBad => "Not Bad",
            Tier::NeedsImprovement => "Needs Improvement",
        }
    }
}
