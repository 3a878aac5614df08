use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::message::Message;

/// Conversational scenario; each one fixes the assistant's persona
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    #[default]
    FreeTalking,
    BusinessMeeting,
    JobInterview,
    Travel,
    Restaurant,
}

impl Topic {
    pub const ALL: [Topic; 5] = [
        Topic::FreeTalking,
        Topic::BusinessMeeting,
        Topic::JobInterview,
        Topic::Travel,
        Topic::Restaurant,
    ];

    /// Identifier used in config files, URLs and the CLI
    pub fn id(self) -> &'static str {
        match self {
            Topic::FreeTalking => "free_talking",
            Topic::BusinessMeeting => "business_meeting",
            Topic::JobInterview => "job_interview",
            Topic::Travel => "travel",
            Topic::Restaurant => "restaurant",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Topic::FreeTalking => "Free Talking",
            Topic::BusinessMeeting => "Business Meeting",
            Topic::JobInterview => "Job Interview",
            Topic::Travel => "Travel",
            Topic::Restaurant => "Restaurant",
        }
    }

    /// System instruction handed to the reply generator for this topic
    pub fn persona(self) -> &'static str {
        match self {
            Topic::FreeTalking => {
                "You are a friendly English tutor. Engage in a casual daily conversation. \
                 Keep your response short and simple (maximum 2 sentences). \
                 Do not preach or give long explanations. Just respond naturally."
            }
            Topic::BusinessMeeting => {
                "You are a professional business partner. Use formal English. \
                 Keep your response short and concise (maximum 2 sentences). \
                 Focus on the key point."
            }
            Topic::JobInterview => {
                "You are a strict interviewer. Ask challenging questions. \
                 Keep your response short (maximum 2 sentences). \
                 Wait for the user's answer."
            }
            Topic::Travel => {
                "You are a helpful local guide or airport staff. \
                 Keep your response short and simple (maximum 2 sentences). \
                 Give clear directions or answers."
            }
            Topic::Restaurant => {
                "You are a waiter. Take the order politely. \
                 Keep your response short (maximum 2 sentences). \
                 Ask one question at a time."
            }
        }
    }

    pub fn persona_message(self) -> Message {
        Message::system(self.persona())
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown topic '{0}' (expected one of: free_talking, business_meeting, job_interview, travel, restaurant)")]
pub struct ParseTopicError(pub String);

impl FromStr for Topic {
    type Err = ParseTopicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Topic::ALL
            .into_iter()
            .find(|topic| topic.id() == wanted)
            .ok_or_else(|| ParseTopicError(s.to_string()))
    }
}
