use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::OpenAiConfig;
use crate::providers::{ProviderError, ReplyGenerator, Summarizer};
use crate::session::{Message, Role};

/// Tutor instructions for the end-of-session report. Headings and the
/// `User said` / `Corrected` labels stay in English so the report can be parsed.
pub fn feedback_prompt(language: &str) -> String {
    format!(
        "\
You are a helpful English tutor. Analyze the user's conversation history.
Write your feedback in {language}, but keep the section headings, the quoted
English sentences and the `User said` / `Corrected` labels exactly as shown.
Provide the output in the following format:

1. **Overall Feedback**:
   - Summarize the user's English skills, strengths, and areas for improvement in 2-3 sentences ({language}).

2. **Grammar Corrections**:
   - Pick up to 3 sentences with grammatical errors from the user's input.
   - Format each one on its own line as: User said: \"...\" -> Corrected: \"...\" (short explanation in {language})
   - If there are no major errors, praise the user's grammar."
    )
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Azure OpenAI chat-completions deployment, used for replies and feedback
pub struct OpenAiClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
    api_version: String,
    feedback_temperature: f32,
    feedback_language: String,
}

impl OpenAiClient {
    pub fn new(config: &OpenAiConfig) -> Result<Self, ProviderError> {
        if config.api_key.trim().is_empty() {
            return Err(ProviderError::NotConfigured("openai.api_key"));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            http,
            url: format!(
                "{}/openai/deployments/{}/chat/completions",
                config.endpoint.trim_end_matches('/'),
                config.deployment
            ),
            api_key: config.api_key.clone(),
            api_version: config.api_version.clone(),
            feedback_temperature: config.feedback_temperature,
            feedback_language: config.feedback_language.clone(),
        })
    }

    async fn complete(
        &self,
        messages: &[Message],
        temperature: Option<f32>,
    ) -> Result<String, ProviderError> {
        debug!("Sending {} messages to {}", messages.len(), self.url);

        let response = self
            .http
            .post(&self.url)
            .query(&[("api-version", self.api_version.as_str())])
            .header("api-key", &self.api_key)
            .json(&ChatRequest {
                messages,
                temperature,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: ChatResponse = response.json().await?;
        first_choice(body)
    }
}

fn first_choice(response: ChatResponse) -> Result<String, ProviderError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(ProviderError::EmptyResponse)
}

/// `role: content` lines for every non-system message
pub fn conversation_log(dialogue: &[Message]) -> String {
    dialogue
        .iter()
        .filter(|m| m.role != Role::System)
        .map(|m| format!("{}: {}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl ReplyGenerator for OpenAiClient {
    async fn generate_reply(&self, history: &[Message]) -> Result<String, ProviderError> {
        let reply = self.complete(history, None).await?;
        info!("Reply generated ({} chars)", reply.len());
        Ok(reply)
    }
}

#[async_trait]
impl Summarizer for OpenAiClient {
    async fn summarize(&self, dialogue: &[Message]) -> Result<String, ProviderError> {
        let prompt = [
            Message::system(feedback_prompt(&self.feedback_language)),
            Message::user(format!(
                "Here is the conversation log:\n{}",
                conversation_log(dialogue)
            )),
        ];

        let report = self
            .complete(&prompt, Some(self.feedback_temperature))
            .await?;
        info!("Feedback report generated ({} chars)", report.len());
        Ok(report)
    }
}
