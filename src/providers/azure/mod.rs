mod openai;
mod speech;

pub use openai::{conversation_log, OpenAiClient};
pub use speech::SpeechClient;
