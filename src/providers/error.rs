/// Failure of an external capability (recognizer, chat model, voice)
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("no speech could be recognized")]
    NoMatch,
    #[error("recognition canceled: {0}")]
    Canceled(String),
    #[error("provider returned an empty response")]
    EmptyResponse,
    #[error("malformed provider response: {0}")]
    Malformed(String),
    #[error("audio error: {0}")]
    Audio(#[from] crate::audio::AudioError),
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}
