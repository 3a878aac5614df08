/// Failures while turning raw capture bytes into recognizer input
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("scratch file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid WAV data: {0}")]
    Wav(#[from] hound::Error),
    #[error("unsupported audio format: {0}")]
    Unsupported(String),
    #[error("capture contains no audio")]
    Empty,
}
