pub mod audio;
pub mod config;
pub mod http;
pub mod providers;
pub mod session;

pub use audio::{decode_capture, encode_wav, AudioError, AudioFile, CapturedAudio, ScratchFile};
pub use config::Config;
pub use http::{create_router, AppState};
pub use providers::{
    ProviderError, Providers, ReplyGenerator, Summarizer, Synthesizer, TranscriptResult,
    Transcriber,
};
pub use session::{
    FeedbackReport, Message, Mode, Report, ReportView, Role, ScoreRecord, SessionConfig,
    SessionController, SessionError, SessionSnapshot, SessionState, Tier, Topic, TurnIssue,
    TurnOutcome,
};
