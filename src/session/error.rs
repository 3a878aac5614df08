use super::state::Mode;

/// Operation attempted in the wrong session mode
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("turns can only be processed while conversing (session is {0:?})")]
    NotConversing(Mode),
    #[error("the report is only available in report mode (session is {0:?})")]
    NotReporting(Mode),
}
