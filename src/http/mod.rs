//! HTTP API for the practice front end
//!
//! This module exposes each session operation as a REST endpoint:
//! - POST /sessions - Start a session
//! - POST /sessions/:id/topic, /reset - Switch persona or start over
//! - POST /sessions/:id/turns - Submit one captured utterance (WAV body)
//! - POST /sessions/:id/report/enter, /report/exit - Change mode
//! - GET /sessions/:id/report - End-of-session report
//! - GET /health, /topics

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::{AppState, SharedSession};
