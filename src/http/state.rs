use crate::providers::Providers;
use crate::session::{SessionConfig, SessionController};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// A session behind its own lock; holding the lock is holding the turn
pub type SharedSession = Arc<Mutex<SessionController>>;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Active practice sessions (session_id → session)
    pub sessions: Arc<RwLock<HashMap<Uuid, SharedSession>>>,

    /// Capabilities every new session is wired to
    pub providers: Providers,

    /// Settings new sessions start from
    pub defaults: SessionConfig,
}

impl AppState {
    pub fn new(providers: Providers, defaults: SessionConfig) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            providers,
            defaults,
        }
    }

    pub async fn session(&self, id: &Uuid) -> Option<SharedSession> {
        let sessions = self.sessions.read().await;
        sessions.get(id).cloned()
    }
}
