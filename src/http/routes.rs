use super::handlers;
use super::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Largest capture accepted for one turn
const MAX_CAPTURE_BYTES: usize = 25 * 1024 * 1024;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        .route("/topics", get(handlers::list_topics))
        // Session lifecycle
        .route("/sessions", post(handlers::create_session))
        .route(
            "/sessions/:session_id",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .route("/sessions/:session_id/topic", post(handlers::select_topic))
        .route("/sessions/:session_id/reset", post(handlers::reset_session))
        // Conversation
        .route(
            "/sessions/:session_id/turns",
            post(handlers::submit_turn).layer(DefaultBodyLimit::max(MAX_CAPTURE_BYTES)),
        )
        // Report
        .route(
            "/sessions/:session_id/report/enter",
            post(handlers::enter_report),
        )
        .route(
            "/sessions/:session_id/report/exit",
            post(handlers::exit_report),
        )
        .route("/sessions/:session_id/report", get(handlers::get_report))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
