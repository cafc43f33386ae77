//! API Routes

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handlers;
use crate::state::AppState;

/// Routes mounted under `/api`
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Agent chat
        .route("/chat", post(handlers::chat::chat))
        // Desk panels
        .route("/desk", get(handlers::desk::snapshot))
        .route("/agents", get(handlers::desk::agents))
        .route("/proposals", get(handlers::desk::proposals))
        .route("/proposals/:id/approve", post(handlers::desk::approve))
        .route("/proposals/:id/reject", post(handlers::desk::reject))
        .route("/executions", get(handlers::desk::executions))
        .route("/constitution", get(handlers::desk::constitution))
        .route("/halt", post(handlers::desk::halt))
}
