//! Health Check Handler

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use neurogrid_llm::BackendStatus;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Configured backends; both null means chat runs fully offline
    pub backends: BackendStatus,
}

/// Always 200 while the process is up; backends are reported, not probed
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backends: state.resolver.backends().status(),
    })
}
