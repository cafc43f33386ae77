//! NeuroGrid War Room API
//!
//! HTTP surface of the war-room dashboard.
//!
//! # API Structure
//!
//! ```text
//! /health                          - Liveness plus configured backends
//! /api/
//! ├── POST /chat                   - Agent chat (always answers)
//! ├── GET  /desk                   - Full panel snapshot
//! ├── GET  /agents                 - Agent roster
//! ├── GET  /proposals              - Pending trade proposals
//! ├── POST /proposals/:id/approve  - Approve (404 unknown, 409 halted)
//! ├── POST /proposals/:id/reject   - Reject (404 unknown)
//! ├── GET  /executions             - Execution ledger, newest first
//! ├── GET  /constitution           - Trading rules
//! └── POST /halt                   - Emergency halt
//! ```

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use error::{ApiResult, AppError};
pub use state::AppState;

/// API configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Enable CORS for browser clients
    pub enable_cors: bool,
    /// Allowed origins for CORS
    pub cors_origins: Vec<String>,
    /// Enable request tracing
    pub enable_tracing: bool,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enable_cors: true,
            cors_origins: vec!["*".to_string()],
            enable_tracing: true,
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

/// Create the main router with all middleware
pub fn create_router(state: Arc<AppState>, config: ApiConfig) -> Router {
    let mut router = Router::new()
        .nest("/api", routes::api_routes())
        .route("/health", axum::routing::get(handlers::health::health_check))
        .layer(DefaultBodyLimit::max(config.max_body_size))
        .with_state(state);

    if config.enable_tracing {
        router = router.layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        );
    }

    if config.enable_cors {
        let cors = if config.cors_origins.iter().any(|o| o == "*") {
            CorsLayer::permissive()
        } else {
            CorsLayer::new()
                .allow_origin(
                    config
                        .cors_origins
                        .iter()
                        .filter_map(|o| o.parse().ok())
                        .collect::<Vec<_>>(),
                )
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers(Any)
        };
        router = router.layer(cors);
    }

    router
}
