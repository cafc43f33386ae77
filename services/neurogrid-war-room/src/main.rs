//! NeuroGrid War Room Server
//!
//! Serves agent chat and the trading desk to the war-room dashboard.
//!
//! # Backends
//!
//! - `AGENT_LLM_BASE_URL` + `AGENT_LLM_API_KEY` enable the tool agent
//! - `HUGGINGFACE_API_KEY` enables the plain model
//!
//! With neither set, every chat reply comes from the canned tables.
//!
//! # Usage
//!
//! ```bash
//! # Start with default settings
//! neurogrid-war-room
//!
//! # Start with custom config
//! neurogrid-war-room --config /path/to/config.toml
//!
//! # Start with environment overrides
//! WARROOM__SERVER__PORT=8080 neurogrid-war-room
//! ```

mod config;

use std::future::{Future, IntoFuture};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::signal;
use tokio::sync::oneshot;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use neurogrid_agents::ResponseResolver;
use neurogrid_desk::Desk;
use neurogrid_llm::BackendRouter;
use neurogrid_war_room::{create_router, AppState};

use crate::config::WarRoomConfig;

// =============================================================================
// CLI Arguments
// =============================================================================

/// NeuroGrid War Room - agent chat and trading desk API
#[derive(Parser, Debug)]
#[command(name = "neurogrid-war-room")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML, JSON, or YAML)
    #[arg(short, long, env = "WARROOM_CONFIG")]
    config: Option<String>,

    /// Host to bind to
    #[arg(long, env = "WARROOM_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "WARROOM_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "WARROOM_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format (json, pretty)
    #[arg(long, env = "WARROOM_LOG_FORMAT")]
    log_format: Option<String>,
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = WarRoomConfig::load(args.config.as_deref())?;

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    if let Some(format) = args.log_format {
        config.logging.format = format;
    }

    init_logging(&config.logging)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting NeuroGrid War Room"
    );

    let backends = BackendRouter::from_env();
    let status = backends.status();
    if status.is_offline() {
        tracing::warn!("No LLM backend configured, chat will use canned replies only");
    } else {
        tracing::info!(
            advanced = ?status.advanced,
            simple = ?status.simple,
            "LLM backends configured"
        );
    }

    let resolver = ResponseResolver::new(backends, config.llm.resolver_settings());
    let state = Arc::new(AppState::new(resolver, Desk::new()));
    let app = create_router(state, config.api.api_config());

    let addr = config.server.socket_addr()?;
    tracing::info!(
        host = %config.server.host,
        port = %config.server.port,
        "Server listening"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;

    let (drain_tx, drain_rx) = oneshot::channel();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = drain_tx.send(());
    });

    serve_with_grace(server.into_future(), drain_rx, config.server.shutdown_grace()).await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

// =============================================================================
// Initialization
// =============================================================================

fn init_logging(config: &config::LoggingConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))?;

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match config.format.as_str() {
        "json" => {
            subscriber
                .with(fmt::layer().json().with_target(true))
                .try_init()?;
        }
        _ => {
            subscriber
                .with(fmt::layer().pretty().with_target(true))
                .try_init()?;
        }
    }

    Ok(())
}

// =============================================================================
// Graceful Shutdown
// =============================================================================

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }

    tracing::info!("Waiting for in-flight requests to complete...");
}

/// Drive the server until it drains, or fail once `grace` has passed since
/// `drain_started` fired
///
/// A model call can hold a request open for the whole tool-agent budget, so
/// the drain is bounded and an unfinished drain is reported as an error.
async fn serve_with_grace<S>(
    server: S,
    drain_started: oneshot::Receiver<()>,
    grace: Duration,
) -> anyhow::Result<()>
where
    S: Future<Output = std::io::Result<()>>,
{
    let deadline = async move {
        match drain_started.await {
            Ok(()) => tokio::time::sleep(grace).await,
            Err(_) => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        result = server => Ok(result?),
        _ = deadline => {
            tracing::warn!(grace_secs = grace.as_secs(), "Shutdown grace period elapsed with requests in flight");
            anyhow::bail!("shutdown grace period of {}s elapsed before requests drained", grace.as_secs())
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let args = Args::parse_from(["neurogrid-war-room", "--port", "8080", "--log-format", "json"]);
        assert_eq!(args.port, Some(8080));
        assert_eq!(args.log_format.as_deref(), Some("json"));
        assert!(args.host.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unfinished_drain_fails_after_grace() {
        let (drain_tx, drain_rx) = oneshot::channel();
        let server = std::future::pending::<std::io::Result<()>>();
        drain_tx.send(()).unwrap();

        let start = tokio::time::Instant::now();
        let result = serve_with_grace(server, drain_rx, Duration::from_secs(10)).await;

        assert!(result.is_err());
        assert!(start.elapsed() >= Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_finished_drain_is_clean() {
        let (_drain_tx, drain_rx) = oneshot::channel();
        let server = async { Ok(()) };

        assert!(serve_with_grace(server, drain_rx, Duration::from_secs(10)).await.is_ok());
    }
}
