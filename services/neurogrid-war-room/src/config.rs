//! Server Configuration
//!
//! Layered configuration for the war-room server: optional config file,
//! `config/default`, `config/local`, then `WARROOM__` environment
//! variables (`WARROOM__SERVER__PORT=8080`). CLI flags override all of it.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

use neurogrid_agents::ResolverSettings;
use neurogrid_war_room::ApiConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WarRoomConfig {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub api: ApiSettings,

    /// Response cascade budgets
    #[serde(default)]
    pub llm: LlmSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server binding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// How long in-flight requests may drain after a shutdown signal
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            shutdown_grace_secs: default_shutdown_grace(),
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port).parse()?;
        Ok(addr)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

/// API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_true")]
    pub enable_tracing: bool,

    /// Maximum request body size in bytes
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            enable_cors: true,
            cors_origins: default_cors_origins(),
            enable_tracing: true,
            max_body_size: default_max_body_size(),
        }
    }
}

impl ApiSettings {
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            enable_cors: self.enable_cors,
            cors_origins: self.cors_origins.clone(),
            enable_tracing: self.enable_tracing,
            max_body_size: self.max_body_size,
        }
    }
}

/// Model stage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    #[serde(default = "default_tool_agent_timeout")]
    pub tool_agent_timeout_secs: u64,

    #[serde(default = "default_plain_model_timeout")]
    pub plain_model_timeout_secs: u64,

    #[serde(default = "default_tool_agent_history")]
    pub tool_agent_history: usize,

    #[serde(default = "default_plain_model_history")]
    pub plain_model_history: usize,

    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: usize,

    #[serde(default = "default_tool_agent_max_tokens")]
    pub tool_agent_max_tokens: u32,

    #[serde(default = "default_plain_model_max_tokens")]
    pub plain_model_max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            tool_agent_timeout_secs: default_tool_agent_timeout(),
            plain_model_timeout_secs: default_plain_model_timeout(),
            tool_agent_history: default_tool_agent_history(),
            plain_model_history: default_plain_model_history(),
            max_tool_rounds: default_max_tool_rounds(),
            tool_agent_max_tokens: default_tool_agent_max_tokens(),
            plain_model_max_tokens: default_plain_model_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

impl LlmSettings {
    pub fn resolver_settings(&self) -> ResolverSettings {
        ResolverSettings {
            tool_agent_timeout: Duration::from_secs(self.tool_agent_timeout_secs),
            plain_model_timeout: Duration::from_secs(self.plain_model_timeout_secs),
            tool_agent_history: self.tool_agent_history,
            plain_model_history: self.plain_model_history,
            max_tool_rounds: self.max_tool_rounds,
            tool_agent_max_tokens: self.tool_agent_max_tokens,
            plain_model_max_tokens: self.plain_model_max_tokens,
            temperature: self.temperature,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// =============================================================================
// Default Functions
// =============================================================================

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_shutdown_grace() -> u64 {
    10
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_max_body_size() -> usize {
    1024 * 1024 // 1MB
}

fn default_tool_agent_timeout() -> u64 {
    45
}

fn default_plain_model_timeout() -> u64 {
    25
}

fn default_tool_agent_history() -> usize {
    8
}

fn default_plain_model_history() -> usize {
    6
}

fn default_max_tool_rounds() -> usize {
    5
}

fn default_tool_agent_max_tokens() -> u32 {
    300
}

fn default_plain_model_max_tokens() -> u32 {
    200
}

fn default_temperature() -> f32 {
    0.7
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_true() -> bool {
    true
}

// =============================================================================
// Configuration Loading
// =============================================================================

impl WarRoomConfig {
    /// Load configuration from files and environment
    pub fn load(config_path: Option<&str>) -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();

        let mut builder = config::Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        builder = builder
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("WARROOM")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_cascade_budgets() {
        let config = WarRoomConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.logging.format, "pretty");

        let settings = config.llm.resolver_settings();
        assert_eq!(settings.tool_agent_timeout, Duration::from_secs(45));
        assert_eq!(settings.plain_model_timeout, Duration::from_secs(25));
        assert_eq!(settings.tool_agent_history, 8);
        assert_eq!(settings.plain_model_history, 6);
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let config: WarRoomConfig = serde_json::from_str(
            r#"{"server": {"port": 8080}, "llm": {"tool_agent_timeout_secs": 10}}"#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.llm.tool_agent_timeout_secs, 10);
        assert_eq!(config.llm.plain_model_timeout_secs, 25);
        assert!(config.api.enable_cors);
    }

    #[test]
    fn test_socket_addr() {
        let settings = ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 4000,
            shutdown_grace_secs: 1,
        };
        assert_eq!(settings.socket_addr().unwrap().port(), 4000);

        let bad = ServerSettings {
            host: "not a host".to_string(),
            ..ServerSettings::default()
        };
        assert!(bad.socket_addr().is_err());
    }
}
