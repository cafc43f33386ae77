//! NeuroGrid Tools - Read-only analysis capabilities for the tool agent
//!
//! Four synchronous, side-effect-free functions the advanced backend may
//! call while answering a chat message:
//!
//! - `analyze_market_sentiment` - sentiment, trend and confidence for a ticker
//! - `calculate_risk_metrics` - position size, risk zone, worst-case drawdown
//! - `check_constitution_compliance` - zone limits and the daily drawdown cap
//! - `analyze_liquidity` - available liquidity, slippage, gas, rating
//!
//! None of them touch a market. They are simulation stand-ins whose output
//! field names and value ranges are stable.

pub mod analysis;
pub mod constitution;

use neurogrid_llm::ToolSpec;
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

pub use analysis::*;
pub use constitution::{Constitution, ConstitutionView, Zone};

/// Errors raised while invoking a tool
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: String, message: String },

    #[error("Failed to encode tool output: {0}")]
    Encoding(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ToolError>;

/// The analysis tools, by the name the model sees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisTool {
    MarketSentiment,
    RiskMetrics,
    ConstitutionCheck,
    Liquidity,
}

impl AnalysisTool {
    pub const ALL: [AnalysisTool; 4] = [
        Self::MarketSentiment,
        Self::RiskMetrics,
        Self::ConstitutionCheck,
        Self::Liquidity,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::MarketSentiment => "analyze_market_sentiment",
            Self::RiskMetrics => "calculate_risk_metrics",
            Self::ConstitutionCheck => "check_constitution_compliance",
            Self::Liquidity => "analyze_liquidity",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    pub fn spec(&self) -> ToolSpec {
        let (description, parameters) = match self {
            Self::MarketSentiment => (
                "Analyzes current market sentiment and price action for a given cryptocurrency ticker. Returns confidence score and trend analysis.",
                json!({
                    "type": "object",
                    "properties": {
                        "ticker": { "type": "string", "description": "The cryptocurrency ticker symbol (e.g., ETH, BTC, SOL)" }
                    },
                    "required": ["ticker"]
                }),
            ),
            Self::RiskMetrics => (
                "Calculates risk metrics for a proposed trade including position size, risk zone, and maximum drawdown impact.",
                json!({
                    "type": "object",
                    "properties": {
                        "ticker": { "type": "string", "description": "The trading pair (e.g., ETH-USDC)" },
                        "amount": { "type": "number", "description": "The trade amount in USD" },
                        "currentPortfolioValue": { "type": "number", "description": "Current portfolio value in USD (default 10000)" }
                    },
                    "required": ["ticker", "amount"]
                }),
            ),
            Self::ConstitutionCheck => (
                "Validates if a proposed trade complies with the trading constitution rules including daily drawdown limits and zone restrictions.",
                json!({
                    "type": "object",
                    "properties": {
                        "tradeAmount": { "type": "number", "description": "The proposed trade amount in USD" },
                        "zone": { "type": "string", "enum": ["green", "yellow", "red"], "description": "The risk zone for this trade" },
                        "currentDailyDrawdown": { "type": "number", "description": "Current daily drawdown percentage" }
                    },
                    "required": ["tradeAmount", "zone"]
                }),
            ),
            Self::Liquidity => (
                "Analyzes liquidity depth and estimates slippage for a trading pair.",
                json!({
                    "type": "object",
                    "properties": {
                        "ticker": { "type": "string", "description": "The trading pair (e.g., ETH-USDC)" },
                        "tradeSize": { "type": "number", "description": "The intended trade size in USD" }
                    },
                    "required": ["ticker", "tradeSize"]
                }),
            ),
        };

        ToolSpec {
            name: self.name().to_string(),
            description: description.to_string(),
            parameters,
        }
    }
}

/// The tool set handed to the advanced backend
#[derive(Debug, Clone, Default)]
pub struct AnalysisToolSet {
    constitution: Constitution,
}

impl AnalysisToolSet {
    pub fn new(constitution: Constitution) -> Self {
        Self { constitution }
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        AnalysisTool::ALL.iter().map(AnalysisTool::spec).collect()
    }

    /// Run a tool by name with JSON arguments
    pub fn invoke<R: Rng + ?Sized>(&self, name: &str, arguments: &Value, rng: &mut R) -> Result<Value> {
        let tool = AnalysisTool::from_name(name).ok_or_else(|| ToolError::UnknownTool {
            name: name.to_string(),
        })?;

        tracing::debug!(tool = tool.name(), %arguments, "Invoking analysis tool");

        match tool {
            AnalysisTool::MarketSentiment => {
                to_value(market_sentiment(&parse_args(tool, arguments)?, rng)?)
            }
            AnalysisTool::RiskMetrics => to_value(risk_metrics(&parse_args(tool, arguments)?)?),
            AnalysisTool::ConstitutionCheck => to_value(constitution_compliance(
                &parse_args(tool, arguments)?,
                &self.constitution,
            )?),
            AnalysisTool::Liquidity => to_value(liquidity(&parse_args(tool, arguments)?, rng)?),
        }
    }
}

fn parse_args<T: DeserializeOwned>(tool: AnalysisTool, arguments: &Value) -> Result<T> {
    serde_json::from_value(arguments.clone()).map_err(|e| ToolError::InvalidArguments {
        tool: tool.name().to_string(),
        message: e.to_string(),
    })
}

fn to_value<T: Serialize>(report: T) -> Result<Value> {
    Ok(serde_json::to_value(report)?)
}
