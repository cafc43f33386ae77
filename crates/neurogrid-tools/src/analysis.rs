//! The four analysis capabilities
//!
//! Every number here is synthetic. Ranges are kept stable so the agent's
//! prompts can rely on them; the randomness itself means nothing.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constitution::{Constitution, Zone};
use crate::{Result, ToolError};

const SENTIMENTS: [&str; 4] = ["bullish", "bearish", "neutral", "volatile"];
const TRENDS: [&str; 4] = ["uptrend", "downtrend", "sideways", "breakout"];

pub const DEFAULT_PORTFOLIO_VALUE: f64 = 10_000.0;

/// Worst case assumed to wipe this share of a position
const WORST_CASE_LOSS: f64 = 0.3;

// ============================================================================
// Market sentiment
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct SentimentInput {
    pub ticker: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SentimentReport {
    pub ticker: String,
    pub sentiment: String,
    pub trend: String,
    /// 70-99
    pub confidence: u8,
    pub recommendation: String,
    pub timestamp: DateTime<Utc>,
}

pub fn market_sentiment<R: Rng + ?Sized>(input: &SentimentInput, rng: &mut R) -> Result<SentimentReport> {
    let ticker = required_ticker(&input.ticker)?;
    let confidence: u8 = rng.gen_range(70..100);

    Ok(SentimentReport {
        ticker: ticker.to_uppercase(),
        sentiment: pick(&SENTIMENTS, rng),
        trend: pick(&TRENDS, rng),
        confidence,
        recommendation: if confidence > 85 { "strong signal" } else { "moderate signal" }.to_string(),
        timestamp: Utc::now(),
    })
}

// ============================================================================
// Risk metrics
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskInput {
    pub ticker: String,
    pub amount: f64,
    #[serde(default)]
    pub current_portfolio_value: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskReport {
    pub ticker: String,
    pub amount: f64,
    /// Percent of portfolio, two decimals, e.g. `"3.00%"`
    pub position_size: String,
    pub risk_level: Zone,
    pub estimated_max_drawdown: String,
    pub recommendation: String,
    pub timestamp: DateTime<Utc>,
}

pub fn risk_metrics(input: &RiskInput) -> Result<RiskReport> {
    let portfolio = input.current_portfolio_value.unwrap_or(DEFAULT_PORTFOLIO_VALUE);
    if !portfolio.is_finite() || portfolio <= 0.0 {
        return Err(ToolError::InvalidArguments {
            tool: "calculate_risk_metrics".to_string(),
            message: format!("portfolio value must be positive, got {}", portfolio),
        });
    }
    non_negative("calculate_risk_metrics", "amount", input.amount)?;

    let position_size = input.amount * 100.0 / portfolio;
    let risk_level = Zone::for_position_size(position_size);
    let recommendation = match risk_level {
        Zone::Green => "approved",
        Zone::Yellow => "proceed with caution",
        Zone::Red => "requires approval",
    };

    Ok(RiskReport {
        ticker: input.ticker.clone(),
        amount: input.amount,
        position_size: format!("{:.2}%", position_size),
        risk_level,
        estimated_max_drawdown: format!("{:.2}%", position_size * WORST_CASE_LOSS),
        recommendation: recommendation.to_string(),
        timestamp: Utc::now(),
    })
}

// ============================================================================
// Constitution compliance
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceInput {
    pub trade_amount: f64,
    pub zone: Zone,
    #[serde(default)]
    pub current_daily_drawdown: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceReport {
    pub compliant: bool,
    pub violations: Vec<String>,
    pub zone: Zone,
    pub trade_amount: f64,
    pub recommendation: String,
    pub timestamp: DateTime<Utc>,
}

pub fn constitution_compliance(input: &ComplianceInput, rules: &Constitution) -> Result<ComplianceReport> {
    non_negative("check_constitution_compliance", "tradeAmount", input.trade_amount)?;

    let violations = rules.violations(
        input.trade_amount,
        input.zone,
        input.current_daily_drawdown.unwrap_or(0.0),
    );
    let compliant = violations.is_empty();
    let recommendation = if compliant {
        "trade approved".to_string()
    } else {
        format!("trade blocked - {}", violations.join(", "))
    };

    Ok(ComplianceReport {
        compliant,
        violations,
        zone: input.zone,
        trade_amount: input.trade_amount,
        recommendation,
        timestamp: Utc::now(),
    })
}

// ============================================================================
// Liquidity
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidityInput {
    pub ticker: String,
    pub trade_size: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidityReport {
    pub ticker: String,
    pub trade_size: f64,
    /// `$100000` - `$1100000`
    pub available_liquidity: String,
    pub estimated_slippage: String,
    /// `$2.00` - `$12.00`
    pub gas_estimate: String,
    pub liquidity_rating: String,
    pub recommendation: String,
    pub timestamp: DateTime<Utc>,
}

pub fn liquidity<R: Rng + ?Sized>(input: &LiquidityInput, rng: &mut R) -> Result<LiquidityReport> {
    let ticker = required_ticker(&input.ticker)?;
    non_negative("analyze_liquidity", "tradeSize", input.trade_size)?;

    let available: f64 = rng.gen_range(100_000.0..1_100_000.0);
    let gas: f64 = rng.gen_range(2.0..12.0);
    let slippage = input.trade_size / available * 100.0;

    let rating = if slippage < 0.5 {
        "excellent"
    } else if slippage < 1.0 {
        "good"
    } else {
        "poor"
    };

    Ok(LiquidityReport {
        ticker: ticker.to_string(),
        trade_size: input.trade_size,
        available_liquidity: format!("${:.0}", available),
        estimated_slippage: format!("{:.3}%", slippage),
        gas_estimate: format!("${:.2}", gas),
        liquidity_rating: rating.to_string(),
        recommendation: if slippage < 1.0 {
            "execute".to_string()
        } else {
            "split order or wait for better liquidity".to_string()
        },
        timestamp: Utc::now(),
    })
}

// ============================================================================
// Helpers
// ============================================================================

fn pick<R: Rng + ?Sized>(options: &[&str], rng: &mut R) -> String {
    options.choose(rng).copied().unwrap_or_default().to_string()
}

fn required_ticker(ticker: &str) -> Result<&str> {
    let ticker = ticker.trim();
    if ticker.is_empty() {
        return Err(ToolError::InvalidArguments {
            tool: "analysis".to_string(),
            message: "ticker must not be empty".to_string(),
        });
    }
    Ok(ticker)
}

fn non_negative(tool: &str, field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ToolError::InvalidArguments {
            tool: tool.to_string(),
            message: format!("{} must be a non-negative number, got {}", field, value),
        })
    }
}
