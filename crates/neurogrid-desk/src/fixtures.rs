//! Seed data the desk starts from

use neurogrid_tools::Zone;

use crate::{AgentCard, AgentStatus, ExecutedTrade, PortfolioSummary, TradeProposal};

/// The five roster agents; only Prime and the CTO are wired up
pub fn agents() -> Vec<AgentCard> {
    vec![
        AgentCard::new("prime", "Prime", "Brain", AgentStatus::Online, "Filtering Noise..."),
        AgentCard::new("sentinel", "Sentinel", "Eye", AgentStatus::Error, "Integration Pending..."),
        AgentCard::new("executor", "Executor", "Zap", AgentStatus::Error, "Integration Pending..."),
        AgentCard::new("warden", "Warden", "Shield", AgentStatus::Error, "Integration Pending..."),
        AgentCard::new("cto", "CTO", "Code", AgentStatus::Online, "Analyzing System Architecture..."),
    ]
}

pub fn proposals(now_ms: i64) -> Vec<TradeProposal> {
    vec![
        TradeProposal {
            id: "1".to_string(),
            ticker: "ETH-USDC".to_string(),
            confidence: 92,
            reason: "Funding Rate Arbitrage".to_string(),
            gas: 2.50,
            slippage: 0.1,
            liquidity: 4_000_000.0,
            zone: Zone::Green,
            timestamp: now_ms - 30_000,
        },
        TradeProposal {
            id: "2".to_string(),
            ticker: "PEPE-SOL".to_string(),
            confidence: 65,
            reason: "Social Volume Spike".to_string(),
            gas: 0.001,
            slippage: 0.5,
            liquidity: 150_000.0,
            zone: Zone::Yellow,
            timestamp: now_ms - 15_000,
        },
    ]
}

pub fn executions(now_ms: i64) -> Vec<ExecutedTrade> {
    vec![
        ExecutedTrade {
            id: "1".to_string(),
            ticker: "SOL-USDC".to_string(),
            timestamp: now_ms - 120_000,
            tx_hash: "0x7a3f...9d2c".to_string(),
            profit: 12.40,
            gas: 0.02,
        },
        ExecutedTrade {
            id: "2".to_string(),
            ticker: "BTC-USDT".to_string(),
            timestamp: now_ms - 240_000,
            tx_hash: "0x4b8e...1a5f".to_string(),
            profit: -3.20,
            gas: 1.50,
        },
    ]
}

pub fn portfolio() -> PortfolioSummary {
    PortfolioSummary {
        value: 1000.00,
        daily_change: 12.40,
        daily_change_percent: 1.2,
    }
}
