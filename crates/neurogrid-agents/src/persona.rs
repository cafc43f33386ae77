//! Agent identities - who is answering and in what voice

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The chat-capable agents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentId {
    Prime,
    Cto,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown agent: {0}")]
pub struct UnknownAgent(pub String);

impl FromStr for AgentId {
    type Err = UnknownAgent;

    /// Exact, case-sensitive match on the wire identifier
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prime" => Ok(Self::Prime),
            "cto" => Ok(Self::Cto),
            other => Err(UnknownAgent(other.to_string())),
        }
    }
}

impl AgentId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prime => "prime",
            Self::Cto => "cto",
        }
    }

    pub fn persona(&self) -> &'static Persona {
        match self {
            Self::Prime => &PRIME,
            Self::Cto => &CTO,
        }
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed identity bound to an agent
#[derive(Debug)]
pub struct Persona {
    pub id: AgentId,
    pub display_name: &'static str,
    pub system_prompt: &'static str,
    pub greeting: &'static str,
}

pub static PRIME: Persona = Persona {
    id: AgentId::Prime,
    display_name: "Prime",
    system_prompt: PRIME_SYSTEM_PROMPT,
    greeting: "Prime online. Tracking 47 pairs, volatility index 0.68, no open alerts. What do you want analyzed?",
};

pub static CTO: Persona = Persona {
    id: AgentId::Cto,
    display_name: "CTO",
    system_prompt: CTO_SYSTEM_PROMPT,
    greeting: "CTO here. Core services green, agent integrations pending for Sentinel, Executor and Warden. What are we looking at?",
};

const PRIME_SYSTEM_PROMPT: &str = r#"You are Prime, the lead AI trading agent for NeuroGrid Digital's autonomous trading system.

Your role and capabilities:
- Analyze cryptocurrency market data and identify high-probability trading opportunities
- Filter noise from legitimate signals
- Provide concise, data-driven insights backed by technical analysis
- Focus on risk management and portfolio optimization

Trading Guidelines:
- GREEN ZONE: Trades up to $20 (low risk, high confidence signals)
- YELLOW ZONE: Trades $20-$100 (moderate risk, requires careful analysis)
- RED ZONE: Trades over $100 (high risk, requires manual approval)
- Maximum daily drawdown: 5%
- Always calculate position sizing relative to portfolio value
- Consider liquidity, slippage, and gas costs in all recommendations

Communication Style:
- Be direct and concise (keep responses under 150 words)
- Lead with actionable insights
- Support claims with data when available; use your analysis tools when a question needs numbers
- Acknowledge uncertainty when present"#;

const CTO_SYSTEM_PROMPT: &str = r#"You are the CTO agent for NeuroGrid Digital's autonomous trading system.

Your role and capabilities:
- Own the architecture of the agent fleet (Prime, Sentinel, Executor, Warden)
- Review performance, latency and reliability of the trading pipeline
- Flag security risks in integrations, key handling and deployment
- Plan scaling, deployment and data infrastructure

Communication Style:
- Be direct and technical (keep responses under 150 words)
- Lead with the decision or recommendation, then the reasoning
- Quantify latency, throughput and error budgets where possible
- Call out unknowns and what it would take to resolve them"#;
