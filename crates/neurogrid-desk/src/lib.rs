//! NeuroGrid Desk - Shared state behind the war-room panels
//!
//! The desk holds the agent roster, the queue of trade proposals waiting
//! for a human decision, the execution ledger and the constitution. It is
//! in-memory only and starts from fixtures on every boot.
//!
//! # Architecture
//!
//! ```text
//! War-room service ──► Desk (Arc<RwLock<DeskBook>>)
//!   GET  /api/desk          snapshot
//!   POST /api/proposals/..  approve / reject
//!   POST /api/halt          emergency halt
//! ```
//!
//! Approving a proposal does not trade anything: the execution record is
//! synthetic, with a made-up transaction hash and a random profit.

pub mod fixtures;

use std::sync::Arc;

use chrono::Utc;
use neurogrid_tools::{Constitution, ConstitutionView, Zone};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

// ============================================================================
// Errors
// ============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeskError {
    #[error("Proposal not found: {id}")]
    NotFound { id: String },

    #[error("Trading is halted")]
    Halted,
}

pub type Result<T> = std::result::Result<T, DeskError>;

// ============================================================================
// Desk Entities
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Online,
    Thinking,
    Error,
}

/// One row of the agent roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCard {
    pub id: String,
    pub name: String,
    /// Icon name for the dashboard
    pub icon: String,
    pub status: AgentStatus,
    pub current_action: String,
}

impl AgentCard {
    pub fn new(id: &str, name: &str, icon: &str, status: AgentStatus, current_action: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            icon: icon.to_string(),
            status,
            current_action: current_action.to_string(),
        }
    }
}

/// A trade waiting for approval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeProposal {
    pub id: String,
    pub ticker: String,
    /// Percent, 0-100
    pub confidence: u8,
    pub reason: String,
    /// USD
    pub gas: f64,
    /// Percent
    pub slippage: f64,
    /// USD
    pub liquidity: f64,
    pub zone: Zone,
    /// Unix milliseconds
    pub timestamp: i64,
}

/// A ledger entry for an approved trade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutedTrade {
    pub id: String,
    pub ticker: String,
    /// Unix milliseconds
    pub timestamp: i64,
    pub tx_hash: String,
    /// USD, negative for a loss
    pub profit: f64,
    pub gas: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub value: f64,
    pub daily_change: f64,
    pub daily_change_percent: f64,
}

/// Everything the dashboard panels render
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeskSnapshot {
    pub agents: Vec<AgentCard>,
    pub proposals: Vec<TradeProposal>,
    pub executions: Vec<ExecutedTrade>,
    pub constitution: ConstitutionView,
    pub portfolio: PortfolioSummary,
    pub halted: bool,
}

// ============================================================================
// Desk Book
// ============================================================================

/// The desk's mutable contents
#[derive(Debug, Clone)]
pub struct DeskBook {
    pub agents: Vec<AgentCard>,
    pub proposals: Vec<TradeProposal>,
    /// Newest first
    pub executions: Vec<ExecutedTrade>,
    pub portfolio: PortfolioSummary,
    pub halted: bool,
}

impl DeskBook {
    /// Book seeded with the fixture roster, queue and ledger
    pub fn seeded() -> Self {
        let now = Utc::now().timestamp_millis();
        Self {
            agents: fixtures::agents(),
            proposals: fixtures::proposals(now),
            executions: fixtures::executions(now),
            portfolio: fixtures::portfolio(),
            halted: false,
        }
    }

    fn take_proposal(&mut self, id: &str) -> Result<TradeProposal> {
        let index = self
            .proposals
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| DeskError::NotFound { id: id.to_string() })?;
        Ok(self.proposals.remove(index))
    }

    pub fn approve<R: Rng + ?Sized>(&mut self, id: &str, rng: &mut R) -> Result<ExecutedTrade> {
        if self.halted {
            return Err(DeskError::Halted);
        }
        let proposal = self.take_proposal(id)?;

        let profit = if rng.gen_bool(0.5) {
            rng.gen_range(0.0..20.0)
        } else {
            -rng.gen_range(0.0..10.0)
        };
        let trade = ExecutedTrade {
            id: format!("trade-{}", uuid::Uuid::new_v4()),
            ticker: proposal.ticker,
            timestamp: Utc::now().timestamp_millis(),
            tx_hash: synthetic_tx_hash(rng),
            profit,
            gas: proposal.gas,
        };
        self.executions.insert(0, trade.clone());
        Ok(trade)
    }

    pub fn reject(&mut self, id: &str) -> Result<TradeProposal> {
        self.take_proposal(id)
    }

    /// Cancel every pending proposal and block approvals; returns how many
    /// were cancelled
    pub fn halt(&mut self) -> usize {
        let cancelled = self.proposals.len();
        self.proposals.clear();
        self.halted = true;
        cancelled
    }
}

/// `0x` plus four hex digits, an ellipsis, and four more
fn synthetic_tx_hash<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("0x{:04x}...{:04x}", rng.gen::<u16>(), rng.gen::<u16>())
}

// ============================================================================
// Desk
// ============================================================================

/// Shared handle to the desk
#[derive(Debug, Clone)]
pub struct Desk {
    book: Arc<RwLock<DeskBook>>,
    constitution: Constitution,
}

impl Desk {
    pub fn new() -> Self {
        Self {
            book: Arc::new(RwLock::new(DeskBook::seeded())),
            constitution: Constitution::default(),
        }
    }

    pub async fn snapshot(&self) -> DeskSnapshot {
        let book = self.book.read().await;
        DeskSnapshot {
            agents: book.agents.clone(),
            proposals: book.proposals.clone(),
            executions: book.executions.clone(),
            constitution: self.constitution.view(),
            portfolio: book.portfolio.clone(),
            halted: book.halted,
        }
    }

    pub async fn agents(&self) -> Vec<AgentCard> {
        self.book.read().await.agents.clone()
    }

    pub async fn proposals(&self) -> Vec<TradeProposal> {
        self.book.read().await.proposals.clone()
    }

    pub async fn executions(&self) -> Vec<ExecutedTrade> {
        self.book.read().await.executions.clone()
    }

    pub fn constitution(&self) -> ConstitutionView {
        self.constitution.view()
    }

    pub async fn is_halted(&self) -> bool {
        self.book.read().await.halted
    }

    /// Approve a proposal, moving it to the head of the execution ledger
    pub async fn approve<R: Rng + ?Sized>(&self, id: &str, rng: &mut R) -> Result<ExecutedTrade> {
        let mut book = self.book.write().await;
        let trade = book.approve(id, rng)?;
        tracing::info!(
            proposal = id,
            ticker = %trade.ticker,
            tx_hash = %trade.tx_hash,
            profit = trade.profit,
            "Proposal approved"
        );
        Ok(trade)
    }

    pub async fn reject(&self, id: &str) -> Result<TradeProposal> {
        let proposal = self.book.write().await.reject(id)?;
        tracing::info!(proposal = id, ticker = %proposal.ticker, "Proposal rejected");
        Ok(proposal)
    }

    pub async fn emergency_halt(&self) -> usize {
        let cancelled = self.book.write().await.halt();
        tracing::warn!(cancelled, "Emergency halt, all trading stopped");
        cancelled
    }
}

impl Default for Desk {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_seeded_book_matches_fixtures() {
        let book = DeskBook::seeded();
        assert_eq!(book.agents.len(), 5);
        let online: Vec<_> = book
            .agents
            .iter()
            .filter(|a| a.status == AgentStatus::Online)
            .map(|a| a.id.as_str())
            .collect();
        assert_eq!(online, vec!["prime", "cto"]);
        assert_eq!(book.proposals[0].ticker, "ETH-USDC");
        assert_eq!(book.proposals[1].zone, Zone::Yellow);
        assert_eq!(book.executions[0].tx_hash, "0x7a3f...9d2c");
        assert!(!book.halted);
    }

    #[test]
    fn test_approve_prepends_execution() {
        let mut book = DeskBook::seeded();
        let mut rng = StdRng::seed_from_u64(3);

        let trade = book.approve("1", &mut rng).unwrap();

        assert_eq!(trade.ticker, "ETH-USDC");
        assert_eq!(trade.gas, 2.50);
        assert!(trade.id.starts_with("trade-"));
        assert_eq!(book.executions.len(), 3);
        assert_eq!(book.executions[0], trade);
        assert_eq!(book.proposals.len(), 1);
        assert_eq!(book.proposals[0].id, "2");
    }

    #[test]
    fn test_synthetic_outcome_shape() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let mut book = DeskBook::seeded();
            let trade = book.approve("2", &mut rng).unwrap();
            assert!(trade.profit > -10.0 && trade.profit < 20.0);

            let hash = &trade.tx_hash;
            assert_eq!(hash.len(), 13);
            assert!(hash.starts_with("0x"));
            assert_eq!(&hash[6..9], "...");
            assert!(hash[2..6].chars().all(|c| c.is_ascii_hexdigit()));
            assert!(hash[9..].chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn test_unknown_proposal() {
        let mut book = DeskBook::seeded();
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            book.approve("99", &mut rng),
            Err(DeskError::NotFound { id: "99".to_string() })
        );
        assert!(matches!(book.reject("99"), Err(DeskError::NotFound { .. })));
        assert_eq!(book.proposals.len(), 2);
    }

    #[test]
    fn test_reject_removes_without_execution() {
        let mut book = DeskBook::seeded();
        let rejected = book.reject("2").unwrap();
        assert_eq!(rejected.ticker, "PEPE-SOL");
        assert_eq!(book.proposals.len(), 1);
        assert_eq!(book.executions.len(), 2);
    }

    #[test]
    fn test_halt_clears_queue_and_blocks_approvals() {
        let mut book = DeskBook::seeded();
        let mut rng = StdRng::seed_from_u64(0);

        assert_eq!(book.halt(), 2);
        assert!(book.halted);
        assert!(book.proposals.is_empty());
        assert_eq!(book.approve("1", &mut rng), Err(DeskError::Halted));
        assert_eq!(book.halt(), 0);
    }

    #[tokio::test]
    async fn test_desk_snapshot_serialization() {
        let desk = Desk::new();
        let json = serde_json::to_value(desk.snapshot().await).unwrap();

        assert_eq!(json["agents"][0]["currentAction"], "Filtering Noise...");
        assert_eq!(json["proposals"][0]["zone"], "green");
        assert_eq!(json["executions"][1]["txHash"], "0x4b8e...1a5f");
        assert_eq!(json["constitution"]["maxDailyDrawdown"], "5%");
        assert_eq!(json["constitution"]["redZoneLimit"], "REQUIRES_MANUAL_APPROVAL");
        assert_eq!(json["portfolio"]["dailyChangePercent"], 1.2);
        assert_eq!(json["halted"], false);
    }

    #[tokio::test]
    async fn test_desk_handles_share_state() {
        let desk = Desk::new();
        let other = desk.clone();
        let mut rng = StdRng::seed_from_u64(5);

        desk.approve("1", &mut rng).await.unwrap();
        assert_eq!(other.proposals().await.len(), 1);
        assert_eq!(other.executions().await.len(), 3);

        assert_eq!(other.emergency_halt().await, 1);
        assert!(desk.is_halted().await);
    }
}
