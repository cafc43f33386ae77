//! Canned replies - the last stage of the cascade, which cannot fail
//!
//! Rules are checked in order against the trimmed, lower-cased message and
//! the first rule with a matching keyword wins. Keywords match as plain
//! substrings, so "ethereum" and "eth" both hit the ETH rule. Messages that
//! match nothing get a random line from the agent's generic pool.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::persona::AgentId;

/// Openers answered with the agent's greeting, exact match only
pub const GREETINGS: [&str; 5] = ["hi", "hey", "hello", "yo", "sup"];

/// Keywords and the line they select
pub struct CannedRule {
    pub keywords: &'static [&'static str],
    pub reply: &'static str,
}

const PRIME_RULES: &[CannedRule] = &[
    CannedRule {
        keywords: &["status", "how are you"],
        reply: "All systems nominal. Currently monitoring 47 trading pairs. Market volatility index: 0.68. Scanning for arbitrage opportunities.",
    },
    CannedRule {
        keywords: &["eth", "ethereum"],
        reply: "ETH currently showing bullish momentum. RSI at 62, funding rate +0.008%. Watching for entry at $3,420 support level. Risk/reward ratio: 1:3.2.",
    },
    CannedRule {
        keywords: &["btc", "bitcoin"],
        reply: "BTC consolidating in tight range. Volume declining. Suggest waiting for breakout confirmation above $96.5K before entry. Current confidence: 72%.",
    },
    CannedRule {
        keywords: &["sol", "solana"],
        reply: "SOL showing strong network activity. DEX volume up 23% in 24h. Potential rotation from ETH. Monitoring whale wallets for position changes.",
    },
    CannedRule {
        keywords: &["risk", "portfolio"],
        reply: "Current portfolio exposure: 68%. Daily drawdown: -0.8% (well within 5% limit). Sharpe ratio: 2.1. All positions within risk parameters.",
    },
    CannedRule {
        keywords: &["trade", "opportunity"],
        reply: "Identified 3 potential setups: 1) ETH-USDC funding arb (92% conf), 2) SOL perp spread (78% conf), 3) BTC range mean reversion (65% conf). Awaiting confirmation signals.",
    },
    CannedRule {
        keywords: &["market", "analysis"],
        reply: "Market correlation matrix shows decoupling between majors. BTC dominance at 54.2%. Fear & Greed Index: 68 (Greed). Suggest reducing position sizes temporarily.",
    },
];

const PRIME_GENERIC: &[&str] = &[
    "Analyzing... Market structure remains intact. Waiting for higher probability setups. Current edge: 0.34% per trade.",
    "Signal quality moderate. Filtering 83% of noise. Focus on high-confidence opportunities only. Patience is alpha.",
    "Risk-adjusted returns prioritized. No forced trades. Current market regime: mean-reverting. Adapt strategy accordingly.",
    "Data synthesis complete. Cross-referencing on-chain metrics with price action. Will alert when probability threshold exceeded.",
    "Market microstructure analysis ongoing. Bid-ask spread tightening. Liquidity improving. Monitoring for optimal entry conditions.",
];

const CTO_RULES: &[CannedRule] = &[
    CannedRule {
        keywords: &["status", "how are you"],
        reply: "Platform healthy. Prime and CTO online, three agents pending integration. API p95 at 180ms, zero failed deploys this week.",
    },
    CannedRule {
        keywords: &["architecture", "system"],
        reply: "Agent fleet runs as isolated services behind a single gateway. Prime proposes, Warden enforces the constitution, Executor is the only path to a venue. No agent holds keys it does not need.",
    },
    CannedRule {
        keywords: &["performance", "optimization"],
        reply: "Hot path is signal ingestion to proposal: 240ms median. Biggest win left is batching RPC reads; expect roughly 35% off p95 once it lands.",
    },
    CannedRule {
        keywords: &["security", "vulnerability"],
        reply: "No open criticals. Keys stay in the signer, agents only hold scoped permits. Next review covers the Executor integration before it goes live.",
    },
    CannedRule {
        keywords: &["scale", "scaling"],
        reply: "Current load is 12% of capacity. Agents scale horizontally; the shared bottleneck is the market-data fan-out, which is next on the roadmap.",
    },
    CannedRule {
        keywords: &["deployment", "deploy"],
        reply: "Deploys are blue-green with automatic rollback on error-rate regression. Last release shipped clean in 6 minutes.",
    },
    CannedRule {
        keywords: &["database", "data"],
        reply: "Trade ledger is append-only with hourly snapshots. Market data is cached for 5 seconds, nothing older is ever used for a live decision.",
    },
    CannedRule {
        keywords: &["bug", "error", "issue"],
        reply: "Logged and triaged. Sentinel, Executor and Warden integration errors are known and tracked; nothing in the trading path is affected.",
    },
];

const CTO_GENERIC: &[&str] = &[
    "Reviewing system telemetry. All services within SLO. Will surface anything that needs a decision.",
    "Integration work continues on Sentinel and Executor. Keeping the trading path frozen until both pass review.",
    "Infrastructure stable. Error budget at 92% for the month. Prioritizing reliability over new surface area.",
    "Looking at it from the platform side: simplest design that keeps agents isolated wins. Happy to go deeper on any component.",
    "Noted. I'll fold that into the next architecture review and report back with numbers.",
];

fn rules(agent: AgentId) -> &'static [CannedRule] {
    match agent {
        AgentId::Prime => PRIME_RULES,
        AgentId::Cto => CTO_RULES,
    }
}

/// The agent's generic pool, used when no rule matches
pub fn generic_pool(agent: AgentId) -> &'static [&'static str] {
    match agent {
        AgentId::Prime => PRIME_GENERIC,
        AgentId::Cto => CTO_GENERIC,
    }
}

fn normalize(message: &str) -> String {
    message.trim().to_lowercase()
}

/// True when the whole message is one of the greeting tokens
pub fn is_greeting(message: &str) -> bool {
    GREETINGS.contains(&normalize(message).as_str())
}

/// The rule-selected line, if any keyword matches
pub fn matched_reply(agent: AgentId, message: &str) -> Option<&'static str> {
    let message = normalize(message);
    rules(agent)
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| message.contains(k)))
        .map(|rule| rule.reply)
}

/// Reply without any backend: greeting, rule match, then a random generic line
///
/// Returns `None` only when the generic pool is empty.
pub fn fallback_reply<R: Rng + ?Sized>(agent: AgentId, message: &str, rng: &mut R) -> Option<&'static str> {
    if is_greeting(message) {
        return Some(agent.persona().greeting);
    }
    matched_reply(agent, message).or_else(|| generic_pool(agent).choose(rng).copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_greetings_exact_after_trim() {
        assert!(is_greeting("hi"));
        assert!(is_greeting("  HeLLo \n"));
        assert!(!is_greeting("hi there"));
        assert!(!is_greeting("hiya"));
    }

    #[test]
    fn test_greeting_reply_per_agent() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            fallback_reply(AgentId::Prime, "YO", &mut rng),
            Some(AgentId::Prime.persona().greeting)
        );
        assert_eq!(
            fallback_reply(AgentId::Cto, "sup", &mut rng),
            Some(AgentId::Cto.persona().greeting)
        );
    }

    #[test]
    fn test_eth_question_is_deterministic() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let reply = fallback_reply(AgentId::Prime, "how's ETH looking", &mut rng).unwrap();
            assert!(reply.starts_with("ETH currently showing bullish momentum"));
        }
    }

    #[test]
    fn test_prime_rule_order() {
        // "status" is checked before "eth"
        let reply = matched_reply(AgentId::Prime, "status of eth?").unwrap();
        assert!(reply.starts_with("All systems nominal"));
        let reply = matched_reply(AgentId::Prime, "Bitcoin outlook").unwrap();
        assert!(reply.starts_with("BTC consolidating"));
        let reply = matched_reply(AgentId::Prime, "what's my portfolio risk").unwrap();
        assert!(reply.starts_with("Current portfolio exposure"));
    }

    #[test]
    fn test_cto_rule_order() {
        let reply = matched_reply(AgentId::Cto, "Deploy broke with an error").unwrap();
        assert!(reply.starts_with("Deploys are blue-green"));
        let reply = matched_reply(AgentId::Cto, "any vulnerability reports?").unwrap();
        assert!(reply.starts_with("No open criticals"));
        let reply = matched_reply(AgentId::Cto, "found a bug").unwrap();
        assert!(reply.starts_with("Logged and triaged"));
    }

    #[test]
    fn test_tables_are_per_agent() {
        assert!(matched_reply(AgentId::Cto, "eth?").is_none());
        assert!(matched_reply(AgentId::Prime, "deploy").is_none());
    }

    #[test]
    fn test_unmatched_draws_from_own_pool() {
        for agent in [AgentId::Prime, AgentId::Cto] {
            let mut rng = StdRng::seed_from_u64(42);
            let mut seen = HashSet::new();
            for _ in 0..200 {
                let reply = fallback_reply(agent, "thoughts?", &mut rng).unwrap();
                assert!(generic_pool(agent).contains(&reply));
                seen.insert(reply);
            }
            assert_eq!(seen.len(), generic_pool(agent).len());
        }
    }

    #[test]
    fn test_pools_have_five_entries() {
        assert_eq!(generic_pool(AgentId::Prime).len(), 5);
        assert_eq!(generic_pool(AgentId::Cto).len(), 5);
    }
}
