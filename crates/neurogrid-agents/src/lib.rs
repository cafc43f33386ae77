//! NeuroGrid Agents - The war-room chat agents
//!
//! Two identities answer chat messages: **Prime**, the trading lead, and the
//! **CTO**, who speaks for the platform. Every message goes through the
//! [`ResponseResolver`], which always produces a reply:
//!
//! 1. Greeting fast-path, answered locally
//! 2. Tool agent on the advanced backend, with the analysis tools
//! 3. Plain completion on the simple backend
//! 4. Canned keyword replies, which cannot fail
//!
//! ```ignore
//! let resolver = ResponseResolver::new(BackendRouter::from_env(), ResolverSettings::default());
//! let request = ChatRequest::new("how's ETH looking", "prime", vec![])?;
//! let resolution = resolver.resolve(&request).await?;
//! println!("{} ({})", resolution.reply, resolution.source.as_str());
//! ```

pub mod canned;
pub mod history;
pub mod persona;
pub mod resolver;
pub mod tool_agent;

#[cfg(test)]
mod testing;

pub use history::{ChatRole, ChatTurn};
pub use persona::{AgentId, Persona, UnknownAgent};
pub use resolver::*;
pub use tool_agent::{AgentOutput, AgentRun, ToolAgent, ToolAgentError};
