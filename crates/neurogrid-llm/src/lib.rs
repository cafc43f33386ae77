//! NeuroGrid LLM - Backend abstraction for the war-room agents
//!
//! Two kinds of backend sit behind the [`LLMProvider`] trait:
//!
//! ## Advanced backend (tool-capable)
//! - Any OpenAI-compatible chat-completions endpoint that supports
//!   function calling. Enabled by the `AGENT_LLM_BASE_URL` +
//!   `AGENT_LLM_API_KEY` credential pair.
//!
//! ## Simple backend (plain text generation)
//! - Hugging Face Inference API. Enabled by `HUGGINGFACE_API_KEY`.
//!
//! ## Key Design Principles
//!
//! 1. Backends only ever produce text or tool-call requests
//! 2. No backend configured means no network call is ever made
//! 3. Callers own timeouts and fallback; providers just report errors

pub mod providers;
pub mod router;
pub mod types;

pub use providers::*;
pub use router::*;
pub use types::*;
