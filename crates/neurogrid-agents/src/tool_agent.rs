//! Tool agent - a model bound to a persona and the analysis tools
//!
//! The agent loops: ask the model, run any tools it requests, feed the
//! results back, and stop once the model answers in plain text.

use std::sync::Arc;

use neurogrid_llm::{CompletionRequest, LLMError, LLMProvider, Message};
use neurogrid_tools::AnalysisToolSet;
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

pub const DEFAULT_MAX_ROUNDS: usize = 5;

#[derive(Error, Debug)]
pub enum ToolAgentError {
    #[error("Backend error: {0}")]
    Backend(#[from] LLMError),

    #[error("No final answer after {max_rounds} model rounds")]
    RoundsExhausted { max_rounds: usize },
}

/// Whatever an agent run produced
#[derive(Debug, Clone)]
pub enum AgentOutput {
    /// Full transcript; the final answer is the last entry
    Messages(Vec<Message>),
    Text(String),
    Structured(serde_json::Value),
}

impl AgentOutput {
    /// The reply text carried by this output
    pub fn into_text(self) -> String {
        match self {
            Self::Messages(messages) => messages.into_iter().last().map(|m| m.content).unwrap_or_default(),
            Self::Text(text) => text,
            Self::Structured(value) => match value {
                serde_json::Value::String(text) => text,
                other => other.to_string(),
            },
        }
    }
}

/// Result of one agent run
#[derive(Debug, Clone)]
pub struct AgentRun {
    pub output: AgentOutput,
    /// Number of tool invocations performed
    pub tool_calls: usize,
    pub model: String,
}

pub struct ToolAgent {
    provider: Arc<dyn LLMProvider>,
    tools: AnalysisToolSet,
    system_prompt: String,
    max_rounds: usize,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

impl ToolAgent {
    pub fn new(provider: Arc<dyn LLMProvider>, tools: AnalysisToolSet, system_prompt: impl Into<String>) -> Self {
        Self {
            provider,
            tools,
            system_prompt: system_prompt.into(),
            max_rounds: DEFAULT_MAX_ROUNDS,
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds.max(1);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Run the loop over `messages` (history plus the new user message)
    pub async fn run(&self, messages: Vec<Message>) -> Result<AgentRun, ToolAgentError> {
        let specs = self.tools.specs();
        let mut transcript = messages;
        let mut tool_calls = 0;
        let mut rng = StdRng::from_entropy();

        for round in 0..self.max_rounds {
            let mut request = CompletionRequest::new(transcript.clone())
                .with_system(self.system_prompt.clone())
                .with_tools(specs.clone());
            if let Some(max_tokens) = self.max_tokens {
                request = request.with_max_tokens(max_tokens);
            }
            if let Some(temperature) = self.temperature {
                request = request.with_temperature(temperature);
            }

            let response = self.provider.complete(request).await?;
            let model = response
                .model
                .clone()
                .unwrap_or_else(|| self.provider.model().to_string());

            if !response.wants_tools() {
                transcript.push(Message::assistant(response.content));
                return Ok(AgentRun {
                    output: AgentOutput::Messages(transcript),
                    tool_calls,
                    model,
                });
            }

            tracing::debug!(round, requested = response.tool_calls.len(), "Model requested tools");
            transcript.push(Message::assistant_tool_calls(
                response.content,
                response.tool_calls.clone(),
            ));

            for call in response.tool_calls {
                let result = match self.tools.invoke(&call.name, &call.arguments, &mut rng) {
                    Ok(value) => value.to_string(),
                    Err(e) => {
                        tracing::warn!(tool = %call.name, error = %e, "Tool invocation failed");
                        serde_json::json!({ "error": e.to_string() }).to_string()
                    }
                };
                transcript.push(Message::tool(call.id, call.name, result));
                tool_calls += 1;
            }
        }

        Err(ToolAgentError::RoundsExhausted {
            max_rounds: self.max_rounds,
        })
    }
}
