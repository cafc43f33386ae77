//! Response resolver - the staged cascade behind the chat endpoint
//!
//! ```text
//! greeting ──► tool agent ──► plain model ──► canned
//!  (local)     (advanced,      (simple,        (local,
//!               45s budget)     25s budget)     cannot fail)
//! ```
//!
//! Each remote stage runs on its own task raced against a timer. A stage
//! that times out, errors, panics or produces blank text is recorded and
//! the next stage runs. A stage whose backend is not configured is skipped
//! without any network call.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use neurogrid_llm::{BackendRouter, CompletionRequest, LLMError, LLMProvider, Message};
use neurogrid_tools::AnalysisToolSet;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use thiserror::Error;
use tokio::time::Instant;

use crate::canned;
use crate::history::{self, ChatTurn};
use crate::persona::AgentId;
use crate::tool_agent::{ToolAgent, ToolAgentError};

/// Budgets and windows for the remote stages
#[derive(Debug, Clone)]
pub struct ResolverSettings {
    pub tool_agent_timeout: Duration,
    pub plain_model_timeout: Duration,
    /// Trailing turns given to the tool agent
    pub tool_agent_history: usize,
    /// Trailing turns rendered into the plain prompt
    pub plain_model_history: usize,
    pub max_tool_rounds: usize,
    pub tool_agent_max_tokens: u32,
    pub plain_model_max_tokens: u32,
    pub temperature: f32,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            tool_agent_timeout: Duration::from_secs(45),
            plain_model_timeout: Duration::from_secs(25),
            tool_agent_history: 8,
            plain_model_history: 6,
            max_tool_rounds: crate::tool_agent::DEFAULT_MAX_ROUNDS,
            tool_agent_max_tokens: 300,
            plain_model_max_tokens: 200,
            temperature: 0.7,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unexpected failure: {0}")]
    Unexpected(String),
}

/// Why a stage did not produce the reply
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StageFailure {
    #[error("backend not configured")]
    Unconfigured,

    #[error("timed out after {}ms", .budget.as_millis())]
    Timeout { budget: Duration },

    #[error("{0}")]
    Backend(String),

    #[error("backend returned an empty reply")]
    EmptyReply,
}

impl From<LLMError> for StageFailure {
    fn from(e: LLMError) -> Self {
        Self::Backend(e.to_string())
    }
}

impl From<ToolAgentError> for StageFailure {
    fn from(e: ToolAgentError) -> Self {
        Self::Backend(e.to_string())
    }
}

/// A validated chat request
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub agent: AgentId,
    /// Trimmed message text, never empty
    pub message: String,
    pub history: Vec<ChatTurn>,
}

impl ChatRequest {
    pub fn new(message: &str, agent_id: &str, history: Vec<ChatTurn>) -> Result<Self, ResolveError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ResolveError::InvalidRequest("message must not be empty".to_string()));
        }
        let agent = agent_id
            .parse::<AgentId>()
            .map_err(|e| ResolveError::InvalidRequest(e.to_string()))?;

        Ok(Self {
            agent,
            message: message.to_string(),
            history,
        })
    }
}

/// Where the final reply came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseSource {
    ToolAgent,
    PlainModel,
    Canned,
}

impl ResponseSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ToolAgent => "tool-agent",
            Self::PlainModel => "plain-model",
            Self::Canned => "canned",
        }
    }

    pub fn confidence(&self) -> f64 {
        match self {
            Self::ToolAgent | Self::PlainModel => 1.0,
            Self::Canned => 0.5,
        }
    }
}

/// Cascade stages, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    Greeting,
    ToolAgent,
    PlainModel,
    CannedFallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Succeeded,
    Skipped,
    TimedOut,
    Failed { reason: String },
}

impl From<&StageFailure> for AttemptOutcome {
    fn from(failure: &StageFailure) -> Self {
        match failure {
            StageFailure::Unconfigured => Self::Skipped,
            StageFailure::Timeout { .. } => Self::TimedOut,
            other => Self::Failed {
                reason: other.to_string(),
            },
        }
    }
}

/// One stage's try at answering
#[derive(Debug, Clone)]
pub struct ReplyAttempt {
    pub backend: Backend,
    pub outcome: AttemptOutcome,
    pub elapsed: Duration,
    pub budget: Option<Duration>,
}

/// The reply plus how it was reached
#[derive(Debug, Clone)]
pub struct Resolution {
    pub reply: String,
    pub source: ResponseSource,
    pub model: Option<String>,
    pub used_tools: bool,
    pub attempts: Vec<ReplyAttempt>,
    pub elapsed: Duration,
}

struct StageReply {
    text: String,
    model: Option<String>,
    tool_calls: usize,
}

/// Resolves chat messages through the cascade
#[derive(Debug, Clone)]
pub struct ResponseResolver {
    backends: BackendRouter,
    tools: AnalysisToolSet,
    settings: ResolverSettings,
}

impl ResponseResolver {
    pub fn new(backends: BackendRouter, settings: ResolverSettings) -> Self {
        Self {
            backends,
            tools: AnalysisToolSet::default(),
            settings,
        }
    }

    pub fn with_tools(mut self, tools: AnalysisToolSet) -> Self {
        self.tools = tools;
        self
    }

    pub fn backends(&self) -> &BackendRouter {
        &self.backends
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    pub async fn resolve(&self, request: &ChatRequest) -> Result<Resolution, ResolveError> {
        let mut rng = StdRng::from_entropy();
        self.resolve_with_rng(request, &mut rng).await
    }

    /// Resolve with an explicit random source for the canned stage
    pub async fn resolve_with_rng<R: Rng + ?Sized>(
        &self,
        request: &ChatRequest,
        rng: &mut R,
    ) -> Result<Resolution, ResolveError> {
        let started = Instant::now();
        let agent = request.agent;
        let mut attempts = Vec::with_capacity(4);

        if canned::is_greeting(&request.message) {
            attempts.push(ReplyAttempt {
                backend: Backend::Greeting,
                outcome: AttemptOutcome::Succeeded,
                elapsed: started.elapsed(),
                budget: None,
            });
            let reply = agent.persona().greeting.to_string();
            return Ok(finish(agent, reply, ResponseSource::Canned, None, false, attempts, started));
        }

        let budget = self.settings.tool_agent_timeout;
        let stage_start = Instant::now();
        let outcome = match self.backends.advanced() {
            Some(provider) => race(budget, self.tool_agent_stage(provider.clone(), request)).await,
            None => Err(StageFailure::Unconfigured),
        };
        if let Some(reply) = record(agent, Backend::ToolAgent, outcome, stage_start, budget, &mut attempts) {
            return Ok(finish(
                agent,
                reply.text,
                ResponseSource::ToolAgent,
                reply.model,
                reply.tool_calls > 0,
                attempts,
                started,
            ));
        }

        let budget = self.settings.plain_model_timeout;
        let stage_start = Instant::now();
        let outcome = match self.backends.simple() {
            Some(provider) => race(budget, self.plain_model_stage(provider.clone(), request)).await,
            None => Err(StageFailure::Unconfigured),
        };
        if let Some(reply) = record(agent, Backend::PlainModel, outcome, stage_start, budget, &mut attempts) {
            return Ok(finish(
                agent,
                reply.text,
                ResponseSource::PlainModel,
                reply.model,
                false,
                attempts,
                started,
            ));
        }

        let stage_start = Instant::now();
        let reply = canned::fallback_reply(agent, &request.message, rng)
            .ok_or_else(|| ResolveError::Unexpected(format!("no canned reply available for {}", agent)))?;
        attempts.push(ReplyAttempt {
            backend: Backend::CannedFallback,
            outcome: AttemptOutcome::Succeeded,
            elapsed: stage_start.elapsed(),
            budget: None,
        });

        Ok(finish(
            agent,
            reply.to_string(),
            ResponseSource::Canned,
            None,
            false,
            attempts,
            started,
        ))
    }

    fn tool_agent_stage(
        &self,
        provider: Arc<dyn LLMProvider>,
        request: &ChatRequest,
    ) -> impl Future<Output = Result<StageReply, StageFailure>> + Send + 'static {
        let persona = request.agent.persona();
        let agent = ToolAgent::new(provider, self.tools.clone(), persona.system_prompt)
            .with_max_rounds(self.settings.max_tool_rounds)
            .with_max_tokens(self.settings.tool_agent_max_tokens)
            .with_temperature(self.settings.temperature);

        let mut messages = history::to_messages(&history::trailing(
            &request.history,
            self.settings.tool_agent_history,
        ));
        messages.push(Message::user(request.message.clone()));

        async move {
            let run = agent.run(messages).await?;
            let tool_calls = run.tool_calls;
            let model = run.model;
            non_blank(run.output.into_text()).map(|text| StageReply {
                text,
                model: Some(model),
                tool_calls,
            })
        }
    }

    fn plain_model_stage(
        &self,
        provider: Arc<dyn LLMProvider>,
        request: &ChatRequest,
    ) -> impl Future<Output = Result<StageReply, StageFailure>> + Send + 'static {
        let persona = request.agent.persona();
        let turns = history::trailing(&request.history, self.settings.plain_model_history);
        let prompt = history::plain_prompt(persona, &turns, &request.message);
        let completion = CompletionRequest::new(vec![Message::user(prompt)])
            .with_system(persona.system_prompt)
            .with_max_tokens(self.settings.plain_model_max_tokens)
            .with_temperature(self.settings.temperature);

        async move {
            let response = provider.complete(completion).await?;
            let model = response.model.unwrap_or_else(|| provider.model().to_string());
            non_blank(response.content).map(|text| StageReply {
                text,
                model: Some(model),
                tool_calls: 0,
            })
        }
    }
}

fn non_blank(text: String) -> Result<String, StageFailure> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(StageFailure::EmptyReply)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Run `stage` on its own task, bounded by `budget`
///
/// On timeout the task is left to finish on its own; its result is dropped.
async fn race<T, F>(budget: Duration, stage: F) -> Result<T, StageFailure>
where
    T: Send + 'static,
    F: Future<Output = Result<T, StageFailure>> + Send + 'static,
{
    let task = tokio::spawn(stage);
    match tokio::time::timeout(budget, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(StageFailure::Backend(format!("backend task failed: {}", join_error))),
        Err(_) => Err(StageFailure::Timeout { budget }),
    }
}

fn record(
    agent: AgentId,
    backend: Backend,
    outcome: Result<StageReply, StageFailure>,
    stage_start: Instant,
    budget: Duration,
    attempts: &mut Vec<ReplyAttempt>,
) -> Option<StageReply> {
    let elapsed = stage_start.elapsed();
    match outcome {
        Ok(reply) => {
            attempts.push(ReplyAttempt {
                backend,
                outcome: AttemptOutcome::Succeeded,
                elapsed,
                budget: Some(budget),
            });
            Some(reply)
        }
        Err(failure) => {
            if failure == StageFailure::Unconfigured {
                tracing::debug!(agent = %agent, stage = ?backend, "Stage skipped, backend not configured");
            } else {
                tracing::warn!(
                    agent = %agent,
                    stage = ?backend,
                    elapsed_ms = elapsed.as_millis() as u64,
                    budget_ms = budget.as_millis() as u64,
                    reason = %failure,
                    "Stage failed, falling through"
                );
            }
            attempts.push(ReplyAttempt {
                backend,
                outcome: AttemptOutcome::from(&failure),
                elapsed,
                budget: Some(budget),
            });
            None
        }
    }
}

fn finish(
    agent: AgentId,
    reply: String,
    source: ResponseSource,
    model: Option<String>,
    used_tools: bool,
    attempts: Vec<ReplyAttempt>,
    started: Instant,
) -> Resolution {
    let elapsed = started.elapsed();
    tracing::info!(
        agent = %agent,
        source = source.as_str(),
        elapsed_ms = elapsed.as_millis() as u64,
        "Chat reply resolved"
    );
    Resolution {
        reply,
        source,
        model,
        used_tools,
        attempts,
        elapsed,
    }
}
