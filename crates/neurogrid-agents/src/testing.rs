//! Scripted backend for resolver and agent tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use neurogrid_llm::{CompletionRequest, CompletionResponse, LLMError, LLMProvider, ProviderKind, Result};

/// What the backend does on one call
#[derive(Debug, Clone)]
pub enum Script {
    Reply(CompletionResponse),
    Fail,
    /// Never answers within any test budget
    Hang,
    Panic,
}

impl Script {
    pub fn text(content: &str) -> Self {
        Self::Reply(CompletionResponse::new(content))
    }
}

pub struct ScriptedProvider {
    tools: bool,
    script: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<CompletionRequest>>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    fn build(tools: bool, script: Vec<Script>) -> Arc<Self> {
        Arc::new(Self {
            tools,
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn tool_capable(script: Vec<Script>) -> Arc<Self> {
        Self::build(true, script)
    }

    pub fn plain(script: Vec<Script>) -> Arc<Self> {
        Self::build(false, script)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The `index`-th request received
    pub fn request(&self, index: usize) -> Option<CompletionRequest> {
        self.requests.lock().unwrap().get(index).cloned()
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Custom
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    fn supports_tools(&self) -> bool {
        self.tools
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        let next = self.script.lock().unwrap().pop_front();

        match next {
            Some(Script::Reply(response)) => Ok(response),
            Some(Script::Fail) | None => Err(LLMError::RequestFailed {
                message: "scripted failure".to_string(),
            }),
            Some(Script::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(LLMError::NetworkError {
                    message: "hung".to_string(),
                })
            }
            Some(Script::Panic) => panic!("scripted panic"),
        }
    }
}
