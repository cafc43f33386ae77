//! LLM Provider implementations

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::*;

/// Trait for LLM providers
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &'static str;

    /// Get the provider kind
    fn kind(&self) -> ProviderKind;

    /// Model identifier reported in reply metadata
    fn model(&self) -> &str;

    /// Whether the provider honours `CompletionRequest::tools`
    fn supports_tools(&self) -> bool {
        false
    }

    /// Complete a conversation
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;
}

async fn error_for_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after_seconds = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);
        return Err(LLMError::RateLimited { retry_after_seconds });
    }
    let body = response.text().await.unwrap_or_default();
    Err(LLMError::RequestFailed {
        message: format!("HTTP {}: {}", status, body),
    })
}

// ============================================================================
// OpenAI-Compatible Provider (advanced, tool-capable)
// ============================================================================

/// Configuration for the OpenAI-compatible provider
#[derive(Debug, Clone)]
pub struct OpenAICompatConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl OpenAICompatConfig {
    /// Both halves of the credential pair must be present
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var("AGENT_LLM_BASE_URL").ok().filter(|v| !v.trim().is_empty())?;
        let api_key = std::env::var("AGENT_LLM_API_KEY").ok().filter(|v| !v.trim().is_empty())?;
        Some(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model: std::env::var("AGENT_LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
        })
    }
}

/// OpenAI-compatible chat API provider with function calling
pub struct OpenAICompatProvider {
    config: OpenAICompatConfig,
    client: reqwest::Client,
}

impl OpenAICompatProvider {
    pub fn new(config: OpenAICompatConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Option<Self> {
        Some(Self::new(OpenAICompatConfig::from_env()?))
    }
}

#[derive(Serialize)]
struct OpenAIChatRequest {
    model: String,
    messages: Vec<OpenAIChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<OpenAITool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
}

#[derive(Serialize, Deserialize)]
struct OpenAIChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<OpenAIToolCall>,
}

#[derive(Serialize)]
struct OpenAITool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: OpenAIFunction,
}

#[derive(Serialize)]
struct OpenAIFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Serialize, Deserialize)]
struct OpenAIToolCall {
    id: String,
    #[serde(rename = "type", default = "function_kind")]
    kind: String,
    function: OpenAIFunctionCall,
}

#[derive(Serialize, Deserialize)]
struct OpenAIFunctionCall {
    name: String,
    /// JSON-encoded arguments object
    arguments: String,
}

fn function_kind() -> String {
    "function".to_string()
}

#[derive(Deserialize)]
struct OpenAIChatResponse {
    choices: Vec<OpenAIChatChoice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIChatChoice {
    message: OpenAIChatMessage,
}

#[derive(Deserialize, Default)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

impl From<&Message> for OpenAIChatMessage {
    fn from(msg: &Message) -> Self {
        let tool_calls = msg
            .tool_calls
            .iter()
            .map(|call| OpenAIToolCall {
                id: call.id.clone(),
                kind: function_kind(),
                function: OpenAIFunctionCall {
                    name: call.name.clone(),
                    arguments: call.arguments.to_string(),
                },
            })
            .collect::<Vec<_>>();

        // Assistant turns that only request tools carry a null content
        let content = if msg.content.is_empty() && !tool_calls.is_empty() {
            None
        } else {
            Some(msg.content.clone())
        };

        Self {
            role: msg.role.as_str().to_string(),
            content,
            tool_call_id: msg.tool_call_id.clone(),
            tool_calls,
        }
    }
}

impl From<OpenAIToolCall> for ToolCall {
    fn from(call: OpenAIToolCall) -> Self {
        // Unparseable arguments are passed through as a string so the tool
        // layer can report the problem back to the model.
        let arguments = serde_json::from_str(&call.function.arguments)
            .unwrap_or(serde_json::Value::String(call.function.arguments));
        Self {
            id: call.id,
            name: call.function.name,
            arguments,
        }
    }
}

#[async_trait]
impl LLMProvider for OpenAICompatProvider {
    fn name(&self) -> &'static str {
        "OpenAI-Compatible"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAICompat
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn supports_tools(&self) -> bool {
        true
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let mut messages: Vec<OpenAIChatMessage> = vec![];

        if let Some(ref system) = request.system {
            messages.push(OpenAIChatMessage::from(&Message::system(system.clone())));
        }
        messages.extend(request.messages.iter().map(OpenAIChatMessage::from));

        let tools = request
            .tools
            .unwrap_or_default()
            .into_iter()
            .map(|spec| OpenAITool {
                kind: "function",
                function: OpenAIFunction {
                    name: spec.name,
                    description: spec.description,
                    parameters: spec.parameters,
                },
            })
            .collect::<Vec<_>>();

        let tool_choice = (!tools.is_empty()).then_some("auto");

        let chat_request = OpenAIChatRequest {
            model: self.config.model.clone(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: false,
            tools,
            tool_choice,
        };

        let url = format!("{}/chat/completions", self.config.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&chat_request)
            .send()
            .await
            .map_err(|e| LLMError::NetworkError {
                message: e.to_string(),
            })?;

        let response = error_for_status(response).await?;

        let chat_response: OpenAIChatResponse =
            response.json().await.map_err(|e| LLMError::InvalidResponse {
                message: e.to_string(),
            })?;

        let model = chat_response
            .model
            .clone()
            .unwrap_or_else(|| self.config.model.clone());
        let usage = chat_response.usage.unwrap_or_default();

        let message = chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| LLMError::InvalidResponse {
                message: "response contained no choices".to_string(),
            })?;

        Ok(CompletionResponse {
            content: message.content.unwrap_or_default(),
            tool_calls: message.tool_calls.into_iter().map(ToolCall::from).collect(),
            usage: TokenUsage {
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: usage.completion_tokens,
                total_tokens: usage.total_tokens,
            },
            model: Some(model),
        })
    }
}

// ============================================================================
// Hugging Face Provider (simple text generation)
// ============================================================================

/// Configuration for the Hugging Face Inference API provider
#[derive(Debug, Clone)]
pub struct HuggingFaceConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl HuggingFaceConfig {
    pub fn from_env() -> Option<Self> {
        Some(Self {
            base_url: std::env::var("HUGGINGFACE_BASE_URL")
                .unwrap_or_else(|_| "https://api-inference.huggingface.co/models".to_string()),
            api_key: std::env::var("HUGGINGFACE_API_KEY")
                .ok()
                .filter(|v| !v.trim().is_empty())?,
            model: std::env::var("HUGGINGFACE_MODEL")
                .unwrap_or_else(|_| "Qwen/Qwen2.5-7B-Instruct".to_string()),
        })
    }
}

/// Hugging Face hosted text-generation provider
pub struct HuggingFaceProvider {
    config: HuggingFaceConfig,
    client: reqwest::Client,
}

impl HuggingFaceProvider {
    pub fn new(config: HuggingFaceConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Option<Self> {
        Some(Self::new(HuggingFaceConfig::from_env()?))
    }
}

#[derive(Serialize)]
struct HuggingFaceRequest {
    inputs: String,
    parameters: HuggingFaceParameters,
}

#[derive(Serialize)]
struct HuggingFaceParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_new_tokens: Option<u32>,
    return_full_text: bool,
}

#[derive(Deserialize)]
struct HuggingFaceGeneration {
    generated_text: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum HuggingFaceResponse {
    Batch(Vec<HuggingFaceGeneration>),
    Single(HuggingFaceGeneration),
    Error {
        error: String,
        #[serde(default)]
        estimated_time: Option<f64>,
    },
}

/// Flatten a request into a single text-generation prompt
///
/// User content is inserted verbatim so callers can pass a pre-rendered
/// transcript; other roles get a speaker label. A trailing user message
/// ends the prompt as given and carries its own speaker cue, otherwise an
/// `Assistant:` cue is appended.
pub fn render_prompt(request: &CompletionRequest) -> String {
    let mut sections = Vec::with_capacity(request.messages.len() + 2);
    if let Some(ref system) = request.system {
        sections.push(system.clone());
    }
    for msg in &request.messages {
        sections.push(match msg.role {
            MessageRole::User => msg.content.clone(),
            MessageRole::Assistant => format!("Assistant: {}", msg.content),
            MessageRole::System => format!("System: {}", msg.content),
            MessageRole::Tool => format!("Tool: {}", msg.content),
        });
    }
    let ends_with_user = matches!(request.messages.last(), Some(msg) if msg.role == MessageRole::User);
    if !ends_with_user {
        sections.push("Assistant:".to_string());
    }
    sections.join("\n\n")
}

#[async_trait]
impl LLMProvider for HuggingFaceProvider {
    fn name(&self) -> &'static str {
        "HuggingFace"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::HuggingFace
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let hf_request = HuggingFaceRequest {
            inputs: render_prompt(&request),
            parameters: HuggingFaceParameters {
                temperature: request.temperature,
                max_new_tokens: request.max_tokens,
                return_full_text: false,
            },
        };

        let model = self.config.model.clone();
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), model);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&hf_request)
            .send()
            .await
            .map_err(|e| LLMError::NetworkError {
                message: e.to_string(),
            })?;

        // A cold model answers 503 with an estimated load time
        let status = response.status();
        if status == reqwest::StatusCode::SERVICE_UNAVAILABLE {
            if let Ok(HuggingFaceResponse::Error { estimated_time, .. }) = response.json().await {
                return Err(LLMError::ModelLoading {
                    estimated_seconds: estimated_time.unwrap_or(0.0).ceil() as u64,
                });
            }
            return Err(LLMError::ProviderNotAvailable {
                provider: self.name().to_string(),
            });
        }
        let response = error_for_status(response).await?;

        let hf_response: HuggingFaceResponse =
            response.json().await.map_err(|e| LLMError::InvalidResponse {
                message: e.to_string(),
            })?;

        let content = match hf_response {
            HuggingFaceResponse::Batch(generations) => generations
                .into_iter()
                .next()
                .map(|g| g.generated_text)
                .unwrap_or_default(),
            HuggingFaceResponse::Single(generation) => generation.generated_text,
            HuggingFaceResponse::Error { error, .. } => {
                return Err(LLMError::RequestFailed { message: error });
            }
        };

        Ok(CompletionResponse {
            content: content.trim().to_string(),
            tool_calls: vec![],
            usage: TokenUsage::default(),
            model: Some(model),
        })
    }
}
