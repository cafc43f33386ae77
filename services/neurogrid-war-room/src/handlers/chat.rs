//! Chat Handler
//!
//! `POST /api/chat` - one message in, one reply out. The body is parsed by
//! hand so that malformed JSON gets the same `{error}` shape as every other
//! rejection.

use std::sync::Arc;

use axum::{body::Bytes, extract::State, Json};
use serde::{Deserialize, Serialize};

use neurogrid_agents::{ChatRequest, ChatTurn, ResponseSource};

use crate::error::{ApiResult, AppError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatBody {
    pub message: String,
    pub agent_id: String,
    #[serde(default)]
    pub conversation_history: Vec<ChatTurn>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub response: String,
    pub source: ResponseSource,
    /// 1.0 for model replies, 0.5 for canned ones
    pub confidence: f64,
    pub metadata: ChatMetadata,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub used_tools: bool,
    pub response_time_ms: u64,
}

pub async fn chat(State(state): State<Arc<AppState>>, body: Bytes) -> ApiResult<Json<ChatResponse>> {
    let body: ChatBody = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid request body: {}", e)))?;
    let request = ChatRequest::new(&body.message, &body.agent_id, body.conversation_history)?;

    let resolution = state.resolver.resolve(&request).await?;

    Ok(Json(ChatResponse {
        response: resolution.reply,
        source: resolution.source,
        confidence: resolution.source.confidence(),
        metadata: ChatMetadata {
            model: resolution.model,
            used_tools: resolution.used_tools,
            response_time_ms: resolution.elapsed.as_millis() as u64,
        },
    }))
}
