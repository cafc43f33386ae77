//! War Room API Tests
//!
//! Drive the full router with `oneshot` requests: offline chat, request
//! validation, a stub model backend, and the desk mutations.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use neurogrid_agents::{ResolverSettings, ResponseResolver};
use neurogrid_desk::Desk;
use neurogrid_llm::{
    BackendRouterBuilder, CompletionRequest, CompletionResponse, LLMProvider, ProviderKind, Result as LLMResult,
};
use neurogrid_war_room::{create_router, ApiConfig, AppState};

fn offline_router() -> Router {
    create_router(Arc::new(AppState::offline()), ApiConfig::default())
}

async fn send(router: &Router, method: &str, uri: &str, body: Body) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(body)
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap_or(json!(null));
    (status, json)
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    send(router, "GET", uri, Body::empty()).await
}

async fn post(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(router, "POST", uri, Body::from(serde_json::to_vec(&body).unwrap())).await
}

/// Tool-capable backend that answers every request with one line
struct FixedReply;

#[async_trait]
impl LLMProvider for FixedReply {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Custom
    }

    fn model(&self) -> &str {
        "fixed-model"
    }

    fn supports_tools(&self) -> bool {
        true
    }

    async fn complete(&self, _request: CompletionRequest) -> LLMResult<CompletionResponse> {
        Ok(CompletionResponse::new("ETH funding positive, watching $3,420."))
    }
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_reports_offline_backends() {
    let router = offline_router();
    let (status, json) = get(&router, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["backends"]["advanced"], Value::Null);
    assert_eq!(json["backends"]["simple"], Value::Null);
}

// =============================================================================
// Chat
// =============================================================================

mod chat {
    use super::*;

    #[tokio::test]
    async fn test_offline_eth_reply_is_canned() {
        let router = offline_router();
        let (status, json) = post(
            &router,
            "/api/chat",
            json!({"message": "how's ETH looking", "agentId": "prime", "conversationHistory": []}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["source"], "canned");
        assert_eq!(json["confidence"], 0.5);
        assert!(json["response"]
            .as_str()
            .unwrap()
            .starts_with("ETH currently showing bullish momentum"));
        assert_eq!(json["metadata"]["usedTools"], false);
        assert!(json["metadata"]["responseTimeMs"].is_u64());
    }

    #[tokio::test]
    async fn test_greeting_without_history_field() {
        let router = offline_router();
        let (status, json) = post(&router, "/api/chat", json!({"message": "hi", "agentId": "cto"})).await;

        assert_eq!(status, StatusCode::OK);
        assert!(json["response"].as_str().unwrap().starts_with("CTO here."));
    }

    #[tokio::test]
    async fn test_invalid_requests_are_400() {
        let router = offline_router();
        let bodies = [
            json!({"agentId": "prime"}),
            json!({"message": 42, "agentId": "prime"}),
            json!({"message": "   ", "agentId": "prime"}),
            json!({"message": "eth?", "agentId": "sentinel"}),
            json!({"message": "eth?"}),
            json!({"message": "eth?", "agentId": "prime", "conversationHistory": [{"role": "system", "content": "x"}]}),
            json!({"message": "eth?", "agentId": "prime", "conversationHistory": "nope"}),
        ];

        for body in bodies {
            let (status, json) = post(&router, "/api/chat", body.clone()).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
            assert!(json["error"].is_string(), "body: {}", body);
        }
    }

    #[tokio::test]
    async fn test_malformed_json_is_400() {
        let router = offline_router();
        let (status, json) = send(&router, "POST", "/api/chat", Body::from("{not json")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("Invalid request body"));
    }

    #[tokio::test]
    async fn test_model_reply_from_tool_agent() {
        let backends = BackendRouterBuilder::new().with_advanced(Arc::new(FixedReply)).build();
        let state = AppState::new(
            ResponseResolver::new(backends, ResolverSettings::default()),
            Desk::new(),
        );
        let router = create_router(Arc::new(state), ApiConfig::default());

        let (status, json) = post(
            &router,
            "/api/chat",
            json!({
                "message": "eth?",
                "agentId": "prime",
                "conversationHistory": [
                    {"role": "user", "content": "btc?"},
                    {"role": "assistant", "content": "ranging"}
                ]
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["source"], "tool-agent");
        assert_eq!(json["confidence"], 1.0);
        assert_eq!(json["response"], "ETH funding positive, watching $3,420.");
        assert_eq!(json["metadata"]["model"], "fixed-model");
        assert_eq!(json["metadata"]["usedTools"], false);

        let (_, health) = get(&router, "/health").await;
        assert_eq!(health["backends"]["advanced"], "custom");
    }
}

// =============================================================================
// Desk
// =============================================================================

mod desk {
    use super::*;

    #[tokio::test]
    async fn test_snapshot_and_panels() {
        let router = offline_router();

        let (status, json) = get(&router, "/api/desk").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["agents"].as_array().unwrap().len(), 5);
        assert_eq!(json["proposals"].as_array().unwrap().len(), 2);
        assert_eq!(json["portfolio"]["value"], 1000.0);
        assert_eq!(json["halted"], false);

        let (_, agents) = get(&router, "/api/agents").await;
        assert_eq!(agents[4]["id"], "cto");

        let (_, constitution) = get(&router, "/api/constitution").await;
        assert_eq!(constitution["greenZoneLimit"], "$20");
        assert_eq!(constitution["yellowZoneLimit"], "$100");
    }

    #[tokio::test]
    async fn test_approve_then_reject_flow() {
        let router = offline_router();

        let (status, json) = post(&router, "/api/proposals/1/approve", json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["trade"]["ticker"], "ETH-USDC");
        let tx_hash = json["trade"]["txHash"].as_str().unwrap().to_string();

        let (_, executions) = get(&router, "/api/executions").await;
        assert_eq!(executions.as_array().unwrap().len(), 3);
        assert_eq!(executions[0]["txHash"], tx_hash.as_str());

        let (status, _) = post(&router, "/api/proposals/1/approve", json!({})).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, json) = post(&router, "/api/proposals/2/reject", json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["proposal"]["ticker"], "PEPE-SOL");

        let (_, proposals) = get(&router, "/api/proposals").await;
        assert!(proposals.as_array().unwrap().is_empty());

        let (status, json) = post(&router, "/api/proposals/7/reject", json!({})).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn test_halt_blocks_approvals() {
        let router = offline_router();

        let (status, json) = post(&router, "/api/halt", json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["halted"], true);
        assert_eq!(json["cancelled"], 2);

        let (_, desk) = get(&router, "/api/desk").await;
        assert_eq!(desk["halted"], true);
        assert!(desk["proposals"].as_array().unwrap().is_empty());

        // the queue is empty, but approvals are refused before lookup
        let (status, json) = post(&router, "/api/proposals/1/approve", json!({})).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"], "Trading is halted");
    }
}
