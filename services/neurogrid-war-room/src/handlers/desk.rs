//! Desk Handlers
//!
//! Read and mutate the roster, proposal queue and execution ledger.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use neurogrid_desk::{AgentCard, DeskSnapshot, ExecutedTrade, TradeProposal};
use neurogrid_tools::ConstitutionView;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ApproveResponse {
    pub trade: ExecutedTrade,
}

#[derive(Debug, Serialize)]
pub struct RejectResponse {
    pub proposal: TradeProposal,
}

#[derive(Debug, Serialize)]
pub struct HaltResponse {
    pub halted: bool,
    pub cancelled: usize,
}

pub async fn snapshot(State(state): State<Arc<AppState>>) -> Json<DeskSnapshot> {
    Json(state.desk.snapshot().await)
}

pub async fn agents(State(state): State<Arc<AppState>>) -> Json<Vec<AgentCard>> {
    Json(state.desk.agents().await)
}

pub async fn proposals(State(state): State<Arc<AppState>>) -> Json<Vec<TradeProposal>> {
    Json(state.desk.proposals().await)
}

pub async fn executions(State(state): State<Arc<AppState>>) -> Json<Vec<ExecutedTrade>> {
    Json(state.desk.executions().await)
}

pub async fn constitution(State(state): State<Arc<AppState>>) -> Json<ConstitutionView> {
    Json(state.desk.constitution())
}

pub async fn approve(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApproveResponse>> {
    let mut rng = StdRng::from_entropy();
    let trade = state.desk.approve(&id, &mut rng).await?;
    Ok(Json(ApproveResponse { trade }))
}

pub async fn reject(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<RejectResponse>> {
    let proposal = state.desk.reject(&id).await?;
    Ok(Json(RejectResponse { proposal }))
}

pub async fn halt(State(state): State<Arc<AppState>>) -> Json<HaltResponse> {
    let cancelled = state.desk.emergency_halt().await;
    Json(HaltResponse {
        halted: true,
        cancelled,
    })
}
