//! Read-only execution log endpoints.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;

use hostflow_app::ports::{
    ActionExecutor, ActionRepository, ExecutionStore, RuleRepository, SuggestionGenerator,
    TriggerRepository,
};
use hostflow_domain::execution::ExecutionRecord;
use hostflow_domain::id::ExecutionRecordId;

use crate::error::ApiError;
use crate::state::AppState;

const DEFAULT_LIMIT: u32 = 100;
const MAX_LIMIT: u32 = 1_000;

#[derive(Deserialize)]
pub struct ListQuery {
    pub limit: Option<u32>,
}

/// `GET /api/workflow-logs[?limit=N]` — most recent records first.
pub async fn list<TR, AR, RR, ES, X, G>(
    State(state): State<AppState<TR, AR, RR, ES, X, G>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ExecutionRecord>>, ApiError>
where
    TR: TriggerRepository + Send + Sync + 'static,
    AR: ActionRepository + Send + Sync + 'static,
    RR: RuleRepository + Send + Sync + 'static,
    ES: ExecutionStore + Send + Sync + 'static,
    X: ActionExecutor + Send + Sync + 'static,
    G: SuggestionGenerator + Send + Sync + 'static,
{
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    let records = state.rule_service.recent_executions(limit).await?;
    Ok(Json(records))
}

/// `GET /api/workflow-logs/{id}` — one execution record.
pub async fn get<TR, AR, RR, ES, X, G>(
    State(state): State<AppState<TR, AR, RR, ES, X, G>>,
    Path(id): Path<String>,
) -> Result<Json<ExecutionRecord>, ApiError>
where
    TR: TriggerRepository + Send + Sync + 'static,
    AR: ActionRepository + Send + Sync + 'static,
    RR: RuleRepository + Send + Sync + 'static,
    ES: ExecutionStore + Send + Sync + 'static,
    X: ActionExecutor + Send + Sync + 'static,
    G: SuggestionGenerator + Send + Sync + 'static,
{
    let record_id = ExecutionRecordId::from_str(&id)?;
    let record = state.rule_service.get_execution(record_id).await?;
    Ok(Json(record))
}
