//! Operational endpoints meant for external schedulers.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use hostflow_app::ports::{
    ActionExecutor, ActionRepository, ExecutionStore, RuleRepository, SuggestionGenerator,
    TriggerRepository,
};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct ProcessScheduledResponse {
    pub status: &'static str,
    pub processed: usize,
    pub errors: usize,
}

/// `POST /api/tasks/process-scheduled` — run one reconcile pass.
///
/// Safe to call repeatedly or concurrently: a record is only processed by
/// the caller that claims it.
pub async fn process_scheduled<TR, AR, RR, ES, X, G>(
    State(state): State<AppState<TR, AR, RR, ES, X, G>>,
) -> Result<Json<ProcessScheduledResponse>, ApiError>
where
    TR: TriggerRepository + Send + Sync + 'static,
    AR: ActionRepository + Send + Sync + 'static,
    RR: RuleRepository + Send + Sync + 'static,
    ES: ExecutionStore + Send + Sync + 'static,
    X: ActionExecutor + Send + Sync + 'static,
    G: SuggestionGenerator + Send + Sync + 'static,
{
    let summary = state.reconciler.reconcile_now().await?;
    Ok(Json(ProcessScheduledResponse {
        status: "success",
        processed: summary.processed,
        errors: summary.errors,
    }))
}
