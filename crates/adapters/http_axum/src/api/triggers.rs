//! JSON handlers for the trigger vocabulary.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, State};

use hostflow_app::ports::{
    ActionExecutor, ActionRepository, ExecutionStore, RuleRepository, SuggestionGenerator,
    TriggerRepository,
};
use hostflow_domain::catalog::Trigger;
use hostflow_domain::id::TriggerId;

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/triggers` — list all triggers by name.
pub async fn list<TR, AR, RR, ES, X, G>(
    State(state): State<AppState<TR, AR, RR, ES, X, G>>,
) -> Result<Json<Vec<Trigger>>, ApiError>
where
    TR: TriggerRepository + Send + Sync + 'static,
    AR: ActionRepository + Send + Sync + 'static,
    RR: RuleRepository + Send + Sync + 'static,
    ES: ExecutionStore + Send + Sync + 'static,
    X: ActionExecutor + Send + Sync + 'static,
    G: SuggestionGenerator + Send + Sync + 'static,
{
    let triggers = state.catalog.list_triggers().await?;
    Ok(Json(triggers))
}

/// `GET /api/triggers/{id}` — get a trigger by ID.
pub async fn get<TR, AR, RR, ES, X, G>(
    State(state): State<AppState<TR, AR, RR, ES, X, G>>,
    Path(id): Path<String>,
) -> Result<Json<Trigger>, ApiError>
where
    TR: TriggerRepository + Send + Sync + 'static,
    AR: ActionRepository + Send + Sync + 'static,
    RR: RuleRepository + Send + Sync + 'static,
    ES: ExecutionStore + Send + Sync + 'static,
    X: ActionExecutor + Send + Sync + 'static,
    G: SuggestionGenerator + Send + Sync + 'static,
{
    let trigger_id = TriggerId::from_str(&id)?;
    let trigger = state.catalog.get_trigger(trigger_id).await?;
    Ok(Json(trigger))
}
