//! JSON handlers for the action vocabulary.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, State};

use hostflow_app::ports::{
    ActionExecutor, ActionRepository, ExecutionStore, RuleRepository, SuggestionGenerator,
    TriggerRepository,
};
use hostflow_domain::catalog::Action;
use hostflow_domain::id::ActionId;

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/actions` — list all actions by name.
pub async fn list<TR, AR, RR, ES, X, G>(
    State(state): State<AppState<TR, AR, RR, ES, X, G>>,
) -> Result<Json<Vec<Action>>, ApiError>
where
    TR: TriggerRepository + Send + Sync + 'static,
    AR: ActionRepository + Send + Sync + 'static,
    RR: RuleRepository + Send + Sync + 'static,
    ES: ExecutionStore + Send + Sync + 'static,
    X: ActionExecutor + Send + Sync + 'static,
    G: SuggestionGenerator + Send + Sync + 'static,
{
    let actions = state.catalog.list_actions().await?;
    Ok(Json(actions))
}

/// `GET /api/actions/{id}` — get an action by ID.
pub async fn get<TR, AR, RR, ES, X, G>(
    State(state): State<AppState<TR, AR, RR, ES, X, G>>,
    Path(id): Path<String>,
) -> Result<Json<Action>, ApiError>
where
    TR: TriggerRepository + Send + Sync + 'static,
    AR: ActionRepository + Send + Sync + 'static,
    RR: RuleRepository + Send + Sync + 'static,
    ES: ExecutionStore + Send + Sync + 'static,
    X: ActionExecutor + Send + Sync + 'static,
    G: SuggestionGenerator + Send + Sync + 'static,
{
    let action_id = ActionId::from_str(&id)?;
    let action = state.catalog.get_action(action_id).await?;
    Ok(Json(action))
}
