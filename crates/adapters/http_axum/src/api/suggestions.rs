//! Suggestion preview and confirmation endpoints.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use hostflow_app::ports::{
    ActionExecutor, ActionRepository, ExecutionStore, RuleRepository, SuggestionGenerator,
    TriggerRepository,
};
use hostflow_domain::catalog::Rule;
use hostflow_domain::suggestion::{SuggestionCandidate, SuggestionPreview};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SuggestRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Deserialize)]
pub struct ConfirmRequest {
    pub suggestion: SuggestionCandidate,
}

/// Possible responses from the confirm endpoint.
pub enum ConfirmResponse {
    Created(Json<Rule>),
}

impl IntoResponse for ConfirmResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// `POST /api/rules/suggest` — turn free text into previewed rules.
/// Nothing is saved.
pub async fn suggest<TR, AR, RR, ES, X, G>(
    State(state): State<AppState<TR, AR, RR, ES, X, G>>,
    Json(req): Json<SuggestRequest>,
) -> Result<Json<SuggestionPreview>, ApiError>
where
    TR: TriggerRepository + Send + Sync + 'static,
    AR: ActionRepository + Send + Sync + 'static,
    RR: RuleRepository + Send + Sync + 'static,
    ES: ExecutionStore + Send + Sync + 'static,
    X: ActionExecutor + Send + Sync + 'static,
    G: SuggestionGenerator + Send + Sync + 'static,
{
    let preview = state.suggestions.suggest(&req.text).await?;
    Ok(Json(preview))
}

/// `POST /api/rules/suggest/confirm` — save one previewed suggestion.
pub async fn confirm<TR, AR, RR, ES, X, G>(
    State(state): State<AppState<TR, AR, RR, ES, X, G>>,
    Json(req): Json<ConfirmRequest>,
) -> Result<ConfirmResponse, ApiError>
where
    TR: TriggerRepository + Send + Sync + 'static,
    AR: ActionRepository + Send + Sync + 'static,
    RR: RuleRepository + Send + Sync + 'static,
    ES: ExecutionStore + Send + Sync + 'static,
    X: ActionExecutor + Send + Sync + 'static,
    G: SuggestionGenerator + Send + Sync + 'static,
{
    let rule = state.suggestions.confirm(req.suggestion).await?;
    Ok(ConfirmResponse::Created(Json(rule)))
}
