//! JSON REST handlers for rules.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use hostflow_app::ports::{
    ActionExecutor, ActionRepository, ExecutionStore, RuleRepository, SuggestionGenerator,
    TriggerRepository,
};
use hostflow_app::services::rule_service::RuleDraft;
use hostflow_domain::catalog::Rule;
use hostflow_domain::execution::ExecutionRecord;
use hostflow_domain::id::{ActionId, RuleId, TriggerId};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for creating or replacing a rule.
#[derive(Deserialize)]
pub struct RuleRequest {
    pub name: String,
    pub description: Option<String>,
    pub trigger_id: TriggerId,
    pub action_id: ActionId,
    pub rule_type: String,
    pub delay_time: Option<i64>,
    pub delay_unit: Option<String>,
    pub is_active: Option<bool>,
}

impl From<RuleRequest> for RuleDraft {
    fn from(req: RuleRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            trigger_id: req.trigger_id,
            action_id: req.action_id,
            rule_type: req.rule_type,
            delay_time: req.delay_time,
            delay_unit: req.delay_unit,
            is_active: req.is_active.unwrap_or(true),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<Rule>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    NoContent,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

fn parse_rule_id(raw: &str) -> Result<RuleId, ApiError> {
    Ok(RuleId::from_str(raw)?)
}

/// `GET /api/rules` — list all rules, newest first.
pub async fn list<TR, AR, RR, ES, X, G>(
    State(state): State<AppState<TR, AR, RR, ES, X, G>>,
) -> Result<Json<Vec<Rule>>, ApiError>
where
    TR: TriggerRepository + Send + Sync + 'static,
    AR: ActionRepository + Send + Sync + 'static,
    RR: RuleRepository + Send + Sync + 'static,
    ES: ExecutionStore + Send + Sync + 'static,
    X: ActionExecutor + Send + Sync + 'static,
    G: SuggestionGenerator + Send + Sync + 'static,
{
    let rules = state.rule_service.list_rules().await?;
    Ok(Json(rules))
}

/// `GET /api/rules/{id}` — get rule by ID.
pub async fn get<TR, AR, RR, ES, X, G>(
    State(state): State<AppState<TR, AR, RR, ES, X, G>>,
    Path(id): Path<String>,
) -> Result<Json<Rule>, ApiError>
where
    TR: TriggerRepository + Send + Sync + 'static,
    AR: ActionRepository + Send + Sync + 'static,
    RR: RuleRepository + Send + Sync + 'static,
    ES: ExecutionStore + Send + Sync + 'static,
    X: ActionExecutor + Send + Sync + 'static,
    G: SuggestionGenerator + Send + Sync + 'static,
{
    let rule = state.rule_service.get_rule(parse_rule_id(&id)?).await?;
    Ok(Json(rule))
}

/// `POST /api/rules` — create a new rule.
pub async fn create<TR, AR, RR, ES, X, G>(
    State(state): State<AppState<TR, AR, RR, ES, X, G>>,
    Json(req): Json<RuleRequest>,
) -> Result<CreateResponse, ApiError>
where
    TR: TriggerRepository + Send + Sync + 'static,
    AR: ActionRepository + Send + Sync + 'static,
    RR: RuleRepository + Send + Sync + 'static,
    ES: ExecutionStore + Send + Sync + 'static,
    X: ActionExecutor + Send + Sync + 'static,
    G: SuggestionGenerator + Send + Sync + 'static,
{
    let created = state.rule_service.create_rule(req.into()).await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `PUT /api/rules/{id}` — replace an existing rule.
pub async fn update<TR, AR, RR, ES, X, G>(
    State(state): State<AppState<TR, AR, RR, ES, X, G>>,
    Path(id): Path<String>,
    Json(req): Json<RuleRequest>,
) -> Result<Json<Rule>, ApiError>
where
    TR: TriggerRepository + Send + Sync + 'static,
    AR: ActionRepository + Send + Sync + 'static,
    RR: RuleRepository + Send + Sync + 'static,
    ES: ExecutionStore + Send + Sync + 'static,
    X: ActionExecutor + Send + Sync + 'static,
    G: SuggestionGenerator + Send + Sync + 'static,
{
    let rule_id = parse_rule_id(&id)?;
    let updated = state.rule_service.update_rule(rule_id, req.into()).await?;
    Ok(Json(updated))
}

/// `DELETE /api/rules/{id}` — delete a rule and its execution history.
pub async fn delete<TR, AR, RR, ES, X, G>(
    State(state): State<AppState<TR, AR, RR, ES, X, G>>,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError>
where
    TR: TriggerRepository + Send + Sync + 'static,
    AR: ActionRepository + Send + Sync + 'static,
    RR: RuleRepository + Send + Sync + 'static,
    ES: ExecutionStore + Send + Sync + 'static,
    X: ActionExecutor + Send + Sync + 'static,
    G: SuggestionGenerator + Send + Sync + 'static,
{
    state.rule_service.delete_rule(parse_rule_id(&id)?).await?;
    Ok(DeleteResponse::NoContent)
}

/// `GET /api/rules/{id}/workflow-logs` — execution history of one rule.
pub async fn executions<TR, AR, RR, ES, X, G>(
    State(state): State<AppState<TR, AR, RR, ES, X, G>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ExecutionRecord>>, ApiError>
where
    TR: TriggerRepository + Send + Sync + 'static,
    AR: ActionRepository + Send + Sync + 'static,
    RR: RuleRepository + Send + Sync + 'static,
    ES: ExecutionStore + Send + Sync + 'static,
    X: ActionExecutor + Send + Sync + 'static,
    G: SuggestionGenerator + Send + Sync + 'static,
{
    let records = state
        .rule_service
        .executions_for_rule(parse_rule_id(&id)?)
        .await?;
    Ok(Json(records))
}
