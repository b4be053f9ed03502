//! Trigger simulation endpoint.

use std::str::FromStr;

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use hostflow_app::dispatcher::{DispatchError, DispatchOutcome};
use hostflow_app::ports::{
    ActionExecutor, ActionRepository, ExecutionStore, RuleRepository, SuggestionGenerator,
    TriggerRepository,
};
use hostflow_domain::error::ValidationError;
use hostflow_domain::execution::ExecutionRecord;
use hostflow_domain::id::{ExecutionRecordId, RuleId, TriggerId};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body: the trigger to fire, by id or by exact name.
///
/// The id wins when both are given.
#[derive(Deserialize)]
pub struct SimulateRequest {
    pub trigger_id: Option<String>,
    pub trigger_name: Option<String>,
}

#[derive(Serialize)]
pub struct SimulationIssue {
    pub rule_id: RuleId,
    pub rule_name: String,
    pub details: String,
    pub log_id: Option<ExecutionRecordId>,
}

impl From<DispatchError> for SimulationIssue {
    fn from(err: DispatchError) -> Self {
        Self {
            rule_id: err.rule_id,
            rule_name: err.rule_name,
            details: err.reason,
            log_id: err.record_id,
        }
    }
}

/// Summary of one simulated firing.
#[derive(Serialize)]
pub struct SimulateResponse {
    pub rules_processed_count: usize,
    pub simulated_logs_created: Vec<ExecutionRecord>,
    pub simulation_errors: Vec<SimulationIssue>,
}

impl From<DispatchOutcome> for SimulateResponse {
    fn from(outcome: DispatchOutcome) -> Self {
        Self {
            rules_processed_count: outcome.rules_processed,
            simulated_logs_created: outcome.created,
            simulation_errors: outcome.errors.into_iter().map(Into::into).collect(),
        }
    }
}

/// `POST /api/rules/simulate-trigger` — fire a trigger and record what its
/// active rules would do.
pub async fn simulate<TR, AR, RR, ES, X, G>(
    State(state): State<AppState<TR, AR, RR, ES, X, G>>,
    Json(req): Json<SimulateRequest>,
) -> Result<Json<SimulateResponse>, ApiError>
where
    TR: TriggerRepository + Send + Sync + 'static,
    AR: ActionRepository + Send + Sync + 'static,
    RR: RuleRepository + Send + Sync + 'static,
    ES: ExecutionStore + Send + Sync + 'static,
    X: ActionExecutor + Send + Sync + 'static,
    G: SuggestionGenerator + Send + Sync + 'static,
{
    let outcome = match (req.trigger_id, req.trigger_name) {
        (Some(raw), _) => {
            let trigger_id = TriggerId::from_str(&raw)?;
            state.dispatcher.dispatch_by_id(trigger_id).await?
        }
        (None, Some(name)) => state.dispatcher.dispatch(&name).await?,
        (None, None) => {
            return Err(ValidationError::MissingField("trigger_id or trigger_name").into());
        }
    };
    Ok(Json(outcome.into()))
}
