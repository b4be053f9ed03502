//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod actions;
#[allow(clippy::missing_errors_doc)]
pub mod rules;
#[allow(clippy::missing_errors_doc)]
pub mod simulate;
#[allow(clippy::missing_errors_doc)]
pub mod suggestions;
#[allow(clippy::missing_errors_doc)]
pub mod tasks;
#[allow(clippy::missing_errors_doc)]
pub mod triggers;
#[allow(clippy::missing_errors_doc)]
pub mod workflow_logs;

use axum::Router;
use axum::routing::{get, post};

use hostflow_app::ports::{
    ActionExecutor, ActionRepository, ExecutionStore, RuleRepository, SuggestionGenerator,
    TriggerRepository,
};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<TR, AR, RR, ES, X, G>() -> Router<AppState<TR, AR, RR, ES, X, G>>
where
    TR: TriggerRepository + Send + Sync + 'static,
    AR: ActionRepository + Send + Sync + 'static,
    RR: RuleRepository + Send + Sync + 'static,
    ES: ExecutionStore + Send + Sync + 'static,
    X: ActionExecutor + Send + Sync + 'static,
    G: SuggestionGenerator + Send + Sync + 'static,
{
    Router::new()
        // Vocabulary
        .route("/triggers", get(triggers::list::<TR, AR, RR, ES, X, G>))
        .route("/triggers/{id}", get(triggers::get::<TR, AR, RR, ES, X, G>))
        .route("/actions", get(actions::list::<TR, AR, RR, ES, X, G>))
        .route("/actions/{id}", get(actions::get::<TR, AR, RR, ES, X, G>))
        // Rules
        .route(
            "/rules",
            get(rules::list::<TR, AR, RR, ES, X, G>).post(rules::create::<TR, AR, RR, ES, X, G>),
        )
        .route(
            "/rules/{id}",
            get(rules::get::<TR, AR, RR, ES, X, G>)
                .put(rules::update::<TR, AR, RR, ES, X, G>)
                .delete(rules::delete::<TR, AR, RR, ES, X, G>),
        )
        .route(
            "/rules/{id}/workflow-logs",
            get(rules::executions::<TR, AR, RR, ES, X, G>),
        )
        .route(
            "/rules/simulate-trigger",
            post(simulate::simulate::<TR, AR, RR, ES, X, G>),
        )
        .route(
            "/rules/suggest",
            post(suggestions::suggest::<TR, AR, RR, ES, X, G>),
        )
        .route(
            "/rules/suggest/confirm",
            post(suggestions::confirm::<TR, AR, RR, ES, X, G>),
        )
        // Execution log
        .route(
            "/workflow-logs",
            get(workflow_logs::list::<TR, AR, RR, ES, X, G>),
        )
        .route(
            "/workflow-logs/{id}",
            get(workflow_logs::get::<TR, AR, RR, ES, X, G>),
        )
        // Operations
        .route(
            "/tasks/process-scheduled",
            post(tasks::process_scheduled::<TR, AR, RR, ES, X, G>),
        )
}
