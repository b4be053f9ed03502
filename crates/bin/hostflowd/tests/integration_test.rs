//! End-to-end tests for the full hostflowd stack.
//!
//! Each test spins up the complete application (in-memory `SQLite`, real repos,
//! real services, real axum router, unconfigured Gemini generator) and
//! exercises the HTTP layer via `tower::ServiceExt::oneshot`, so no TCP port is
//! bound. Time is driven by a [`FixedClock`].

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{TimeDelta, TimeZone, Utc};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use hostflow_adapter_gemini::{GeminiConfig, GeminiSuggestionGenerator};
use hostflow_adapter_http_axum::router;
use hostflow_adapter_http_axum::state::AppState;
use hostflow_adapter_storage_sqlite_sqlx::pool::Config;
use hostflow_adapter_storage_sqlite_sqlx::{
    SqliteActionRepository, SqliteExecutionStore, SqliteRuleRepository, SqliteTriggerRepository,
};
use hostflow_app::catalog::RuleCatalog;
use hostflow_app::dispatcher::TriggerDispatcher;
use hostflow_app::executor::SimulatedActionExecutor;
use hostflow_app::ports::SharedClock;
use hostflow_app::reconciler::Reconciler;
use hostflow_app::seed::seed_vocabulary;
use hostflow_app::services::rule_service::RuleService;
use hostflow_app::suggestions::SuggestionService;
use hostflow_app::testing::FixedClock;

struct TestApp {
    router: axum::Router,
    clock: Arc<FixedClock>,
}

/// Build a fully-wired router backed by an in-memory `SQLite` database.
async fn app() -> TestApp {
    let db = Config {
        database_url: "sqlite::memory:".to_string(),
    }
    .build()
    .await
    .expect("in-memory database should initialise");
    let pool = db.pool().clone();

    let triggers = SqliteTriggerRepository::new(pool.clone());
    let actions = SqliteActionRepository::new(pool.clone());
    let rules = SqliteRuleRepository::new(pool.clone());
    let executions = SqliteExecutionStore::new(pool);
    seed_vocabulary(&triggers, &actions).await.unwrap();

    let clock = Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
    ));
    let shared: SharedClock = clock.clone();

    let state = AppState::new(
        RuleCatalog::new(triggers.clone(), actions.clone(), rules.clone()),
        RuleService::new(
            triggers.clone(),
            actions.clone(),
            rules.clone(),
            executions.clone(),
            shared.clone(),
        ),
        TriggerDispatcher::new(
            RuleCatalog::new(triggers.clone(), actions.clone(), rules.clone()),
            executions.clone(),
            shared.clone(),
        ),
        Reconciler::new(executions, SimulatedActionExecutor, shared.clone()),
        SuggestionService::new(
            RuleCatalog::new(triggers, actions, rules.clone()),
            rules,
            GeminiSuggestionGenerator::new(GeminiConfig::default()).unwrap(),
            shared,
        ),
    );

    TestApp {
        router: router::build(state),
        clock,
    }
}

async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn id_of<'a>(items: &'a Value, name: &str) -> &'a Value {
    &items
        .as_array()
        .unwrap()
        .iter()
        .find(|item| item["name"] == name)
        .unwrap_or_else(|| panic!("{name} should be seeded"))["id"]
}

// ---------------------------------------------------------------------------
// Health check & vocabulary
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_return_ok_when_health_check_called() {
    let app = app().await;

    let resp = app
        .router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn should_serve_seeded_vocabulary() {
    let app = app().await;

    let (_, triggers) = send(&app.router, "GET", "/api/triggers", None).await;
    let (_, actions) = send(&app.router, "GET", "/api/actions", None).await;

    assert_eq!(triggers.as_array().unwrap().len(), 9);
    assert_eq!(actions.as_array().unwrap().len(), 5);
    assert_eq!(actions[0]["name"], "Create Task");
}

// ---------------------------------------------------------------------------
// Dispatch & reconciliation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_run_inventory_scenario_end_to_end() {
    let app = app().await;
    let (_, triggers) = send(&app.router, "GET", "/api/triggers", None).await;
    let (_, actions) = send(&app.router, "GET", "/api/actions", None).await;
    let inventory_low = id_of(&triggers, "Inventory running low").clone();

    let (status, _) = send(
        &app.router,
        "POST",
        "/api/rules",
        Some(json!({
            "name": "Low Inventory Alert",
            "trigger_id": inventory_low,
            "action_id": id_of(&actions, "Send Native Notification"),
            "rule_type": "immediate"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    app.clock.advance(TimeDelta::seconds(1));
    let (status, reorder) = send(
        &app.router,
        "POST",
        "/api/rules",
        Some(json!({
            "name": "Delayed Reorder Task",
            "trigger_id": inventory_low,
            "action_id": id_of(&actions, "Create Task"),
            "rule_type": "scheduled",
            "delay_time": 1,
            "delay_unit": "days"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, outcome) = send(
        &app.router,
        "POST",
        "/api/rules/simulate-trigger",
        Some(json!({ "trigger_name": "Inventory running low" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["rules_processed_count"], 2);
    assert_eq!(outcome["simulation_errors"], json!([]));
    let created = outcome["simulated_logs_created"].as_array().unwrap();
    assert_eq!(created[0]["status"], "SIMULATED_IMMEDIATE");
    assert_eq!(created[0]["action_name"], "Send Native Notification");
    assert_eq!(created[1]["status"], "SIMULATED_SCHEDULED");
    assert_eq!(created[1]["logged_at"], "2025-03-01T09:00:01Z");
    assert_eq!(created[1]["scheduled_execution_time"], "2025-03-02T09:00:01Z");

    let (_, early) = send(&app.router, "POST", "/api/tasks/process-scheduled", None).await;
    assert_eq!(early, json!({ "status": "success", "processed": 0, "errors": 0 }));

    app.clock.advance(TimeDelta::days(1));
    let (_, due) = send(&app.router, "POST", "/api/tasks/process-scheduled", None).await;
    assert_eq!(due, json!({ "status": "success", "processed": 1, "errors": 0 }));

    let (_, again) = send(&app.router, "POST", "/api/tasks/process-scheduled", None).await;
    assert_eq!(again, json!({ "status": "success", "processed": 0, "errors": 0 }));

    let uri = format!("/api/rules/{}/workflow-logs", reorder["id"].as_str().unwrap());
    let (_, logs) = send(&app.router, "GET", &uri, None).await;
    assert_eq!(logs.as_array().unwrap().len(), 1);
    assert_eq!(logs[0]["status"], "EXECUTED");
    assert!(logs[0]["actual_execution_time"].is_string());
}

#[tokio::test]
async fn should_report_zero_rules_for_trigger_without_rules() {
    let app = app().await;

    let (status, outcome) = send(
        &app.router,
        "POST",
        "/api/rules/simulate-trigger",
        Some(json!({ "trigger_name": "Smart Device Alert" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["rules_processed_count"], 0);
    assert_eq!(outcome["simulated_logs_created"], json!([]));
}

#[tokio::test]
async fn should_delete_execution_history_with_rule() {
    let app = app().await;
    let (_, triggers) = send(&app.router, "GET", "/api/triggers", None).await;
    let (_, actions) = send(&app.router, "GET", "/api/actions", None).await;
    let (_, rule) = send(
        &app.router,
        "POST",
        "/api/rules",
        Some(json!({
            "name": "Welcome Email",
            "trigger_id": id_of(&triggers, "Guest checks in"),
            "action_id": id_of(&actions, "Send Email"),
            "rule_type": "immediate"
        })),
    )
    .await;
    send(
        &app.router,
        "POST",
        "/api/rules/simulate-trigger",
        Some(json!({ "trigger_name": "Guest checks in" })),
    )
    .await;
    let (_, logs) = send(&app.router, "GET", "/api/workflow-logs", None).await;
    assert_eq!(logs.as_array().unwrap().len(), 1);

    let uri = format!("/api/rules/{}", rule["id"].as_str().unwrap());
    let (status, _) = send(&app.router, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, logs) = send(&app.router, "GET", "/api/workflow-logs", None).await;
    assert_eq!(logs, json!([]));
}

// ---------------------------------------------------------------------------
// Suggestions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_report_bad_gateway_when_generator_is_not_configured() {
    let app = app().await;

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/rules/suggest",
        Some(json!({ "text": "Email guests when they check in" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("not configured"));
}

#[tokio::test]
async fn should_confirm_suggestion_into_stored_rule() {
    let app = app().await;

    let (status, rule) = send(
        &app.router,
        "POST",
        "/api/rules/suggest/confirm",
        Some(json!({
            "suggestion": {
                "workflow_name": "Post-Checkout Cleaning",
                "trigger_name": "guest checks out",
                "action_name": "create task",
                "rule_type": "scheduled",
                "delay_time": "2",
                "delay_unit": "hours"
            }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(rule["delay_time"], 2);

    let (_, rules) = send(&app.router, "GET", "/api/rules", None).await;
    assert_eq!(rules.as_array().unwrap().len(), 1);
    assert_eq!(rules[0]["name"], "Post-Checkout Cleaning");
}
