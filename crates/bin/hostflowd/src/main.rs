//! # hostflowd — hostflow daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (CLI args, env vars, config file)
//! - Initialize logging
//! - Initialize the `SQLite` connection pool, run migrations, seed the vocabulary
//! - Construct repository implementations (adapters)
//! - Construct application services, injecting repositories via port traits
//! - `serve`: build the axum router, start the reconcile loop, serve until
//!   SIGTERM/SIGINT
//! - `process-scheduled`: run one reconciliation pass and exit
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hostflow_adapter_gemini::{GeminiConfig, GeminiSuggestionGenerator};
use hostflow_adapter_http_axum::state::AppState;
use hostflow_adapter_storage_sqlite_sqlx::pool::{Config as DatabaseConfig, Database};
use hostflow_adapter_storage_sqlite_sqlx::{
    SqliteActionRepository, SqliteExecutionStore, SqliteRuleRepository, SqliteTriggerRepository,
};
use hostflow_app::catalog::RuleCatalog;
use hostflow_app::dispatcher::TriggerDispatcher;
use hostflow_app::executor::SimulatedActionExecutor;
use hostflow_app::ports::SystemClock;
use hostflow_app::reconciler::{ReconcileLoop, Reconciler};
use hostflow_app::seed::seed_vocabulary;
use hostflow_app::services::rule_service::RuleService;
use hostflow_app::suggestions::SuggestionService;

use crate::config::Config;

type SqliteReconciler = Reconciler<SqliteExecutionStore, SimulatedActionExecutor>;

#[derive(Debug, Parser)]
#[command(name = "hostflowd", version, about = "Hospitality workflow automation daemon")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "HOSTFLOW_CONFIG", default_value = "hostflow.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Default, Subcommand)]
enum Command {
    /// Serve the HTTP API and run the background reconcile loop.
    #[default]
    Serve,
    /// Advance every due scheduled record once, print the counts and exit.
    ProcessScheduled,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    init_tracing(&config.logging.filter);

    let db = DatabaseConfig {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await
    .context("opening database")?;

    match cli.command.unwrap_or_default() {
        Command::Serve => serve(&config, &db).await,
        Command::ProcessScheduled => process_scheduled(&db).await,
    }
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|err| {
        eprintln!("invalid log filter {filter:?} ({err}), falling back to info");
        EnvFilter::new("info")
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn reconciler(db: &Database) -> SqliteReconciler {
    Reconciler::new(
        SqliteExecutionStore::new(db.pool().clone()),
        SimulatedActionExecutor,
        SystemClock::shared(),
    )
}

async fn process_scheduled(db: &Database) -> anyhow::Result<()> {
    let summary = reconciler(db)
        .reconcile_now()
        .await
        .context("processing scheduled records")?;
    println!(
        "processed {} scheduled record(s), {} error(s)",
        summary.processed, summary.errors
    );
    Ok(())
}

async fn serve(config: &Config, db: &Database) -> anyhow::Result<()> {
    let pool = db.pool().clone();
    let clock = SystemClock::shared();

    // Repositories
    let triggers = SqliteTriggerRepository::new(pool.clone());
    let actions = SqliteActionRepository::new(pool.clone());
    let rules = SqliteRuleRepository::new(pool.clone());
    let executions = SqliteExecutionStore::new(pool);

    let report = seed_vocabulary(&triggers, &actions)
        .await
        .context("seeding vocabulary")?;
    tracing::info!(
        triggers_created = report.triggers_created,
        actions_created = report.actions_created,
        "vocabulary seeded"
    );

    // Services
    let catalog = RuleCatalog::new(triggers.clone(), actions.clone(), rules.clone());
    let rule_service = RuleService::new(
        triggers.clone(),
        actions.clone(),
        rules.clone(),
        executions.clone(),
        Arc::clone(&clock),
    );
    let dispatcher = TriggerDispatcher::new(
        RuleCatalog::new(triggers.clone(), actions.clone(), rules.clone()),
        executions.clone(),
        Arc::clone(&clock),
    );
    let reconciler = Arc::new(reconciler(db));
    let suggestions = SuggestionService::new(
        RuleCatalog::new(triggers, actions, rules.clone()),
        rules,
        suggestion_generator(&config.suggestions)?,
        clock,
    );

    let sweep = config.scheduler.enabled.then(|| {
        tracing::info!(interval_secs = config.scheduler.interval_secs, "starting reconcile loop");
        ReconcileLoop::start(
            Arc::clone(&reconciler),
            Duration::from_secs(config.scheduler.interval_secs),
        )
    });

    // HTTP
    let state = AppState::from_arcs(
        Arc::new(catalog),
        Arc::new(rule_service),
        Arc::new(dispatcher),
        reconciler,
        Arc::new(suggestions),
    );
    let app = hostflow_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {bind_addr}"))?;
    tracing::info!(addr = %bind_addr, "hostflowd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(sweep) = sweep {
        sweep.abort();
    }
    tracing::info!("hostflowd stopped");
    Ok(())
}

fn suggestion_generator(config: &GeminiConfig) -> anyhow::Result<GeminiSuggestionGenerator> {
    tracing::debug!(?config, "configuring suggestion generator");
    GeminiSuggestionGenerator::new(config.clone()).context("building suggestion generator")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received ctrl-c"),
        () = terminate => tracing::info!("received SIGTERM"),
    }
}
