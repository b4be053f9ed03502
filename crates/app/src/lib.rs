//! # hostflow-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `TriggerRepository`, `ActionRepository`, `RuleRepository` — the catalog
//!   - `ExecutionStore` — append & query execution records, conditional save
//!   - `Clock` — current time
//!   - `ActionExecutor` — perform (simulate) an action
//!   - `SuggestionGenerator` — natural language in, rule candidates out
//! - Define **driving/inbound** use-cases:
//!   - `RuleCatalog` — lookups by trigger and by name
//!   - `RuleService` — rule CRUD and execution history
//!   - `TriggerDispatcher` — fire a trigger, write one record per rule
//!   - `Reconciler` — advance due scheduled records, plus its background loop
//!   - `SuggestionService` — preview and confirm suggested rules
//!   - `seed_vocabulary` — insert the controlled vocabulary
//!
//! ## Dependency rule
//! Depends on `hostflow-domain` only (plus `tokio` for the background loop).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod catalog;
pub mod dispatcher;
pub mod executor;
pub mod ports;
pub mod reconciler;
pub mod seed;
pub mod services;
pub mod suggestions;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
