//! # hostflow-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the catalog and execution store ports defined in `hostflow-app::ports`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `hostflow-app` (for port traits) and `hostflow-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod columns;
pub mod error;
pub mod pool;

mod action_repo;
mod execution_store;
mod rule_repo;
mod trigger_repo;

pub use action_repo::SqliteActionRepository;
pub use execution_store::SqliteExecutionStore;
pub use rule_repo::SqliteRuleRepository;
pub use trigger_repo::SqliteTriggerRepository;
