//! # hostflow-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a JSON API for the catalog (`/api/triggers`, `/api/actions`,
//!   `/api/rules`) and the execution log (`/api/workflow-logs`)
//! - Expose trigger simulation and the suggestion preview / confirm flow
//! - Expose `/api/tasks/process-scheduled` for external schedulers
//! - Map application errors onto HTTP status codes
//!
//! ## Dependency rule
//! Depends on `hostflow-app` (for port traits and services) and
//! `hostflow-domain` (for domain types used in request/response mapping).
//! Never leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
