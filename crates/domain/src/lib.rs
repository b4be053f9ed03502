//! # hostflow-domain
//!
//! Pure domain model for the hostflow automation-rule engine.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define the **Catalog**: triggers, actions and the rules binding them
//! - Define **Schedules** (immediate, or a fixed delay in minutes/hours/days)
//! - Define **Execution records** and their status state machine
//! - Map untrusted rule **suggestions** onto the controlled vocabulary
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod catalog;
pub mod execution;
pub mod suggestion;
pub mod vocabulary;
