//! # hostflow-adapter-gemini
//!
//! [`SuggestionGenerator`](hostflow_app::ports::SuggestionGenerator) backed by
//! the Gemini `generateContent` REST API, called through
//! [reqwest](https://docs.rs/reqwest).
//!
//! ## Responsibilities
//! - Build the request: system instruction listing the vocabulary and the
//!   output shape, a handful of worked examples, JSON response mime type
//! - Call the API once per prompt; no retries
//! - Turn the model's text into a [`SuggestionResponse`](hostflow_domain::suggestion::SuggestionResponse)
//!
//! Every failure (missing key, transport, non-2xx, empty or unparseable
//! output) surfaces as an
//! [`ExternalServiceError`](hostflow_domain::error::ExternalServiceError).
//!
//! ## Dependency rule
//! Depends on `hostflow-app` (for the port trait) and `hostflow-domain`.

mod client;
mod config;
mod prompt;

pub use client::GeminiSuggestionGenerator;
pub use config::GeminiConfig;
