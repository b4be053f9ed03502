//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`HostflowError`] via `#[from]`. Adapters box their own error types into
//! the [`HostflowError::Storage`] variant.

use crate::execution::ExecutionStatus;

/// Top-level error shared by every crate in the workspace.
#[derive(Debug, thiserror::Error)]
pub enum HostflowError {
    /// Malformed rule, schedule or suggestion field.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A named or identified entity does not exist.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// The persistence layer failed.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A conditional update lost against a concurrent writer.
    #[error(transparent)]
    Conflict(#[from] ConflictError),

    /// The external suggestion generator failed.
    #[error(transparent)]
    ExternalService(#[from] ExternalServiceError),

    /// A (simulated) action failed while being executed.
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

/// Domain validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("invalid rule type '{0}', expected 'immediate' or 'scheduled'")]
    InvalidRuleType(String),

    #[error("scheduled rules require both delay_time and delay_unit")]
    MissingDelay,

    #[error("delay time must be a positive integer, got {0}")]
    NonPositiveDelay(i64),

    #[error("invalid delay unit '{0}', expected 'minutes', 'hours' or 'days'")]
    InvalidDelayUnit(String),

    #[error("scheduled execution time is out of range")]
    DelayOutOfRange,

    #[error("cannot move execution record from {from} to {to}")]
    InvalidTransition {
        from: ExecutionStatus,
        to: ExecutionStatus,
    },

    #[error("prompt text must not be empty")]
    EmptyPrompt,

    #[error("suggestion cannot be saved: {0}")]
    IncompleteSuggestion(String),

    #[error("invalid identifier '{0}'")]
    InvalidId(String),

    #[error("{0} is required")]
    MissingField(&'static str),
}

/// A lookup by id or name found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} '{id}' not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// A conditional update affected no row because the stored status moved on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} '{id}' is no longer in status {expected}")]
pub struct ConflictError {
    pub entity: &'static str,
    pub id: String,
    pub expected: ExecutionStatus,
}

/// Failure of the out-of-core suggestion generator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExternalServiceError {
    #[error("suggestion generator is not configured: {0}")]
    NotConfigured(String),

    #[error("suggestion generator unreachable: {0}")]
    Unreachable(String),

    #[error("suggestion generator returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("suggestion generator returned an empty response")]
    EmptyResponse,

    #[error("suggestion generator returned unparseable output: {0}")]
    InvalidResponse(String),
}

/// Failure while executing an action for an execution record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("action '{action}' failed: {reason}")]
pub struct ExecutionError {
    pub action: String,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_render_not_found_with_entity_and_id() {
        let err = NotFoundError {
            entity: "Trigger",
            id: "Guest checks in".to_string(),
        };
        assert_eq!(err.to_string(), "Trigger 'Guest checks in' not found");
    }

    #[test]
    fn should_convert_validation_error_into_hostflow_error() {
        let err: HostflowError = ValidationError::MissingDelay.into();
        assert!(matches!(
            err,
            HostflowError::Validation(ValidationError::MissingDelay)
        ));
    }

    #[test]
    fn should_name_both_states_in_invalid_transition() {
        let err = ValidationError::InvalidTransition {
            from: ExecutionStatus::Executed,
            to: ExecutionStatus::Processing,
        };
        assert_eq!(
            err.to_string(),
            "cannot move execution record from EXECUTED to PROCESSING"
        );
    }
}
