//! Execution records — the audit trail of rule firings.
//!
//! ```text
//! SimulatedImmediate                         (terminal, written by dispatch)
//! SimulationError                            (terminal, written by dispatch)
//! SimulatedScheduled --claim--> Processing --complete--> Executed
//!                                          \--fail-----> ExecutionError
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::{ExecutionRecordId, RuleId};
use crate::time::Timestamp;

/// Lifecycle state of an [`ExecutionRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    SimulatedImmediate,
    SimulatedScheduled,
    SimulationError,
    Processing,
    Executed,
    ExecutionError,
}

impl ExecutionStatus {
    /// Wire/storage representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SimulatedImmediate => "SIMULATED_IMMEDIATE",
            Self::SimulatedScheduled => "SIMULATED_SCHEDULED",
            Self::SimulationError => "SIMULATION_ERROR",
            Self::Processing => "PROCESSING",
            Self::Executed => "EXECUTED",
            Self::ExecutionError => "EXECUTION_ERROR",
        }
    }

    /// Whether no further transition is possible.
    ///
    /// Immediate records are terminal from the moment they are written; they
    /// are never handed to the reconciler.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::SimulatedScheduled | Self::Processing)
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SIMULATED_IMMEDIATE" => Ok(Self::SimulatedImmediate),
            "SIMULATED_SCHEDULED" => Ok(Self::SimulatedScheduled),
            "SIMULATION_ERROR" => Ok(Self::SimulationError),
            "PROCESSING" => Ok(Self::Processing),
            "EXECUTED" => Ok(Self::Executed),
            "EXECUTION_ERROR" => Ok(Self::ExecutionError),
            other => Err(format!("unknown execution status: {other}")),
        }
    }
}

/// One firing of one rule.
///
/// Trigger and action names are snapshots taken at firing time, so history
/// survives later renames or deletions in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub id: ExecutionRecordId,
    pub rule_id: RuleId,
    pub status: ExecutionStatus,
    pub trigger_name: String,
    pub action_name: String,
    pub logged_at: Timestamp,
    pub scheduled_execution_time: Option<Timestamp>,
    pub actual_execution_time: Option<Timestamp>,
    pub details: Option<String>,
}

impl ExecutionRecord {
    fn new(
        rule_id: RuleId,
        status: ExecutionStatus,
        trigger_name: impl Into<String>,
        action_name: impl Into<String>,
        logged_at: Timestamp,
    ) -> Self {
        Self {
            id: ExecutionRecordId::new(),
            rule_id,
            status,
            trigger_name: trigger_name.into(),
            action_name: action_name.into(),
            logged_at,
            scheduled_execution_time: None,
            actual_execution_time: None,
            details: None,
        }
    }

    /// Record of an immediate rule, simulated at `now`.
    #[must_use]
    pub fn simulated_immediate(
        rule_id: RuleId,
        trigger_name: impl Into<String>,
        action_name: impl Into<String>,
        now: Timestamp,
    ) -> Self {
        let mut record = Self::new(
            rule_id,
            ExecutionStatus::SimulatedImmediate,
            trigger_name,
            action_name,
            now,
        );
        record.actual_execution_time = Some(now);
        record.details = Some(format!(
            "Simulated immediate execution of action '{}'",
            record.action_name
        ));
        record
    }

    /// Record of a delayed rule, due at `due_at`.
    #[must_use]
    pub fn simulated_scheduled(
        rule_id: RuleId,
        trigger_name: impl Into<String>,
        action_name: impl Into<String>,
        now: Timestamp,
        due_at: Timestamp,
    ) -> Self {
        let mut record = Self::new(
            rule_id,
            ExecutionStatus::SimulatedScheduled,
            trigger_name,
            action_name,
            now,
        );
        record.scheduled_execution_time = Some(due_at);
        record.details = Some(format!(
            "Action '{}' scheduled for {}",
            record.action_name,
            due_at.to_rfc3339()
        ));
        record
    }

    /// Record of a rule that could not be simulated.
    #[must_use]
    pub fn simulation_error(
        rule_id: RuleId,
        trigger_name: impl Into<String>,
        action_name: impl Into<String>,
        now: Timestamp,
        reason: impl Into<String>,
    ) -> Self {
        let mut record = Self::new(
            rule_id,
            ExecutionStatus::SimulationError,
            trigger_name,
            action_name,
            now,
        );
        record.details = Some(reason.into());
        record
    }

    fn transition(&mut self, from: ExecutionStatus, to: ExecutionStatus) -> Result<(), ValidationError> {
        if self.status != from {
            return Err(ValidationError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    /// Mark a due scheduled record as in flight.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidTransition`] unless the record is
    /// `SimulatedScheduled`.
    pub fn claim(&mut self) -> Result<(), ValidationError> {
        self.transition(ExecutionStatus::SimulatedScheduled, ExecutionStatus::Processing)
    }

    /// Finalize an in-flight record as executed at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidTransition`] unless the record is
    /// `Processing`.
    pub fn complete(&mut self, now: Timestamp) -> Result<(), ValidationError> {
        self.transition(ExecutionStatus::Processing, ExecutionStatus::Executed)?;
        self.actual_execution_time = Some(now);
        self.details = Some(format!(
            "Successfully processed by scheduler at {}",
            now.to_rfc3339()
        ));
        Ok(())
    }

    /// Finalize an in-flight record as failed at `now`.
    ///
    /// `actual_execution_time` is the time of the failed attempt.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidTransition`] unless the record is
    /// `Processing`.
    pub fn fail(&mut self, now: Timestamp, reason: &str) -> Result<(), ValidationError> {
        self.transition(ExecutionStatus::Processing, ExecutionStatus::ExecutionError)?;
        self.actual_execution_time = Some(now);
        self.details = Some(format!("Error during scheduled execution: {reason}"));
        Ok(())
    }

    /// Whether the record is waiting for the reconciler at `now`.
    #[must_use]
    pub fn is_due(&self, now: Timestamp) -> bool {
        self.status == ExecutionStatus::SimulatedScheduled
            && self.scheduled_execution_time.is_some_and(|due| due <= now)
    }
}
