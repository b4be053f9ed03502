//! Simulated action execution.
//!
//! Real delivery of emails, chat messages, tasks or device commands is out
//! of scope; this executor only logs what it would have done.

use std::future::Future;

use hostflow_domain::error::HostflowError;
use hostflow_domain::execution::ExecutionRecord;

use crate::ports::ActionExecutor;

/// [`ActionExecutor`] that succeeds after logging the action.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedActionExecutor;

impl ActionExecutor for SimulatedActionExecutor {
    fn execute(
        &self,
        record: &ExecutionRecord,
    ) -> impl Future<Output = Result<(), HostflowError>> + Send {
        tracing::info!(
            record_id = %record.id,
            rule_id = %record.rule_id,
            trigger = %record.trigger_name,
            action = %record.action_name,
            "simulating action"
        );
        async { Ok(()) }
    }
}
