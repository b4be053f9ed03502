//! Action executor port.

use std::future::Future;

use hostflow_domain::error::HostflowError;
use hostflow_domain::execution::ExecutionRecord;

/// Performs the action behind an execution record.
pub trait ActionExecutor {
    /// Execute the action named by `record.action_name`.
    ///
    /// Failures are reported as [`HostflowError::Execution`].
    fn execute(
        &self,
        record: &ExecutionRecord,
    ) -> impl Future<Output = Result<(), HostflowError>> + Send;
}
