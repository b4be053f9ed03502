//! Execution store port — the audit log of rule firings.

use std::future::Future;

use hostflow_domain::error::HostflowError;
use hostflow_domain::execution::{ExecutionRecord, ExecutionStatus};
use hostflow_domain::id::{ExecutionRecordId, RuleId};
use hostflow_domain::time::Timestamp;

/// Append-mostly store of [`ExecutionRecord`]s.
pub trait ExecutionStore {
    /// Persist a new record and return its id.
    fn create(
        &self,
        record: ExecutionRecord,
    ) -> impl Future<Output = Result<ExecutionRecordId, HostflowError>> + Send;

    /// Records in `status` whose scheduled time is at or before `until`.
    ///
    /// Ordered by scheduled time, then `logged_at`, then id.
    fn find_due(
        &self,
        status: ExecutionStatus,
        until: Timestamp,
    ) -> impl Future<Output = Result<Vec<ExecutionRecord>, HostflowError>> + Send;

    /// Overwrite a record, provided it is still stored in `expected` status.
    ///
    /// Returns [`HostflowError::Conflict`] when the stored status differs
    /// (including when another writer got there first) and
    /// [`HostflowError::NotFound`] when the record does not exist.
    fn save(
        &self,
        record: &ExecutionRecord,
        expected: ExecutionStatus,
    ) -> impl Future<Output = Result<(), HostflowError>> + Send;

    /// Get a record by its unique identifier.
    fn get_by_id(
        &self,
        id: ExecutionRecordId,
    ) -> impl Future<Output = Result<Option<ExecutionRecord>, HostflowError>> + Send;

    /// The most recent records, newest `logged_at` first.
    fn list_recent(
        &self,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<ExecutionRecord>, HostflowError>> + Send;

    /// All records of one rule, newest first.
    fn list_by_rule(
        &self,
        rule_id: RuleId,
    ) -> impl Future<Output = Result<Vec<ExecutionRecord>, HostflowError>> + Send;
}
