//! Reconciler — advances due scheduled records to a terminal state.
//!
//! Each due record is claimed (`SimulatedScheduled → Processing`) with a
//! conditional save, executed, then finalized as `Executed` or
//! `ExecutionError`. Records are processed independently; one failure never
//! stops the sweep. A record that another sweep claimed first is skipped.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;

use hostflow_domain::error::HostflowError;
use hostflow_domain::execution::{ExecutionRecord, ExecutionStatus};
use hostflow_domain::time::Timestamp;

use crate::dispatcher::describe;
use crate::ports::{ActionExecutor, ExecutionStore, SharedClock};

/// Counts of one reconciliation sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    /// Records that reached `Executed`.
    pub processed: usize,
    /// Records that could not be claimed or ended in `ExecutionError`.
    pub errors: usize,
}

enum Disposition {
    Executed,
    Failed,
    Skipped,
}

/// Drives due scheduled records through the execution state machine.
pub struct Reconciler<S, X> {
    store: S,
    executor: X,
    clock: SharedClock,
}

impl<S, X> Reconciler<S, X>
where
    S: ExecutionStore,
    X: ActionExecutor,
{
    pub fn new(store: S, executor: X, clock: SharedClock) -> Self {
        Self {
            store,
            executor,
            clock,
        }
    }

    /// Reconcile every record due at the clock's current time.
    ///
    /// # Errors
    ///
    /// See [`reconcile_due`](Self::reconcile_due).
    pub async fn reconcile_now(&self) -> Result<ReconcileSummary, HostflowError> {
        self.reconcile_due(self.clock.now()).await
    }

    /// Process every `SimulatedScheduled` record due at or before `now`.
    ///
    /// Calling this again right away finds nothing: processed records are no
    /// longer `SimulatedScheduled`.
    ///
    /// # Errors
    ///
    /// Returns a storage error only when the due records cannot be queried.
    /// Per-record failures are counted in [`ReconcileSummary::errors`].
    #[tracing::instrument(skip(self))]
    pub async fn reconcile_due(&self, now: Timestamp) -> Result<ReconcileSummary, HostflowError> {
        let due = self
            .store
            .find_due(ExecutionStatus::SimulatedScheduled, now)
            .await?;
        let mut summary = ReconcileSummary::default();

        for record in due {
            match self.process(record, now).await {
                Disposition::Executed => summary.processed += 1,
                Disposition::Failed => summary.errors += 1,
                Disposition::Skipped => {}
            }
        }

        if summary != ReconcileSummary::default() {
            tracing::info!(
                processed = summary.processed,
                errors = summary.errors,
                "scheduled executions reconciled"
            );
        }
        Ok(summary)
    }

    async fn process(&self, mut record: ExecutionRecord, now: Timestamp) -> Disposition {
        let record_id = record.id;

        if let Err(err) = record.claim() {
            tracing::warn!(%record_id, %err, "due record cannot be claimed");
            return Disposition::Failed;
        }
        match self
            .store
            .save(&record, ExecutionStatus::SimulatedScheduled)
            .await
        {
            Ok(()) => {}
            Err(HostflowError::Conflict(_)) => {
                tracing::debug!(%record_id, "record already claimed elsewhere, skipping");
                return Disposition::Skipped;
            }
            Err(err) => {
                tracing::error!(%record_id, error = %describe(&err), "failed to claim scheduled record");
                return Disposition::Failed;
            }
        }

        let failure = match self.executor.execute(&record).await {
            Ok(()) => {
                let mut done = record.clone();
                match done.complete(now) {
                    Ok(()) => match self.store.save(&done, ExecutionStatus::Processing).await {
                        Ok(()) => {
                            tracing::info!(%record_id, action = %record.action_name, "scheduled execution completed");
                            return Disposition::Executed;
                        }
                        Err(err) => describe(&err),
                    },
                    Err(err) => err.to_string(),
                }
            }
            Err(err) => describe(&err),
        };

        tracing::warn!(%record_id, reason = %failure, "scheduled execution failed");
        if let Err(err) = record.fail(now, &failure) {
            tracing::error!(%record_id, %err, "cannot mark record as failed");
            return Disposition::Failed;
        }
        if let Err(err) = self.store.save(&record, ExecutionStatus::Processing).await {
            tracing::error!(
                %record_id,
                error = %describe(&err),
                "failed to persist execution error state"
            );
        }
        Disposition::Failed
    }
}

/// Periodic background sweep.
pub struct ReconcileLoop<S, X> {
    reconciler: Arc<Reconciler<S, X>>,
    interval: Duration,
}

impl<S, X> ReconcileLoop<S, X>
where
    S: ExecutionStore + Send + Sync + 'static,
    X: ActionExecutor + Send + Sync + 'static,
{
    /// Spawn the sweep on the current tokio runtime.
    pub fn start(reconciler: Arc<Reconciler<S, X>>, interval: Duration) -> JoinHandle<()> {
        let sweep = Self {
            reconciler,
            interval,
        };
        tokio::spawn(sweep.run())
    }

    async fn run(self) {
        loop {
            if let Err(err) = self.reconciler.reconcile_now().await {
                tracing::warn!(error = %describe(&err), "reconciliation sweep failed, retrying next interval");
            }
            tokio::time::sleep(self.interval).await;
        }
    }
}
