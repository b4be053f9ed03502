//! Trigger dispatcher — turns one trigger occurrence into execution records.
//!
//! Every active rule bound to the trigger gets exactly one record attempt.
//! Rules are handled independently: a rule that cannot be simulated, or
//! whose record cannot be persisted, ends up in [`DispatchOutcome::errors`]
//! while its siblings proceed.

use std::collections::HashMap;
use std::error::Error as _;

use hostflow_domain::catalog::{LoadedRule, Trigger};
use hostflow_domain::error::HostflowError;
use hostflow_domain::execution::{ExecutionRecord, ExecutionStatus};
use hostflow_domain::id::{ActionId, ExecutionRecordId, RuleId, TriggerId};
use hostflow_domain::time::Timestamp;

use crate::catalog::{Matching, RuleCatalog};
use crate::ports::{ActionRepository, ExecutionStore, RuleRepository, SharedClock, TriggerRepository};

/// A rule that did not yield a successfully simulated record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchError {
    pub rule_id: RuleId,
    pub rule_name: String,
    pub reason: String,
    /// The `SimulationError` record written for this rule, if it could be
    /// persisted.
    pub record_id: Option<ExecutionRecordId>,
}

/// Aggregate result of one dispatch. Partial success is expected.
///
/// `created.len() + errors.len() == rules_processed` always holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub rules_processed: usize,
    pub created: Vec<ExecutionRecord>,
    pub errors: Vec<DispatchError>,
}

/// Render an error together with its immediate source.
pub(crate) fn describe(err: &HostflowError) -> String {
    match err.source() {
        Some(source) => format!("{err}: {source}"),
        None => err.to_string(),
    }
}

/// Evaluates the active rules of a trigger.
pub struct TriggerDispatcher<TR, AR, RR, S> {
    catalog: RuleCatalog<TR, AR, RR>,
    store: S,
    clock: SharedClock,
}

impl<TR, AR, RR, S> TriggerDispatcher<TR, AR, RR, S>
where
    TR: TriggerRepository,
    AR: ActionRepository,
    RR: RuleRepository,
    S: ExecutionStore,
{
    pub fn new(catalog: RuleCatalog<TR, AR, RR>, store: S, clock: SharedClock) -> Self {
        Self {
            catalog,
            store,
            clock,
        }
    }

    /// Dispatch the trigger named exactly `trigger_name`.
    ///
    /// # Errors
    ///
    /// Returns [`HostflowError::NotFound`] for an unknown trigger, or a
    /// storage error when the rules themselves cannot be loaded. Per-rule
    /// failures never surface here.
    #[tracing::instrument(skip(self))]
    pub async fn dispatch(&self, trigger_name: &str) -> Result<DispatchOutcome, HostflowError> {
        let trigger = self
            .catalog
            .find_trigger_by_name(trigger_name, Matching::Exact)
            .await?;
        self.dispatch_resolved(&trigger).await
    }

    /// Dispatch the trigger with `trigger_id`.
    ///
    /// # Errors
    ///
    /// Same as [`dispatch`](Self::dispatch).
    #[tracing::instrument(skip(self))]
    pub async fn dispatch_by_id(
        &self,
        trigger_id: TriggerId,
    ) -> Result<DispatchOutcome, HostflowError> {
        let trigger = self.catalog.get_trigger(trigger_id).await?;
        self.dispatch_resolved(&trigger).await
    }

    async fn dispatch_resolved(&self, trigger: &Trigger) -> Result<DispatchOutcome, HostflowError> {
        let rules = self.catalog.rules_for_trigger(trigger.id).await?;
        let now = self.clock.now();
        let mut outcome = DispatchOutcome {
            rules_processed: rules.len(),
            ..DispatchOutcome::default()
        };
        let mut action_names: HashMap<ActionId, Result<String, String>> = HashMap::new();

        for loaded in rules {
            let (rule_id, rule_name) = match &loaded {
                Ok(rule) => (rule.id, rule.name.clone()),
                Err(malformed) => (malformed.id, malformed.name.clone()),
            };
            let record = self
                .simulate(trigger, loaded, now, &mut action_names)
                .await;
            let status = record.status;
            let details = record.details.clone();

            match self.store.create(record.clone()).await {
                Ok(record_id) if status == ExecutionStatus::SimulationError => {
                    tracing::warn!(%rule_id, %record_id, "rule could not be simulated");
                    outcome.errors.push(DispatchError {
                        rule_id,
                        rule_name,
                        reason: details.unwrap_or_default(),
                        record_id: Some(record_id),
                    });
                }
                Ok(record_id) => {
                    tracing::debug!(%rule_id, %record_id, %status, "execution record created");
                    outcome.created.push(record);
                }
                Err(err) => {
                    tracing::error!(%rule_id, error = %describe(&err), "failed to persist execution record");
                    outcome.errors.push(DispatchError {
                        rule_id,
                        rule_name,
                        reason: format!("failed to persist execution record: {}", describe(&err)),
                        record_id: None,
                    });
                }
            }
        }

        tracing::info!(
            trigger = %trigger.name,
            processed = outcome.rules_processed,
            created = outcome.created.len(),
            errors = outcome.errors.len(),
            "trigger dispatched"
        );
        Ok(outcome)
    }

    /// Build the record for one rule. Never fails: problems become a
    /// `SimulationError` record carrying the reason.
    async fn simulate(
        &self,
        trigger: &Trigger,
        loaded: LoadedRule,
        now: Timestamp,
        action_names: &mut HashMap<ActionId, Result<String, String>>,
    ) -> ExecutionRecord {
        let (rule_id, action_id) = match &loaded {
            Ok(rule) => (rule.id, rule.action_id),
            Err(malformed) => (malformed.id, malformed.action_id),
        };
        let action_name = match action_names.get(&action_id) {
            Some(cached) => cached.clone(),
            None => {
                let resolved = self.resolve_action_name(action_id).await;
                action_names.insert(action_id, resolved.clone());
                resolved
            }
        };
        let action_name = match action_name {
            Ok(name) => name,
            Err(reason) => {
                return ExecutionRecord::simulation_error(
                    rule_id,
                    &trigger.name,
                    format!("<unknown action {action_id}>"),
                    now,
                    reason,
                );
            }
        };

        let rule = match loaded {
            Ok(rule) => rule,
            Err(malformed) => {
                return ExecutionRecord::simulation_error(
                    rule_id,
                    &trigger.name,
                    action_name,
                    now,
                    format!("invalid rule configuration: {}", malformed.reason),
                );
            }
        };

        match rule.schedule.due_at(now) {
            Ok(None) => ExecutionRecord::simulated_immediate(rule.id, &trigger.name, action_name, now),
            Ok(Some(due)) => {
                ExecutionRecord::simulated_scheduled(rule.id, &trigger.name, action_name, now, due)
            }
            Err(err) => ExecutionRecord::simulation_error(
                rule.id,
                &trigger.name,
                action_name,
                now,
                format!("invalid rule configuration: {err}"),
            ),
        }
    }

    async fn resolve_action_name(&self, action_id: ActionId) -> Result<String, String> {
        match self.catalog.find_action(action_id).await {
            Ok(Some(action)) => Ok(action.name),
            Ok(None) => Err(format!("action '{action_id}' not found")),
            Err(err) => Err(format!("failed to load action: {}", describe(&err))),
        }
    }
}
