//! Rule service — use-cases for managing rules.

use hostflow_domain::catalog::{Rule, Schedule};
use hostflow_domain::error::HostflowError;
use hostflow_domain::execution::ExecutionRecord;
use hostflow_domain::id::{ActionId, ExecutionRecordId, RuleId, TriggerId};

use crate::ports::{
    ActionRepository, ExecutionStore, RuleRepository, SharedClock, TriggerRepository,
};

/// Untyped rule fields as submitted by a client.
///
/// Scheduling fields are validated together through
/// [`Schedule::from_parts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDraft {
    pub name: String,
    pub description: Option<String>,
    pub trigger_id: TriggerId,
    pub action_id: ActionId,
    pub rule_type: String,
    pub delay_time: Option<i64>,
    pub delay_unit: Option<String>,
    pub is_active: bool,
}

impl RuleDraft {
    fn schedule(&self) -> Result<Schedule, HostflowError> {
        Ok(Schedule::from_parts(
            &self.rule_type,
            self.delay_time,
            self.delay_unit.as_deref(),
        )?)
    }
}

/// Application service for rule CRUD and execution history.
pub struct RuleService<TR, AR, RR, S> {
    triggers: TR,
    actions: AR,
    rules: RR,
    executions: S,
    clock: SharedClock,
}

impl<TR, AR, RR, S> RuleService<TR, AR, RR, S>
where
    TR: TriggerRepository,
    AR: ActionRepository,
    RR: RuleRepository,
    S: ExecutionStore,
{
    /// Create a new service backed by the given repositories.
    pub fn new(triggers: TR, actions: AR, rules: RR, executions: S, clock: SharedClock) -> Self {
        Self {
            triggers,
            actions,
            rules,
            executions,
            clock,
        }
    }

    async fn ensure_references(
        &self,
        trigger_id: TriggerId,
        action_id: ActionId,
    ) -> Result<(), HostflowError> {
        if self.triggers.get_by_id(trigger_id).await?.is_none() {
            return Err(trigger_id.not_found().into());
        }
        if self.actions.get_by_id(action_id).await?.is_none() {
            return Err(action_id.not_found().into());
        }
        Ok(())
    }

    /// Create a new rule from client input.
    ///
    /// # Errors
    ///
    /// Returns [`HostflowError::Validation`] for a blank name or an invalid
    /// schedule, [`HostflowError::NotFound`] when the trigger or action does
    /// not exist, or a storage error from the repository.
    #[tracing::instrument(skip(self, draft), fields(rule_name = %draft.name))]
    pub async fn create_rule(&self, draft: RuleDraft) -> Result<Rule, HostflowError> {
        let now = self.clock.now();
        let rule = Rule::builder()
            .name(draft.name.clone())
            .maybe_description(draft.description.clone())
            .trigger_id(draft.trigger_id)
            .action_id(draft.action_id)
            .schedule(draft.schedule()?)
            .is_active(draft.is_active)
            .created_at(now)
            .build()?;
        self.save_new(rule).await
    }

    /// Persist an already-built rule, e.g. one confirmed from a suggestion.
    ///
    /// # Errors
    ///
    /// Same as [`create_rule`](Self::create_rule).
    #[tracing::instrument(skip(self, rule), fields(rule_name = %rule.name))]
    pub async fn save_new(&self, rule: Rule) -> Result<Rule, HostflowError> {
        rule.validate()?;
        self.ensure_references(rule.trigger_id, rule.action_id)
            .await?;
        let rule = self.rules.create(rule).await?;
        tracing::info!(rule_id = %rule.id, schedule = %rule.schedule, "rule created");
        Ok(rule)
    }

    /// Look up a rule by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`HostflowError::NotFound`] when no rule with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_rule(&self, id: RuleId) -> Result<Rule, HostflowError> {
        self.rules.get_by_id(id).await?.ok_or_else(|| id.not_found().into())
    }

    /// List all rules, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_rules(&self) -> Result<Vec<Rule>, HostflowError> {
        self.rules.get_all().await
    }

    /// Replace the editable fields of an existing rule.
    ///
    /// `created_at` is kept; `updated_at` moves to now.
    ///
    /// # Errors
    ///
    /// Same as [`create_rule`](Self::create_rule), plus
    /// [`HostflowError::NotFound`] when the rule does not exist.
    #[tracing::instrument(skip(self, draft))]
    pub async fn update_rule(&self, id: RuleId, draft: RuleDraft) -> Result<Rule, HostflowError> {
        let existing = self.get_rule(id).await?;
        let rule = Rule::builder()
            .id(id)
            .name(draft.name.clone())
            .maybe_description(draft.description.clone())
            .trigger_id(draft.trigger_id)
            .action_id(draft.action_id)
            .schedule(draft.schedule()?)
            .is_active(draft.is_active)
            .created_at(existing.created_at)
            .updated_at(self.clock.now())
            .build()?;
        self.ensure_references(rule.trigger_id, rule.action_id)
            .await?;
        self.rules.update(rule).await
    }

    /// Delete a rule by id. Its execution records go with it.
    ///
    /// # Errors
    ///
    /// Returns [`HostflowError::NotFound`] when the rule does not exist, or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn delete_rule(&self, id: RuleId) -> Result<(), HostflowError> {
        self.rules.delete(id).await
    }

    /// Most recent execution records across all rules.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    pub async fn recent_executions(&self, limit: u32) -> Result<Vec<ExecutionRecord>, HostflowError> {
        self.executions.list_recent(limit).await
    }

    /// Look up one execution record.
    ///
    /// # Errors
    ///
    /// Returns [`HostflowError::NotFound`] when no record with `id` exists.
    pub async fn get_execution(
        &self,
        id: ExecutionRecordId,
    ) -> Result<ExecutionRecord, HostflowError> {
        self.executions.get_by_id(id).await?.ok_or_else(|| id.not_found().into())
    }

    /// Execution history of one rule, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`HostflowError::NotFound`] when the rule does not exist.
    pub async fn executions_for_rule(
        &self,
        id: RuleId,
    ) -> Result<Vec<ExecutionRecord>, HostflowError> {
        self.get_rule(id).await?;
        self.executions.list_by_rule(id).await
    }
}
