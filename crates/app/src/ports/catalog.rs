//! Catalog ports — persistence for triggers, actions and rules.

use std::future::Future;

use hostflow_domain::catalog::{Action, LoadedRule, Rule, Trigger};
use hostflow_domain::error::HostflowError;
use hostflow_domain::id::{ActionId, RuleId, TriggerId};

/// Repository for the trigger vocabulary.
pub trait TriggerRepository {
    /// Insert a new trigger. Names are unique.
    fn create(&self, trigger: Trigger) -> impl Future<Output = Result<Trigger, HostflowError>> + Send;

    /// Get a trigger by its unique identifier.
    fn get_by_id(
        &self,
        id: TriggerId,
    ) -> impl Future<Output = Result<Option<Trigger>, HostflowError>> + Send;

    /// Get a trigger by its exact name.
    fn find_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Trigger>, HostflowError>> + Send;

    /// Get all triggers, ordered by name.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Trigger>, HostflowError>> + Send;
}

/// Repository for the action vocabulary.
pub trait ActionRepository {
    /// Insert a new action. Names are unique.
    fn create(&self, action: Action) -> impl Future<Output = Result<Action, HostflowError>> + Send;

    /// Get an action by its unique identifier.
    fn get_by_id(
        &self,
        id: ActionId,
    ) -> impl Future<Output = Result<Option<Action>, HostflowError>> + Send;

    /// Get an action by its exact name.
    fn find_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Action>, HostflowError>> + Send;

    /// Get all actions, ordered by name.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Action>, HostflowError>> + Send;
}

/// Repository for rules.
pub trait RuleRepository {
    /// Insert a new rule.
    fn create(&self, rule: Rule) -> impl Future<Output = Result<Rule, HostflowError>> + Send;

    /// Get a rule by its unique identifier.
    ///
    /// A stored row that no longer forms a valid rule yields
    /// [`HostflowError::Validation`].
    fn get_by_id(&self, id: RuleId)
    -> impl Future<Output = Result<Option<Rule>, HostflowError>> + Send;

    /// Get all valid rules, newest first.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Rule>, HostflowError>> + Send;

    /// Get the active rules bound to `trigger_id`, oldest first.
    ///
    /// Malformed rows are returned as errors in place, never skipped.
    fn find_active_by_trigger(
        &self,
        trigger_id: TriggerId,
    ) -> impl Future<Output = Result<Vec<LoadedRule>, HostflowError>> + Send;

    /// Replace an existing rule.
    ///
    /// Returns [`HostflowError::NotFound`] when no rule has this id.
    fn update(&self, rule: Rule) -> impl Future<Output = Result<Rule, HostflowError>> + Send;

    /// Delete a rule and, by cascade, its execution records.
    ///
    /// Returns [`HostflowError::NotFound`] when no rule has this id.
    fn delete(&self, id: RuleId) -> impl Future<Output = Result<(), HostflowError>> + Send;
}
