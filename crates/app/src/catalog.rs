//! Rule catalog — read model over triggers, actions and rules.

use hostflow_domain::catalog::{names_match, Action, LoadedRule, Trigger};
use hostflow_domain::error::{HostflowError, NotFoundError};
use hostflow_domain::id::{ActionId, TriggerId};

use crate::ports::{ActionRepository, RuleRepository, TriggerRepository};

/// How a name lookup compares names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matching {
    /// Byte-for-byte equality; what dispatch and storage use.
    Exact,
    /// Case-insensitive equality of the whole name; only for mapping
    /// untrusted input onto the vocabulary.
    CaseInsensitive,
}

/// Side-effect free queries over the catalog.
pub struct RuleCatalog<TR, AR, RR> {
    triggers: TR,
    actions: AR,
    rules: RR,
}

impl<TR, AR, RR> RuleCatalog<TR, AR, RR>
where
    TR: TriggerRepository,
    AR: ActionRepository,
    RR: RuleRepository,
{
    pub fn new(triggers: TR, actions: AR, rules: RR) -> Self {
        Self {
            triggers,
            actions,
            rules,
        }
    }

    /// Active rules bound to `trigger_id`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn rules_for_trigger(
        &self,
        trigger_id: TriggerId,
    ) -> Result<Vec<LoadedRule>, HostflowError> {
        self.rules.find_active_by_trigger(trigger_id).await
    }

    /// Resolve a trigger by name.
    ///
    /// Never falls back to partial matches.
    ///
    /// # Errors
    ///
    /// Returns [`HostflowError::NotFound`] when no trigger carries `name`.
    pub async fn find_trigger_by_name(
        &self,
        name: &str,
        matching: Matching,
    ) -> Result<Trigger, HostflowError> {
        let found = match matching {
            Matching::Exact => self.triggers.find_by_name(name).await?,
            Matching::CaseInsensitive => self
                .triggers
                .get_all()
                .await?
                .into_iter()
                .find(|t| names_match(&t.name, name)),
        };
        found.ok_or_else(|| {
            NotFoundError {
                entity: TriggerId::ENTITY,
                id: name.to_string(),
            }
            .into()
        })
    }

    /// Resolve an action by name.
    ///
    /// # Errors
    ///
    /// Returns [`HostflowError::NotFound`] when no action carries `name`.
    pub async fn find_action_by_name(
        &self,
        name: &str,
        matching: Matching,
    ) -> Result<Action, HostflowError> {
        let found = match matching {
            Matching::Exact => self.actions.find_by_name(name).await?,
            Matching::CaseInsensitive => self
                .actions
                .get_all()
                .await?
                .into_iter()
                .find(|a| names_match(&a.name, name)),
        };
        found.ok_or_else(|| {
            NotFoundError {
                entity: ActionId::ENTITY,
                id: name.to_string(),
            }
            .into()
        })
    }

    /// # Errors
    ///
    /// Returns [`HostflowError::NotFound`] when no trigger has `id`.
    pub async fn get_trigger(&self, id: TriggerId) -> Result<Trigger, HostflowError> {
        self.triggers.get_by_id(id).await?.ok_or_else(|| id.not_found().into())
    }

    /// # Errors
    ///
    /// Returns [`HostflowError::NotFound`] when no action has `id`.
    pub async fn get_action(&self, id: ActionId) -> Result<Action, HostflowError> {
        self.actions.get_by_id(id).await?.ok_or_else(|| id.not_found().into())
    }

    /// Like [`get_action`](Self::get_action) but `None` when missing.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn find_action(&self, id: ActionId) -> Result<Option<Action>, HostflowError> {
        self.actions.get_by_id(id).await
    }

    /// All triggers, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_triggers(&self) -> Result<Vec<Trigger>, HostflowError> {
        self.triggers.get_all().await
    }

    /// All actions, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_actions(&self) -> Result<Vec<Action>, HostflowError> {
        self.actions.get_all().await
    }
}
