//! Rule — binds one trigger to one action with a scheduling disposition.

use serde::{Deserialize, Serialize};

use crate::catalog::Schedule;
use crate::error::{HostflowError, ValidationError};
use crate::id::{ActionId, RuleId, TriggerId};
use crate::time::{self, Timestamp};

/// "When `trigger_id` occurs, perform `action_id`", now or after a delay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub id: RuleId,
    pub name: String,
    pub description: Option<String>,
    pub trigger_id: TriggerId,
    pub action_id: ActionId,
    #[serde(flatten)]
    pub schedule: Schedule,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Rule {
    /// Create a builder for constructing a [`Rule`].
    #[must_use]
    pub fn builder() -> RuleBuilder {
        RuleBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// Scheduling invariants are carried by [`Schedule`] itself.
    ///
    /// # Errors
    ///
    /// Returns [`HostflowError::Validation`] when `name` is blank.
    pub fn validate(&self) -> Result<(), HostflowError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(())
    }
}

/// Step-by-step builder for [`Rule`].
#[derive(Debug, Default)]
pub struct RuleBuilder {
    id: Option<RuleId>,
    name: Option<String>,
    description: Option<String>,
    trigger_id: Option<TriggerId>,
    action_id: Option<ActionId>,
    schedule: Option<Schedule>,
    is_active: Option<bool>,
    created_at: Option<Timestamp>,
    updated_at: Option<Timestamp>,
}

impl RuleBuilder {
    #[must_use]
    pub fn id(mut self, id: RuleId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn maybe_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    #[must_use]
    pub fn trigger_id(mut self, trigger_id: TriggerId) -> Self {
        self.trigger_id = Some(trigger_id);
        self
    }

    #[must_use]
    pub fn action_id(mut self, action_id: ActionId) -> Self {
        self.action_id = Some(action_id);
        self
    }

    #[must_use]
    pub fn schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = Some(schedule);
        self
    }

    #[must_use]
    pub fn is_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    #[must_use]
    pub fn created_at(mut self, ts: Timestamp) -> Self {
        self.created_at = Some(ts);
        self
    }

    #[must_use]
    pub fn updated_at(mut self, ts: Timestamp) -> Self {
        self.updated_at = Some(ts);
        self
    }

    /// Consume the builder, validate, and return a [`Rule`].
    ///
    /// Defaults: immediate schedule, active, timestamps set to now.
    ///
    /// # Errors
    ///
    /// Returns [`HostflowError::Validation`] if the name is blank or the
    /// trigger or action reference is missing.
    pub fn build(self) -> Result<Rule, HostflowError> {
        let trigger_id = self
            .trigger_id
            .ok_or(ValidationError::MissingField("trigger_id"))?;
        let action_id = self
            .action_id
            .ok_or(ValidationError::MissingField("action_id"))?;
        let created_at = self.created_at.unwrap_or_else(time::now);
        let rule = Rule {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            description: self.description,
            trigger_id,
            action_id,
            schedule: self.schedule.unwrap_or(Schedule::Immediate),
            is_active: self.is_active.unwrap_or(true),
            created_at,
            updated_at: self.updated_at.unwrap_or(created_at),
        };
        rule.validate()?;
        Ok(rule)
    }
}

/// A stored rule whose scheduling columns do not form a valid [`Schedule`].
///
/// Storage adapters hand these back instead of dropping the row so that
/// dispatching can record why the rule could not fire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedRule {
    pub id: RuleId,
    pub name: String,
    pub trigger_id: TriggerId,
    pub action_id: ActionId,
    pub reason: ValidationError,
}

/// Outcome of loading one rule from storage.
pub type LoadedRule = Result<Rule, MalformedRule>;
