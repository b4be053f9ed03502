//! Trigger — a named event category that rules react to.

use serde::{Deserialize, Serialize};

use crate::error::{HostflowError, ValidationError};
use crate::id::TriggerId;

/// A named event category, e.g. `"Guest checks in"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    pub id: TriggerId,
    pub name: String,
    pub description: Option<String>,
}

impl Trigger {
    /// Create a builder for constructing a [`Trigger`].
    #[must_use]
    pub fn builder() -> TriggerBuilder {
        TriggerBuilder::default()
    }

    /// Check domain invariants.
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

/// Step-by-step builder for [`Trigger`].
#[derive(Debug, Default)]
pub struct TriggerBuilder {
    id: Option<TriggerId>,
    name: Option<String>,
    description: Option<String>,
}

impl TriggerBuilder {
    #[must_use]
    pub fn id(mut self, id: TriggerId) -> Self {
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

    /// Consume the builder, validate, and return a [`Trigger`].
    ///
    /// # Errors
    ///
    /// Returns [`HostflowError::Validation`] if `name` is missing or blank.
    pub fn build(self) -> Result<Trigger, HostflowError> {
        let trigger = Trigger {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            description: self.description,
        };
        trigger.validate()?;
        Ok(trigger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_build_trigger_when_name_provided() {
        let trigger = Trigger::builder()
            .name("Guest checks in")
            .description("front desk")
            .build()
            .unwrap();
        assert_eq!(trigger.name, "Guest checks in");
        assert_eq!(trigger.description.as_deref(), Some("front desk"));
    }

    #[test]
    fn should_return_validation_error_when_name_is_blank() {
        let result = Trigger::builder().name("   ").build();
        assert!(matches!(
            result,
            Err(HostflowError::Validation(ValidationError::EmptyName))
        ));
    }
}
