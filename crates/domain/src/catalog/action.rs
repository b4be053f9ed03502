//! Action — the named effect a rule performs.

use serde::{Deserialize, Serialize};

use crate::error::{HostflowError, ValidationError};
use crate::id::ActionId;

/// A named effect, e.g. `"Send Email"`. Dispatch only simulates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub id: ActionId,
    pub name: String,
    pub description: Option<String>,
}

impl Action {
    #[must_use]
    pub fn builder() -> ActionBuilder {
        ActionBuilder::default()
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

#[derive(Debug, Default)]
pub struct ActionBuilder {
    id: Option<ActionId>,
    name: Option<String>,
    description: Option<String>,
}

impl ActionBuilder {
    #[must_use]
    pub fn id(mut self, id: ActionId) -> Self {
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

    /// Consume the builder, validate, and return an [`Action`].
    ///
    /// # Errors
    ///
    /// Returns [`HostflowError::Validation`] if `name` is missing or blank.
    pub fn build(self) -> Result<Action, HostflowError> {
        let action = Action {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            description: self.description,
        };
        action.validate()?;
        Ok(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_build_action_without_description() {
        let action = Action::builder().name("Create Task").build().unwrap();
        assert_eq!(action.name, "Create Task");
        assert!(action.description.is_none());
    }

    #[test]
    fn should_return_validation_error_when_name_missing() {
        assert!(matches!(
            Action::builder().build(),
            Err(HostflowError::Validation(ValidationError::EmptyName))
        ));
    }
}
