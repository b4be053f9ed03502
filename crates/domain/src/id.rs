//! Typed identifiers for catalog entities and execution records.
//!
//! Each id knows the entity it names, so lookups build their
//! [`NotFoundError`] from the id alone and a malformed id surfaces as
//! [`ValidationError::InvalidId`] rather than a raw UUID error.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{NotFoundError, ValidationError};

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident => $entity:literal) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl Default for $name {
            fn default() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }

        impl $name {
            /// Entity label used in error messages.
            pub const ENTITY: &'static str = $entity;

            #[must_use]
            pub fn new() -> Self {
                Self::default()
            }

            #[must_use]
            pub fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            #[must_use]
            pub fn as_uuid(self) -> uuid::Uuid {
                self.0
            }

            /// Error for a lookup of this id that found nothing.
            #[must_use]
            pub fn not_found(self) -> NotFoundError {
                NotFoundError {
                    entity: Self::ENTITY,
                    id: self.to_string(),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                uuid::Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|_| ValidationError::InvalidId(s.to_string()))
            }
        }
    };
}

define_id!(
    /// Identifies a [`Trigger`](crate::catalog::Trigger).
    TriggerId => "Trigger"
);

define_id!(
    /// Identifies an [`Action`](crate::catalog::Action).
    ActionId => "Action"
);

define_id!(
    /// Identifies a [`Rule`](crate::catalog::Rule). Execution records keep it
    /// until the rule is deleted.
    RuleId => "Rule"
);

define_id!(
    /// Identifies an [`ExecutionRecord`](crate::execution::ExecutionRecord).
    ExecutionRecordId => "ExecutionRecord"
);
