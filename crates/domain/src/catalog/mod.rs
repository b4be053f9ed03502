//! Catalog — trigger, action and rule definitions.
//!
//! A [`Rule`] binds exactly one [`Trigger`] to one [`Action`] and carries a
//! [`Schedule`] telling whether the action fires immediately or after a
//! fixed delay.

mod action;
mod rule;
mod schedule;
mod trigger;

pub use action::{Action, ActionBuilder};
pub use rule::{LoadedRule, MalformedRule, Rule, RuleBuilder};
pub use schedule::{DelayUnit, RuleType, Schedule};
pub use trigger::{Trigger, TriggerBuilder};

/// Case-insensitive name equality used at mapping boundaries only.
#[must_use]
pub fn names_match(stored: &str, candidate: &str) -> bool {
    stored.to_lowercase() == candidate.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_match_names_ignoring_case_and_outer_whitespace() {
        assert!(names_match("Guest checks in", " guest CHECKS in "));
    }

    #[test]
    fn should_not_match_partial_names() {
        assert!(!names_match("Guest checks in", "guest checks"));
    }
}
