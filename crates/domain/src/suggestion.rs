//! Mapping of free-form rule suggestions onto the controlled vocabulary.
//!
//! A suggestion generator returns untrusted candidates. [`map_suggestions`]
//! resolves names against the catalog, validates the scheduling fields and
//! keeps a note for every field it could not accept. Nothing here persists;
//! a caller turns a fully resolved [`MappedSuggestion`] into a [`Rule`] with
//! [`MappedSuggestion::to_rule`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::{names_match, Action, DelayUnit, Rule, RuleType, Schedule, Trigger};
use crate::error::{HostflowError, ValidationError};
use crate::id::{ActionId, TriggerId};

/// One rule proposal as produced by the generator. Every field is untrusted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestionCandidate {
    #[serde(default)]
    pub workflow_name: Option<String>,
    #[serde(default)]
    pub workflow_description: Option<String>,
    #[serde(default)]
    pub trigger_name: Option<String>,
    #[serde(default)]
    pub action_name: Option<String>,
    #[serde(default)]
    pub rule_type: Option<String>,
    /// Number or numeric string; coerced during mapping.
    #[serde(default)]
    pub delay_time: Option<Value>,
    #[serde(default)]
    pub delay_unit: Option<String>,
}

/// Problems the generator itself reported for one of its candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionIssue {
    /// Position of the candidate, as a number or numeric string. Issues whose
    /// index is not a non-negative integer are reported globally.
    #[serde(default)]
    pub workflow_index: Value,
    #[serde(default)]
    pub issues: Vec<String>,
}

/// Raw generator output: `{ suggested_workflows: [...], errors?: [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestionResponse {
    #[serde(default)]
    pub suggested_workflows: Vec<SuggestionCandidate>,
    #[serde(default)]
    pub errors: Vec<SuggestionIssue>,
}

/// A candidate after vocabulary resolution and validation.
///
/// Unresolved or invalid fields are `None` and explained in `notes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappedSuggestion {
    pub raw: SuggestionCandidate,
    pub name: Option<String>,
    pub description: Option<String>,
    pub trigger_id: Option<TriggerId>,
    pub trigger_name: Option<String>,
    pub action_id: Option<ActionId>,
    pub action_name: Option<String>,
    pub rule_type: Option<RuleType>,
    pub delay_time: Option<u32>,
    pub delay_unit: Option<DelayUnit>,
    #[serde(default)]
    pub notes: Vec<String>,
}

/// Result of mapping one generator response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestionPreview {
    pub suggestions: Vec<MappedSuggestion>,
    pub global_errors: Vec<String>,
}

impl MappedSuggestion {
    /// Whether every field needed for a rule resolved.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing_field().is_none()
    }

    fn missing_field(&self) -> Option<&'static str> {
        if self.name.is_none() {
            return Some("workflow_name");
        }
        if self.trigger_id.is_none() {
            return Some("trigger");
        }
        if self.action_id.is_none() {
            return Some("action");
        }
        match self.rule_type {
            None => Some("rule_type"),
            Some(RuleType::Scheduled) if self.delay_time.is_none() => Some("delay_time"),
            Some(RuleType::Scheduled) if self.delay_unit.is_none() => Some("delay_unit"),
            _ => None,
        }
    }

    fn schedule(&self) -> Result<Schedule, ValidationError> {
        match (self.rule_type, self.delay_time, self.delay_unit) {
            (Some(RuleType::Scheduled), Some(time), Some(unit)) => Schedule::scheduled(time, unit),
            (Some(RuleType::Scheduled), _, _) => Err(ValidationError::MissingDelay),
            _ => Ok(Schedule::Immediate),
        }
    }

    /// Build an unsaved, active [`Rule`] from this suggestion.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::IncompleteSuggestion`] naming the first
    /// unresolved field, or any validation error the rule builder raises.
    pub fn to_rule(&self) -> Result<Rule, HostflowError> {
        if let Some(field) = self.missing_field() {
            return Err(ValidationError::IncompleteSuggestion(format!("{field} is unresolved")).into());
        }
        let (Some(name), Some(trigger_id), Some(action_id)) =
            (self.name.as_deref(), self.trigger_id, self.action_id)
        else {
            return Err(ValidationError::IncompleteSuggestion("missing reference".into()).into());
        };
        Rule::builder()
            .name(name)
            .maybe_description(self.description.clone())
            .trigger_id(trigger_id)
            .action_id(action_id)
            .schedule(self.schedule()?)
            .build()
    }
}

/// Map every candidate of `response` against the catalog.
///
/// Candidates are never dropped: the output has one [`MappedSuggestion`] per
/// input candidate, in order. Generator issues are attached to the candidate
/// they name; issues naming no existing candidate go to `global_errors`.
#[must_use]
pub fn map_suggestions(
    triggers: &[Trigger],
    actions: &[Action],
    response: SuggestionResponse,
) -> SuggestionPreview {
    let mut suggestions: Vec<MappedSuggestion> = response
        .suggested_workflows
        .into_iter()
        .map(|candidate| map_candidate(triggers, actions, candidate))
        .collect();

    let mut global_errors = Vec::new();
    for issue in response.errors {
        let target = issue_index(&issue.workflow_index).and_then(|index| suggestions.get_mut(index));
        match target {
            Some(suggestion) => suggestion.notes.extend(issue.issues),
            None => {
                let label = index_label(&issue.workflow_index);
                global_errors.extend(
                    issue
                        .issues
                        .into_iter()
                        .map(|text| format!("workflow {label}: {text}")),
                );
            }
        }
    }

    SuggestionPreview {
        suggestions,
        global_errors,
    }
}

fn map_candidate(
    triggers: &[Trigger],
    actions: &[Action],
    raw: SuggestionCandidate,
) -> MappedSuggestion {
    let mut notes = Vec::new();

    let name = non_blank(raw.workflow_name.as_deref());
    if name.is_none() {
        notes.push("workflow_name is missing".to_string());
    }

    let trigger = match non_blank(raw.trigger_name.as_deref()) {
        Some(wanted) => {
            let found = triggers.iter().find(|t| names_match(&t.name, &wanted));
            if found.is_none() {
                notes.push(format!("unknown trigger '{wanted}'"));
            }
            found
        }
        None => {
            notes.push("trigger_name is missing".to_string());
            None
        }
    };

    let action = match non_blank(raw.action_name.as_deref()) {
        Some(wanted) => {
            let found = actions.iter().find(|a| names_match(&a.name, &wanted));
            if found.is_none() {
                notes.push(format!("unknown action '{wanted}'"));
            }
            found
        }
        None => {
            notes.push("action_name is missing".to_string());
            None
        }
    };

    let rule_type = match non_blank(raw.rule_type.as_deref()) {
        Some(value) => match value.to_lowercase().parse::<RuleType>() {
            Ok(rule_type) => Some(rule_type),
            Err(_) => {
                notes.push(format!("invalid rule_type '{value}'"));
                None
            }
        },
        None => {
            notes.push("rule_type is missing".to_string());
            None
        }
    };

    let (delay_time, delay_unit) = if rule_type == Some(RuleType::Scheduled) {
        (
            coerce_delay_time(raw.delay_time.as_ref(), &mut notes),
            coerce_delay_unit(raw.delay_unit.as_deref(), &mut notes),
        )
    } else {
        (None, None)
    };

    MappedSuggestion {
        name,
        description: non_blank(raw.workflow_description.as_deref()),
        trigger_id: trigger.map(|t| t.id),
        trigger_name: trigger.map(|t| t.name.clone()),
        action_id: action.map(|a| a.id),
        action_name: action.map(|a| a.name.clone()),
        rule_type,
        delay_time,
        delay_unit,
        notes,
        raw,
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

#[allow(clippy::cast_possible_truncation)]
fn truncate_float(value: f64) -> Option<i64> {
    let value = value.trunc();
    // i64::MAX is not exactly representable; stay strictly below 2^63.
    if value.is_finite() && value >= -9.223_372_036_854_776e18 && value < 9.223_372_036_854_776e18 {
        Some(value as i64)
    } else {
        None
    }
}

fn delay_number(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64().or_else(|| number.as_f64().and_then(truncate_float)),
        Value::String(text) => {
            let text = text.trim();
            text.parse::<i64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().and_then(truncate_float))
        }
        _ => None,
    }
}

fn integral_index(value: f64) -> Option<usize> {
    if value.fract() != 0.0 || value < 0.0 {
        return None;
    }
    truncate_float(value).and_then(|index| usize::try_from(index).ok())
}

fn issue_index(value: &Value) -> Option<usize> {
    match value {
        Value::Number(number) => number
            .as_u64()
            .and_then(|index| usize::try_from(index).ok())
            .or_else(|| number.as_f64().and_then(integral_index)),
        Value::String(text) => {
            let text = text.trim();
            text.parse::<usize>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().and_then(integral_index))
        }
        _ => None,
    }
}

fn index_label(value: &Value) -> String {
    match value {
        Value::Null => "?".to_string(),
        Value::String(text) => text.trim().to_string(),
        other => other.to_string(),
    }
}

fn coerce_delay_time(value: Option<&Value>, notes: &mut Vec<String>) -> Option<u32> {
    let value = match value {
        None | Some(Value::Null) => {
            notes.push("delay_time is required for scheduled rules".to_string());
            return None;
        }
        Some(value) => value,
    };
    let Some(number) = delay_number(value) else {
        notes.push(format!("delay_time '{value}' is not a number"));
        return None;
    };
    if number <= 0 {
        notes.push(format!("delay_time must be positive, got {number}"));
        return None;
    }
    if let Ok(number) = u32::try_from(number) {
        Some(number)
    } else {
        notes.push(format!("delay_time {number} is too large"));
        None
    }
}

fn coerce_delay_unit(value: Option<&str>, notes: &mut Vec<String>) -> Option<DelayUnit> {
    let Some(value) = non_blank(value) else {
        notes.push("delay_unit is required for scheduled rules".to_string());
        return None;
    };
    if let Ok(unit) = value.to_lowercase().parse::<DelayUnit>() {
        Some(unit)
    } else {
        notes.push(format!("invalid delay_unit '{value}'"));
        None
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn catalog() -> (Vec<Trigger>, Vec<Action>) {
        let triggers = vec![
            Trigger::builder().name("Guest checks in").build().unwrap(),
            Trigger::builder().name("Inventory running low").build().unwrap(),
        ];
        let actions = vec![
            Action::builder().name("Send Email").build().unwrap(),
            Action::builder().name("Create Task").build().unwrap(),
        ];
        (triggers, actions)
    }

    fn candidate(value: serde_json::Value) -> SuggestionCandidate {
        serde_json::from_value(value).unwrap()
    }

    fn map_one(value: serde_json::Value) -> MappedSuggestion {
        let (triggers, actions) = catalog();
        let response = SuggestionResponse {
            suggested_workflows: vec![candidate(value)],
            errors: Vec::new(),
        };
        map_suggestions(&triggers, &actions, response)
            .suggestions
            .remove(0)
    }

    #[test]
    fn should_null_action_and_keep_trigger_when_action_is_unknown() {
        let (triggers, actions) = catalog();
        let response = SuggestionResponse {
            suggested_workflows: vec![candidate(json!({
                "workflow_name": "Fax the guest",
                "trigger_name": "guest checks in",
                "action_name": "Send Fax",
                "rule_type": "immediate"
            }))],
            errors: Vec::new(),
        };
        let mapped = map_suggestions(&triggers, &actions, response)
            .suggestions
            .remove(0);
        assert_eq!(mapped.trigger_id, Some(triggers[0].id));
        assert_eq!(mapped.trigger_name.as_deref(), Some("Guest checks in"));
        assert!(mapped.action_id.is_none());
        assert!(mapped.notes.iter().any(|n| n.contains("Send Fax")));
        assert_eq!(mapped.raw.action_name.as_deref(), Some("Send Fax"));
    }

    #[test]
    fn should_force_null_delay_when_rule_is_immediate() {
        let mapped = map_one(json!({
            "workflow_name": "Welcome Email",
            "trigger_name": "Guest checks in",
            "action_name": "Send Email",
            "rule_type": "Immediate",
            "delay_time": 5,
            "delay_unit": "hours"
        }));
        assert_eq!(mapped.rule_type, Some(RuleType::Immediate));
        assert!(mapped.delay_time.is_none());
        assert!(mapped.delay_unit.is_none());
        assert!(mapped.notes.is_empty());
        assert!(mapped.is_complete());
    }

    #[test]
    fn should_coerce_numeric_string_and_float_delay() {
        let from_string = map_one(json!({
            "rule_type": "scheduled", "delay_time": " 3 ", "delay_unit": "DAYS"
        }));
        assert_eq!(from_string.delay_time, Some(3));
        assert_eq!(from_string.delay_unit, Some(DelayUnit::Days));

        let from_float = map_one(json!({
            "rule_type": "scheduled", "delay_time": 2.7, "delay_unit": "hours"
        }));
        assert_eq!(from_float.delay_time, Some(2));
    }

    #[test]
    fn should_null_delay_with_note_when_not_positive() {
        let mapped = map_one(json!({
            "rule_type": "scheduled", "delay_time": 0, "delay_unit": "minutes"
        }));
        assert!(mapped.delay_time.is_none());
        assert!(mapped.notes.iter().any(|n| n.contains("must be positive")));
    }

    #[test]
    fn should_null_delay_with_note_when_unparsable() {
        let mapped = map_one(json!({
            "rule_type": "scheduled", "delay_time": "soon", "delay_unit": "weeks"
        }));
        assert!(mapped.delay_time.is_none());
        assert!(mapped.delay_unit.is_none());
        assert!(mapped.notes.iter().any(|n| n.contains("not a number")));
        assert!(mapped.notes.iter().any(|n| n.contains("weeks")));
    }

    #[test]
    fn should_null_rule_type_with_note_when_invalid() {
        let mapped = map_one(json!({ "rule_type": "eventually" }));
        assert!(mapped.rule_type.is_none());
        assert!(mapped.notes.iter().any(|n| n.contains("eventually")));
    }

    #[test]
    fn should_attach_generator_issues_by_index_and_keep_the_rest_global() {
        let (triggers, actions) = catalog();
        let response = SuggestionResponse {
            suggested_workflows: vec![candidate(json!({ "workflow_name": "A" }))],
            errors: vec![
                SuggestionIssue {
                    workflow_index: json!(0),
                    issues: vec!["ambiguous recipient".into()],
                },
                SuggestionIssue {
                    workflow_index: json!(4),
                    issues: vec!["could not parse clause".into()],
                },
            ],
        };
        let preview = map_suggestions(&triggers, &actions, response);
        assert!(preview.suggestions[0]
            .notes
            .contains(&"ambiguous recipient".to_string()));
        assert_eq!(preview.global_errors, vec!["workflow 4: could not parse clause"]);
    }

    #[test]
    fn should_build_scheduled_rule_when_suggestion_is_complete() {
        let mapped = map_one(json!({
            "workflow_name": "Create Reorder Task",
            "workflow_description": "Reorder stock",
            "trigger_name": "inventory running low",
            "action_name": "create task",
            "rule_type": "scheduled",
            "delay_time": 1,
            "delay_unit": "days"
        }));
        let rule = mapped.to_rule().unwrap();
        assert_eq!(rule.name, "Create Reorder Task");
        assert_eq!(rule.schedule, Schedule::scheduled(1, DelayUnit::Days).unwrap());
        assert!(rule.is_active);
    }

    #[test]
    fn should_refuse_rule_when_action_unresolved() {
        let mapped = map_one(json!({
            "workflow_name": "Fax",
            "trigger_name": "Guest checks in",
            "action_name": "Send Fax",
            "rule_type": "immediate"
        }));
        assert!(matches!(
            mapped.to_rule(),
            Err(HostflowError::Validation(ValidationError::IncompleteSuggestion(_)))
        ));
    }

    #[test]
    fn should_keep_candidates_when_issue_index_is_a_float() {
        let (triggers, actions) = catalog();
        let response: SuggestionResponse = serde_json::from_str(
            r#"{
                "suggested_workflows": [
                    {"workflow_name": "Welcome", "trigger_name": "Guest checks in",
                     "action_name": "Send Email", "rule_type": "immediate"},
                    {"workflow_name": "Reorder"}
                ],
                "errors": [
                    {"workflow_index": 0.0, "issues": ["tone unclear"]},
                    {"workflow_index": "1", "issues": ["no trigger given"]},
                    {"workflow_index": 1.5, "issues": ["half a workflow"]},
                    {"workflow_index": "last", "issues": ["unparsable"]},
                    {"issues": ["no index"]}
                ]
            }"#,
        )
        .unwrap();

        let preview = map_suggestions(&triggers, &actions, response);

        assert_eq!(preview.suggestions.len(), 2);
        assert!(preview.suggestions[0].is_complete());
        assert_eq!(preview.suggestions[0].notes, vec!["tone unclear"]);
        assert!(preview.suggestions[1]
            .notes
            .contains(&"no trigger given".to_string()));
        assert_eq!(
            preview.global_errors,
            vec![
                "workflow 1.5: half a workflow",
                "workflow last: unparsable",
                "workflow ?: no index",
            ]
        );
    }

    #[test]
    fn should_accept_response_without_errors_field() {
        let response: SuggestionResponse =
            serde_json::from_str(r#"{"suggested_workflows": []}"#).unwrap();
        assert!(response.errors.is_empty());
    }
}
