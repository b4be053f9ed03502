//! `generateContent` wire types and the prompt sent with every request.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use hostflow_domain::vocabulary;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    pub system_instruction: Content,
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    pub response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Candidate {
    pub content: Option<Content>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, parts concatenated.
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Content {
    fn text(role: &str, text: impl Into<String>) -> Self {
        Self {
            role: Some(role.to_string()),
            parts: vec![Part {
                text: Some(text.into()),
            }],
        }
    }
}

// Worked examples, as (user request, expected model output).
const EXAMPLES: &[(&str, &str)] = &[
    (
        "When someone checks in, send them a welcome email.",
        r#"{"suggested_workflows":[{"workflow_name":"Welcome Email","workflow_description":"Send a welcome email to the guest.","trigger_name":"Guest checks in","action_name":"Send Email","rule_type":"immediate","delay_time":0,"delay_unit":"minutes"}]}"#,
    ),
    (
        "When inventory is running low, create a reorder task; and when a booking is canceled, send a Slack notification to procurement.",
        r#"{"suggested_workflows":[{"workflow_name":"Create Reorder Task","workflow_description":"Create a reorder task.","trigger_name":"Inventory running low","action_name":"Create Task","rule_type":"immediate","delay_time":0,"delay_unit":"minutes"},{"workflow_name":"Notify Procurement","workflow_description":"Send a Slack notification to procurement.","trigger_name":"Booking canceled","action_name":"Send Slack Notification","rule_type":"immediate","delay_time":0,"delay_unit":"minutes"}]}"#,
    ),
    (
        "When a guest checks out, create a cleaning task 2 hours later.",
        r#"{"suggested_workflows":[{"workflow_name":"Post-Checkout Cleaning","workflow_description":"Create a cleaning task two hours after checkout.","trigger_name":"Guest checks out","action_name":"Create Task","rule_type":"scheduled","delay_time":2,"delay_unit":"hours"}]}"#,
    ),
    (
        "When inventory is running low, send a native notification to the manager immediately and create a reorder task one day later.",
        r#"{"suggested_workflows":[{"workflow_name":"Low Inventory Alert","workflow_description":"Notify the manager about low inventory.","trigger_name":"Inventory running low","action_name":"Send Native Notification","rule_type":"immediate","delay_time":0,"delay_unit":"minutes"},{"workflow_name":"Delayed Reorder Task","workflow_description":"Create a reorder task one day later.","trigger_name":"Inventory running low","action_name":"Create Task","rule_type":"scheduled","delay_time":1,"delay_unit":"days"}]}"#,
    ),
    (
        "When the pool is cleaned, order pizza.",
        r#"{"suggested_workflows":[{"workflow_name":"Pool Cleaning Follow-up","workflow_description":"Order pizza after the pool is cleaned.","trigger_name":"Cleaning completed","action_name":"Create Task","rule_type":"immediate","delay_time":0,"delay_unit":"minutes"}],"errors":[{"workflow_index":0,"issues":["'order pizza' is not a known action; mapped to Create Task"]}]}"#,
    ),
];

/// The system instruction: vocabulary, output shape and field rules.
pub(crate) fn system_instruction() -> String {
    let mut text = String::from(
        "You are an assistant that turns automation requests from hospitality staff into \
         structured workflow suggestions.\n\n1. Valid triggers (must match exactly):\n",
    );
    for name in vocabulary::trigger_names() {
        let _ = writeln!(text, "   - {name}");
    }
    text.push_str("2. Valid actions (must match exactly):\n");
    for name in vocabulary::action_names() {
        let _ = writeln!(text, "   - {name}");
    }
    text.push_str(
        "3. Always return exactly one JSON object of the form \
         {\"suggested_workflows\": [{\"workflow_name\": string, \"workflow_description\": string, \
         \"trigger_name\": string, \"action_name\": string, \"rule_type\": \"immediate\" | \"scheduled\", \
         \"delay_time\": number, \"delay_unit\": \"minutes\" | \"hours\" | \"days\"}], \
         \"errors\": [{\"workflow_index\": number, \"issues\": [string]}]}. \
         \"errors\" is optional and reports problems with the suggestion at that index.\n\
         4. If rule_type is \"immediate\", delay_time must be 0. If rule_type is \"scheduled\", \
         delay_time must be a positive integer and delay_unit one of \"minutes\", \"hours\" or \"days\".\n\
         5. Do not wrap the output in markdown, do not add commentary, do not invent triggers or \
         actions, and do not add fields beyond the ones listed.\n",
    );
    text
}

/// Full request for one user prompt.
pub(crate) fn build_request(prompt: &str) -> GenerateContentRequest {
    let mut contents = Vec::with_capacity(EXAMPLES.len() * 2 + 1);
    for (request, answer) in EXAMPLES {
        contents.push(Content::text("user", *request));
        contents.push(Content::text("model", *answer));
    }
    contents.push(Content::text("user", prompt));

    GenerateContentRequest {
        system_instruction: Content {
            role: None,
            parts: vec![Part {
                text: Some(system_instruction()),
            }],
        },
        contents,
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
        },
    }
}

/// Drop a surrounding markdown code fence, which some models add anyway.
pub(crate) fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
