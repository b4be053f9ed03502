//! Controlled vocabulary of trigger and action names.
//!
//! Names must match exactly when stored. Case-insensitive matching is only
//! allowed when mapping untrusted input (see [`crate::suggestion`]).

/// Every trigger name the system knows about, with a short description.
pub const TRIGGERS: &[(&str, &str)] = &[
    ("Guest checks in", "A guest has completed check-in."),
    ("Guest checks out", "A guest has completed check-out."),
    ("Cleaning completed", "Housekeeping marked a unit as clean."),
    (
        "Maintenance issue reported",
        "A maintenance problem was reported for a unit.",
    ),
    ("Booking canceled", "A reservation was canceled."),
    ("Inventory running low", "A stocked item fell below its threshold."),
    ("Guest Sends Message", "A guest sent a message."),
    ("New Booking Confirmed", "A new reservation was confirmed."),
    ("Smart Device Alert", "A smart device raised an alert."),
];

/// Every action name the system knows about, with a short description.
pub const ACTIONS: &[(&str, &str)] = &[
    ("Send Email", "Send an email message."),
    ("Send Slack Notification", "Post a message to a Slack channel."),
    ("Send Native Notification", "Push a notification to the app."),
    ("Create Task", "Create a task for the team."),
    ("Turn Device On/Off", "Toggle a smart device."),
];

/// Iterate over the trigger names only.
pub fn trigger_names() -> impl Iterator<Item = &'static str> {
    TRIGGERS.iter().map(|(name, _)| *name)
}

/// Iterate over the action names only.
pub fn action_names() -> impl Iterator<Item = &'static str> {
    ACTIONS.iter().map(|(name, _)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_list_nine_triggers_and_five_actions() {
        assert_eq!(trigger_names().count(), 9);
        assert_eq!(action_names().count(), 5);
    }

    #[test]
    fn should_keep_exact_casing_of_names() {
        assert!(trigger_names().any(|n| n == "Guest Sends Message"));
        assert!(action_names().any(|n| n == "Turn Device On/Off"));
    }
}
