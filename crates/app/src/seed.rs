//! Vocabulary seeding — make sure every known trigger and action exists.

use hostflow_domain::catalog::{Action, Trigger};
use hostflow_domain::error::HostflowError;
use hostflow_domain::vocabulary;

use crate::ports::{ActionRepository, TriggerRepository};

/// How many rows a seeding pass inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub triggers_created: usize,
    pub actions_created: usize,
}

/// Insert the controlled vocabulary rows that are missing.
///
/// Existing rows are left untouched, so running this twice is harmless.
///
/// # Errors
///
/// Returns a storage error propagated from the repositories.
#[tracing::instrument(skip_all)]
pub async fn seed_vocabulary<TR, AR>(triggers: &TR, actions: &AR) -> Result<SeedReport, HostflowError>
where
    TR: TriggerRepository,
    AR: ActionRepository,
{
    let mut report = SeedReport::default();

    for (name, description) in vocabulary::TRIGGERS {
        if triggers.find_by_name(name).await?.is_none() {
            let trigger = Trigger::builder()
                .name(*name)
                .description(*description)
                .build()?;
            triggers.create(trigger).await?;
            report.triggers_created += 1;
        }
    }

    for (name, description) in vocabulary::ACTIONS {
        if actions.find_by_name(name).await?.is_none() {
            let action = Action::builder()
                .name(*name)
                .description(*description)
                .build()?;
            actions.create(action).await?;
            report.actions_created += 1;
        }
    }

    if report != SeedReport::default() {
        tracing::info!(
            triggers = report.triggers_created,
            actions = report.actions_created,
            "seeded vocabulary"
        );
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemoryActionRepo, InMemoryTriggerRepo};

    #[tokio::test]
    async fn should_create_full_vocabulary_on_empty_store() {
        let triggers = InMemoryTriggerRepo::default();
        let actions = InMemoryActionRepo::default();

        let report = seed_vocabulary(&triggers, &actions).await.unwrap();

        assert_eq!(report.triggers_created, 9);
        assert_eq!(report.actions_created, 5);
        assert!(triggers
            .find_by_name("Smart Device Alert")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn should_be_idempotent() {
        let triggers = InMemoryTriggerRepo::default();
        let actions = InMemoryActionRepo::default();
        seed_vocabulary(&triggers, &actions).await.unwrap();

        let again = seed_vocabulary(&triggers, &actions).await.unwrap();

        assert_eq!(again, SeedReport::default());
        assert_eq!(triggers.get_all().await.unwrap().len(), 9);
    }

    #[tokio::test]
    async fn should_keep_existing_rows() {
        let existing = Trigger::builder()
            .name("Guest checks in")
            .description("custom")
            .build()
            .unwrap();
        let triggers = InMemoryTriggerRepo::with(vec![existing.clone()]);
        let actions = InMemoryActionRepo::default();

        let report = seed_vocabulary(&triggers, &actions).await.unwrap();

        assert_eq!(report.triggers_created, 8);
        let kept = triggers.get_by_id(existing.id).await.unwrap().unwrap();
        assert_eq!(kept.description.as_deref(), Some("custom"));
    }
}
