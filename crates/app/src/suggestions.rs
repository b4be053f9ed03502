//! Suggestion service — natural-language rule proposals.
//!
//! `suggest` asks the generator and maps its answer onto the catalog without
//! persisting anything. `confirm` is the explicit step that saves one
//! candidate as a rule, after mapping it again against the current catalog.
//!
//! Trigger and action names go through the catalog's case-insensitive
//! lookups; only the entities found that way reach the mapper.

use hostflow_domain::catalog::Rule;
use hostflow_domain::error::{HostflowError, ValidationError};
use hostflow_domain::suggestion::{
    map_suggestions, MappedSuggestion, SuggestionCandidate, SuggestionPreview, SuggestionResponse,
};

use crate::catalog::{Matching, RuleCatalog};
use crate::ports::{
    ActionRepository, RuleRepository, SharedClock, SuggestionGenerator, TriggerRepository,
};

pub struct SuggestionService<TR, AR, RR, G> {
    catalog: RuleCatalog<TR, AR, RR>,
    rules: RR,
    generator: G,
    clock: SharedClock,
}

impl<TR, AR, RR, G> SuggestionService<TR, AR, RR, G>
where
    TR: TriggerRepository,
    AR: ActionRepository,
    RR: RuleRepository,
    G: SuggestionGenerator,
{
    /// `rules` is where confirmed suggestions are saved.
    pub fn new(
        catalog: RuleCatalog<TR, AR, RR>,
        rules: RR,
        generator: G,
        clock: SharedClock,
    ) -> Self {
        Self {
            catalog,
            rules,
            generator,
            clock,
        }
    }

    /// Ask the generator for rules matching `text` and map them.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyPrompt`] for blank input,
    /// [`HostflowError::ExternalService`] when the generator fails, or a
    /// storage error while loading the catalog.
    #[tracing::instrument(skip(self, text))]
    pub async fn suggest(&self, text: &str) -> Result<SuggestionPreview, HostflowError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyPrompt.into());
        }
        let response = self.generator.generate(text).await?;
        let preview = self.map(response).await?;
        tracing::info!(
            suggestions = preview.suggestions.len(),
            global_errors = preview.global_errors.len(),
            "suggestions mapped"
        );
        Ok(preview)
    }

    /// Map a generator response against the current catalog.
    ///
    /// # Errors
    ///
    /// Returns a storage error while loading the catalog.
    pub async fn map(&self, response: SuggestionResponse) -> Result<SuggestionPreview, HostflowError> {
        let mut triggers = Vec::new();
        let mut actions = Vec::new();
        for candidate in &response.suggested_workflows {
            if let Some(name) = candidate.trigger_name.as_deref() {
                let found = self
                    .catalog
                    .find_trigger_by_name(name, Matching::CaseInsensitive)
                    .await;
                triggers.extend(unless_missing(found)?);
            }
            if let Some(name) = candidate.action_name.as_deref() {
                let found = self
                    .catalog
                    .find_action_by_name(name, Matching::CaseInsensitive)
                    .await;
                actions.extend(unless_missing(found)?);
            }
        }
        Ok(map_suggestions(&triggers, &actions, response))
    }

    /// Save one candidate as an active rule.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::IncompleteSuggestion`] when the candidate
    /// does not fully resolve, or a storage error.
    #[tracing::instrument(skip(self, candidate))]
    pub async fn confirm(&self, candidate: SuggestionCandidate) -> Result<Rule, HostflowError> {
        let preview = self
            .map(SuggestionResponse {
                suggested_workflows: vec![candidate],
                errors: Vec::new(),
            })
            .await?;
        let mapped: Option<&MappedSuggestion> = preview.suggestions.first();
        let Some(mapped) = mapped else {
            return Err(ValidationError::IncompleteSuggestion("no candidate".to_string()).into());
        };
        let mut rule = mapped.to_rule()?;
        let now = self.clock.now();
        rule.created_at = now;
        rule.updated_at = now;
        let rule = self.rules.create(rule).await?;
        tracing::info!(rule_id = %rule.id, "suggestion confirmed as rule");
        Ok(rule)
    }
}

// Unknown names become mapping notes, not errors.
fn unless_missing<T>(found: Result<T, HostflowError>) -> Result<Option<T>, HostflowError> {
    match found {
        Ok(entity) => Ok(Some(entity)),
        Err(HostflowError::NotFound(_)) => Ok(None),
        Err(err) => Err(err),
    }
}
