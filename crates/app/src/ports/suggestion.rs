//! Suggestion generator port — free-form text in, rule candidates out.

use std::future::Future;

use hostflow_domain::error::HostflowError;
use hostflow_domain::suggestion::SuggestionResponse;

/// External collaborator turning a natural-language request into rule
/// candidates.
///
/// Implementations report every failure as
/// [`HostflowError::ExternalService`] and never retry.
pub trait SuggestionGenerator {
    fn generate(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<SuggestionResponse, HostflowError>> + Send;
}
