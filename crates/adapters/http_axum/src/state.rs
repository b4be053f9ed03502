//! Shared application state for axum handlers.

use std::sync::Arc;

use hostflow_app::catalog::RuleCatalog;
use hostflow_app::dispatcher::TriggerDispatcher;
use hostflow_app::reconciler::Reconciler;
use hostflow_app::services::rule_service::RuleService;
use hostflow_app::suggestions::SuggestionService;

/// Application state shared across all axum handlers.
///
/// Generic over the trigger, action and rule repositories, the execution
/// store, the action executor and the suggestion generator to avoid dynamic
/// dispatch. `Clone` is implemented manually so the underlying types
/// themselves do not need to be `Clone`; only the `Arc` wrappers are cloned.
pub struct AppState<TR, AR, RR, ES, X, G> {
    /// Read-only trigger and action lookups.
    pub catalog: Arc<RuleCatalog<TR, AR, RR>>,
    /// Rule CRUD and execution log queries.
    pub rule_service: Arc<RuleService<TR, AR, RR, ES>>,
    /// Trigger simulation.
    pub dispatcher: Arc<TriggerDispatcher<TR, AR, RR, ES>>,
    /// Due scheduled record processing.
    pub reconciler: Arc<Reconciler<ES, X>>,
    /// Natural-language rule suggestions.
    pub suggestions: Arc<SuggestionService<TR, AR, RR, G>>,
}

impl<TR, AR, RR, ES, X, G> Clone for AppState<TR, AR, RR, ES, X, G> {
    fn clone(&self) -> Self {
        Self {
            catalog: Arc::clone(&self.catalog),
            rule_service: Arc::clone(&self.rule_service),
            dispatcher: Arc::clone(&self.dispatcher),
            reconciler: Arc::clone(&self.reconciler),
            suggestions: Arc::clone(&self.suggestions),
        }
    }
}

impl<TR, AR, RR, ES, X, G> AppState<TR, AR, RR, ES, X, G> {
    /// Create a new application state from service instances.
    pub fn new(
        catalog: RuleCatalog<TR, AR, RR>,
        rule_service: RuleService<TR, AR, RR, ES>,
        dispatcher: TriggerDispatcher<TR, AR, RR, ES>,
        reconciler: Reconciler<ES, X>,
        suggestions: SuggestionService<TR, AR, RR, G>,
    ) -> Self {
        Self {
            catalog: Arc::new(catalog),
            rule_service: Arc::new(rule_service),
            dispatcher: Arc::new(dispatcher),
            reconciler: Arc::new(reconciler),
            suggestions: Arc::new(suggestions),
        }
    }

    /// Create a new application state from pre-wrapped `Arc` services.
    ///
    /// Use this when services need to be shared with background tasks
    /// before constructing the HTTP state.
    pub fn from_arcs(
        catalog: Arc<RuleCatalog<TR, AR, RR>>,
        rule_service: Arc<RuleService<TR, AR, RR, ES>>,
        dispatcher: Arc<TriggerDispatcher<TR, AR, RR, ES>>,
        reconciler: Arc<Reconciler<ES, X>>,
        suggestions: Arc<SuggestionService<TR, AR, RR, G>>,
    ) -> Self {
        Self {
            catalog,
            rule_service,
            dispatcher,
            reconciler,
            suggestions,
        }
    }
}
