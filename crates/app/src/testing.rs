//! In-memory port implementations for tests.
//!
//! Every double is cheaply cloneable and clones share state, so a test can
//! hand one copy to a service and keep another to inspect or script it.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::TimeDelta;
use hostflow_domain::catalog::{Action, LoadedRule, MalformedRule, Rule, Trigger};
use hostflow_domain::error::{ConflictError, ExecutionError, ExternalServiceError, HostflowError};
use hostflow_domain::execution::{ExecutionRecord, ExecutionStatus};
use hostflow_domain::id::{ActionId, ExecutionRecordId, RuleId, TriggerId};
use hostflow_domain::suggestion::SuggestionResponse;
use hostflow_domain::time::Timestamp;

use crate::ports::{
    ActionExecutor, ActionRepository, Clock, ExecutionStore, RuleRepository, SuggestionGenerator,
    TriggerRepository,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn injected(reason: &str) -> HostflowError {
    HostflowError::Storage(Box::new(std::io::Error::other(reason.to_string())))
}

/// Clock frozen at a settable instant.
#[derive(Debug)]
pub struct FixedClock(Mutex<Timestamp>);

impl FixedClock {
    #[must_use]
    pub fn new(now: Timestamp) -> Self {
        Self(Mutex::new(now))
    }

    pub fn set(&self, now: Timestamp) {
        *lock(&self.0) = now;
    }

    pub fn advance(&self, by: TimeDelta) {
        let mut now = lock(&self.0);
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        *lock(&self.0)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryTriggerRepo {
    store: Arc<Mutex<HashMap<TriggerId, Trigger>>>,
}

impl InMemoryTriggerRepo {
    #[must_use]
    pub fn with(triggers: Vec<Trigger>) -> Self {
        let repo = Self::default();
        lock(&repo.store).extend(triggers.into_iter().map(|t| (t.id, t)));
        repo
    }
}

impl TriggerRepository for InMemoryTriggerRepo {
    fn create(&self, trigger: Trigger) -> impl Future<Output = Result<Trigger, HostflowError>> + Send {
        lock(&self.store).insert(trigger.id, trigger.clone());
        async { Ok(trigger) }
    }

    fn get_by_id(
        &self,
        id: TriggerId,
    ) -> impl Future<Output = Result<Option<Trigger>, HostflowError>> + Send {
        let result = lock(&self.store).get(&id).cloned();
        async { Ok(result) }
    }

    fn find_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Trigger>, HostflowError>> + Send {
        let result = lock(&self.store).values().find(|t| t.name == name).cloned();
        async { Ok(result) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Trigger>, HostflowError>> + Send {
        let mut result: Vec<Trigger> = lock(&self.store).values().cloned().collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        async { Ok(result) }
    }
}

#[derive(Clone, Default)]
pub struct InMemoryActionRepo {
    store: Arc<Mutex<HashMap<ActionId, Action>>>,
}

impl InMemoryActionRepo {
    #[must_use]
    pub fn with(actions: Vec<Action>) -> Self {
        let repo = Self::default();
        lock(&repo.store).extend(actions.into_iter().map(|a| (a.id, a)));
        repo
    }

    /// Remove an action without touching the rules that reference it.
    pub fn forget(&self, id: ActionId) {
        lock(&self.store).remove(&id);
    }
}

impl ActionRepository for InMemoryActionRepo {
    fn create(&self, action: Action) -> impl Future<Output = Result<Action, HostflowError>> + Send {
        lock(&self.store).insert(action.id, action.clone());
        async { Ok(action) }
    }

    fn get_by_id(
        &self,
        id: ActionId,
    ) -> impl Future<Output = Result<Option<Action>, HostflowError>> + Send {
        let result = lock(&self.store).get(&id).cloned();
        async { Ok(result) }
    }

    fn find_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Action>, HostflowError>> + Send {
        let result = lock(&self.store).values().find(|a| a.name == name).cloned();
        async { Ok(result) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Action>, HostflowError>> + Send {
        let mut result: Vec<Action> = lock(&self.store).values().cloned().collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        async { Ok(result) }
    }
}

/// Rule store that keeps insertion order and can hold malformed rows.
#[derive(Clone, Default)]
pub struct InMemoryRuleRepo {
    store: Arc<Mutex<Vec<LoadedRule>>>,
}

fn loaded_id(loaded: &LoadedRule) -> RuleId {
    match loaded {
        Ok(rule) => rule.id,
        Err(malformed) => malformed.id,
    }
}

impl InMemoryRuleRepo {
    #[must_use]
    pub fn with(rules: Vec<Rule>) -> Self {
        let repo = Self::default();
        lock(&repo.store).extend(rules.into_iter().map(Ok));
        repo
    }

    /// Store a rule without going through the async port.
    pub fn insert(&self, rule: Rule) {
        lock(&self.store).push(Ok(rule));
    }

    /// Store a row whose scheduling columns are invalid.
    pub fn insert_malformed(&self, malformed: MalformedRule) {
        lock(&self.store).push(Err(malformed));
    }
}

impl RuleRepository for InMemoryRuleRepo {
    fn create(&self, rule: Rule) -> impl Future<Output = Result<Rule, HostflowError>> + Send {
        lock(&self.store).push(Ok(rule.clone()));
        async { Ok(rule) }
    }

    fn get_by_id(
        &self,
        id: RuleId,
    ) -> impl Future<Output = Result<Option<Rule>, HostflowError>> + Send {
        let result = match lock(&self.store).iter().find(|r| loaded_id(r) == id) {
            None => Ok(None),
            Some(Ok(rule)) => Ok(Some(rule.clone())),
            Some(Err(malformed)) => Err(malformed.reason.clone().into()),
        };
        async { result }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Rule>, HostflowError>> + Send {
        let mut result: Vec<Rule> = lock(&self.store)
            .iter()
            .filter_map(|r| r.as_ref().ok().cloned())
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        async { Ok(result) }
    }

    fn find_active_by_trigger(
        &self,
        trigger_id: TriggerId,
    ) -> impl Future<Output = Result<Vec<LoadedRule>, HostflowError>> + Send {
        let result: Vec<LoadedRule> = lock(&self.store)
            .iter()
            .filter(|loaded| match loaded {
                Ok(rule) => rule.trigger_id == trigger_id && rule.is_active,
                Err(malformed) => malformed.trigger_id == trigger_id,
            })
            .cloned()
            .collect();
        async { Ok(result) }
    }

    fn update(&self, rule: Rule) -> impl Future<Output = Result<Rule, HostflowError>> + Send {
        let mut store = lock(&self.store);
        let result = match store.iter_mut().find(|r| loaded_id(r) == rule.id) {
            Some(slot) => {
                *slot = Ok(rule.clone());
                Ok(rule)
            }
            None => Err(rule.id.not_found().into()),
        };
        async { result }
    }

    fn delete(&self, id: RuleId) -> impl Future<Output = Result<(), HostflowError>> + Send {
        let mut store = lock(&self.store);
        let before = store.len();
        store.retain(|r| loaded_id(r) != id);
        let result = if store.len() == before {
            Err(id.not_found().into())
        } else {
            Ok(())
        };
        async { result }
    }
}

#[derive(Default)]
struct ExecutionState {
    records: Vec<ExecutionRecord>,
    failing_creates: HashSet<String>,
    failing_saves: HashSet<ExecutionStatus>,
    failing_due: bool,
}

/// Execution store with failure injection.
#[derive(Clone, Default)]
pub struct InMemoryExecutionStore {
    state: Arc<Mutex<ExecutionState>>,
}

impl InMemoryExecutionStore {
    /// Make `create` fail for records snapshotting this action name.
    pub fn fail_creates_for(&self, action_name: &str) {
        lock(&self.state)
            .failing_creates
            .insert(action_name.to_string());
    }

    /// Make `save` fail whenever the record would land in `status`.
    pub fn fail_saves_into(&self, status: ExecutionStatus) {
        lock(&self.state).failing_saves.insert(status);
    }

    /// Make `find_due` fail.
    pub fn fail_due_queries(&self) {
        lock(&self.state).failing_due = true;
    }

    /// Insert a record as-is, bypassing failure injection.
    pub fn insert(&self, record: ExecutionRecord) {
        lock(&self.state).records.push(record);
    }

    /// Overwrite the stored status of a record behind the callers' back.
    pub fn force_status(&self, id: ExecutionRecordId, status: ExecutionStatus) {
        if let Some(record) = lock(&self.state).records.iter_mut().find(|r| r.id == id) {
            record.status = status;
        }
    }

    /// Snapshot of all stored records, in insertion order.
    #[must_use]
    pub fn records(&self) -> Vec<ExecutionRecord> {
        lock(&self.state).records.clone()
    }

    /// Stored copy of one record.
    #[must_use]
    pub fn record(&self, id: ExecutionRecordId) -> Option<ExecutionRecord> {
        lock(&self.state).records.iter().find(|r| r.id == id).cloned()
    }
}

impl ExecutionStore for InMemoryExecutionStore {
    fn create(
        &self,
        record: ExecutionRecord,
    ) -> impl Future<Output = Result<ExecutionRecordId, HostflowError>> + Send {
        let mut state = lock(&self.state);
        let result = if state.failing_creates.contains(&record.action_name) {
            Err(injected("insert rejected"))
        } else {
            let id = record.id;
            state.records.push(record);
            Ok(id)
        };
        async { result }
    }

    fn find_due(
        &self,
        status: ExecutionStatus,
        until: Timestamp,
    ) -> impl Future<Output = Result<Vec<ExecutionRecord>, HostflowError>> + Send {
        let state = lock(&self.state);
        let result = if state.failing_due {
            Err(injected("query rejected"))
        } else {
            let mut due: Vec<ExecutionRecord> = state
                .records
                .iter()
                .filter(|r| {
                    r.status == status && r.scheduled_execution_time.is_some_and(|t| t <= until)
                })
                .cloned()
                .collect();
            due.sort_by_key(|r| (r.scheduled_execution_time, r.logged_at, r.id.as_uuid()));
            Ok(due)
        };
        async { result }
    }

    fn save(
        &self,
        record: &ExecutionRecord,
        expected: ExecutionStatus,
    ) -> impl Future<Output = Result<(), HostflowError>> + Send {
        let mut state = lock(&self.state);
        let failing = state.failing_saves.contains(&record.status);
        let result = match state.records.iter_mut().find(|r| r.id == record.id) {
            None => Err(record.id.not_found().into()),
            Some(_) if failing => Err(injected("update rejected")),
            Some(stored) if stored.status != expected => Err(ConflictError {
                entity: ExecutionRecordId::ENTITY,
                id: record.id.to_string(),
                expected,
            }
            .into()),
            Some(stored) => {
                *stored = record.clone();
                Ok(())
            }
        };
        async { result }
    }

    fn get_by_id(
        &self,
        id: ExecutionRecordId,
    ) -> impl Future<Output = Result<Option<ExecutionRecord>, HostflowError>> + Send {
        let result = self.record(id);
        async { Ok(result) }
    }

    fn list_recent(
        &self,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<ExecutionRecord>, HostflowError>> + Send {
        let mut result = self.records();
        result.sort_by(|a, b| b.logged_at.cmp(&a.logged_at));
        result.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        async { Ok(result) }
    }

    fn list_by_rule(
        &self,
        rule_id: RuleId,
    ) -> impl Future<Output = Result<Vec<ExecutionRecord>, HostflowError>> + Send {
        let mut result: Vec<ExecutionRecord> = self
            .records()
            .into_iter()
            .filter(|r| r.rule_id == rule_id)
            .collect();
        result.sort_by(|a, b| b.logged_at.cmp(&a.logged_at));
        async { Ok(result) }
    }
}

/// Executor that fails for a configurable set of action names and remembers
/// every record it was asked to run.
#[derive(Clone, Default)]
pub struct ScriptedExecutor {
    failing_actions: Arc<Mutex<HashSet<String>>>,
    executed: Arc<Mutex<Vec<ExecutionRecordId>>>,
}

impl ScriptedExecutor {
    pub fn fail_for(&self, action_name: &str) {
        lock(&self.failing_actions).insert(action_name.to_string());
    }

    #[must_use]
    pub fn executed(&self) -> Vec<ExecutionRecordId> {
        lock(&self.executed).clone()
    }
}

impl ActionExecutor for ScriptedExecutor {
    fn execute(
        &self,
        record: &ExecutionRecord,
    ) -> impl Future<Output = Result<(), HostflowError>> + Send {
        lock(&self.executed).push(record.id);
        let result = if lock(&self.failing_actions).contains(&record.action_name) {
            Err(ExecutionError {
                action: record.action_name.clone(),
                reason: "simulated failure".to_string(),
            }
            .into())
        } else {
            Ok(())
        };
        async { result }
    }
}

/// Generator returning a canned response and remembering the prompts.
#[derive(Clone)]
pub struct StubSuggestionGenerator {
    response: Result<SuggestionResponse, ExternalServiceError>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl StubSuggestionGenerator {
    #[must_use]
    pub fn returning(response: SuggestionResponse) -> Self {
        Self {
            response: Ok(response),
            prompts: Arc::default(),
        }
    }

    #[must_use]
    pub fn failing(error: ExternalServiceError) -> Self {
        Self {
            response: Err(error),
            prompts: Arc::default(),
        }
    }

    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }
}

impl SuggestionGenerator for StubSuggestionGenerator {
    fn generate(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<SuggestionResponse, HostflowError>> + Send {
        lock(&self.prompts).push(prompt.to_string());
        let result = self.response.clone().map_err(HostflowError::from);
        async { result }
    }
}
