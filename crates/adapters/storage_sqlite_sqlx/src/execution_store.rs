//! `SQLite` implementation of [`ExecutionStore`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use hostflow_app::ports::ExecutionStore;
use hostflow_domain::error::{ConflictError, HostflowError, ValidationError};
use hostflow_domain::execution::{ExecutionRecord, ExecutionStatus};
use hostflow_domain::id::{ExecutionRecordId, RuleId};
use hostflow_domain::time::{self, Timestamp};

use crate::columns::{decode_optional_timestamp, decode_timestamp, encode_timestamp};
use crate::error::StorageError;

struct Wrapper(ExecutionRecord);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<ExecutionRecord> {
        value.map(|w| w.0)
    }

    fn unwrap_all(rows: Vec<Self>) -> Vec<ExecutionRecord> {
        rows.into_iter().map(|w| w.0).collect()
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: uuid::Uuid = row.try_get("id")?;
        let rule_id: uuid::Uuid = row.try_get("rule_id")?;
        let status: String = row.try_get("status")?;
        let logged_at: String = row.try_get("logged_at")?;
        let scheduled: Option<String> = row.try_get("scheduled_execution_time")?;
        let actual: Option<String> = row.try_get("actual_execution_time")?;

        let status: ExecutionStatus = status
            .parse()
            .map_err(|err: String| sqlx::Error::Decode(err.into()))?;

        Ok(Self(ExecutionRecord {
            id: ExecutionRecordId::from_uuid(id),
            rule_id: RuleId::from_uuid(rule_id),
            status,
            trigger_name: row.try_get("trigger_name")?,
            action_name: row.try_get("action_name")?,
            logged_at: decode_timestamp(&logged_at)?,
            scheduled_execution_time: decode_optional_timestamp(scheduled)?,
            actual_execution_time: decode_optional_timestamp(actual)?,
            details: row.try_get("details")?,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO execution_records (id, rule_id, status, trigger_name, action_name, logged_at,
                                   scheduled_execution_time, actual_execution_time, details)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
";

// Only the status and its timing columns move after creation.
const CONDITIONAL_UPDATE: &str = r"
    UPDATE execution_records
    SET status = ?, scheduled_execution_time = ?, actual_execution_time = ?, details = ?
    WHERE id = ? AND status = ?
";

const SELECT_DUE: &str = r"
    SELECT * FROM execution_records
    WHERE status = ? AND scheduled_execution_time IS NOT NULL AND scheduled_execution_time <= ?
    ORDER BY scheduled_execution_time, logged_at, id
";

const SELECT_BY_ID: &str = "SELECT * FROM execution_records WHERE id = ?";
const SELECT_RECENT: &str =
    "SELECT * FROM execution_records ORDER BY logged_at DESC, id LIMIT ?";
const SELECT_BY_RULE: &str =
    "SELECT * FROM execution_records WHERE rule_id = ? ORDER BY logged_at DESC, id";

// Text columns only compare in time order for four-digit years.
fn ensure_storable(record: &ExecutionRecord) -> Result<(), ValidationError> {
    let storable = [
        Some(record.logged_at),
        record.scheduled_execution_time,
        record.actual_execution_time,
    ]
    .into_iter()
    .flatten()
    .all(time::is_representable);
    if storable {
        Ok(())
    } else {
        Err(ValidationError::DelayOutOfRange)
    }
}

/// `SQLite`-backed execution record store.
#[derive(Clone)]
pub struct SqliteExecutionStore {
    pool: SqlitePool,
}

impl SqliteExecutionStore {
    /// Create a new store using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ExecutionStore for SqliteExecutionStore {
    async fn create(&self, record: ExecutionRecord) -> Result<ExecutionRecordId, HostflowError> {
        ensure_storable(&record)?;
        sqlx::query(INSERT)
            .bind(record.id.as_uuid())
            .bind(record.rule_id.as_uuid())
            .bind(record.status.as_str())
            .bind(&record.trigger_name)
            .bind(&record.action_name)
            .bind(encode_timestamp(record.logged_at))
            .bind(record.scheduled_execution_time.map(encode_timestamp))
            .bind(record.actual_execution_time.map(encode_timestamp))
            .bind(&record.details)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(record.id)
    }

    async fn find_due(
        &self,
        status: ExecutionStatus,
        until: Timestamp,
    ) -> Result<Vec<ExecutionRecord>, HostflowError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_DUE)
            .bind(status.as_str())
            .bind(encode_timestamp(until))
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(Wrapper::unwrap_all(rows))
    }

    async fn save(
        &self,
        record: &ExecutionRecord,
        expected: ExecutionStatus,
    ) -> Result<(), HostflowError> {
        ensure_storable(record)?;
        let result = sqlx::query(CONDITIONAL_UPDATE)
            .bind(record.status.as_str())
            .bind(record.scheduled_execution_time.map(encode_timestamp))
            .bind(record.actual_execution_time.map(encode_timestamp))
            .bind(&record.details)
            .bind(record.id.as_uuid())
            .bind(expected.as_str())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        if result.rows_affected() == 1 {
            return Ok(());
        }

        let exists: Option<(String,)> =
            sqlx::query_as("SELECT status FROM execution_records WHERE id = ?")
                .bind(record.id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(StorageError::from)?;
        match exists {
            None => Err(record.id.not_found().into()),
            Some((current,)) => {
                tracing::debug!(record_id = %record.id, %expected, %current, "status moved on");
                Err(ConflictError {
                    entity: ExecutionRecordId::ENTITY,
                    id: record.id.to_string(),
                    expected,
                }
                .into())
            }
        }
    }

    async fn get_by_id(
        &self,
        id: ExecutionRecordId,
    ) -> Result<Option<ExecutionRecord>, HostflowError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(Wrapper::maybe(row))
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<ExecutionRecord>, HostflowError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_RECENT)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(Wrapper::unwrap_all(rows))
    }

    async fn list_by_rule(&self, rule_id: RuleId) -> Result<Vec<ExecutionRecord>, HostflowError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_RULE)
            .bind(rule_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(Wrapper::unwrap_all(rows))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone};
    use hostflow_app::ports::{ActionRepository, RuleRepository, TriggerRepository};
    use hostflow_domain::catalog::{Action, Rule, Trigger};

    use super::*;
    use crate::pool::Config;
    use crate::{SqliteActionRepository, SqliteRuleRepository, SqliteTriggerRepository};

    struct Fixture {
        store: SqliteExecutionStore,
        rules: SqliteRuleRepository,
        rule_id: RuleId,
    }

    async fn setup() -> Fixture {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();
        let pool = db.pool().clone();

        let trigger = Trigger::builder().name("Guest checks out").build().unwrap();
        let action = Action::builder().name("Create Task").build().unwrap();
        SqliteTriggerRepository::new(pool.clone())
            .create(trigger.clone())
            .await
            .unwrap();
        SqliteActionRepository::new(pool.clone())
            .create(action.clone())
            .await
            .unwrap();
        let rule = Rule::builder()
            .name("Cleanup")
            .trigger_id(trigger.id)
            .action_id(action.id)
            .build()
            .unwrap();
        let rules = SqliteRuleRepository::new(pool.clone());
        rules.create(rule.clone()).await.unwrap();

        Fixture {
            store: SqliteExecutionStore::new(pool),
            rules,
            rule_id: rule.id,
        }
    }

    fn t0() -> Timestamp {
        chrono::Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap()
    }

    fn scheduled(fx: &Fixture, logged_at: Timestamp, due_at: Timestamp) -> ExecutionRecord {
        ExecutionRecord::simulated_scheduled(
            fx.rule_id,
            "Guest checks out",
            "Create Task",
            logged_at,
            due_at,
        )
    }

    #[tokio::test]
    async fn should_create_and_retrieve_record() {
        let fx = setup().await;
        let record = scheduled(&fx, t0(), t0() + TimeDelta::hours(2));

        let id = fx.store.create(record.clone()).await.unwrap();

        assert_eq!(id, record.id);
        assert_eq!(fx.store.get_by_id(id).await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn should_find_only_due_records_with_status_in_time_order() {
        let fx = setup().await;
        let late = scheduled(&fx, t0(), t0() + TimeDelta::minutes(30));
        let early = scheduled(&fx, t0(), t0() + TimeDelta::minutes(10));
        let future = scheduled(&fx, t0(), t0() + TimeDelta::hours(5));
        let immediate = ExecutionRecord::simulated_immediate(
            fx.rule_id,
            "Guest checks out",
            "Create Task",
            t0(),
        );
        for record in [late.clone(), early.clone(), future, immediate] {
            fx.store.create(record).await.unwrap();
        }

        let due = fx
            .store
            .find_due(ExecutionStatus::SimulatedScheduled, t0() + TimeDelta::hours(1))
            .await
            .unwrap();

        assert_eq!(due, vec![early, late]);
    }

    #[tokio::test]
    async fn should_refuse_due_time_past_year_9999_and_keep_sweeps_working() {
        let fx = setup().await;
        let beyond = chrono::Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap()
            + TimeDelta::days(1);
        let record = scheduled(&fx, t0(), beyond);

        let err = fx.store.create(record.clone()).await.unwrap_err();

        assert!(matches!(
            err,
            HostflowError::Validation(ValidationError::DelayOutOfRange)
        ));
        assert_eq!(fx.store.get_by_id(record.id).await.unwrap(), None);
        assert!(fx
            .store
            .find_due(ExecutionStatus::SimulatedScheduled, t0())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn should_not_report_year_9999_record_as_due() {
        let fx = setup().await;
        let last = chrono::Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap();
        let record = scheduled(&fx, t0(), last);
        fx.store.create(record.clone()).await.unwrap();

        let due = fx
            .store
            .find_due(ExecutionStatus::SimulatedScheduled, t0())
            .await
            .unwrap();

        assert!(due.is_empty());
        assert_eq!(fx.store.get_by_id(record.id).await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn should_include_record_due_exactly_at_until() {
        let fx = setup().await;
        let due_at = t0() + TimeDelta::hours(2);
        let record = scheduled(&fx, t0(), due_at);
        fx.store.create(record.clone()).await.unwrap();

        let due = fx
            .store
            .find_due(ExecutionStatus::SimulatedScheduled, due_at)
            .await
            .unwrap();

        assert_eq!(due, vec![record]);
    }

    #[tokio::test]
    async fn should_save_when_expected_status_matches() {
        let fx = setup().await;
        let mut record = scheduled(&fx, t0(), t0());
        fx.store.create(record.clone()).await.unwrap();

        record.claim().unwrap();
        fx.store
            .save(&record, ExecutionStatus::SimulatedScheduled)
            .await
            .unwrap();
        record.complete(t0() + TimeDelta::minutes(1)).unwrap();
        fx.store
            .save(&record, ExecutionStatus::Processing)
            .await
            .unwrap();

        let stored = fx.store.get_by_id(record.id).await.unwrap().unwrap();
        assert_eq!(stored, record);
        assert_eq!(stored.status, ExecutionStatus::Executed);
    }

    #[tokio::test]
    async fn should_conflict_when_status_moved_on() {
        let fx = setup().await;
        let record = scheduled(&fx, t0(), t0());
        fx.store.create(record.clone()).await.unwrap();

        let mut first = record.clone();
        first.claim().unwrap();
        fx.store
            .save(&first, ExecutionStatus::SimulatedScheduled)
            .await
            .unwrap();

        let mut second = record;
        second.claim().unwrap();
        let result = fx
            .store
            .save(&second, ExecutionStatus::SimulatedScheduled)
            .await;

        assert!(matches!(result, Err(HostflowError::Conflict(_))));
    }

    #[tokio::test]
    async fn should_return_not_found_when_saving_unknown_record() {
        let fx = setup().await;
        let mut record = scheduled(&fx, t0(), t0());
        record.claim().unwrap();

        let result = fx
            .store
            .save(&record, ExecutionStatus::SimulatedScheduled)
            .await;

        assert!(matches!(result, Err(HostflowError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_list_recent_newest_first_with_limit() {
        let fx = setup().await;
        for minutes in [1, 3, 2] {
            let logged_at = t0() + TimeDelta::minutes(minutes);
            fx.store
                .create(scheduled(&fx, logged_at, logged_at))
                .await
                .unwrap();
        }

        let recent = fx.store.list_recent(2).await.unwrap();

        let logged: Vec<Timestamp> = recent.iter().map(|r| r.logged_at).collect();
        assert_eq!(
            logged,
            vec![t0() + TimeDelta::minutes(3), t0() + TimeDelta::minutes(2)]
        );
    }

    #[tokio::test]
    async fn should_drop_records_with_their_rule() {
        let fx = setup().await;
        fx.store.create(scheduled(&fx, t0(), t0())).await.unwrap();
        assert_eq!(fx.store.list_by_rule(fx.rule_id).await.unwrap().len(), 1);

        fx.rules.delete(fx.rule_id).await.unwrap();

        assert!(fx.store.list_by_rule(fx.rule_id).await.unwrap().is_empty());
        assert!(fx.store.list_recent(10).await.unwrap().is_empty());
    }
}
