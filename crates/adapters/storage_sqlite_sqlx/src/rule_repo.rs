//! `SQLite` implementation of [`RuleRepository`].
//!
//! The scheduling columns are plain text and integers, so a row can hold a
//! combination the domain rejects (e.g. `scheduled` without a unit). Such rows
//! are decoded as [`MalformedRule`] rather than failing the whole query.

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use hostflow_app::ports::RuleRepository;
use hostflow_domain::catalog::{DelayUnit, LoadedRule, MalformedRule, Rule, Schedule};
use hostflow_domain::error::HostflowError;
use hostflow_domain::id::{ActionId, RuleId, TriggerId};
use hostflow_domain::time::Timestamp;

use crate::columns::{decode_timestamp, encode_timestamp};
use crate::error::StorageError;

struct RuleRow {
    id: RuleId,
    name: String,
    description: Option<String>,
    trigger_id: TriggerId,
    action_id: ActionId,
    rule_type: String,
    delay_time: Option<i64>,
    delay_unit: Option<String>,
    is_active: bool,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl RuleRow {
    fn into_loaded(self) -> LoadedRule {
        let schedule = match Schedule::from_parts(
            &self.rule_type,
            self.delay_time,
            self.delay_unit.as_deref(),
        ) {
            Ok(schedule) => schedule,
            Err(reason) => {
                return Err(MalformedRule {
                    id: self.id,
                    name: self.name,
                    trigger_id: self.trigger_id,
                    action_id: self.action_id,
                    reason,
                });
            }
        };
        Ok(Rule {
            id: self.id,
            name: self.name,
            description: self.description,
            trigger_id: self.trigger_id,
            action_id: self.action_id,
            schedule,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl<'r> FromRow<'r, SqliteRow> for RuleRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: uuid::Uuid = row.try_get("id")?;
        let trigger_id: uuid::Uuid = row.try_get("trigger_id")?;
        let action_id: uuid::Uuid = row.try_get("action_id")?;
        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;

        Ok(Self {
            id: RuleId::from_uuid(id),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            trigger_id: TriggerId::from_uuid(trigger_id),
            action_id: ActionId::from_uuid(action_id),
            rule_type: row.try_get("rule_type")?,
            delay_time: row.try_get("delay_time")?,
            delay_unit: row.try_get("delay_unit")?,
            is_active: row.try_get("is_active")?,
            created_at: decode_timestamp(&created_at)?,
            updated_at: decode_timestamp(&updated_at)?,
        })
    }
}

const INSERT: &str = r"
    INSERT INTO rules (id, name, description, trigger_id, action_id, rule_type,
                       delay_time, delay_unit, is_active, created_at, updated_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
";

const UPDATE: &str = r"
    UPDATE rules
    SET name = ?, description = ?, trigger_id = ?, action_id = ?, rule_type = ?,
        delay_time = ?, delay_unit = ?, is_active = ?, updated_at = ?
    WHERE id = ?
";

const SELECT_BY_ID: &str = "SELECT * FROM rules WHERE id = ?";
const SELECT_ALL: &str = "SELECT * FROM rules ORDER BY created_at DESC, id";
const SELECT_ACTIVE_BY_TRIGGER: &str =
    "SELECT * FROM rules WHERE trigger_id = ? AND is_active = 1 ORDER BY created_at, id";

fn not_found(id: RuleId) -> HostflowError {
    id.not_found().into()
}

/// `SQLite`-backed rule repository.
#[derive(Clone)]
pub struct SqliteRuleRepository {
    pool: SqlitePool,
}

impl SqliteRuleRepository {
    /// Create a new repository backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl RuleRepository for SqliteRuleRepository {
    async fn create(&self, rule: Rule) -> Result<Rule, HostflowError> {
        sqlx::query(INSERT)
            .bind(rule.id.as_uuid())
            .bind(&rule.name)
            .bind(&rule.description)
            .bind(rule.trigger_id.as_uuid())
            .bind(rule.action_id.as_uuid())
            .bind(rule.schedule.rule_type().as_str())
            .bind(rule.schedule.delay_time().map(i64::from))
            .bind(rule.schedule.delay_unit().map(DelayUnit::as_str))
            .bind(rule.is_active)
            .bind(encode_timestamp(rule.created_at))
            .bind(encode_timestamp(rule.updated_at))
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rule)
    }

    async fn get_by_id(&self, id: RuleId) -> Result<Option<Rule>, HostflowError> {
        let row: Option<RuleRow> = sqlx::query_as(SELECT_BY_ID)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        match row.map(RuleRow::into_loaded) {
            None => Ok(None),
            Some(Ok(rule)) => Ok(Some(rule)),
            Some(Err(malformed)) => Err(malformed.reason.into()),
        }
    }

    async fn get_all(&self) -> Result<Vec<Rule>, HostflowError> {
        let rows: Vec<RuleRow> = sqlx::query_as(SELECT_ALL)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows
            .into_iter()
            .filter_map(|row| match row.into_loaded() {
                Ok(rule) => Some(rule),
                Err(malformed) => {
                    tracing::warn!(
                        rule_id = %malformed.id,
                        reason = %malformed.reason,
                        "skipping malformed rule"
                    );
                    None
                }
            })
            .collect())
    }

    async fn find_active_by_trigger(
        &self,
        trigger_id: TriggerId,
    ) -> Result<Vec<LoadedRule>, HostflowError> {
        let rows: Vec<RuleRow> = sqlx::query_as(SELECT_ACTIVE_BY_TRIGGER)
            .bind(trigger_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(RuleRow::into_loaded).collect())
    }

    async fn update(&self, rule: Rule) -> Result<Rule, HostflowError> {
        let result = sqlx::query(UPDATE)
            .bind(&rule.name)
            .bind(&rule.description)
            .bind(rule.trigger_id.as_uuid())
            .bind(rule.action_id.as_uuid())
            .bind(rule.schedule.rule_type().as_str())
            .bind(rule.schedule.delay_time().map(i64::from))
            .bind(rule.schedule.delay_unit().map(DelayUnit::as_str))
            .bind(rule.is_active)
            .bind(encode_timestamp(rule.updated_at))
            .bind(rule.id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        if result.rows_affected() == 0 {
            return Err(not_found(rule.id));
        }
        Ok(rule)
    }

    async fn delete(&self, id: RuleId) -> Result<(), HostflowError> {
        let result = sqlx::query("DELETE FROM rules WHERE id = ?")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use hostflow_app::ports::{ActionRepository, TriggerRepository};
    use hostflow_domain::catalog::{Action, Trigger};
    use hostflow_domain::error::ValidationError;

    use super::*;
    use crate::pool::Config;
    use crate::{SqliteActionRepository, SqliteTriggerRepository};

    struct Fixture {
        pool: SqlitePool,
        repo: SqliteRuleRepository,
        trigger: Trigger,
        action: Action,
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

        Fixture {
            repo: SqliteRuleRepository::new(pool.clone()),
            pool,
            trigger,
            action,
        }
    }

    fn at(hour: u32) -> Timestamp {
        chrono::Utc.with_ymd_and_hms(2025, 1, 1, hour, 0, 0).unwrap()
    }

    fn rule(fixture: &Fixture, name: &str, schedule: Schedule, created_at: Timestamp) -> Rule {
        Rule::builder()
            .name(name)
            .trigger_id(fixture.trigger.id)
            .action_id(fixture.action.id)
            .schedule(schedule)
            .created_at(created_at)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn should_round_trip_scheduled_rule() {
        let fx = setup().await;
        let schedule = Schedule::scheduled(2, DelayUnit::Hours).unwrap();
        let created = rule(&fx, "Cleanup", schedule, at(9));

        fx.repo.create(created.clone()).await.unwrap();

        let fetched = fx.repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn should_store_null_delay_columns_for_immediate_rule() {
        let fx = setup().await;
        let created = rule(&fx, "Welcome", Schedule::Immediate, at(9));
        fx.repo.create(created.clone()).await.unwrap();

        let (delay_time, delay_unit): (Option<i64>, Option<String>) =
            sqlx::query_as("SELECT delay_time, delay_unit FROM rules WHERE id = ?")
                .bind(created.id.as_uuid())
                .fetch_one(&fx.pool)
                .await
                .unwrap();

        assert_eq!(delay_time, None);
        assert_eq!(delay_unit, None);
        let fetched = fx.repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.schedule, Schedule::Immediate);
    }

    #[tokio::test]
    async fn should_list_newest_first() {
        let fx = setup().await;
        fx.repo
            .create(rule(&fx, "Older", Schedule::Immediate, at(8)))
            .await
            .unwrap();
        fx.repo
            .create(rule(&fx, "Newer", Schedule::Immediate, at(10)))
            .await
            .unwrap();

        let names: Vec<String> = fx
            .repo
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["Newer", "Older"]);
    }

    #[tokio::test]
    async fn should_return_only_active_rules_for_trigger_oldest_first() {
        let fx = setup().await;
        let second = rule(&fx, "Second", Schedule::Immediate, at(10));
        let first = rule(&fx, "First", Schedule::Immediate, at(8));
        let mut inactive = rule(&fx, "Paused", Schedule::Immediate, at(9));
        inactive.is_active = false;
        for r in [second.clone(), first.clone(), inactive] {
            fx.repo.create(r).await.unwrap();
        }

        let loaded = fx.repo.find_active_by_trigger(fx.trigger.id).await.unwrap();

        assert_eq!(loaded, vec![Ok(first), Ok(second)]);
        assert!(
            fx.repo
                .find_active_by_trigger(TriggerId::new())
                .await
                .unwrap()
                .is_empty()
        );
    }

    async fn insert_raw(fx: &Fixture, id: RuleId, rule_type: &str, delay_time: Option<i64>) {
        sqlx::query(INSERT)
            .bind(id.as_uuid())
            .bind("Broken")
            .bind(None::<String>)
            .bind(fx.trigger.id.as_uuid())
            .bind(fx.action.id.as_uuid())
            .bind(rule_type)
            .bind(delay_time)
            .bind(None::<String>)
            .bind(true)
            .bind(encode_timestamp(at(7)))
            .bind(encode_timestamp(at(7)))
            .execute(&fx.pool)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn should_surface_malformed_row_to_dispatch_lookup() {
        let fx = setup().await;
        let id = RuleId::new();
        insert_raw(&fx, id, "scheduled", Some(3)).await;

        let loaded = fx.repo.find_active_by_trigger(fx.trigger.id).await.unwrap();

        assert_eq!(
            loaded,
            vec![Err(MalformedRule {
                id,
                name: "Broken".to_string(),
                trigger_id: fx.trigger.id,
                action_id: fx.action.id,
                reason: ValidationError::MissingDelay,
            })]
        );
    }

    #[tokio::test]
    async fn should_skip_malformed_row_in_listing_and_reject_it_by_id() {
        let fx = setup().await;
        let id = RuleId::new();
        insert_raw(&fx, id, "later", None).await;
        fx.repo
            .create(rule(&fx, "Fine", Schedule::Immediate, at(9)))
            .await
            .unwrap();

        assert_eq!(fx.repo.get_all().await.unwrap().len(), 1);
        assert!(matches!(
            fx.repo.get_by_id(id).await,
            Err(HostflowError::Validation(ValidationError::InvalidRuleType(_)))
        ));
    }

    #[tokio::test]
    async fn should_update_rule() {
        let fx = setup().await;
        let mut stored = rule(&fx, "Cleanup", Schedule::Immediate, at(9));
        fx.repo.create(stored.clone()).await.unwrap();

        stored.name = "Cleanup later".to_string();
        stored.schedule = Schedule::scheduled(30, DelayUnit::Minutes).unwrap();
        stored.is_active = false;
        stored.updated_at = at(11);
        fx.repo.update(stored.clone()).await.unwrap();

        assert_eq!(fx.repo.get_by_id(stored.id).await.unwrap(), Some(stored));
    }

    #[tokio::test]
    async fn should_return_not_found_when_updating_or_deleting_missing_rule() {
        let fx = setup().await;
        let ghost = rule(&fx, "Ghost", Schedule::Immediate, at(9));

        assert!(matches!(
            fx.repo.update(ghost.clone()).await,
            Err(HostflowError::NotFound(_))
        ));
        assert!(matches!(
            fx.repo.delete(ghost.id).await,
            Err(HostflowError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn should_delete_rule() {
        let fx = setup().await;
        let stored = rule(&fx, "Cleanup", Schedule::Immediate, at(9));
        fx.repo.create(stored.clone()).await.unwrap();

        fx.repo.delete(stored.id).await.unwrap();

        assert!(fx.repo.get_by_id(stored.id).await.unwrap().is_none());
    }
}
