//! `SQLite` implementation of [`TriggerRepository`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use hostflow_app::ports::TriggerRepository;
use hostflow_domain::catalog::Trigger;
use hostflow_domain::error::HostflowError;
use hostflow_domain::id::TriggerId;

use crate::error::StorageError;

struct Wrapper(Trigger);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Trigger> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: uuid::Uuid = row.try_get("id")?;
        Ok(Self(Trigger {
            id: TriggerId::from_uuid(id),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
        }))
    }
}

/// `SQLite`-backed trigger repository.
#[derive(Clone)]
pub struct SqliteTriggerRepository {
    pool: SqlitePool,
}

impl SqliteTriggerRepository {
    /// Create a new repository backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl TriggerRepository for SqliteTriggerRepository {
    async fn create(&self, trigger: Trigger) -> Result<Trigger, HostflowError> {
        sqlx::query("INSERT INTO triggers (id, name, description) VALUES (?, ?, ?)")
            .bind(trigger.id.as_uuid())
            .bind(&trigger.name)
            .bind(&trigger.description)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(trigger)
    }

    async fn get_by_id(&self, id: TriggerId) -> Result<Option<Trigger>, HostflowError> {
        let row: Option<Wrapper> = sqlx::query_as("SELECT * FROM triggers WHERE id = ?")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(Wrapper::maybe(row))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Trigger>, HostflowError> {
        let row: Option<Wrapper> = sqlx::query_as("SELECT * FROM triggers WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(Wrapper::maybe(row))
    }

    async fn get_all(&self) -> Result<Vec<Trigger>, HostflowError> {
        let rows: Vec<Wrapper> = sqlx::query_as("SELECT * FROM triggers ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }
}
