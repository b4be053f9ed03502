//! `SQLite` implementation of [`ActionRepository`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use hostflow_app::ports::ActionRepository;
use hostflow_domain::catalog::Action;
use hostflow_domain::error::HostflowError;
use hostflow_domain::id::ActionId;

use crate::error::StorageError;

struct Wrapper(Action);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Action> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: uuid::Uuid = row.try_get("id")?;
        Ok(Self(Action {
            id: ActionId::from_uuid(id),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
        }))
    }
}

/// `SQLite`-backed action repository.
#[derive(Clone)]
pub struct SqliteActionRepository {
    pool: SqlitePool,
}

impl SqliteActionRepository {
    /// Create a new repository backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ActionRepository for SqliteActionRepository {
    async fn create(&self, action: Action) -> Result<Action, HostflowError> {
        sqlx::query("INSERT INTO actions (id, name, description) VALUES (?, ?, ?)")
            .bind(action.id.as_uuid())
            .bind(&action.name)
            .bind(&action.description)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(action)
    }

    async fn get_by_id(&self, id: ActionId) -> Result<Option<Action>, HostflowError> {
        let row: Option<Wrapper> = sqlx::query_as("SELECT * FROM actions WHERE id = ?")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(Wrapper::maybe(row))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Action>, HostflowError> {
        let row: Option<Wrapper> = sqlx::query_as("SELECT * FROM actions WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(Wrapper::maybe(row))
    }

    async fn get_all(&self) -> Result<Vec<Action>, HostflowError> {
        let rows: Vec<Wrapper> = sqlx::query_as("SELECT * FROM actions ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }
}
