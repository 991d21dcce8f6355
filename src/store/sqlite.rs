use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use uuid::Uuid;

use super::{EntryStore, StoreError};
use crate::models::{EntryChanges, NewWorkoutEntry, UserId, WorkoutEntry};

/// Initialize the database connection pool and run migrations
pub async fn init_db(path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite:{}?mode=rwc", path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Offline backend keeping the entry table in a local SQLite file.
pub struct SqliteEntryStore {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct EntryRow {
    id: String,
    user_id: String,
    date: String,
    exercise: String,
    weight: f64,
    reps: i64,
    set_number: i64,
}

impl TryFrom<EntryRow> for WorkoutEntry {
    type Error = StoreError;

    fn try_from(row: EntryRow) -> Result<Self, Self::Error> {
        let reps = u32::try_from(row.reps)
            .map_err(|_| StoreError::Decode(format!("reps out of range: {}", row.reps)))?;
        let set_number = u32::try_from(row.set_number).map_err(|_| {
            StoreError::Decode(format!("set_number out of range: {}", row.set_number))
        })?;

        Ok(WorkoutEntry {
            id: row.id,
            user_id: UserId::new(row.user_id),
            date: row.date,
            exercise: row.exercise,
            weight: row.weight,
            reps,
            set_number,
        })
    }
}

impl SqliteEntryStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if needed) the database at `path`.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        let pool = init_db(path).await?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl EntryStore for SqliteEntryStore {
    async fn fetch_by_user(
        &self,
        user_id: &UserId,
        date: Option<&str>,
    ) -> Result<Vec<WorkoutEntry>, StoreError> {
        // rowid keeps insertion order among equal sort keys
        let rows: Vec<EntryRow> = match date {
            Some(date) => {
                sqlx::query_as(
                    r#"
                    SELECT id, user_id, date, exercise, weight, reps, set_number
                    FROM workout_entries
                    WHERE user_id = ? AND date = ?
                    ORDER BY set_number ASC, rowid ASC
                    "#,
                )
                .bind(user_id.as_str())
                .bind(date)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    r#"
                    SELECT id, user_id, date, exercise, weight, reps, set_number
                    FROM workout_entries
                    WHERE user_id = ?
                    ORDER BY date DESC, rowid ASC
                    "#,
                )
                .bind(user_id.as_str())
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.into_iter().map(WorkoutEntry::try_from).collect()
    }

    async fn create(&self, user_id: &UserId, entry: &NewWorkoutEntry) -> Result<(), StoreError> {
        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO workout_entries (id, user_id, date, exercise, weight, reps, set_number, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(user_id.as_str())
        .bind(&entry.date)
        .bind(&entry.exercise)
        .bind(entry.weight)
        .bind(i64::from(entry.reps))
        .bind(i64::from(entry.set_number))
        .bind(&created_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(%id, user = %user_id, date = %entry.date, "inserted workout entry");
        Ok(())
    }

    async fn update(
        &self,
        user_id: &UserId,
        id: &str,
        changes: &EntryChanges,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE workout_entries
            SET exercise = ?, weight = ?, reps = ?, set_number = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(&changes.exercise)
        .bind(changes.weight)
        .bind(i64::from(changes.reps))
        .bind(i64::from(changes.set_number))
        .bind(id)
        .bind(user_id.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { id: id.to_string() });
        }
        Ok(())
    }

    async fn delete(&self, user_id: &UserId, id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM workout_entries WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { id: id.to_string() });
        }
        Ok(())
    }
}
