//! Persistence port for workout entries.
//!
//! Every operation takes the owning [`UserId`]; update and delete only touch a
//! row when both the entry id and the owner match. Calls are issued once and
//! failures are returned to the caller as-is, without retries.

mod rest;
mod sqlite;

pub use rest::RestEntryStore;
pub use sqlite::{init_db, SqliteEntryStore};

use async_trait::async_trait;

use crate::models::{EntryChanges, NewWorkoutEntry, UserId, WorkoutEntry};

/// Create/read/update/delete access to the `workout_entries` table.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Entries owned by `user_id`.
    ///
    /// Without a date the result is ordered by date, newest first. With a date
    /// only that day's entries are returned, ordered by set number.
    async fn fetch_by_user(
        &self,
        user_id: &UserId,
        date: Option<&str>,
    ) -> Result<Vec<WorkoutEntry>, StoreError>;

    /// Inserts a new entry. The generated id is not returned; re-fetch to see it.
    async fn create(&self, user_id: &UserId, entry: &NewWorkoutEntry) -> Result<(), StoreError>;

    async fn update(
        &self,
        user_id: &UserId,
        id: &str,
        changes: &EntryChanges,
    ) -> Result<(), StoreError>;

    async fn delete(&self, user_id: &UserId, id: &str) -> Result<(), StoreError>;
}

/// Errors returned by an [`EntryStore`].
#[derive(Debug)]
pub enum StoreError {
    /// The request never got a response (connection refused, DNS, TLS...)
    Http(String),
    /// The store refused our credentials
    Unauthorized(String),
    /// The store answered with an error status
    Rejected { status: u16, message: String },
    /// No row matched both the entry id and the owner
    NotFound { id: String },
    /// Local database error
    Database(String),
    /// Response body could not be decoded
    Decode(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Http(e) => write!(f, "Request failed: {}", e),
            StoreError::Unauthorized(e) => write!(f, "Not authorized: {}", e),
            StoreError::Rejected { status, message } => {
                write!(f, "Store rejected request ({}): {}", status, message)
            }
            StoreError::NotFound { id } => write!(f, "Entry not found: {}", id),
            StoreError::Database(e) => write!(f, "Database error: {}", e),
            StoreError::Decode(e) => write!(f, "Invalid response: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            StoreError::Decode(e.to_string())
        } else {
            StoreError::Http(e.to_string())
        }
    }
}

#[cfg(test)]
pub(crate) mod testing;
