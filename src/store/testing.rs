//! Store wrappers for exercising failure paths in tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tempfile::TempDir;

use super::{EntryStore, SqliteEntryStore, StoreError};
use crate::models::{EntryChanges, NewWorkoutEntry, UserId, WorkoutEntry};

/// SQLite store whose writes can be switched to fail, counting every call.
pub(crate) struct FlakyStore {
    inner: SqliteEntryStore,
    fail_writes: AtomicBool,
    calls: AtomicUsize,
    _temp_dir: TempDir,
}

impl FlakyStore {
    pub(crate) async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let inner = SqliteEntryStore::open(&temp_dir.path().join("test.db"))
            .await
            .unwrap();
        Self {
            inner,
            fail_writes: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            _temp_dir: temp_dir,
        }
    }

    pub(crate) fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn write_guard(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected {
                status: 503,
                message: "service unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl EntryStore for FlakyStore {
    async fn fetch_by_user(
        &self,
        user_id: &UserId,
        date: Option<&str>,
    ) -> Result<Vec<WorkoutEntry>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch_by_user(user_id, date).await
    }

    async fn create(&self, user_id: &UserId, entry: &NewWorkoutEntry) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.write_guard()?;
        self.inner.create(user_id, entry).await
    }

    async fn update(
        &self,
        user_id: &UserId,
        id: &str,
        changes: &EntryChanges,
    ) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.write_guard()?;
        self.inner.update(user_id, id, changes).await
    }

    async fn delete(&self, user_id: &UserId, id: &str) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.write_guard()?;
        self.inner.delete(user_id, id).await
    }
}
