use crate::aggregate::total_volume;
use crate::form::EntryForm;
use crate::models::{UserId, WorkoutEntry};
use crate::store::{EntryStore, StoreError};

use super::ViewError;

const PENDING_PREFIX: &str = "pending-";

/// Sets logged on a single day plus the running volume total.
pub struct TodayView<'a> {
    store: &'a dyn EntryStore,
    user: UserId,
    date: String,
    entries: Vec<WorkoutEntry>,
    next_pending: u32,
}

impl<'a> TodayView<'a> {
    /// Loads `date`'s sets for `user`, ordered by set number.
    pub async fn load(
        store: &'a dyn EntryStore,
        user: UserId,
        date: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let date = date.into();
        let entries = store.fetch_by_user(&user, Some(&date)).await.map_err(|e| {
            tracing::error!("Failed to fetch today entries: {}", e);
            e
        })?;

        Ok(Self {
            store,
            user,
            date,
            entries,
            next_pending: 1,
        })
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn entries(&self) -> &[WorkoutEntry] {
        &self.entries
    }

    pub fn running_total(&self) -> f64 {
        total_volume(&self.entries)
    }

    /// True for a row shown locally that the store has not confirmed yet.
    pub fn is_pending(entry: &WorkoutEntry) -> bool {
        entry.id.starts_with(PENDING_PREFIX)
    }

    /// Validates and submits a new set.
    ///
    /// A set for this view's date is shown immediately and removed again if
    /// the insert fails. Sets for another date are saved but not listed here.
    pub async fn add(&mut self, form: &EntryForm) -> Result<(), ViewError> {
        let entry = form.validate()?;

        let placeholder = (entry.date == self.date).then(|| {
            let id = format!("{}{}", PENDING_PREFIX, self.next_pending);
            self.next_pending += 1;
            self.entries.push(entry.to_pending(&self.user, id.clone()));
            id
        });

        if let Err(e) = self.store.create(&self.user, &entry).await {
            tracing::error!("Failed to add workout entry: {}", e);
            if let Some(id) = placeholder {
                self.entries.retain(|row| row.id != id);
            }
            return Err(e.into());
        }

        // Pick up the generated id; the insert itself already succeeded
        if placeholder.is_some() {
            if let Err(e) = self.refresh().await {
                tracing::warn!("Saved set but could not reload {}: {}", self.date, e);
            }
        }
        Ok(())
    }

    /// Re-reads the day from the store, replacing local rows.
    pub async fn refresh(&mut self) -> Result<(), StoreError> {
        self.entries = self
            .store
            .fetch_by_user(&self.user, Some(&self.date))
            .await?;
        Ok(())
    }
}
