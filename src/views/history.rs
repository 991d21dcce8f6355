use std::collections::HashSet;

use crate::aggregate::{group_by_date, volume_series};
use crate::models::{DailySummary, EntryChanges, UserId, VolumePoint, WorkoutEntry};
use crate::store::{EntryStore, StoreError};

use super::ViewError;

/// Every logged day for one user, with per-day cards and a volume chart.
pub struct HistoryView<'a> {
    store: &'a dyn EntryStore,
    user: UserId,
    entries: Vec<WorkoutEntry>,
    expanded: HashSet<String>,
}

impl<'a> HistoryView<'a> {
    pub async fn load(store: &'a dyn EntryStore, user: UserId) -> Result<Self, StoreError> {
        let entries = store.fetch_by_user(&user, None).await.map_err(|e| {
            tracing::error!("Failed to fetch workout entries: {}", e);
            e
        })?;

        Ok(Self {
            store,
            user,
            entries,
            expanded: HashSet::new(),
        })
    }

    pub fn entries(&self) -> &[WorkoutEntry] {
        &self.entries
    }

    pub fn entry(&self, id: &str) -> Option<&WorkoutEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// One card per date, most recent first.
    pub fn summaries(&self) -> Vec<DailySummary> {
        group_by_date(&self.entries)
    }

    /// Daily volume, oldest first.
    pub fn chart(&self) -> Vec<VolumePoint> {
        volume_series(&self.summaries())
    }

    /// Opens or closes the card for `date`; returns whether it is now open.
    pub fn toggle(&mut self, date: &str) -> bool {
        if self.expanded.remove(date) {
            false
        } else {
            self.expanded.insert(date.to_string());
            true
        }
    }

    pub fn is_expanded(&self, date: &str) -> bool {
        self.expanded.contains(date)
    }

    /// Saves edited fields of an entry, then applies them locally.
    pub async fn edit(&mut self, id: &str, changes: EntryChanges) -> Result<(), ViewError> {
        if self.entry(id).is_none() {
            return Err(ViewError::UnknownEntry(id.to_string()));
        }

        self.store
            .update(&self.user, id, &changes)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update workout entry: {}", e);
                e
            })?;

        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            entry.apply(&changes);
        }
        Ok(())
    }

    /// Deletes an entry from the store, then from the local list.
    pub async fn delete(&mut self, id: &str) -> Result<(), ViewError> {
        if self.entry(id).is_none() {
            return Err(ViewError::UnknownEntry(id.to_string()));
        }

        self.store.delete(&self.user, id).await.map_err(|e| {
            tracing::error!("Failed to delete workout entry: {}", e);
            e
        })?;

        self.entries.retain(|e| e.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewWorkoutEntry;
    use crate::store::testing::FlakyStore;

    fn user() -> UserId {
        UserId::new("lifter")
    }

    async fn seeded_store() -> FlakyStore {
        let store = FlakyStore::new().await;
        for (date, weight, reps, set) in [
            ("2024-01-10", 50.0, 10, 1),
            ("2024-01-10", 60.0, 5, 2),
            ("2024-01-12", 100.0, 5, 1),
            ("2024-01-11", 40.0, 10, 1),
        ] {
            store
                .create(&user(), &NewWorkoutEntry::new(date, "Bench", weight, reps, set))
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_summaries_and_chart() {
        let store = seeded_store().await;
        let view = HistoryView::load(&store, user()).await.unwrap();

        let cards: Vec<(String, f64)> = view
            .summaries()
            .into_iter()
            .map(|s| (s.date, s.total_volume))
            .collect();
        assert_eq!(
            cards,
            vec![
                ("2024-01-12".to_string(), 500.0),
                ("2024-01-11".to_string(), 400.0),
                ("2024-01-10".to_string(), 800.0),
            ]
        );

        let chart: Vec<String> = view.chart().into_iter().map(|p| p.date).collect();
        assert_eq!(chart, vec!["2024-01-10", "2024-01-11", "2024-01-12"]);
    }

    #[tokio::test]
    async fn test_toggle_card() {
        let store = seeded_store().await;
        let mut view = HistoryView::load(&store, user()).await.unwrap();

        assert!(!view.is_expanded("2024-01-10"));
        assert!(view.toggle("2024-01-10"));
        assert!(view.is_expanded("2024-01-10"));
        assert!(!view.toggle("2024-01-10"));
        assert!(!view.is_expanded("2024-01-10"));
    }

    #[tokio::test]
    async fn test_edit_recomputes_volume() {
        let store = seeded_store().await;
        let mut view = HistoryView::load(&store, user()).await.unwrap();
        let id = view.summaries()[0].sets[0].id.clone();

        view.edit(
            &id,
            EntryChanges {
                exercise: "Bench".to_string(),
                weight: 110.0,
                reps: 5,
                set_number: 1,
            },
        )
        .await
        .unwrap();

        assert_eq!(view.summaries()[0].total_volume, 550.0);

        // The store agrees with the local copy
        let reloaded = HistoryView::load(&store, user()).await.unwrap();
        assert_eq!(reloaded.entry(&id), view.entry(&id));
    }

    #[tokio::test]
    async fn test_delete_removes_empty_day() {
        let store = seeded_store().await;
        let mut view = HistoryView::load(&store, user()).await.unwrap();
        let id = view.summaries()[0].sets[0].id.clone();

        view.delete(&id).await.unwrap();

        let dates: Vec<String> = view.summaries().into_iter().map(|s| s.date).collect();
        assert_eq!(dates, vec!["2024-01-11", "2024-01-10"]);
        assert_eq!(store.fetch_by_user(&user(), None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_failed_edit_leaves_local_state() {
        let store = seeded_store().await;
        let mut view = HistoryView::load(&store, user()).await.unwrap();
        let before = view.summaries();
        let id = before[0].sets[0].id.clone();

        store.fail_writes(true);
        let result = view
            .edit(
                &id,
                EntryChanges {
                    exercise: "Bench".to_string(),
                    weight: 1.0,
                    reps: 1,
                    set_number: 1,
                },
            )
            .await;
        assert!(matches!(result, Err(ViewError::Store(_))));

        let result = view.delete(&id).await;
        assert!(matches!(result, Err(ViewError::Store(_))));

        assert_eq!(view.summaries(), before);
    }

    #[tokio::test]
    async fn test_unknown_entry_skips_store() {
        let store = seeded_store().await;
        let mut view = HistoryView::load(&store, user()).await.unwrap();
        let calls = store.calls();

        let result = view.delete("not-loaded").await;
        assert!(matches!(result, Err(ViewError::UnknownEntry(id)) if id == "not-loaded"));
        assert_eq!(store.calls(), calls);
    }

    #[tokio::test]
    async fn test_only_own_entries_loaded() {
        let store = seeded_store().await;
        store
            .create(
                &UserId::new("someone-else"),
                &NewWorkoutEntry::new("2024-01-10", "Curl", 20.0, 10, 1),
            )
            .await
            .unwrap();

        let view = HistoryView::load(&store, user()).await.unwrap();
        assert_eq!(view.entries().len(), 4);
        assert_eq!(view.summaries()[2].total_volume, 800.0);
    }
}
