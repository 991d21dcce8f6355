//! Daily aggregation of workout entries.
//!
//! Entries are grouped by their `date` string exactly as stored; no calendar
//! normalization is applied, so `"2024-01-10"` and `"2024-1-10"` are different
//! days. Ordering relies on the fixed-width `YYYY-MM-DD` format sorting
//! lexicographically.
//!
//! Grouping does not look at `user_id`. Callers pass a single user's entries.

use std::collections::HashMap;

use crate::models::{DailySummary, VolumePoint, WorkoutEntry};

/// Groups entries into one summary per date, most recent date first.
///
/// Sets inside a summary keep the order in which they appear in `entries`.
pub fn group_by_date(entries: &[WorkoutEntry]) -> Vec<DailySummary> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut summaries: Vec<DailySummary> = Vec::new();

    for entry in entries {
        let slot = *index.entry(entry.date.as_str()).or_insert_with(|| {
            summaries.push(DailySummary {
                date: entry.date.clone(),
                total_volume: 0.0,
                sets: Vec::new(),
            });
            summaries.len() - 1
        });

        let summary = &mut summaries[slot];
        summary.total_volume += entry.volume();
        summary.sets.push(entry.clone());
    }

    summaries.sort_by(|a, b| b.date.cmp(&a.date));
    summaries
}

/// Sum of `weight * reps` across `entries`.
pub fn total_volume(entries: &[WorkoutEntry]) -> f64 {
    entries.iter().map(WorkoutEntry::volume).sum()
}

/// Chart series of daily volume, oldest date first.
pub fn volume_series(summaries: &[DailySummary]) -> Vec<VolumePoint> {
    let mut points: Vec<VolumePoint> = summaries.iter().map(VolumePoint::from).collect();
    points.sort_by(|a, b| a.date.cmp(&b.date));
    points
}
