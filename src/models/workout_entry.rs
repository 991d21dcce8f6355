use serde::{Deserialize, Serialize};
use std::fmt;

use super::user_id::UserId;

/// One recorded set, as stored in the `workout_entries` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutEntry {
    pub id: String,
    pub user_id: UserId,
    /// Calendar date in `YYYY-MM-DD` form, compared as a plain string.
    pub date: String,
    pub exercise: String,
    /// Kilograms.
    pub weight: f64,
    pub reps: u32,
    pub set_number: u32,
}

impl WorkoutEntry {
    /// Lifted volume of this set (`weight * reps`).
    pub fn volume(&self) -> f64 {
        self.weight * f64::from(self.reps)
    }

    /// Applies the mutable fields of an update in place.
    pub fn apply(&mut self, changes: &EntryChanges) {
        self.exercise = changes.exercise.clone();
        self.weight = changes.weight;
        self.reps = changes.reps;
        self.set_number = changes.set_number;
    }
}

impl fmt::Display for WorkoutEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "set {}: {} {}kg x {}",
            self.set_number, self.exercise, self.weight, self.reps
        )
    }
}

/// Insert payload: every column except the store-generated `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWorkoutEntry {
    pub date: String,
    pub exercise: String,
    pub weight: f64,
    pub reps: u32,
    pub set_number: u32,
}

impl NewWorkoutEntry {
    pub fn new(
        date: impl Into<String>,
        exercise: impl Into<String>,
        weight: f64,
        reps: u32,
        set_number: u32,
    ) -> Self {
        Self {
            date: date.into(),
            exercise: exercise.into(),
            weight,
            reps,
            set_number,
        }
    }

    /// Local row shown before the store has assigned an id.
    pub fn to_pending(&self, user_id: &UserId, placeholder_id: impl Into<String>) -> WorkoutEntry {
        WorkoutEntry {
            id: placeholder_id.into(),
            user_id: user_id.clone(),
            date: self.date.clone(),
            exercise: self.exercise.clone(),
            weight: self.weight,
            reps: self.reps,
            set_number: self.set_number,
        }
    }
}

/// Update payload: the fields a user may edit after the fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryChanges {
    pub exercise: String,
    pub weight: f64,
    pub reps: u32,
    pub set_number: u32,
}

impl From<&WorkoutEntry> for EntryChanges {
    fn from(entry: &WorkoutEntry) -> Self {
        Self {
            exercise: entry.exercise.clone(),
            weight: entry.weight,
            reps: entry.reps,
            set_number: entry.set_number,
        }
    }
}
