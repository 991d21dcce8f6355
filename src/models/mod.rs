mod daily_summary;
mod user_id;
mod workout_entry;

pub use daily_summary::{DailySummary, VolumePoint};
pub use user_id::UserId;
pub use workout_entry::{EntryChanges, NewWorkoutEntry, WorkoutEntry};
