use serde::{Deserialize, Serialize};

use super::workout_entry::WorkoutEntry;

/// All sets logged on one date, with their combined volume.
///
/// Derived from a list of entries on demand and never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: String,
    #[serde(rename = "totalVolume")]
    pub total_volume: f64,
    pub sets: Vec<WorkoutEntry>,
}

/// One point of the volume-over-time chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumePoint {
    pub date: String,
    #[serde(rename = "totalVolume")]
    pub total_volume: f64,
}

impl From<&DailySummary> for VolumePoint {
    fn from(summary: &DailySummary) -> Self {
        Self {
            date: summary.date.clone(),
            total_volume: summary.total_volume,
        }
    }
}
