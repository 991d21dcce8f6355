//! View state for the two screens: today's log and the history.
//!
//! Views own the entry list loaded from the store and the values derived from
//! it. Mutating methods borrow the view mutably, so only one mutation per view
//! can be in flight at a time.

mod history;
mod today;

pub use history::HistoryView;
pub use today::TodayView;

use crate::form::ValidationError;
use crate::store::StoreError;

/// Why a view action failed.
#[derive(Debug)]
pub enum ViewError {
    /// Form input was rejected before contacting the store
    Validation(ValidationError),
    /// The store call failed; local state is unchanged
    Store(StoreError),
    /// The id is not among the loaded entries
    UnknownEntry(String),
}

impl std::fmt::Display for ViewError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewError::Validation(e) => write!(f, "{}", e),
            ViewError::Store(e) => write!(f, "Could not save: {}", e),
            ViewError::UnknownEntry(id) => write!(f, "No entry with id {}", id),
        }
    }
}

impl std::error::Error for ViewError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ViewError::Validation(e) => Some(e),
            ViewError::Store(e) => Some(e),
            ViewError::UnknownEntry(_) => None,
        }
    }
}

impl From<ValidationError> for ViewError {
    fn from(e: ValidationError) -> Self {
        ViewError::Validation(e)
    }
}

impl From<StoreError> for ViewError {
    fn from(e: StoreError) -> Self {
        ViewError::Store(e)
    }
}
