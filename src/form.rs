//! Input validation for the "add set" form.
//!
//! Fields arrive as the user typed them. Validation only checks that each
//! field is present and that numeric fields parse; values are not range
//! checked.

use serde::{Deserialize, Deserializer};

use crate::models::NewWorkoutEntry;

/// Raw form input. Every field may be missing or blank.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryForm {
    #[serde(default, deserialize_with = "text_or_number")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub exercise: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub weight: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub reps: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub set_number: Option<String>,
}

/// Accepts `"100"` and `100` alike so JSON clients may send either.
fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// A form that can't be submitted.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    MissingDate,
    /// Exercise, weight, reps or set number left blank
    MissingFields,
    NotANumber { field: &'static str, value: String },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::MissingDate => write!(f, "Please enter a date"),
            ValidationError::MissingFields => {
                write!(f, "Exercise, weight, reps and set number are all required")
            }
            ValidationError::NotANumber { field, value } => {
                write!(f, "{} must be a number, got '{}'", field, value)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

fn filled(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl EntryForm {
    pub fn new(
        date: impl Into<String>,
        exercise: impl Into<String>,
        weight: impl Into<String>,
        reps: impl Into<String>,
        set_number: impl Into<String>,
    ) -> Self {
        Self {
            date: Some(date.into()),
            exercise: Some(exercise.into()),
            weight: Some(weight.into()),
            reps: Some(reps.into()),
            set_number: Some(set_number.into()),
        }
    }

    /// Checks the form and builds the insert payload.
    pub fn validate(&self) -> Result<NewWorkoutEntry, ValidationError> {
        let date = filled(&self.date).ok_or(ValidationError::MissingDate)?;

        let (Some(exercise), Some(weight), Some(reps), Some(set_number)) = (
            filled(&self.exercise),
            filled(&self.weight),
            filled(&self.reps),
            filled(&self.set_number),
        ) else {
            return Err(ValidationError::MissingFields);
        };

        let weight: f64 = parse("weight", weight)?;
        if !weight.is_finite() {
            return Err(ValidationError::NotANumber {
                field: "weight",
                value: weight.to_string(),
            });
        }

        Ok(NewWorkoutEntry {
            date: date.to_string(),
            exercise: exercise.to_string(),
            weight,
            reps: parse("reps", reps)?,
            set_number: parse("set_number", set_number)?,
        })
    }

    /// Clears the numeric fields, keeping date and exercise for the next set.
    pub fn reset_numbers(&mut self) {
        self.weight = None;
        self.reps = None;
        self.set_number = None;
    }
}

fn parse<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T, ValidationError> {
    value.parse().map_err(|_| ValidationError::NotANumber {
        field,
        value: value.to_string(),
    })
}
