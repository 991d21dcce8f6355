pub mod auth;
pub mod config_cmd;
pub mod entry;
pub mod history;

pub use auth::CredentialArgs;
pub use config_cmd::ConfigCommand;
pub use entry::{AddCommand, DeleteCommand, EditCommand, TodayCommand};
pub use history::HistoryCommand;

use chrono::{Local, NaiveDate};
use clap::ValueEnum;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Checks a `YYYY-MM-DD` argument, defaulting to today's local date.
pub fn resolve_date(date: Option<&str>) -> Result<String, String> {
    match date {
        Some(d) => NaiveDate::parse_from_str(d, "%Y-%m-%d")
            .map(|parsed| parsed.format("%Y-%m-%d").to_string())
            .map_err(|_| format!("Invalid date format '{}'. Use YYYY-MM-DD.", d)),
        None => Ok(Local::now().date_naive().format("%Y-%m-%d").to_string()),
    }
}
