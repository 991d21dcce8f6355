use clap::Args;
use std::io::{self, Write};

use gymlog::form::EntryForm;
use gymlog::models::{EntryChanges, UserId};
use gymlog::store::EntryStore;
use gymlog::views::{HistoryView, TodayView, ViewError};

use super::{resolve_date, OutputFormat};

/// Log a set
#[derive(Args)]
pub struct AddCommand {
    /// Exercise name (e.g., "Bench Press")
    #[arg(long)]
    pub exercise: String,

    /// Weight lifted in kg
    #[arg(long)]
    pub weight: String,

    /// Repetitions performed
    #[arg(long)]
    pub reps: String,

    /// Set number within the exercise
    #[arg(long = "set")]
    pub set_number: String,

    /// Date (YYYY-MM-DD, default: today)
    #[arg(long)]
    pub date: Option<String>,
}

impl AddCommand {
    pub async fn run(
        &self,
        store: &dyn EntryStore,
        user: UserId,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let date = resolve_date(self.date.as_deref())?;
        let form = EntryForm::new(
            date.clone(),
            self.exercise.clone(),
            self.weight.clone(),
            self.reps.clone(),
            self.set_number.clone(),
        );

        let mut view = TodayView::load(store, user, date).await?;
        view.add(&form).await?;

        println!(
            "Logged {} set {}: {}kg x {}",
            self.exercise.trim(),
            self.set_number.trim(),
            self.weight.trim(),
            self.reps.trim()
        );
        println!("Volume for {}: {}", view.date(), view.running_total());
        Ok(())
    }
}

/// Show the sets logged on one day
#[derive(Args)]
pub struct TodayCommand {
    /// Date (YYYY-MM-DD, default: today)
    #[arg(long)]
    pub date: Option<String>,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl TodayCommand {
    pub async fn run(
        &self,
        store: &dyn EntryStore,
        user: UserId,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let date = resolve_date(self.date.as_deref())?;
        let view = TodayView::load(store, user, date).await?;

        match self.format {
            OutputFormat::Json => {
                let report = serde_json::json!({
                    "date": view.date(),
                    "entries": view.entries(),
                    "total_volume": view.running_total(),
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            OutputFormat::Text => print!("{}", render_day(&view)),
        }
        Ok(())
    }
}

fn render_day(view: &TodayView<'_>) -> String {
    let mut out = format!("{}\n{}\n", view.date(), "-".repeat(10));
    if view.entries().is_empty() {
        out.push_str("No sets logged.\n");
        return out;
    }

    for entry in view.entries() {
        out.push_str(&format!("  {}  ({})\n", entry, entry.id));
    }
    out.push_str(&format!("\nTotal volume: {}\n", view.running_total()));
    out
}

/// Change a logged set; fields not given keep their current values
#[derive(Args)]
pub struct EditCommand {
    /// Entry ID
    pub id: String,

    #[arg(long)]
    pub exercise: Option<String>,

    #[arg(long, value_parser = parse_weight)]
    pub weight: Option<f64>,

    #[arg(long)]
    pub reps: Option<u32>,

    #[arg(long = "set")]
    pub set_number: Option<u32>,
}

fn parse_weight(value: &str) -> Result<f64, String> {
    let weight: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    if !weight.is_finite() {
        return Err(format!("'{}' is not a finite weight", value));
    }
    Ok(weight)
}

impl EditCommand {
    fn changes_from(&self, current: EntryChanges) -> EntryChanges {
        EntryChanges {
            exercise: self
                .exercise
                .as_deref()
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(str::to_string)
                .unwrap_or(current.exercise),
            weight: self.weight.unwrap_or(current.weight),
            reps: self.reps.unwrap_or(current.reps),
            set_number: self.set_number.unwrap_or(current.set_number),
        }
    }

    pub async fn run(
        &self,
        store: &dyn EntryStore,
        user: UserId,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut view = HistoryView::load(store, user).await?;
        let current = view
            .entry(&self.id)
            .map(EntryChanges::from)
            .ok_or_else(|| ViewError::UnknownEntry(self.id.clone()))?;

        let changes = self.changes_from(current);
        view.edit(&self.id, changes).await?;

        if let Some(entry) = view.entry(&self.id) {
            println!("Updated {} on {}", entry, entry.date);
        }
        Ok(())
    }
}

/// Remove a logged set
#[derive(Args)]
pub struct DeleteCommand {
    /// Entry ID
    pub id: String,

    /// Skip confirmation prompt
    #[arg(long, short)]
    pub yes: bool,
}

impl DeleteCommand {
    pub async fn run(
        &self,
        store: &dyn EntryStore,
        user: UserId,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut view = HistoryView::load(store, user).await?;
        let label = match view.entry(&self.id) {
            Some(entry) => format!("{} on {}", entry, entry.date),
            None => return Err(ViewError::UnknownEntry(self.id.clone()).into()),
        };

        if !self.yes {
            print!("Delete {}? [y/N] ", label);
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;

            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Deletion cancelled.");
                return Ok(());
            }
        }

        view.delete(&self.id).await?;
        println!("Deleted {}", label);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gymlog::models::NewWorkoutEntry;
    use gymlog::store::SqliteEntryStore;
    use tempfile::TempDir;

    struct TestContext {
        store: SqliteEntryStore,
        _temp_dir: TempDir,
    }

    impl TestContext {
        async fn new() -> Self {
            let temp_dir = TempDir::new().unwrap();
            let store = SqliteEntryStore::open(&temp_dir.path().join("test.db"))
                .await
                .unwrap();
            Self {
                store,
                _temp_dir: temp_dir,
            }
        }
    }

    fn user() -> UserId {
        UserId::new("lifter")
    }

    fn add(weight: &str, reps: &str, set: &str) -> AddCommand {
        AddCommand {
            exercise: "Bench".to_string(),
            weight: weight.to_string(),
            reps: reps.to_string(),
            set_number: set.to_string(),
            date: Some("2024-01-10".to_string()),
        }
    }

    #[tokio::test]
    async fn test_add_then_render_day() {
        let ctx = TestContext::new().await;
        add("50", "10", "1").run(&ctx.store, user()).await.unwrap();
        add("60", "5", "2").run(&ctx.store, user()).await.unwrap();

        let view = TodayView::load(&ctx.store, user(), "2024-01-10")
            .await
            .unwrap();
        let text = render_day(&view);

        assert!(text.starts_with("2024-01-10\n"));
        assert!(text.contains("set 1: Bench 50kg x 10"));
        assert!(text.contains("set 2: Bench 60kg x 5"));
        assert!(text.ends_with("Total volume: 800\n"));
    }

    #[tokio::test]
    async fn test_add_rejects_bad_input() {
        let ctx = TestContext::new().await;

        assert!(add("heavy", "5", "1").run(&ctx.store, user()).await.is_err());

        let mut bad_date = add("50", "5", "1");
        bad_date.date = Some("yesterday".to_string());
        assert!(bad_date.run(&ctx.store, user()).await.is_err());

        let saved = ctx.store.fetch_by_user(&user(), None).await.unwrap();
        assert!(saved.is_empty());
    }

    #[tokio::test]
    async fn test_render_empty_day() {
        let ctx = TestContext::new().await;
        let view = TodayView::load(&ctx.store, user(), "2024-01-10")
            .await
            .unwrap();

        assert!(render_day(&view).contains("No sets logged."));
    }

    #[tokio::test]
    async fn test_edit_keeps_unspecified_fields() {
        let ctx = TestContext::new().await;
        ctx.store
            .create(
                &user(),
                &NewWorkoutEntry::new("2024-01-10", "Squat", 100.0, 5, 1),
            )
            .await
            .unwrap();
        let id = ctx.store.fetch_by_user(&user(), None).await.unwrap()[0]
            .id
            .clone();

        let edit = EditCommand {
            id: id.clone(),
            exercise: None,
            weight: Some(105.0),
            reps: None,
            set_number: None,
        };
        edit.run(&ctx.store, user()).await.unwrap();

        let saved = &ctx.store.fetch_by_user(&user(), None).await.unwrap()[0];
        assert_eq!(saved.exercise, "Squat");
        assert_eq!(saved.weight, 105.0);
        assert_eq!(saved.reps, 5);
        assert_eq!(saved.set_number, 1);
    }

    #[tokio::test]
    async fn test_edit_and_delete_reject_other_users_entry() {
        let ctx = TestContext::new().await;
        ctx.store
            .create(
                &UserId::new("someone-else"),
                &NewWorkoutEntry::new("2024-01-10", "Squat", 100.0, 5, 1),
            )
            .await
            .unwrap();
        let id = ctx
            .store
            .fetch_by_user(&UserId::new("someone-else"), None)
            .await
            .unwrap()[0]
            .id
            .clone();

        let edit = EditCommand {
            id: id.clone(),
            exercise: Some("Curl".to_string()),
            weight: None,
            reps: None,
            set_number: None,
        };
        assert!(edit.run(&ctx.store, user()).await.is_err());

        let delete = DeleteCommand { id, yes: true };
        assert!(delete.run(&ctx.store, user()).await.is_err());

        let theirs = ctx
            .store
            .fetch_by_user(&UserId::new("someone-else"), None)
            .await
            .unwrap();
        assert_eq!(theirs[0].exercise, "Squat");
    }

    #[tokio::test]
    async fn test_delete_with_yes() {
        let ctx = TestContext::new().await;
        add("50", "10", "1").run(&ctx.store, user()).await.unwrap();
        let id = ctx.store.fetch_by_user(&user(), None).await.unwrap()[0]
            .id
            .clone();

        DeleteCommand { id, yes: true }
            .run(&ctx.store, user())
            .await
            .unwrap();

        assert!(ctx.store.fetch_by_user(&user(), None).await.unwrap().is_empty());
    }

    #[test]
    fn test_weight_must_be_finite() {
        assert_eq!(parse_weight("62.5"), Ok(62.5));
        assert!(parse_weight("NaN").is_err());
        assert!(parse_weight("inf").is_err());
        assert!(parse_weight("-infinity").is_err());
        assert!(parse_weight("heavy").is_err());
    }

    #[test]
    fn test_changes_ignore_blank_exercise() {
        let edit = EditCommand {
            id: "e1".to_string(),
            exercise: Some("  ".to_string()),
            weight: None,
            reps: Some(8),
            set_number: None,
        };
        let current = EntryChanges {
            exercise: "Row".to_string(),
            weight: 70.0,
            reps: 10,
            set_number: 3,
        };

        let changes = edit.changes_from(current);
        assert_eq!(changes.exercise, "Row");
        assert_eq!(changes.reps, 8);
        assert_eq!(changes.set_number, 3);
    }
}
