use clap::Args;

use gymlog::models::{DailySummary, UserId, VolumePoint};
use gymlog::store::EntryStore;
use gymlog::views::HistoryView;

use super::{resolve_date, OutputFormat};

const CHART_WIDTH: usize = 40;

/// Show every logged day with its total volume
#[derive(Args)]
pub struct HistoryCommand {
    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Include the volume-over-time chart
    #[arg(long)]
    pub chart: bool,

    /// List the sets of this day (can be repeated)
    #[arg(long, value_name = "DATE")]
    pub expand: Vec<String>,
}

impl HistoryCommand {
    pub async fn run(
        &self,
        store: &dyn EntryStore,
        user: UserId,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut view = HistoryView::load(store, user).await?;
        for date in &self.expand {
            let date = resolve_date(Some(date))?;
            if !view.is_expanded(&date) {
                view.toggle(&date);
            }
        }

        match self.format {
            OutputFormat::Json => {
                let report = serde_json::json!({
                    "summaries": view.summaries(),
                    "chart": view.chart(),
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            OutputFormat::Text => {
                let summaries = view.summaries();
                if summaries.is_empty() {
                    println!("No workouts logged yet.");
                    return Ok(());
                }

                for summary in &summaries {
                    print!("{}", render_card(summary, view.is_expanded(&summary.date)));
                }

                if self.chart {
                    println!();
                    println!("Volume over time");
                    println!("{}", "-".repeat(16));
                    for line in render_chart(&view.chart(), CHART_WIDTH) {
                        println!("{}", line);
                    }
                }
            }
        }
        Ok(())
    }
}

fn render_card(summary: &DailySummary, expanded: bool) -> String {
    let count = summary.sets.len();
    let mut out = format!(
        "{}  {} kg total ({} set{})\n",
        summary.date,
        summary.total_volume,
        count,
        if count == 1 { "" } else { "s" }
    );
    if expanded {
        for set in &summary.sets {
            out.push_str(&format!("    {}  ({})\n", set, set.id));
        }
    }
    out
}

/// Horizontal bars scaled so the heaviest day spans `width` columns.
fn render_chart(points: &[VolumePoint], width: usize) -> Vec<String> {
    let max = points
        .iter()
        .map(|p| p.total_volume)
        .fold(0.0_f64, f64::max);

    points
        .iter()
        .map(|p| {
            let len = if max > 0.0 {
                ((p.total_volume / max) * width as f64).round() as usize
            } else {
                0
            };
            format!("{}  {:<width$}  {}", p.date, "#".repeat(len), p.total_volume)
        })
        .collect()
}
