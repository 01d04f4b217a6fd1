use chrono::{DateTime, NaiveDate, Utc};
use clap::ValueEnum;
use flashsync::backup::RestoreReport;
use flashsync::models::{Card, DailyStatistic, Identity, Setting};
use flashsync::scheduler::UNCATEGORIZED;
use flashsync::sync::{SyncOutcome, SyncStatus};
use serde::Serialize;
use serde_json::json;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

/// Bundled output configuration passed to all print functions
#[derive(Debug, Clone, Copy)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// When true, print minimal output (just IDs or counts)
    pub quiet: bool,
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Error: could not encode output: {}", e),
    }
}

fn date(at: Option<DateTime<Utc>>) -> String {
    at.map(|t| t.format("%Y-%m-%d").to_string()).unwrap_or_else(|| "-".to_string())
}

/// Prints a list of cards in the specified format
pub fn print_cards(cards: &[Card], config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if cards.is_empty() {
                if !config.quiet {
                    println!("No cards found.");
                }
                return;
            }
            if config.quiet {
                for card in cards {
                    println!("{}", card.get_id());
                }
                return;
            }
            let max_id = cards.iter().map(|c| c.get_id().len()).max().unwrap_or(2);
            println!("{:<width$}  {:<10}  {:<8}  {:>7}  QUESTION", "ID", "NEXT", "CATEGORY", "REVIEWS", width = max_id);
            for card in cards {
                println!(
                    "{:<width$}  {:<10}  {:<8}  {:>7}  {}",
                    card.get_id(),
                    date(card.get_next_review()),
                    card.get_category().unwrap_or(UNCATEGORIZED),
                    card.get_review_count(),
                    card.get_question(),
                    width = max_id
                );
            }
        }
        OutputFormat::Json => print_json(cards),
    }
}

/// Prints a single card in the specified format
pub fn print_card(card: &Card, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", card.get_id());
                return;
            }
            println!("ID:          {}", card.get_id());
            println!("Question:    {}", card.get_question());
            println!("Answer:      {}", card.get_answer());
            println!("Category:    {}", card.get_category().unwrap_or(UNCATEGORIZED));
            println!("Reviews:     {}", card.get_review_count());
            if let Some(difficulty) = card.get_difficulty() {
                println!("Last result: {}", difficulty);
            }
            println!("Last review: {}", date(card.get_last_review()));
            println!("Next review: {}", date(card.get_next_review()));
        }
        OutputFormat::Json => print_json(card),
    }
}

/// Prints upcoming review dates with card counts
pub fn print_schedule(schedule: &[(NaiveDate, usize)], config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if schedule.is_empty() {
                println!("Nothing scheduled.");
                return;
            }
            for (day, count) in schedule {
                println!("{}  {} cards", day.format("%Y-%m-%d"), count);
            }
        }
        OutputFormat::Json => {
            let rows: Vec<_> = schedule
                .iter()
                .map(|(day, count)| json!({ "date": day.format("%Y-%m-%d").to_string(), "count": count }))
                .collect();
            print_json(&rows);
        }
    }
}

/// Prints per-category counts and per-day review statistics
pub fn print_stats(categories: &[(String, usize)], days: &[DailyStatistic], due: usize, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            println!("Due today: {}", due);
            println!();
            println!("CATEGORY        CARDS");
            for (category, count) in categories {
                println!("{:<14}  {:>5}", category, count);
            }
            if !days.is_empty() {
                println!();
                println!("DATE        FORGOT  UNSURE  REMEMBERED  PERFECT");
                for day in days {
                    println!(
                        "{}  {:>6}  {:>6}  {:>10}  {:>7}",
                        day.date.format("%Y-%m-%d"), day.forgot, day.unsure, day.remembered, day.perfect
                    );
                }
            }
        }
        OutputFormat::Json => {
            let categories: serde_json::Map<String, serde_json::Value> =
                categories.iter().map(|(c, n)| (c.clone(), json!(n))).collect();
            print_json(&json!({ "due": due, "categories": categories, "days": days }));
        }
    }
}

pub fn print_restore_report(report: &RestoreReport, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", report.restored);
                return;
            }
            println!("Restored {} cards ({} skipped)", report.restored, report.skipped);
            if report.settings > 0 {
                println!("Restored {} settings", report.settings);
            }
        }
        OutputFormat::Json => print_json(&json!({
            "restored": report.restored,
            "skipped": report.skipped,
            "settings": report.settings,
        })),
    }
}

pub fn print_sync_outcome(outcome: &SyncOutcome, config: &OutputConfig) {
    match (config.format, outcome) {
        (OutputFormat::Human, SyncOutcome::InProgress) => println!("Sync already in progress."),
        (OutputFormat::Human, SyncOutcome::Synced(report)) => println!(
            "Synced: pushed {}, pulled {}, {} new, {} updated",
            report.pushed, report.pulled, report.added, report.updated
        ),
        (OutputFormat::Json, SyncOutcome::InProgress) => print_json(&json!({ "status": "in_progress" })),
        (OutputFormat::Json, SyncOutcome::Synced(report)) => print_json(&json!({
            "status": "synced",
            "pushed": report.pushed,
            "pulled": report.pulled,
            "added": report.added,
            "updated": report.updated,
            "finishedAt": report.finished_at,
        })),
    }
}

pub fn print_sync_status(status: &SyncStatus, identity: Option<&Identity>, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            println!("State:     {:?}", status.state);
            println!("Signed in: {}", identity.map_or("no", |i| i.email.as_str()));
            println!("Auto-sync: {}", if status.auto_sync { "on" } else { "off" });
            if let Some(at) = status.last_sync_time {
                println!("Last sync: {}", at.to_rfc3339());
            }
            if let Some(err) = &status.last_error {
                println!("Last error: {}", err);
            }
        }
        OutputFormat::Json => print_json(&json!({
            "state": format!("{:?}", status.state),
            "identity": identity,
            "autoSync": status.auto_sync,
            "lastSyncTime": status.last_sync_time,
            "lastError": status.last_error,
        })),
    }
}

pub fn print_identity(identity: Option<&Identity>, config: &OutputConfig) {
    match (config.format, identity) {
        (OutputFormat::Human, Some(identity)) if config.quiet => println!("{}", identity.user_id),
        (OutputFormat::Human, Some(identity)) => println!("Signed in as {} ({})", identity.email, identity.user_id),
        (OutputFormat::Human, None) => println!("Not signed in."),
        (OutputFormat::Json, identity) => print_json(&identity),
    }
}

pub fn print_settings(settings: &[Setting], config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            for setting in settings {
                println!("{} = {}", setting.key, setting.value);
            }
        }
        OutputFormat::Json => print_json(settings),
    }
}

/// Prints a one-line confirmation unless quiet
pub fn print_message(message: &str, config: &OutputConfig) {
    if config.quiet {
        return;
    }
    match config.format {
        OutputFormat::Human => println!("{}", message),
        OutputFormat::Json => print_json(&json!({ "message": message })),
    }
}
