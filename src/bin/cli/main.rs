mod commands;
mod context;
mod output;

use clap::{Parser, Subcommand};
use context::Context;
use flashsync::config::{self, CliArgs};
use flashsync::logging::{self, LogOptions};
use flashsync::models::Difficulty;
use output::{OutputConfig, OutputFormat};
use std::process;

/// Flashcards with spaced repetition and multi-device sync
#[derive(Parser, Debug)]
#[clap(name = "flashsync", about = "Flashcards with spaced repetition and sync")]
struct Cli {
    #[command(flatten)]
    args: CliArgs,

    /// Output format
    #[clap(long, value_enum, default_value_t = OutputFormat::Human, global = true)]
    format: OutputFormat,

    /// Quiet mode: minimal output (just IDs or counts)
    #[clap(short, long, global = true)]
    quiet: bool,

    /// Log as JSON lines
    #[clap(long, env = "FLASHSYNC_JSON_LOGS", global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage cards
    #[command(subcommand)]
    Card(commands::card::CardCommands),
    /// List the cards due today
    Due,
    /// Record how well you remembered a card
    Review {
        /// The card ID
        id: String,
        /// forgot, unsure, remembered or perfect
        outcome: Difficulty,
    },
    /// Show how many cards come up on the next review dates
    Schedule {
        #[clap(long, default_value_t = 5)]
        days: usize,
    },
    /// Show card counts per category and review history
    Stats,
    /// Backups, imports and reset
    #[command(subcommand)]
    Data(commands::data::DataCommands),
    /// Sign up, sign in and out
    #[command(subcommand)]
    Account(commands::account::AccountCommands),
    /// Synchronize with the remote replica
    #[command(subcommand)]
    Sync(commands::sync::SyncCommands),
    /// Read and change preferences
    #[command(subcommand)]
    Settings(commands::settings::SettingsCommands),
    /// Run auto-sync and automatic backups in the foreground
    Daemon,
}

/// Formats an error for human-readable stderr output
fn format_error(err: &dyn std::error::Error) -> String {
    let err_string = err.to_string();

    if err_string.contains("error sending request")
        || err_string.contains("Connection refused")
        || err_string.contains("tcp connect error")
    {
        return format!("Could not connect to server. Is flashsync-server running?\n  {}", err_string);
    }

    err_string
}

async fn run(cli: Cli) -> commands::CommandResult {
    let output_config = OutputConfig { format: cli.format, quiet: cli.quiet };
    let ctx = Context::open(config::get_config(cli.args)).await?;

    match cli.command {
        Commands::Card(cmd) => commands::card::execute(&ctx, cmd, &output_config).await,
        Commands::Due => commands::card::due(&ctx, &output_config).await,
        Commands::Review { id, outcome } => commands::card::review(&ctx, &id, outcome, &output_config).await,
        Commands::Schedule { days } => commands::card::schedule(&ctx, days, &output_config).await,
        Commands::Stats => commands::card::stats(&ctx, &output_config).await,
        Commands::Data(cmd) => commands::data::execute(&ctx, cmd, &output_config).await,
        Commands::Account(cmd) => commands::account::execute(&ctx, cmd, &output_config).await,
        Commands::Sync(cmd) => commands::sync::execute(&ctx, cmd, &output_config).await,
        Commands::Settings(cmd) => commands::settings::execute(&ctx, cmd, &output_config).await,
        Commands::Daemon => commands::daemon::run(&ctx).await,
    }
}

#[tokio::main]
async fn main() {
    if std::fs::metadata(".env").is_ok() {
        dotenv::dotenv().ok();
    }

    let cli = Cli::parse();
    let log_options = LogOptions {
        default_level: "warn",
        debug: cli.args.debug,
        json: cli.json_logs,
        log_dir: None,
    };
    let _log_guard = match logging::init_logging(&log_options, "flashsync.log") {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Warning: logging disabled: {}", e);
            None
        }
    };

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", format_error(e.as_ref()));
        process::exit(1);
    }
}
