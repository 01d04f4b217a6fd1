use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::Subcommand;
use flashsync::backup;

use super::CommandResult;
use crate::context::Context;
use crate::output::{self, OutputConfig};

/// Import, export and reset commands
#[derive(Subcommand, Debug)]
pub enum DataCommands {
    /// Write a full JSON backup
    Export {
        /// File to write; stdout when omitted
        #[clap(long, short)]
        output: Option<PathBuf>,
    },
    /// Write all cards as CSV
    ExportCsv {
        /// File to write; stdout when omitted
        #[clap(long, short)]
        output: Option<PathBuf>,
    },
    /// Restore a JSON backup or import a CSV file
    Import {
        /// A `.json` backup or a `.csv` export
        file: PathBuf,
    },
    /// Write an automatic backup now and rotate old ones
    Backup,
    /// Delete every card and start over with the sample cards
    Reset {
        /// Required; resetting cannot be undone
        #[clap(long)]
        yes: bool,
    },
}

fn write_output(path: Option<&Path>, text: &str) -> std::io::Result<()> {
    match path {
        Some(path) => std::fs::write(path, text),
        None => {
            println!("{}", text);
            Ok(())
        }
    }
}

/// Executes a data command
pub async fn execute(ctx: &Context, cmd: DataCommands, config: &OutputConfig) -> CommandResult {
    match cmd {
        DataCommands::Export { output } => {
            let document = backup::export_backup(&ctx.deck, Utc::now()).await?;
            write_output(output.as_deref(), &serde_json::to_string_pretty(&document)?)?;
        }
        DataCommands::ExportCsv { output } => {
            let csv = backup::export_csv(&ctx.deck.cards().await)?;
            write_output(output.as_deref(), &csv)?;
        }
        DataCommands::Import { file } => {
            let text = tokio::fs::read_to_string(&file).await?;
            let extension = file.extension().and_then(|e| e.to_str()).map(str::to_lowercase);
            let report = match extension.as_deref() {
                Some("json") => backup::restore_backup(&ctx.deck, &text, Utc::now()).await?,
                Some("csv") => backup::restore_csv(&ctx.deck, &text, Utc::now()).await?,
                _ => return Err(format!("Unsupported file type: {:?} (expected .json or .csv)", file).into()),
            };
            output::print_restore_report(&report, config);
        }
        DataCommands::Backup => {
            let dir = &ctx.config.backup_dir;
            let path = backup::write_backup_file(&ctx.deck, dir, Utc::now()).await?;
            backup::rotate_backups(dir, ctx.config.backup_count as usize).await?;
            output::print_message(&format!("Backup written to {}", path.display()), config);
        }
        DataCommands::Reset { yes } => {
            if !yes {
                return Err("Refusing to reset without --yes".into());
            }
            ctx.deck.reset(Utc::now()).await?;
            output::print_message("All cards deleted; sample cards restored", config);
        }
    }
    Ok(())
}
