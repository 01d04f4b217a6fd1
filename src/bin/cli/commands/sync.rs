use clap::Subcommand;

use super::CommandResult;
use crate::context::Context;
use crate::output::{self, OutputConfig};

/// Synchronization commands
#[derive(Subcommand, Debug)]
pub enum SyncCommands {
    /// Push local cards, then pull and merge remote ones
    Now,
    /// Pull and merge remote cards without pushing
    Pull,
    /// Show sync state and the signed-in account
    Status,
    /// Turn auto-sync on or off for the daemon
    Auto {
        #[clap(value_parser = clap::builder::BoolishValueParser::new())]
        enabled: bool,
    },
}

/// Executes a sync command
pub async fn execute(ctx: &Context, cmd: SyncCommands, config: &OutputConfig) -> CommandResult {
    match cmd {
        SyncCommands::Now => {
            let outcome = ctx.sync.sync_now().await?;
            output::print_sync_outcome(&outcome, config);
        }
        SyncCommands::Pull => {
            let outcome = ctx.sync.pull_now().await?;
            output::print_sync_outcome(&outcome, config);
        }
        SyncCommands::Status => {
            ctx.sync.load_auto_sync().await?;
            output::print_sync_status(&ctx.sync.status(), ctx.current_identity().as_ref(), config);
        }
        SyncCommands::Auto { enabled } => {
            ctx.sync.set_auto_sync(enabled).await?;
            output::print_message(&format!("Auto-sync {}", if enabled { "on" } else { "off" }), config);
        }
    }
    Ok(())
}
