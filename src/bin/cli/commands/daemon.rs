use std::sync::Arc;

use flashsync::backup;
use flashsync::identity::IdentityProvider;
use tracing::info;

use super::CommandResult;
use crate::context::Context;

/// Runs auto-sync and automatic backups until interrupted
///
/// Auto-sync starts on when it was turned on earlier or when the
/// configuration says so.
pub async fn run(ctx: &Context) -> CommandResult {
    let enabled = ctx.sync.load_auto_sync().await?;
    if ctx.config.auto_sync && !enabled {
        ctx.sync.set_auto_sync(true).await?;
    }
    ctx.sync.watch_identity(ctx.identities.subscribe());

    let _backups = backup::schedule_auto_backup(
        Arc::clone(&ctx.deck),
        ctx.config.backup_dir.clone(),
        ctx.config.backup_interval(),
        ctx.config.backup_count as usize,
    );
    info!(
        "Daemon running: auto-sync {}, backups every {:?} into {:?}",
        if ctx.sync.status().auto_sync { "on" } else { "off" },
        ctx.config.backup_interval(),
        ctx.config.backup_dir
    );

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    Ok(())
}
