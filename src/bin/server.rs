use std::sync::Arc;

use clap::Parser;
use flashsync::{
    config::{self, ServerArgs},
    create_app, db,
    logging::{self, LogOptions},
};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::fs::metadata(".env").is_ok() {
        dotenv::dotenv().ok();
    }

    let args = ServerArgs::parse();
    let config = config::get_server_config(&args);
    let _log_guard = logging::init_logging(
        &LogOptions {
            default_level: "info",
            debug: args.debug,
            json: args.json_logs,
            log_dir: config.log_dir.clone(),
        },
        "flashsync-server.log",
    )?;

    let pool = Arc::new(db::open_server_pool(&config.database_url)?);
    let app = create_app(pool);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutting down");
        })
        .await?;
    Ok(())
}
