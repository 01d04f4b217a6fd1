//! Subscriber setup shared by both binaries

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Level used when `RUST_LOG` is unset and `debug` is off
    pub default_level: &'static str,
    /// Log at debug level unless `RUST_LOG` says otherwise
    pub debug: bool,
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
    /// Also write a daily rolling file into this directory
    pub log_dir: Option<PathBuf>,
}

/// Installs the global subscriber
///
/// Console output goes to stderr so that command output on stdout stays
/// clean. `RUST_LOG` overrides the level picked from `options.debug`.
///
/// ### Returns
///
/// The file writer's guard when a log directory is set; keep it alive until
/// exit or buffered lines are lost
pub fn init_logging(options: &LogOptions, file_prefix: &str) -> anyhow::Result<Option<WorkerGuard>> {
    let default_level = if options.debug { "debug" } else { options.default_level };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let console = if options.json {
        tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        tracing_subscriber::fmt::layer().with_writer(std::io::stderr).boxed()
    };

    let (file, guard) = match &options.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .with(filter)
        .try_init()?;

    Ok(guard)
}
