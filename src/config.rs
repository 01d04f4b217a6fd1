use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, ValueEnum};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Which remote replica and identity provider the client talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RemoteKind {
    /// In-process fakes; nothing leaves the machine
    #[default]
    Memory,
    /// A `flashsync-server` reachable at `server_url`
    Http,
}

/// Configuration for the flashsync client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// SQLite database file for the local store
    pub database_url: String,
    pub remote: RemoteKind,
    /// Base URL of the document server when `remote` is `http`
    pub server_url: String,
    /// Whether the daemon starts with auto-sync on
    pub auto_sync: bool,
    pub auto_sync_interval_minutes: u64,
    /// Duration between automatic backups in minutes
    pub backup_interval_minutes: u64,
    /// Number of automatic backups to keep
    pub backup_count: u32,
    pub backup_dir: PathBuf,
}

/// Update structure for Config with all fields optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigUpdate {
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default)]
    pub remote: Option<RemoteKind>,
    #[serde(default)]
    pub server_url: Option<String>,
    #[serde(default)]
    pub auto_sync: Option<bool>,
    #[serde(default)]
    pub auto_sync_interval_minutes: Option<u64>,
    #[serde(default)]
    pub backup_interval_minutes: Option<u64>,
    #[serde(default)]
    pub backup_count: Option<u32>,
    #[serde(default)]
    pub backup_dir: Option<PathBuf>,
}

/// Client options accepted on the command line or from the environment
#[derive(Args, Debug, Default, Clone)]
pub struct CliArgs {
    /// Database URL
    #[arg(long, env = "DATABASE_URL", global = true)]
    pub database_url: Option<String>,

    /// Remote replica to sync with
    #[arg(long, env = "FLASHSYNC_REMOTE", value_enum, global = true)]
    pub remote: Option<RemoteKind>,

    /// Base URL of the document server
    #[arg(long, env = "FLASHSYNC_SERVER_URL", global = true)]
    pub server_url: Option<String>,

    /// Start with auto-sync on or off
    #[arg(long, env = "FLASHSYNC_AUTO_SYNC", global = true)]
    pub auto_sync: Option<bool>,

    /// Auto-sync interval in minutes
    #[arg(long, env = "FLASHSYNC_AUTO_SYNC_INTERVAL_MINUTES", global = true)]
    pub auto_sync_interval_minutes: Option<u64>,

    /// Backup interval in minutes
    #[arg(long, env = "BACKUP_INTERVAL_MINUTES", global = true)]
    pub backup_interval_minutes: Option<u64>,

    /// Number of backups to keep
    #[arg(long, env = "BACKUP_COUNT", global = true)]
    pub backup_count: Option<u32>,

    /// Directory for automatic backups
    #[arg(long, env = "FLASHSYNC_BACKUP_DIR", global = true)]
    pub backup_dir: Option<PathBuf>,

    /// Debug logging
    #[arg(long, env = "FLASHSYNC_DEBUG", default_value_t = false, global = true)]
    pub debug: bool,
}

fn minutes(value: u64) -> Duration {
    Duration::from_secs(value.max(1).saturating_mul(60))
}

impl Config {
    /// Applies a config update to the current configuration
    pub fn apply_update(self, update: ConfigUpdate) -> Self {
        Self {
            database_url: update.database_url.unwrap_or(self.database_url),
            remote: update.remote.unwrap_or(self.remote),
            server_url: update.server_url.unwrap_or(self.server_url),
            auto_sync: update.auto_sync.unwrap_or(self.auto_sync),
            auto_sync_interval_minutes: update.auto_sync_interval_minutes.unwrap_or(self.auto_sync_interval_minutes),
            backup_interval_minutes: update.backup_interval_minutes.unwrap_or(self.backup_interval_minutes),
            backup_count: update.backup_count.unwrap_or(self.backup_count),
            backup_dir: update.backup_dir.unwrap_or(self.backup_dir),
        }
    }

    /// The auto-sync period; never shorter than a minute
    pub fn auto_sync_interval(&self) -> Duration {
        minutes(self.auto_sync_interval_minutes)
    }

    /// The auto-backup period; never shorter than a minute
    pub fn backup_interval(&self) -> Duration {
        minutes(self.backup_interval_minutes)
    }
}

/// Returns the base (default) configuration
///
/// ### Arguments
///
/// * `data_dir` - Directory to keep the database and backups in; relative
///   paths in the working directory are used when None
pub fn base_config(data_dir: Option<PathBuf>) -> Config {
    let in_dir = |name: &str| data_dir.as_ref().map_or_else(|| PathBuf::from(name), |dir| dir.join(name));

    Config {
        database_url: in_dir("flashsync.db").to_string_lossy().to_string(),
        remote: RemoteKind::Memory,
        server_url: "http://localhost:3000".to_string(),
        auto_sync: false,
        auto_sync_interval_minutes: 5,
        backup_interval_minutes: 5,
        backup_count: 10,
        backup_dir: in_dir("backups"),
    }
}

/// Reads a TOML file into an all-optional update; a missing file is empty
fn update_from_file<T: DeserializeOwned + Default>(config_path: Option<&Path>) -> Result<T, String> {
    let Some(config_path) = config_path else {
        return Ok(T::default());
    };

    if !config_path.exists() {
        info!("Config file not found at {:?}, using defaults", config_path);
        return Ok(T::default());
    }

    match fs::read_to_string(config_path) {
        Ok(content) => match toml::from_str::<T>(&content) {
            Ok(config) => {
                info!("Loaded configuration from {:?}", config_path);
                Ok(config)
            }
            Err(e) => {
                warn!("Failed to parse config file: {}", e);
                Err(format!("Failed to parse config file: {}", e))
            }
        },
        Err(e) => {
            warn!("Failed to read config file: {}", e);
            Err(format!("Failed to read config file: {}", e))
        }
    }
}

/// Loads client configuration from a TOML file
pub fn config_from_file(config_path: Option<&Path>) -> Result<ConfigUpdate, String> {
    update_from_file(config_path)
}

/// Loads configuration from command line arguments
pub fn config_from_args(args: CliArgs) -> ConfigUpdate {
    ConfigUpdate {
        database_url: args.database_url,
        remote: args.remote,
        server_url: args.server_url,
        auto_sync: args.auto_sync,
        auto_sync_interval_minutes: args.auto_sync_interval_minutes,
        backup_interval_minutes: args.backup_interval_minutes,
        backup_count: args.backup_count,
        backup_dir: args.backup_dir,
    }
}

/// The per-user configuration directory, if the platform has one and it exists
pub fn get_config_dir_path() -> Option<PathBuf> {
    let Some(proj_dirs) = ProjectDirs::from("com", "flashsync", "flashsync") else {
        warn!("Could not determine XDG config directory, skipping config file");
        return None;
    };

    let path = proj_dirs.config_dir().to_path_buf();
    if !path.exists() {
        info!("Config path not found at {:?}, using defaults", path);
        return None;
    }
    Some(path)
}

/// Gets the complete client configuration
///
/// Defaults, then `config.toml` from the config directory, then environment
/// variables and command line arguments, in order of increasing precedence.
pub fn get_config(args: CliArgs) -> Config {
    let config_dir = get_config_dir_path();
    let config_file = config_dir.as_ref().map(|dir| dir.join("config.toml"));

    let config = base_config(config_dir)
        .apply_update(config_from_file(config_file.as_deref()).unwrap_or_default())
        .apply_update(config_from_args(args));

    info!(
        "Final configuration: database_url={}, remote={:?}, auto_sync={}, backup_interval={}min, backup_count={}",
        config.database_url, config.remote, config.auto_sync, config.backup_interval_minutes, config.backup_count
    );

    config
}

/// Configuration for the document server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub database_url: String,
    /// Address the HTTP listener binds to
    pub bind_addr: String,
    /// Directory for daily rolling log files; stdout only when None
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerConfigUpdate {
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default)]
    pub bind_addr: Option<String>,
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

/// Command line arguments for the document server
#[derive(Parser, Debug, Default)]
#[command(name = "flashsync-server", about = "Document store for flashsync clients")]
pub struct ServerArgs {
    /// Database URL
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Address to listen on
    #[arg(long, env = "FLASHSYNC_BIND_ADDR")]
    pub bind_addr: Option<String>,

    /// Directory for log files
    #[arg(long, env = "FLASHSYNC_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Debug logging
    #[arg(long, env = "FLASHSYNC_DEBUG", default_value_t = false)]
    pub debug: bool,

    /// Log as JSON lines
    #[arg(long, env = "FLASHSYNC_JSON_LOGS", default_value_t = false)]
    pub json_logs: bool,
}

impl ServerConfig {
    pub fn apply_update(self, update: ServerConfigUpdate) -> Self {
        Self {
            database_url: update.database_url.unwrap_or(self.database_url),
            bind_addr: update.bind_addr.unwrap_or(self.bind_addr),
            log_dir: update.log_dir.or(self.log_dir),
        }
    }
}

pub fn base_server_config(data_dir: Option<PathBuf>) -> ServerConfig {
    let database_url = data_dir.map_or("flashsync_server.db".to_string(), |dir| {
        dir.join("flashsync_server.db").to_string_lossy().to_string()
    });

    ServerConfig {
        database_url,
        bind_addr: "0.0.0.0:3000".to_string(),
        log_dir: None,
    }
}

pub fn server_config_from_file(config_path: Option<&Path>) -> Result<ServerConfigUpdate, String> {
    update_from_file(config_path)
}

pub fn server_config_from_args(args: &ServerArgs) -> ServerConfigUpdate {
    ServerConfigUpdate {
        database_url: args.database_url.clone(),
        bind_addr: args.bind_addr.clone(),
        log_dir: args.log_dir.clone(),
    }
}

/// Gets the complete server configuration, layered like [`get_config`] from
/// `server.toml`
pub fn get_server_config(args: &ServerArgs) -> ServerConfig {
    let config_dir = get_config_dir_path();
    let config_file = config_dir.as_ref().map(|dir| dir.join("server.toml"));

    let config = base_server_config(config_dir)
        .apply_update(server_config_from_file(config_file.as_deref()).unwrap_or_default())
        .apply_update(server_config_from_args(args));

    info!("Final server configuration: database_url={}, bind_addr={}", config.database_url, config.bind_addr);
    config
}
