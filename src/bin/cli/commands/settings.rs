use clap::Subcommand;
use flashsync::identity::SESSION_SETTING;
use flashsync::models::Setting;
use flashsync::repo::LocalStore;

use super::CommandResult;
use crate::context::Context;
use crate::output::{self, OutputConfig};

/// Preference commands
#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// List every stored setting
    List,
    /// Store a setting; the value is parsed as JSON, or kept as a string
    Set {
        /// e.g. theme, autoFlip, soundEffects
        key: String,
        value: String,
    },
}

/// Executes a settings command
pub async fn execute(ctx: &Context, cmd: SettingsCommands, config: &OutputConfig) -> CommandResult {
    match cmd {
        SettingsCommands::List => {
            let settings = ctx.deck.store().all_settings().await?;
            output::print_settings(&settings, config);
        }
        SettingsCommands::Set { key, value } => {
            if key == SESSION_SETTING {
                return Err("Use `account login` or `account logout` to change the session".into());
            }
            let value = serde_json::from_str(&value).unwrap_or(serde_json::Value::String(value));
            ctx.deck.store().put_setting(&Setting::new(key.clone(), value)).await?;
            output::print_message(&format!("Stored {}", key), config);
        }
    }
    Ok(())
}
