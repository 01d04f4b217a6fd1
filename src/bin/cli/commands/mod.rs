pub mod account;
pub mod card;
pub mod daemon;
pub mod data;
pub mod settings;
pub mod sync;

/// Error type shared by all command handlers
pub type CommandResult = Result<(), Box<dyn std::error::Error>>;
