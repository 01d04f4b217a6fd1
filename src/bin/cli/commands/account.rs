use clap::Subcommand;
use flashsync::identity::IdentityProvider;

use super::CommandResult;
use crate::context::Context;
use crate::output::{self, OutputConfig};

/// Account commands
#[derive(Subcommand, Debug)]
pub enum AccountCommands {
    /// Create an account and sign in
    Signup {
        email: String,
        /// At least six characters
        #[clap(long, env = "FLASHSYNC_PASSWORD")]
        password: String,
    },
    /// Sign in to an existing account
    Login {
        email: String,
        #[clap(long, env = "FLASHSYNC_PASSWORD")]
        password: String,
    },
    /// Sign out
    Logout,
    /// Show who is signed in
    Whoami,
}

/// Executes an account command
pub async fn execute(ctx: &Context, cmd: AccountCommands, config: &OutputConfig) -> CommandResult {
    match cmd {
        AccountCommands::Signup { email, password } => {
            let identity = ctx.identities.sign_up(&email, &password).await?;
            ctx.save_session(Some(&identity)).await?;
            output::print_identity(Some(&identity), config);
        }
        AccountCommands::Login { email, password } => {
            let identity = ctx.identities.sign_in(&email, &password).await?;
            ctx.save_session(Some(&identity)).await?;
            output::print_identity(Some(&identity), config);
        }
        AccountCommands::Logout => {
            ctx.identities.sign_out().await?;
            ctx.save_session(None).await?;
            output::print_message("Signed out", config);
        }
        AccountCommands::Whoami => {
            output::print_identity(ctx.current_identity().as_ref(), config);
        }
    }
    Ok(())
}
