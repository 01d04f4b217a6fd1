use chrono::Utc;
use clap::Subcommand;
use flashsync::models::Difficulty;
use flashsync::scheduler;

use super::CommandResult;
use crate::context::Context;
use crate::output::{self, OutputConfig};

/// Card management commands
#[derive(Subcommand, Debug)]
pub enum CardCommands {
    /// Create a card that is due immediately
    Add {
        question: String,
        answer: String,
        /// e.g. 語学, 資格, プログラミング
        #[clap(long)]
        category: Option<String>,
    },
    /// List cards, optionally only one category or those matching a search
    List {
        #[clap(long)]
        category: Option<String>,
        /// Case-insensitive text to find in the question or answer
        #[clap(long)]
        search: Option<String>,
    },
    /// Show a card in full
    Get {
        /// The card ID
        id: String,
    },
    /// Delete a card
    Delete {
        /// The card ID
        id: String,
    },
}

/// Executes a card command
pub async fn execute(ctx: &Context, cmd: CardCommands, config: &OutputConfig) -> CommandResult {
    match cmd {
        CardCommands::Add { question, answer, category } => {
            let card = ctx.deck.add_card(&question, &answer, category, Utc::now()).await?;
            output::print_card(&card, config);
        }
        CardCommands::List { category, search } => {
            let cards = ctx.deck.cards().await;
            let cards = scheduler::filter_cards(&cards, search.as_deref(), category.as_deref());
            output::print_cards(&cards, config);
        }
        CardCommands::Get { id } => {
            let card = ctx.deck.get(&id).await.ok_or_else(|| format!("Card not found: {}", id))?;
            output::print_card(&card, config);
        }
        CardCommands::Delete { id } => {
            ctx.deck.delete_card(&id).await?;
            output::print_message(&format!("Deleted {}", id), config);
        }
    }
    Ok(())
}

/// Lists the cards due today
pub async fn due(ctx: &Context, config: &OutputConfig) -> CommandResult {
    let cards = ctx.deck.due(Utc::now()).await;
    output::print_cards(&cards, config);
    Ok(())
}

/// Records a review outcome and prints the rescheduled card
pub async fn review(ctx: &Context, id: &str, outcome: Difficulty, config: &OutputConfig) -> CommandResult {
    let card = ctx.deck.review(id, outcome, Utc::now()).await?;
    output::print_card(&card, config);
    Ok(())
}

/// Prints how many cards come up on each of the next `days` review dates
pub async fn schedule(ctx: &Context, days: usize, config: &OutputConfig) -> CommandResult {
    let cards = ctx.deck.cards().await;
    output::print_schedule(&scheduler::review_schedule(&cards, days), config);
    Ok(())
}

/// Prints category counts and review history
pub async fn stats(ctx: &Context, config: &OutputConfig) -> CommandResult {
    use flashsync::repo::LocalStore;

    let cards = ctx.deck.cards().await;
    let due = scheduler::due_cards(&cards, Utc::now()).len();
    let days = ctx.deck.store().all_statistics().await?;
    output::print_stats(&scheduler::category_counts(&cards), &days, due, config);
    Ok(())
}
