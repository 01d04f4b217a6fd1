//! The application state: the in-memory card collection and the store it mirrors
//!
//! Every mutation writes to the store first and only then updates the
//! in-memory collection, so a storage failure leaves memory at its
//! pre-operation value. Mutations hold the collection's write lock for their
//! whole duration, which serializes them with each other and with sync merges.

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{instrument, debug, info, warn};

use crate::errors::AppError;
use crate::models::{Card, Difficulty};
use crate::reconcile::{Reconciliation, reconcile};
use crate::repo::LocalStore;
use crate::scheduler;

/// The cards created on first start and after a reset
pub fn sample_cards(now: DateTime<Utc>) -> Vec<Card> {
    vec![
        Card::new("Hello".to_string(), "こんにちは".to_string(), Some("語学".to_string()), now),
        Card::new("Thank you".to_string(), "ありがとう".to_string(), Some("語学".to_string()), now),
        Card::new(
            "ROI（投資利益率）の計算式は？".to_string(),
            "(投資で得られた利益 - 投資額) / 投資額 × 100".to_string(),
            Some("資格".to_string()),
            now,
        ),
    ]
}

pub struct Deck<S: LocalStore> {
    store: S,
    cards: RwLock<Vec<Card>>,
}

impl<S: LocalStore> Deck<S> {
    /// Loads the collection from the store
    #[instrument(skip(store))]
    pub async fn load(store: S) -> Result<Self, AppError> {
        let cards = store.get_all().await?;
        info!("Loaded {} cards", cards.len());
        Ok(Self { store, cards: RwLock::new(cards) })
    }

    /// Loads the collection, seeding the sample cards into an empty store
    pub async fn load_or_seed(store: S, now: DateTime<Utc>) -> Result<Self, AppError> {
        let deck = Self::load(store).await?;
        if deck.cards.read().await.is_empty() {
            deck.seed_samples(now).await?;
        }
        Ok(deck)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// A snapshot of every card in collection order
    pub async fn cards(&self) -> Vec<Card> {
        self.cards.read().await.clone()
    }

    pub async fn get(&self, id: &str) -> Option<Card> {
        self.cards.read().await.iter().find(|c| c.get_id() == id).cloned()
    }

    /// The cards due on `today`, in collection order
    pub async fn due(&self, today: DateTime<Utc>) -> Vec<Card> {
        scheduler::due_cards(self.cards.read().await.iter(), today)
    }

    /// Creates a card that is due immediately
    ///
    /// ### Errors
    ///
    /// Returns `AppError::Validation` when the question or answer is blank, and
    /// `AppError::Storage` when the card cannot be saved
    #[instrument(skip(self, question, answer))]
    pub async fn add_card(
        &self,
        question: &str,
        answer: &str,
        category: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Card, AppError> {
        let (question, answer) = (question.trim(), answer.trim());
        if question.is_empty() || answer.is_empty() {
            return Err(AppError::Validation("question and answer are required".to_string()));
        }

        let card = Card::new(question.to_string(), answer.to_string(), category, now);
        let mut cards = self.cards.write().await;
        self.store.put(&card).await?;
        cards.push(card.clone());

        info!("Added card {}", card.get_id());
        Ok(card)
    }

    /// Deletes a card; deleting an unknown id succeeds
    #[instrument(skip(self))]
    pub async fn delete_card(&self, id: &str) -> Result<(), AppError> {
        let mut cards = self.cards.write().await;
        self.store.delete(id).await?;
        cards.retain(|c| c.get_id() != id);
        Ok(())
    }

    /// Records a review outcome for a card and reschedules it
    ///
    /// ### Returns
    ///
    /// The updated card
    ///
    /// ### Errors
    ///
    /// Returns `AppError::NotFound` for an unknown id and `AppError::Storage`
    /// when the updated card cannot be saved
    #[instrument(skip(self))]
    pub async fn review(&self, id: &str, outcome: Difficulty, now: DateTime<Utc>) -> Result<Card, AppError> {
        let mut cards = self.cards.write().await;
        let index = cards
            .iter()
            .position(|c| c.get_id() == id)
            .ok_or_else(|| AppError::NotFound(format!("card {}", id)))?;

        let current = &cards[index];
        let mut reviewed = scheduler::apply_outcome(current, outcome, now);
        // Keep lastModified monotonic if the clock stepped backwards
        reviewed.touch(current.get_last_modified());

        self.store.put(&reviewed).await?;
        if let Err(e) = self.store.record_review(now.date_naive(), outcome).await {
            warn!("Failed to record review statistics: {}", e);
        }
        cards[index] = reviewed.clone();

        debug!("Card {} next due {:?}", id, reviewed.get_next_review());
        Ok(reviewed)
    }

    /// Like [`Deck::review`], taking the outcome as its wire label
    pub async fn review_label(&self, id: &str, outcome: &str, now: DateTime<Utc>) -> Result<Card, AppError> {
        let outcome = outcome.parse::<Difficulty>()?;
        self.review(id, outcome, now).await
    }

    /// Upserts externally produced cards (imports) into store and memory
    #[instrument(skip(self, incoming), fields(count = incoming.len()))]
    pub async fn upsert_cards(&self, incoming: Vec<Card>) -> Result<(), AppError> {
        if incoming.is_empty() {
            return Ok(());
        }
        let mut cards = self.cards.write().await;
        self.store.put_many(&incoming).await?;
        for card in incoming {
            match cards.iter_mut().find(|c| c.get_id() == card.get_id()) {
                Some(slot) => *slot = card,
                None => cards.push(card),
            }
        }
        Ok(())
    }

    /// Reconciles remote cards into the collection and persists the result
    ///
    /// The merge runs against the collection as it is now, so local edits
    /// made while a sync was talking to the remote are not lost.
    #[instrument(skip(self, remote), fields(remote = remote.len()))]
    pub async fn merge_remote(&self, remote: &[Card]) -> Result<Reconciliation, AppError> {
        let mut cards = self.cards.write().await;
        let merged = reconcile(&cards, remote);
        self.store.put_many(&merged.cards).await?;
        *cards = merged.cards.clone();
        Ok(merged)
    }

    /// Re-reads the collection from the store
    pub async fn reload(&self) -> Result<(), AppError> {
        let mut cards = self.cards.write().await;
        *cards = self.store.get_all().await?;
        Ok(())
    }

    /// Removes every card, then seeds the sample cards again
    #[instrument(skip(self))]
    pub async fn reset(&self, now: DateTime<Utc>) -> Result<(), AppError> {
        {
            let mut cards = self.cards.write().await;
            self.store.clear().await?;
            cards.clear();
        }
        info!("Cleared all cards");
        self.seed_samples(now).await
    }

    async fn seed_samples(&self, now: DateTime<Utc>) -> Result<(), AppError> {
        let samples = sample_cards(now);
        info!("Seeding {} sample cards", samples.len());
        self.upsert_cards(samples).await
    }
}
