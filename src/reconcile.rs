//! Last-writer-wins reconciliation of two card collections
//!
//! The winner for an id depends only on the two candidates' `lastModified`
//! instants: the remote card replaces the local one when it is strictly newer,
//! and the local card is kept on an exact tie. That makes the merge
//! idempotent and independent of how several merges are grouped.

use std::collections::HashMap;

use tracing::debug;

use crate::models::Card;

/// The outcome of merging a local and a remote collection
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// Local cards in their input order (winners substituted), followed by
    /// remote-only cards in remote order
    pub cards: Vec<Card>,
    /// Remote cards with no local counterpart
    pub added: usize,
    /// Local cards replaced by a strictly newer remote version
    pub updated: usize,
}

/// Merges `local` and `remote`, reporting what the remote side contributed
pub fn reconcile(local: &[Card], remote: &[Card]) -> Reconciliation {
    let mut order: Vec<&str> = Vec::with_capacity(local.len() + remote.len());
    let mut merged: HashMap<&str, &Card> = HashMap::with_capacity(local.len() + remote.len());

    for card in local {
        if merged.insert(card.get_id(), card).is_none() {
            order.push(card.get_id());
        }
    }

    let mut added = 0;
    let mut updated = 0;
    for card in remote {
        match merged.get(card.get_id()) {
            None => {
                order.push(card.get_id());
                merged.insert(card.get_id(), card);
                added += 1;
            }
            Some(existing) if card.get_last_modified() > existing.get_last_modified() => {
                merged.insert(card.get_id(), card);
                updated += 1;
            }
            Some(_) => {}
        }
    }

    let cards: Vec<Card> = order
        .into_iter()
        .filter_map(|id| merged.get(id).map(|card| (*card).clone()))
        .collect();

    debug!("Merged {} local and {} remote cards into {} ({} added, {} updated)",
        local.len(), remote.len(), cards.len(), added, updated);

    Reconciliation { cards, added, updated }
}

/// Merges `local` and `remote` into one collection
pub fn merge_cards(local: &[Card], remote: &[Card]) -> Vec<Card> {
    reconcile(local, remote).cards
}

#[cfg(test)]
mod tests;
