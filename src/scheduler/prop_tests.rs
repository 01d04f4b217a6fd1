use super::*;
use crate::test_utils::{arb_datetime_utc, arb_difficulty, arb_optional_datetime_utc};
use proptest::prelude::*;

fn card_with(next: Option<DateTime<Utc>>, created: DateTime<Utc>) -> Card {
    let mut card = Card::new("Q".to_string(), "A".to_string(), None, created);
    card.set_next_review(next);
    card
}

proptest! {
    /// Due iff the next review's date is on or before today's date
    #[test]
    fn prop_is_due_matches_date_comparison(
        next in arb_optional_datetime_utc(),
        today in arb_datetime_utc(),
        created in arb_datetime_utc(),
    ) {
        let card = card_with(next, created);
        let expected = next.is_none_or(|n| n.date_naive() <= today.date_naive());
        prop_assert_eq!(is_due(&card, today), expected);
    }

    /// due_cards is an order-preserving filter by is_due
    #[test]
    fn prop_due_cards_is_ordered_filter(
        nexts in prop::collection::vec(arb_optional_datetime_utc(), 0..20),
        today in arb_datetime_utc(),
        created in arb_datetime_utc(),
    ) {
        let cards: Vec<Card> = nexts.into_iter().map(|n| card_with(n, created)).collect();
        let due = due_cards(&cards, today);
        let expected: Vec<Card> = cards.iter().filter(|c| is_due(c, today)).cloned().collect();
        prop_assert_eq!(due, expected);
    }

    /// A reviewed card is never due before its interval has passed
    #[test]
    fn prop_reviewed_card_not_due_same_day(
        outcome in arb_difficulty(),
        now in arb_datetime_utc(),
    ) {
        let card = card_with(Some(now), now);
        let reviewed = apply_outcome(&card, outcome, now);
        prop_assert!(!is_due(&reviewed, now));
        prop_assert!(is_due(&reviewed, now + Duration::days(interval_days(outcome))));
        prop_assert_eq!(reviewed.get_review_count(), 1);
        prop_assert_eq!(reviewed.get_id(), card.get_id());
        prop_assert_eq!(reviewed.get_question(), card.get_question());
    }
}
