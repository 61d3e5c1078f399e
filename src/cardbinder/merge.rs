//! # Capacity/Import Merger
//!
//! Rebuilds the slot array from the cards already in the binder plus a batch of
//! new ones. The result is always fully compacted: existing cards first (in
//! their index order), then the new cards (in batch order), then empty slots up
//! to the next page boundary. Empty slots that existed before the merge are not
//! preserved.

use crate::layout::aligned_length;
use crate::model::{Card, Slot};
use crate::slots::SlotArray;
use log::debug;

/// Merges `new_cards` after the existing cards of `existing`.
pub fn merge_cards(existing: &SlotArray, new_cards: Vec<Card>, page_capacity: usize) -> SlotArray {
    let existing_cards: Vec<Card> = existing.cards().cloned().collect();
    let existing_count = existing_cards.len();
    let combined: Vec<Card> = existing_cards.into_iter().chain(new_cards).collect();
    let new_total = aligned_length(combined.len(), page_capacity);

    debug!(
        "merging {} existing + {} new cards into {} slots",
        existing_count,
        combined.len() - existing_count,
        new_total
    );

    let mut slots: Vec<Slot> = combined.into_iter().map(Some).collect();
    slots.resize(new_total, None);
    SlotArray::from_slots(slots)
}

/// Packs a batch into a brand new binder, as when importing a saved file.
pub fn pack_cards(cards: Vec<Card>, page_capacity: usize) -> SlotArray {
    merge_cards(&SlotArray::new(), cards, page_capacity)
}
