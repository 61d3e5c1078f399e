//! # Slot Array
//!
//! The flat, ordered sequence of slots backing every page of the binder. All
//! other components read and write through it.
//!
//! The one structural invariant is that the length is either zero or an exact
//! multiple of the page capacity. Operations that can grow the array
//! ([`SlotArray::set_at`], [`SlotArray::align`], [`SlotArray::resize_capacity`])
//! always grow by whole pages. Deleting a card never shrinks the grid, except
//! that a binder with no cards left collapses to zero slots.
//!
//! Capacity is passed in rather than stored: the layout lives on the binder and
//! may change between calls.
//!
//! Growth past [`MAX_SLOTS`] is refused with [`BinderError::TooManySlots`].

use crate::error::{BinderError, Result};
use crate::layout::aligned_length;
use crate::model::{Card, Slot};
use log::debug;

/// Upper bound on how far a binder can be grown by placement or resizing.
pub const MAX_SLOTS: usize = 10_000;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotArray {
    slots: Vec<Slot>,
}

/// Outcome of [`SlotArray::resize_capacity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityChange {
    pub previous_len: usize,
    pub new_len: usize,
    /// Cards dropped by a confirmed destructive reduction.
    pub dropped_cards: usize,
}

impl SlotArray {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh array of `len` empty slots.
    pub fn empty(len: usize) -> Self {
        Self {
            slots: vec![None; len],
        }
    }

    pub fn from_slots(slots: Vec<Slot>) -> Self {
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Card> {
        self.slots.get(index).and_then(|slot| slot.as_ref())
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Card> {
        self.slots.get_mut(index).and_then(|slot| slot.as_mut())
    }

    pub fn as_slice(&self) -> &[Slot] {
        &self.slots
    }

    /// Non-empty slots in index order.
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.slots.iter().flatten()
    }

    pub fn card_count(&self) -> usize {
        self.cards().count()
    }

    /// The slots visible on a 1-indexed page; shorter than `capacity` only
    /// when the array itself is misaligned.
    pub fn page(&self, page: usize, capacity: usize) -> &[Slot] {
        let start = page.saturating_sub(1) * capacity;
        if start >= self.slots.len() {
            return &[];
        }
        let end = (start + capacity).min(self.slots.len());
        &self.slots[start..end]
    }

    pub fn page_has_cards(&self, page: usize, capacity: usize) -> bool {
        self.page(page, capacity).iter().any(|slot| slot.is_some())
    }

    /// Writes `slot` at `index`, first growing the array by whole pages if
    /// `index` lies beyond the end. New trailing slots are empty.
    pub fn set_at(&mut self, index: usize, slot: Slot, capacity: usize) -> Result<()> {
        if index >= self.slots.len() {
            check_growth(index.saturating_add(1))?;
            let new_len = aligned_length(index + 1, capacity);
            debug!(
                "growing slot array from {} to {} to place index {}",
                self.slots.len(),
                new_len,
                index
            );
            self.resize(new_len);
        }
        self.slots[index] = slot;
        Ok(())
    }

    /// Leftmost empty slot, if any.
    pub fn find_first_empty(&self) -> Option<usize> {
        self.slots.iter().position(|slot| slot.is_none())
    }

    /// Exchanges two slots in place. Nothing else moves.
    pub fn swap(&mut self, i: usize, j: usize) -> Result<()> {
        self.check_index(i)?;
        self.check_index(j)?;
        self.slots.swap(i, j);
        Ok(())
    }

    /// Empties the slot at `index` and returns what was there.
    ///
    /// If no cards remain anywhere, the array is truncated to zero length.
    pub fn delete_at(&mut self, index: usize) -> Result<Slot> {
        self.check_index(index)?;
        let removed = self.slots[index].take();
        if self.slots.iter().all(|slot| slot.is_none()) {
            self.slots.clear();
        }
        Ok(removed)
    }

    /// Explicit resize: truncates, or extends with empty slots.
    pub fn resize(&mut self, new_len: usize) {
        self.slots.resize(new_len, None);
    }

    /// Pads the array with empties up to the next page boundary.
    pub fn align(&mut self, capacity: usize) {
        let aligned = aligned_length(self.slots.len(), capacity);
        if aligned != self.slots.len() {
            self.resize(aligned);
        }
    }

    /// Changes the total slot count, rounded up to a whole number of pages.
    ///
    /// When the rounded target cannot hold every card, nothing is changed and
    /// [`BinderError::CapacityReductionRequiresConfirmation`] is returned
    /// unless `confirmed` is set; a confirmed reduction keeps the first cards
    /// in their original relative order, packed to the front, and drops the
    /// rest. Otherwise no card is lost: cards sitting past the new end are
    /// packed forward rather than cut off.
    pub fn resize_capacity(
        &mut self,
        new_slot_count: usize,
        capacity: usize,
        confirmed: bool,
    ) -> Result<CapacityChange> {
        check_growth(new_slot_count)?;
        let target = aligned_length(new_slot_count, capacity);
        let card_count = self.card_count();
        let previous_len = self.slots.len();

        if target < card_count {
            if !confirmed {
                return Err(BinderError::CapacityReductionRequiresConfirmation {
                    requested: target,
                    cards: card_count,
                });
            }
            let kept: Vec<Card> = self.cards().take(target).cloned().collect();
            self.repack(kept, target);
            return Ok(CapacityChange {
                previous_len,
                new_len: target,
                dropped_cards: card_count - target,
            });
        }

        let cut_off = self.slots.iter().skip(target).any(|slot| slot.is_some());
        if cut_off {
            debug!("capacity {} would cut off cards, packing to the front", target);
            let cards: Vec<Card> = self.cards().cloned().collect();
            self.repack(cards, target);
        } else {
            self.resize(target);
        }

        Ok(CapacityChange {
            previous_len,
            new_len: target,
            dropped_cards: 0,
        })
    }

    fn repack(&mut self, cards: Vec<Card>, len: usize) {
        let mut slots: Vec<Slot> = cards.into_iter().map(Some).collect();
        slots.resize(len, None);
        self.slots = slots;
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.slots.len() {
            return Err(BinderError::IndexOutOfRange {
                index,
                len: self.slots.len(),
            });
        }
        Ok(())
    }
}

/// Refuses to grow the array past [`MAX_SLOTS`].
pub fn check_growth(requested: usize) -> Result<()> {
    if requested > MAX_SLOTS {
        return Err(BinderError::TooManySlots {
            requested,
            max: MAX_SLOTS,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(name: &str) -> Card {
        Card::new(format!("https://img.example/{}.png", name), name)
    }

    fn names(slots: &SlotArray) -> Vec<Option<String>> {
        slots
            .as_slice()
            .iter()
            .map(|s| s.as_ref().map(|c| c.name.clone()))
            .collect()
    }

    #[test]
    fn set_at_beyond_end_grows_by_whole_pages() {
        let mut slots = SlotArray::empty(4);
        slots.set_at(9, Some(card("a")), 4).unwrap();

        assert_eq!(slots.len(), 12);
        assert!((4..9).all(|i| slots.get(i).is_none()));
        assert_eq!(slots.get(9).unwrap().name, "a");
    }

    #[test]
    fn set_at_on_empty_array_allocates_first_page() {
        let mut slots = SlotArray::new();
        slots.set_at(0, Some(card("a")), 9).unwrap();
        assert_eq!(slots.len(), 9);
        assert_eq!(slots.card_count(), 1);
    }

    #[test]
    fn set_at_within_range_overwrites_in_place() {
        let mut slots = SlotArray::empty(4);
        slots.set_at(1, Some(card("a")), 4).unwrap();
        slots.set_at(1, Some(card("b")), 4).unwrap();
        assert_eq!(slots.len(), 4);
        assert_eq!(slots.get(1).unwrap().name, "b");
    }

    #[test]
    fn length_stays_page_aligned_for_many_layouts() {
        for n in 1..6usize {
            let capacity = n * n;
            let mut slots = SlotArray::new();
            for index in [0, 3, 7, 20, 41] {
                slots.set_at(index, Some(card("x")), capacity).unwrap();
                assert_eq!(slots.len() % capacity, 0);
            }
        }
    }

    #[test]
    fn find_first_empty_returns_leftmost_gap() {
        let mut slots = SlotArray::empty(4);
        slots.set_at(0, Some(card("a")), 4).unwrap();
        slots.set_at(2, Some(card("b")), 4).unwrap();
        assert_eq!(slots.find_first_empty(), Some(1));

        slots.set_at(1, Some(card("c")), 4).unwrap();
        slots.set_at(3, Some(card("d")), 4).unwrap();
        assert_eq!(slots.find_first_empty(), None);
    }

    #[test]
    fn swap_exchanges_only_two_slots() {
        let mut slots = SlotArray::empty(4);
        slots.set_at(0, Some(card("a")), 4).unwrap();
        slots.set_at(1, Some(card("b")), 4).unwrap();
        slots.swap(0, 3).unwrap();
        assert_eq!(
            names(&slots),
            vec![None, Some("b".into()), None, Some("a".into())]
        );
    }

    #[test]
    fn swap_out_of_range_is_an_error() {
        let mut slots = SlotArray::empty(4);
        assert!(matches!(
            slots.swap(0, 4),
            Err(BinderError::IndexOutOfRange { index: 4, len: 4 })
        ));
    }

    #[test]
    fn delete_keeps_grid_size() {
        let mut slots = SlotArray::empty(8);
        slots.set_at(0, Some(card("a")), 4).unwrap();
        slots.set_at(5, Some(card("b")), 4).unwrap();

        let removed = slots.delete_at(5).unwrap();
        assert_eq!(removed.unwrap().name, "b");
        assert_eq!(slots.len(), 8);
    }

    #[test]
    fn deleting_last_card_truncates_to_zero() {
        let mut slots = SlotArray::empty(8);
        slots.set_at(5, Some(card("b")), 4).unwrap();
        slots.delete_at(5).unwrap();
        assert!(slots.is_empty());
    }

    #[test]
    fn resize_capacity_rounds_up_and_preserves_cards() {
        let mut slots = SlotArray::empty(4);
        slots.set_at(1, Some(card("a")), 4).unwrap();
        let change = slots.resize_capacity(10, 4, false).unwrap();

        assert_eq!(change.new_len, 12);
        assert_eq!(slots.len(), 12);
        assert_eq!(slots.get(1).unwrap().name, "a");
    }

    #[test]
    fn resize_capacity_packs_cards_that_would_be_cut_off() {
        let mut slots = SlotArray::empty(12);
        slots.set_at(0, Some(card("a")), 4).unwrap();
        slots.set_at(10, Some(card("b")), 4).unwrap();

        slots.resize_capacity(4, 4, false).unwrap();
        assert_eq!(
            names(&slots),
            vec![Some("a".into()), Some("b".into()), None, None]
        );
    }

    #[test]
    fn reduction_below_card_count_requires_confirmation() {
        let mut slots = SlotArray::empty(8);
        for (i, name) in ["a", "b", "c", "d", "e"].iter().enumerate() {
            slots.set_at(i, Some(card(name)), 4).unwrap();
        }
        let before = slots.clone();

        let err = slots.resize_capacity(3, 4, false).unwrap_err();
        assert!(matches!(
            err,
            BinderError::CapacityReductionRequiresConfirmation {
                requested: 4,
                cards: 5
            }
        ));
        assert_eq!(slots, before);
    }

    #[test]
    fn confirmed_reduction_keeps_first_cards_in_order() {
        let mut slots = SlotArray::empty(8);
        slots.set_at(1, Some(card("a")), 4).unwrap();
        slots.set_at(3, Some(card("b")), 4).unwrap();
        slots.set_at(4, Some(card("c")), 4).unwrap();
        slots.set_at(6, Some(card("d")), 4).unwrap();
        slots.set_at(7, Some(card("e")), 4).unwrap();

        let change = slots.resize_capacity(4, 4, true).unwrap();
        assert_eq!(change.dropped_cards, 1);
        assert_eq!(
            names(&slots),
            vec![
                Some("a".into()),
                Some("b".into()),
                Some("c".into()),
                Some("d".into())
            ]
        );
    }

    #[test]
    fn page_returns_visible_slice() {
        let mut slots = SlotArray::empty(8);
        slots.set_at(5, Some(card("b")), 4).unwrap();
        assert_eq!(slots.page(2, 4).len(), 4);
        assert!(slots.page_has_cards(2, 4));
        assert!(!slots.page_has_cards(1, 4));
        assert!(slots.page(3, 4).is_empty());
    }

    #[test]
    fn set_at_far_beyond_limit_is_refused() {
        let mut slots = SlotArray::empty(4);
        let err = slots.set_at(usize::MAX, Some(card("a")), 4).unwrap_err();
        assert!(matches!(err, BinderError::TooManySlots { max: MAX_SLOTS, .. }));
        assert!(slots.set_at(MAX_SLOTS, Some(card("a")), 4).is_err());
        assert_eq!(slots.len(), 4);

        slots.set_at(MAX_SLOTS - 1, Some(card("a")), 4).unwrap();
        assert_eq!(slots.len(), MAX_SLOTS);
    }

    #[test]
    fn huge_capacity_is_refused() {
        let mut slots = SlotArray::empty(4);
        assert!(matches!(
            slots.resize_capacity(usize::MAX, 4, false),
            Err(BinderError::TooManySlots { .. })
        ));
        assert_eq!(slots.len(), 4);
    }

    #[test]
    fn align_pads_to_page_boundary() {
        let mut slots = SlotArray::from_slots(vec![Some(card("a")), None, None]);
        slots.align(4);
        assert_eq!(slots.len(), 4);
    }
}
