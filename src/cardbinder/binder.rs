//! # Binder State
//!
//! The single explicit state object the rest of the crate operates on: the
//! slot array, the selected layout, the current page and the undo history.
//! A hosting shell owns one `Binder` and feeds it operations through
//! [`crate::api::BinderApi`].
//!
//! Methods here only mutate; recording a history checkpoint is left to the
//! caller (see [`Binder::checkpoint`]) so that a logical operation made of
//! several steps lands in history exactly once.

use crate::error::{BinderError, Result};
use crate::history::History;
use crate::layout::{clamp_page, page_of, total_pages, Layout};
use crate::model::{BinderSnapshot, Card};
use crate::slots::{check_growth, CapacityChange, SlotArray};
use log::debug;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub struct Binder {
    slots: SlotArray,
    layout: Option<Layout>,
    current_page: usize,
    history: History,
}

/// Where to navigate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTarget {
    First,
    Last,
    Next,
    Prev,
    Number(usize),
}

impl FromStr for PageTarget {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "first" => Ok(PageTarget::First),
            "last" => Ok(PageTarget::Last),
            "next" | "n" => Ok(PageTarget::Next),
            "prev" | "previous" | "p" => Ok(PageTarget::Prev),
            other => other
                .parse()
                .map(PageTarget::Number)
                .map_err(|_| format!("Invalid page: {}", s)),
        }
    }
}

/// "Cards: X / Y slots used".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tracker {
    pub cards: usize,
    pub slots: usize,
}

impl Default for Binder {
    fn default() -> Self {
        Self::new(History::default())
    }
}

impl Binder {
    pub fn new(history: History) -> Self {
        Self {
            slots: SlotArray::new(),
            layout: None,
            current_page: 1,
            history,
        }
    }

    /// Rebuilds a binder from persisted parts, re-establishing alignment and
    /// a valid page.
    pub fn from_parts(
        slots: SlotArray,
        layout: Option<Layout>,
        current_page: usize,
        history: History,
    ) -> Self {
        let mut binder = Self {
            slots,
            layout,
            current_page,
            history,
        };
        if let Some(layout) = layout {
            binder.slots.align(layout.page_capacity());
        }
        binder.clamp_current_page();
        binder
    }

    pub fn slots(&self) -> &SlotArray {
        &self.slots
    }

    pub fn layout(&self) -> Option<Layout> {
        self.layout
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    pub fn require_layout(&self) -> Result<Layout> {
        self.layout.ok_or(BinderError::NoLayout)
    }

    pub fn page_capacity(&self) -> Option<usize> {
        self.layout.map(|l| l.page_capacity())
    }

    pub fn total_pages(&self) -> usize {
        match self.page_capacity() {
            Some(capacity) => total_pages(self.slots.len(), capacity),
            None => 1,
        }
    }

    pub fn tracker(&self) -> Tracker {
        Tracker {
            cards: self.slots.card_count(),
            slots: self.slots.len(),
        }
    }

    pub fn snapshot(&self) -> BinderSnapshot {
        BinderSnapshot {
            slot_array: self.slots.as_slice().to_vec(),
            layout: self.layout,
            current_page: self.current_page,
        }
    }

    /// Loads a history entry. Entries read back from disk may be misaligned,
    /// so the array is padded to whole pages again.
    pub fn restore(&mut self, snapshot: &BinderSnapshot) {
        self.slots = SlotArray::from_slots(snapshot.slot_array.clone());
        self.layout = snapshot.layout;
        if let Some(layout) = self.layout {
            self.slots.align(layout.page_capacity());
        }
        self.current_page = snapshot.current_page;
        self.clamp_current_page();
    }

    /// Records the live state as a new history entry.
    pub fn checkpoint(&mut self) {
        let snapshot = self.snapshot();
        self.history.record(snapshot);
    }

    /// Carries the live page into the current history entry without
    /// recording a new one.
    pub fn sync_history_page(&mut self) {
        let page = self.current_page;
        self.history.set_current_page(page);
    }

    /// Restores the previous history entry. Returns `false` when there is
    /// nothing to undo.
    pub fn undo(&mut self) -> bool {
        let previous = match self.history.undo() {
            Some(snapshot) => snapshot.clone(),
            None => return false,
        };
        self.restore(&previous);
        true
    }

    /// Switches to an `n × n` layout and returns to page 1. An empty binder
    /// gets one page of empty slots; a misaligned one is padded.
    pub fn select_layout(&mut self, layout: Layout) {
        let capacity = layout.page_capacity();
        self.layout = Some(layout);
        self.current_page = 1;
        if self.slots.is_empty() {
            self.slots = SlotArray::empty(capacity);
        } else {
            self.slots.align(capacity);
        }
        debug!("layout {} selected, {} slots", layout, self.slots.len());
    }

    /// Where a new card would go: the target if given, else the first empty
    /// slot, else one past the end.
    pub fn placement_index(&self, target: Option<usize>) -> usize {
        target
            .or_else(|| self.slots.find_first_empty())
            .unwrap_or(self.slots.len())
    }

    /// Writes a card at `index`, growing by whole pages if needed, and moves
    /// the view to the page the card landed on.
    pub fn place_card(&mut self, card: Card, index: usize) -> Result<usize> {
        let capacity = self.require_layout()?.page_capacity();
        self.slots.set_at(index, Some(card), capacity)?;
        self.current_page = page_of(index, capacity);
        self.clamp_current_page();
        Ok(index)
    }

    /// Empties a slot. The current page steps back when it no longer exists
    /// or has just become empty.
    pub fn delete_card(&mut self, index: usize) -> Result<Option<Card>> {
        let capacity = self.require_layout()?.page_capacity();
        let removed = self.slots.delete_at(index)?;

        let pages = self.total_pages();
        if self.slots.is_empty() {
            self.current_page = 1;
        } else if self.current_page > pages {
            self.current_page = pages;
        } else if self.current_page > 1 && !self.slots.page_has_cards(self.current_page, capacity) {
            self.current_page -= 1;
        }
        Ok(removed)
    }

    /// Swaps two slots and follows the moved card. Returns `false` for a
    /// drop onto the same slot.
    pub fn move_card(&mut self, from: usize, to: usize) -> Result<bool> {
        let capacity = self.require_layout()?.page_capacity();
        if from == to {
            return Ok(false);
        }
        self.slots.swap(from, to)?;
        self.current_page = page_of(to, capacity);
        self.clamp_current_page();
        Ok(true)
    }

    pub fn set_capacity(&mut self, slot_count: usize, confirmed: bool) -> Result<CapacityChange> {
        let capacity = self.require_layout()?.page_capacity();
        let change = self.slots.resize_capacity(slot_count, capacity, confirmed)?;
        self.clamp_current_page();
        Ok(change)
    }

    /// Appends one page of empty slots.
    pub fn add_page(&mut self) -> Result<usize> {
        let capacity = self.require_layout()?.page_capacity();
        let new_len = self.slots.len() + capacity;
        check_growth(new_len)?;
        self.slots.resize(new_len);
        Ok(new_len)
    }

    pub fn clear(&mut self) {
        self.slots = SlotArray::new();
        self.current_page = 1;
    }

    /// Replaces the whole slot array (sort, import) and sets the page.
    pub fn replace_slots(&mut self, slots: SlotArray, page: usize) {
        self.slots = slots;
        self.current_page = page;
        self.clamp_current_page();
    }

    /// Swaps in a whole new binder (file import) under a possibly different
    /// layout.
    pub fn replace_contents(&mut self, slots: SlotArray, layout: Layout, page: usize) {
        self.layout = Some(layout);
        self.slots = slots;
        self.slots.align(layout.page_capacity());
        self.current_page = page;
        self.clamp_current_page();
    }

    pub fn go_to_page(&mut self, target: PageTarget) -> usize {
        let last = self.total_pages();
        self.current_page = match target {
            PageTarget::First => 1,
            PageTarget::Last => last,
            PageTarget::Next => (self.current_page + 1).min(last),
            PageTarget::Prev => self.current_page.saturating_sub(1).max(1),
            PageTarget::Number(n) => n.clamp(1, last),
        };
        self.current_page
    }

    fn clamp_current_page(&mut self) {
        self.current_page = match self.page_capacity() {
            Some(capacity) => clamp_page(self.current_page, self.slots.len(), capacity),
            None => 1,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(name: &str) -> Card {
        Card::new(format!("{}.png", name), name)
    }

    fn binder(n: i64) -> Binder {
        let mut binder = Binder::default();
        binder.select_layout(Layout::new(n).unwrap());
        binder.checkpoint();
        binder
    }

    #[test]
    fn selecting_layout_on_empty_binder_allocates_one_page() {
        let b = binder(3);
        assert_eq!(b.slots().len(), 9);
        assert_eq!(b.current_page(), 1);
        assert_eq!(b.total_pages(), 1);
    }

    #[test]
    fn changing_layout_pads_to_new_page_size() {
        let mut b = binder(3);
        b.place_card(card("a"), 0).unwrap();
        b.select_layout(Layout::new(2).unwrap());
        assert_eq!(b.slots().len(), 12);
        assert_eq!(b.slots().len() % 4, 0);
    }

    #[test]
    fn operations_without_layout_fail() {
        let mut b = Binder::default();
        assert!(matches!(b.place_card(card("a"), 0), Err(BinderError::NoLayout)));
        assert!(matches!(b.add_page(), Err(BinderError::NoLayout)));
    }

    #[test]
    fn placing_beyond_end_follows_card_to_new_page() {
        let mut b = binder(2);
        let index = b.placement_index(Some(9));
        b.place_card(card("far"), index).unwrap();
        assert_eq!(b.slots().len(), 12);
        assert_eq!(b.current_page(), 3);
    }

    #[test]
    fn placement_prefers_first_empty_then_appends() {
        let mut b = binder(1);
        assert_eq!(b.placement_index(None), 0);
        b.place_card(card("a"), 0).unwrap();
        assert_eq!(b.placement_index(None), 1);
        b.place_card(card("b"), 1).unwrap();
        assert_eq!(b.slots().len(), 2);
    }

    #[test]
    fn deleting_last_card_on_page_steps_back() {
        let mut b = binder(2);
        b.place_card(card("a"), 0).unwrap();
        b.place_card(card("b"), 5).unwrap();
        assert_eq!(b.current_page(), 2);

        b.delete_card(5).unwrap();
        assert_eq!(b.current_page(), 1);
        assert_eq!(b.slots().len(), 8);
    }

    #[test]
    fn deleting_every_card_empties_binder() {
        let mut b = binder(2);
        b.place_card(card("a"), 6).unwrap();
        b.delete_card(6).unwrap();
        assert!(b.slots().is_empty());
        assert_eq!(b.current_page(), 1);
        assert_eq!(b.total_pages(), 1);
    }

    #[test]
    fn move_swaps_and_follows_target() {
        let mut b = binder(2);
        b.place_card(card("a"), 0).unwrap();
        b.add_page().unwrap();
        b.go_to_page(PageTarget::First);

        assert!(b.move_card(0, 6).unwrap());
        assert_eq!(b.slots().get(6).unwrap().name, "a");
        assert!(b.slots().get(0).is_none());
        assert_eq!(b.current_page(), 2);
        assert!(!b.move_card(6, 6).unwrap());
    }

    #[test]
    fn undo_restores_previous_state() {
        let mut b = binder(2);
        b.place_card(card("a"), 0).unwrap();
        b.checkpoint();
        b.place_card(card("b"), 1).unwrap();
        b.checkpoint();

        assert!(b.undo());
        assert_eq!(b.tracker().cards, 1);
        assert!(b.undo());
        assert_eq!(b.tracker().cards, 0);
        assert!(!b.undo());
    }

    #[test]
    fn navigation_is_clamped() {
        let mut b = binder(2);
        b.add_page().unwrap();
        b.add_page().unwrap();
        assert_eq!(b.go_to_page(PageTarget::Last), 3);
        assert_eq!(b.go_to_page(PageTarget::Next), 3);
        assert_eq!(b.go_to_page(PageTarget::Number(0)), 1);
        assert_eq!(b.go_to_page(PageTarget::Prev), 1);
        assert_eq!(b.go_to_page(PageTarget::Number(2)), 2);
    }

    #[test]
    fn page_target_parses_words_and_numbers() {
        assert_eq!("next".parse::<PageTarget>().unwrap(), PageTarget::Next);
        assert_eq!("Last".parse::<PageTarget>().unwrap(), PageTarget::Last);
        assert_eq!("4".parse::<PageTarget>().unwrap(), PageTarget::Number(4));
        assert!("sideways".parse::<PageTarget>().is_err());
    }

    #[test]
    fn placing_past_slot_limit_changes_nothing() {
        let mut b = binder(2);
        let before = b.clone();
        assert!(matches!(
            b.place_card(card("a"), usize::MAX),
            Err(BinderError::TooManySlots { .. })
        ));
        assert_eq!(b, before);
    }

    #[test]
    fn undo_into_misaligned_entry_realigns() {
        let mut history = History::default();
        history.record(BinderSnapshot {
            slot_array: vec![Some(card("a")), None, None],
            layout: Some(Layout::new(2).unwrap()),
            current_page: 1,
        });
        let mut b = Binder::new(history);
        b.select_layout(Layout::new(2).unwrap());
        b.place_card(card("b"), 0).unwrap();
        b.checkpoint();

        assert!(b.undo());
        assert_eq!(b.slots().len(), 4);
        assert_eq!(b.slots().get(0).unwrap().name, "a");
    }

    #[test]
    fn page_sync_keeps_history_length() {
        let mut b = binder(2);
        b.place_card(card("a"), 5).unwrap();
        b.checkpoint();
        b.go_to_page(PageTarget::First);
        b.sync_history_page();

        assert_eq!(b.history().len(), 2);
        assert_eq!(b.history().current(), Some(&b.snapshot()));
    }

    #[test]
    fn from_parts_realigns_and_clamps_page() {
        let slots = SlotArray::from_slots(vec![Some(card("a")), None, None, None, None]);
        let b = Binder::from_parts(slots, Some(Layout::new(2).unwrap()), 7, History::default());
        assert_eq!(b.slots().len(), 8);
        assert_eq!(b.current_page(), 2);
    }
}
