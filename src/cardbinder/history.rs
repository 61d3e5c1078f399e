//! # History Manager
//!
//! Linear undo over full snapshots of the binder. Every mutating operation
//! records one [`BinderSnapshot`]; the pointer always refers to the entry that
//! matches the live state.
//!
//! - Recording after an undo discards everything past the pointer, so there is
//!   never a redo branch.
//! - The log is bounded: once it exceeds `max_size`, the oldest entry is
//!   evicted and the pointer stays where it is (it still names the newest entry).
//! - Undo moves the pointer back one step and hands back that snapshot. It does
//!   not record again; the pointer already sits on the restored content.
//! - Page turns are written into the current entry instead of being recorded,
//!   so the entry still matches the live state when the binder is reopened.

use crate::model::BinderSnapshot;
use log::debug;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_HISTORY: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct History {
    entries: Vec<BinderSnapshot>,
    pointer: usize,
    max_size: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

impl History {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: Vec::new(),
            pointer: 0,
            max_size: max_size.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn entries(&self) -> &[BinderSnapshot] {
        &self.entries
    }

    pub fn current(&self) -> Option<&BinderSnapshot> {
        self.entries.get(self.pointer)
    }

    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty() && self.pointer > 0
    }

    /// Appends a snapshot of the live state, discarding any entries past the
    /// pointer first.
    pub fn record(&mut self, snapshot: BinderSnapshot) {
        if !self.entries.is_empty() && self.pointer + 1 < self.entries.len() {
            debug!(
                "discarding {} history entries past pointer {}",
                self.entries.len() - self.pointer - 1,
                self.pointer
            );
            self.entries.truncate(self.pointer + 1);
        }

        self.entries.push(snapshot);

        if self.entries.len() > self.max_size {
            self.entries.remove(0);
        } else {
            self.pointer = self.entries.len() - 1;
        }
    }

    /// Steps back one entry. Returns `None` when already at the oldest entry.
    pub fn undo(&mut self) -> Option<&BinderSnapshot> {
        if !self.can_undo() {
            return None;
        }
        self.pointer -= 1;
        self.entries.get(self.pointer)
    }

    /// Moves the current entry to `page` in place. Page turns are not undo
    /// steps.
    pub fn set_current_page(&mut self, page: usize) {
        if let Some(entry) = self.entries.get_mut(self.pointer) {
            entry.current_page = page;
        }
    }

    /// Changes the bound, evicting the oldest entries if needed.
    pub fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size.max(1);
        while self.entries.len() > self.max_size {
            self.entries.remove(0);
            self.pointer = self.pointer.saturating_sub(1);
        }
    }

    /// A deserialized history is usable only if its pointer lands on an entry.
    pub fn is_consistent(&self) -> bool {
        if self.entries.is_empty() {
            return self.pointer == 0;
        }
        self.pointer < self.entries.len() && self.entries.len() <= self.max_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Layout;
    use crate::model::Card;

    fn snapshot(tag: usize) -> BinderSnapshot {
        BinderSnapshot {
            slot_array: vec![Some(Card::new("a.png", format!("card-{}", tag)))],
            layout: Some(Layout::new(1).unwrap()),
            current_page: 1,
        }
    }

    fn tag(snapshot: &BinderSnapshot) -> String {
        snapshot.slot_array[0].as_ref().unwrap().name.clone()
    }

    #[test]
    fn page_sync_touches_only_current_entry() {
        let mut history = History::new(20);
        history.record(snapshot(0));
        history.record(snapshot(1));
        history.set_current_page(3);

        assert_eq!(history.len(), 2);
        assert_eq!(history.current().unwrap().current_page, 3);
        assert_eq!(history.entries()[0].current_page, 1);
    }

    #[test]
    fn first_record_points_at_zero() {
        let mut history = History::new(20);
        history.record(snapshot(0));
        assert_eq!(history.len(), 1);
        assert_eq!(history.pointer(), 0);
        assert!(!history.can_undo());
    }

    #[test]
    fn bounded_history_evicts_oldest_entries() {
        let mut history = History::new(20);
        history.record(snapshot(0));
        for i in 1..=25 {
            history.record(snapshot(i));
        }

        assert_eq!(history.len(), 20);
        assert_eq!(history.pointer(), 19);

        let mut last = None;
        for _ in 0..19 {
            last = history.undo().map(tag);
        }
        // Snapshots 0..=5 were evicted; the oldest retained one is 6.
        assert_eq!(last.as_deref(), Some("card-6"));
        assert_eq!(history.pointer(), 0);
    }

    #[test]
    fn undo_at_oldest_entry_is_a_noop() {
        let mut history = History::new(20);
        history.record(snapshot(0));
        for _ in 0..5 {
            assert!(history.undo().is_none());
        }
        assert_eq!(history.len(), 1);
        assert_eq!(history.pointer(), 0);
    }

    #[test]
    fn undo_on_empty_history_is_a_noop() {
        let mut history = History::new(20);
        assert!(history.undo().is_none());
        assert!(history.is_consistent());
    }

    #[test]
    fn new_action_after_undo_discards_redo_branch() {
        let mut history = History::new(20);
        history.record(snapshot(0));
        history.record(snapshot(1)); // A
        history.record(snapshot(2)); // B
        assert_eq!(history.undo().map(tag).as_deref(), Some("card-1"));
        history.record(snapshot(3)); // C

        let tags: Vec<String> = history.entries().iter().map(tag).collect();
        assert_eq!(tags, vec!["card-0", "card-1", "card-3"]);
        assert_eq!(history.pointer(), 2);
    }

    #[test]
    fn repeated_undo_walks_back_one_step_each_time() {
        let mut history = History::new(20);
        for i in 0..4 {
            history.record(snapshot(i));
        }
        assert_eq!(history.undo().map(tag).as_deref(), Some("card-2"));
        assert_eq!(history.undo().map(tag).as_deref(), Some("card-1"));
        assert_eq!(history.undo().map(tag).as_deref(), Some("card-0"));
        assert!(history.undo().is_none());
        assert_eq!(history.len(), 4);
    }

    #[test]
    fn shrinking_max_size_keeps_pointer_valid() {
        let mut history = History::new(20);
        for i in 0..10 {
            history.record(snapshot(i));
        }
        history.set_max_size(4);
        assert_eq!(history.len(), 4);
        assert_eq!(history.pointer(), 3);
        assert_eq!(history.current().map(tag).as_deref(), Some("card-9"));
        assert!(history.is_consistent());
    }

    #[test]
    fn inconsistent_pointer_is_detected() {
        let json = r#"{"entries": [], "pointer": 3, "maxSize": 20}"#;
        let history: History = serde_json::from_str(json).unwrap();
        assert!(!history.is_consistent());
    }
}
