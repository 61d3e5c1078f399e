//! # Drag and Drop
//!
//! Input-agnostic drag handling. A shell translates pointer or touch events
//! into [`DragState`] transitions; dropping yields a [`DropAction`] that the
//! API applies as an ordinary move or add.
//!
//! While dragging, [`PageTurner`] flips pages when the pointer rests near the
//! left or right edge of the binder for [`PAGE_TURN_DELAY`]. It turns at most
//! once per visit to an edge.

use crate::layout::global_index;
use crate::model::Card;
use log::debug;
use std::time::{Duration, Instant};

pub const PAGE_TURN_DELAY: Duration = Duration::from_millis(700);

/// Fraction of the binder width, on each side, that counts as an edge.
pub const EDGE_FRACTION: f64 = 0.15;

/// What is being dragged.
#[derive(Debug, Clone, PartialEq)]
pub enum DragSource {
    /// A card already in the binder, by global index.
    Slot(usize),
    /// A card from outside (search result, pasted URL).
    Card(Card),
}

/// Where the pointer was released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    /// A slot on the current page, by page-relative index.
    Slot(usize),
    /// The binder, but not on any slot.
    Binder,
    Outside,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DropAction {
    Swap { from: usize, to: usize },
    /// `index: None` means "first empty slot, else append".
    Place { card: Card, index: Option<usize> },
    Nothing,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        source: DragSource,
        offset: (f64, f64),
    },
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, DragState::Dragging { .. })
    }

    pub fn start(&mut self, source: DragSource, offset: (f64, f64)) {
        debug!("drag started: {:?}", source);
        *self = DragState::Dragging { source, offset };
    }

    /// Updates the pointer offset. Ignored when idle.
    pub fn move_to(&mut self, position: (f64, f64)) {
        if let DragState::Dragging { offset, .. } = self {
            *offset = position;
        }
    }

    pub fn cancel(&mut self) {
        *self = DragState::Idle;
    }

    /// Ends the drag and works out what the drop means. `page` and
    /// `page_capacity` describe the page the target slot is on.
    pub fn drop(&mut self, target: DropTarget, page: usize, page_capacity: usize) -> DropAction {
        let source = match std::mem::take(self) {
            DragState::Idle => return DropAction::Nothing,
            DragState::Dragging { source, .. } => source,
        };

        match (source, target) {
            (DragSource::Slot(from), DropTarget::Slot(local)) => {
                let to = global_index(page, local, page_capacity);
                if from == to {
                    DropAction::Nothing
                } else {
                    DropAction::Swap { from, to }
                }
            }
            (DragSource::Card(card), DropTarget::Slot(local)) => DropAction::Place {
                card,
                index: Some(global_index(page, local, page_capacity)),
            },
            (DragSource::Card(card), DropTarget::Binder) => DropAction::Place { card, index: None },
            _ => DropAction::Nothing,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Left,
    Right,
}

/// Hover-to-turn timer for dragging across pages.
#[derive(Debug)]
pub struct PageTurner {
    delay: Duration,
    armed: Option<(Edge, Instant)>,
    last_turned_to: Option<usize>,
}

impl Default for PageTurner {
    fn default() -> Self {
        Self::new(PAGE_TURN_DELAY)
    }
}

impl PageTurner {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            armed: None,
            last_turned_to: None,
        }
    }

    /// Feeds one hover sample. `x` is the pointer position as a fraction of
    /// the binder width. Returns the page to turn to once the pointer has
    /// rested on an edge long enough.
    pub fn hover(
        &mut self,
        x: f64,
        current_page: usize,
        total_pages: usize,
        now: Instant,
    ) -> Option<usize> {
        let edge = if x < EDGE_FRACTION && current_page > 1 {
            Edge::Left
        } else if x > 1.0 - EDGE_FRACTION && current_page < total_pages {
            Edge::Right
        } else {
            self.reset();
            return None;
        };

        if self.last_turned_to == Some(current_page) {
            return None;
        }

        match self.armed {
            Some((armed_edge, since)) if armed_edge == edge => {
                if now.duration_since(since) < self.delay {
                    return None;
                }
                let target = match edge {
                    Edge::Left => current_page - 1,
                    Edge::Right => current_page + 1,
                };
                debug!("turning page {} -> {} while dragging", current_page, target);
                self.armed = None;
                self.last_turned_to = Some(target);
                Some(target)
            }
            _ => {
                self.armed = Some((edge, now));
                None
            }
        }
    }

    /// Forgets any pending turn, as when the pointer leaves the edge or the
    /// drag ends.
    pub fn reset(&mut self) {
        self.armed = None;
        self.last_turned_to = None;
    }
}
