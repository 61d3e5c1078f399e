//! # Layout Calculator
//!
//! Pure arithmetic for mapping between pages and slot indexes. The binder is a
//! flat array of slots rendered `n × n` at a time, so every conversion is a
//! multiply, a divide, or a round-up to the next page boundary.
//!
//! Pages are **1-indexed** (page 1 is the first page a user sees); global and
//! page-relative (local) indexes are **0-indexed**.

use crate::error::{BinderError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest grid side accepted for a page.
pub const MAX_LAYOUT: i64 = 20;

/// Side length of the square grid shown on one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Layout(usize);

impl Layout {
    pub fn new(size: i64) -> Result<Self> {
        if !(1..=MAX_LAYOUT).contains(&size) {
            return Err(BinderError::InvalidLayout(size));
        }
        Ok(Self(size as usize))
    }

    pub fn size(&self) -> usize {
        self.0
    }

    pub fn page_capacity(&self) -> usize {
        self.0 * self.0
    }
}

impl TryFrom<i64> for Layout {
    type Error = BinderError;

    fn try_from(value: i64) -> Result<Self> {
        Layout::new(value)
    }
}

impl From<Layout> for i64 {
    fn from(layout: Layout) -> Self {
        layout.0 as i64
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.0, self.0)
    }
}

/// Number of slots on one page of an `n × n` layout.
pub fn page_capacity(layout: i64) -> Result<usize> {
    Layout::new(layout).map(|l| l.page_capacity())
}

/// Converts a (1-indexed page, local index) pair to a global slot index.
pub fn global_index(page: usize, local_index: usize, capacity: usize) -> usize {
    page.saturating_sub(1) * capacity + local_index
}

/// The 1-indexed page a global slot index falls on.
pub fn page_of(global_index: usize, capacity: usize) -> usize {
    global_index / capacity + 1
}

/// Number of pages needed for `slot_count` slots; never less than one.
pub fn total_pages(slot_count: usize, capacity: usize) -> usize {
    if capacity == 0 {
        return 1;
    }
    slot_count.div_ceil(capacity).max(1)
}

/// Rounds `current_length` up to the next multiple of `capacity`.
pub fn aligned_length(current_length: usize, capacity: usize) -> usize {
    if capacity == 0 {
        return current_length;
    }
    current_length.div_ceil(capacity) * capacity
}

/// Keeps `page` within `[1, total_pages]`.
pub fn clamp_page(page: usize, slot_count: usize, capacity: usize) -> usize {
    page.clamp(1, total_pages(slot_count, capacity))
}
