//! # Hue Sort Engine
//!
//! Reorders the cards of a binder by hue. Cards are gathered in index order,
//! stable-sorted by hue ascending (cards without a hue go last, ties keep their
//! original order), then laid out into a fresh array of the same length.
//!
//! Two placements are supported:
//!
//! - [`SortOrder::RowMajor`]: sorted cards fill slots 0, 1, 2, … so a page
//!   reads across then down.
//! - [`SortOrder::ColumnMajor`]: the k-th card goes down the columns of each
//!   page instead, so a page rendered row by row reads top-to-bottom then
//!   left-to-right.
//!
//! Empty slots only survive at the tail. Column-major placement is defined for
//! square `n × n` layouts only, which is the only kind of [`Layout`] there is.

use crate::error::{BinderError, Result};
use crate::hue::HueSource;
use crate::layout::Layout;
use crate::model::{Card, Slot};
use crate::slots::SlotArray;
use log::{debug, info};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    RowMajor,
    ColumnMajor,
}

impl SortOrder {
    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::RowMajor => "Rows",
            SortOrder::ColumnMajor => "Columns",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortReport {
    pub sorted: usize,
    pub resolved_hues: usize,
    /// Cards that fell outside the original slot count. Always zero unless
    /// the array was misaligned.
    pub dropped: usize,
}

/// Minimum number of cards needed before sorting does anything.
pub const MIN_CARDS_TO_SORT: usize = 2;

/// Fills in missing hues for direct-image cards, one card at a time.
///
/// `progress` is called after every card with `(done, total)`. Returns the
/// number of cards whose hue was looked up.
pub fn resolve_hues<H, P>(slots: &mut SlotArray, hue: &mut H, mut progress: P) -> usize
where
    H: HueSource + ?Sized,
    P: FnMut(usize, usize),
{
    let indexes: Vec<usize> = slots
        .as_slice()
        .iter()
        .enumerate()
        .filter_map(|(i, slot)| slot.as_ref().map(|_| i))
        .collect();
    let total = indexes.len();
    let mut resolved = 0;

    for (done, index) in indexes.into_iter().enumerate() {
        if let Some(card) = slots.get_mut(index) {
            if card.hue.is_none() && card.is_direct_image {
                card.hue = hue.hue(&card.image_url);
                resolved += 1;
            }
        }
        progress(done + 1, total);
    }
    resolved
}

/// Sorts the binder in place: resolves missing hues, then rearranges.
///
/// Fails with [`BinderError::InsufficientCards`] (leaving the array untouched)
/// when fewer than two cards are present.
pub fn sort_slots<H, P>(
    slots: &mut SlotArray,
    layout: Layout,
    order: SortOrder,
    hue: &mut H,
    progress: P,
) -> Result<SortReport>
where
    H: HueSource + ?Sized,
    P: FnMut(usize, usize),
{
    let found = slots.card_count();
    if found < MIN_CARDS_TO_SORT {
        return Err(BinderError::InsufficientCards { found });
    }

    let resolved_hues = resolve_hues(slots, hue, progress);
    let cards: Vec<Card> = slots.cards().cloned().collect();
    let (arranged, dropped) = arrange(cards, slots.len(), layout.size(), order);
    *slots = SlotArray::from_slots(arranged);

    info!(
        "sorted {} cards by hue ({}), {} hues resolved",
        found,
        order.label(),
        resolved_hues
    );
    Ok(SortReport {
        sorted: found,
        resolved_hues,
        dropped,
    })
}

/// Stable sort by hue ascending, `None` after every number.
pub fn sort_cards_by_hue(cards: &mut [Card]) {
    cards.sort_by(|a, b| compare_hue(a.hue, b.hue));
}

fn compare_hue(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sorts `cards` and places them into a new array of `total_slots` slots.
///
/// Returns the array and how many cards did not fit.
pub fn arrange(
    mut cards: Vec<Card>,
    total_slots: usize,
    layout_size: usize,
    order: SortOrder,
) -> (Vec<Slot>, usize) {
    sort_cards_by_hue(&mut cards);
    let mut arranged: Vec<Slot> = vec![None; total_slots];
    let mut dropped = 0;

    for (k, card) in cards.into_iter().enumerate() {
        let index = match order {
            SortOrder::RowMajor => k,
            SortOrder::ColumnMajor => column_major_index(k, layout_size),
        };
        match arranged.get_mut(index) {
            Some(slot) => *slot = Some(card),
            None => {
                debug!("sorted card {} maps to {} past the end, dropping", k, index);
                dropped += 1;
            }
        }
    }
    (arranged, dropped)
}

/// Global index of the k-th card when filling each `n × n` page column by column.
pub fn column_major_index(k: usize, n: usize) -> usize {
    let visual_col = k / n;
    let visual_row = k % n;
    let page = visual_col / n;
    let col_on_page = visual_col % n;
    page * n * n + visual_row * n + col_on_page
}
