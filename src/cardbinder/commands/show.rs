use crate::binder::{Binder, Tracker};
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::layout::{global_index, Layout};
use crate::model::Slot;

/// Everything needed to draw the current page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageView {
    pub layout: Layout,
    pub page: usize,
    pub total_pages: usize,
    /// Global index of the first slot on the page.
    pub first_index: usize,
    /// Exactly `layout²` slots; pages past the end of the array show empties.
    pub slots: Vec<Slot>,
    pub tracker: Tracker,
}

impl PageView {
    pub fn of(binder: &Binder, layout: Layout) -> Self {
        let capacity = layout.page_capacity();
        let page = binder.current_page();
        let mut slots = binder.slots().page(page, capacity).to_vec();
        slots.resize(capacity, None);

        Self {
            layout,
            page,
            total_pages: binder.total_pages(),
            first_index: global_index(page, 0, capacity),
            slots,
            tracker: binder.tracker(),
        }
    }

    /// Rows of the grid, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Slot]> {
        self.slots.chunks(self.layout.size())
    }
}

pub fn run(binder: &Binder) -> Result<CmdResult> {
    match binder.layout() {
        Some(layout) => Ok(CmdResult::default().with_page(PageView::of(binder, layout))),
        None => Ok(CmdResult::default().with_message(CmdMessage::info(
            "No layout selected. Pick one with `binder layout <n>`.",
        ))),
    }
}
