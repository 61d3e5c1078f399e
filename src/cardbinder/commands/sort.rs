use crate::binder::Binder;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{BinderError, Result};
use crate::hue::HueSource;
use crate::sort::{sort_slots, SortOrder};

/// Sorts every card by hue and returns to page 1.
///
/// Fewer than two cards is reported as a warning, not an error.
pub fn run<H, P>(binder: &mut Binder, hue: &mut H, order: SortOrder, progress: P) -> Result<CmdResult>
where
    H: HueSource + ?Sized,
    P: FnMut(usize, usize),
{
    let layout = binder.require_layout()?;
    let mut slots = binder.slots().clone();

    match sort_slots(&mut slots, layout, order, hue, progress) {
        Ok(_) => {
            binder.replace_slots(slots, 1);
            Ok(CmdResult::mutated(format!("Sorted by Hue ({})", order.label())))
        }
        Err(BinderError::InsufficientCards { .. }) => {
            Ok(CmdResult::default().with_message(CmdMessage::warning("Need 2+ cards to sort")))
        }
        Err(e) => Err(e),
    }
}
