use crate::binder::Binder;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;

/// Sets the total number of slots (rounded up to whole pages).
///
/// A reduction that would drop cards fails with
/// `CapacityReductionRequiresConfirmation` unless `confirmed`.
pub fn run(binder: &mut Binder, slot_count: usize, confirmed: bool) -> Result<CmdResult> {
    let change = binder.set_capacity(slot_count, confirmed)?;
    if change.previous_len == change.new_len && change.dropped_cards == 0 {
        return Ok(CmdResult::default().with_message(CmdMessage::info(format!(
            "Capacity is already {} slots",
            change.new_len
        ))));
    }

    let mut result = CmdResult::mutated(format!(
        "Capacity updated: {} slots ({} pages)",
        change.new_len,
        binder.total_pages()
    ));
    if change.dropped_cards > 0 {
        result.add_message(CmdMessage::warning(format!(
            "Removed {} cards that no longer fit",
            change.dropped_cards
        )));
    }
    Ok(result)
}

pub fn add_page(binder: &mut Binder) -> Result<CmdResult> {
    binder.add_page()?;
    Ok(CmdResult::mutated(format!(
        "Page added ({} pages)",
        binder.total_pages()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Commit;
    use crate::error::BinderError;
    use crate::layout::Layout;
    use crate::model::Card;

    fn binder_with_cards(count: usize) -> Binder {
        let mut binder = Binder::default();
        binder.select_layout(Layout::new(2).unwrap());
        for i in 0..count {
            binder.place_card(Card::new(format!("{}.png", i), i.to_string()), i).unwrap();
        }
        binder
    }

    #[test]
    fn grows_to_whole_pages() {
        let mut binder = binder_with_cards(2);
        let result = run(&mut binder, 9, false).unwrap();
        assert_eq!(result.commit, Commit::Checkpoint);
        assert_eq!(binder.slots().len(), 12);
    }

    #[test]
    fn destructive_reduction_needs_confirmation() {
        let mut binder = binder_with_cards(6);
        let err = run(&mut binder, 4, false).unwrap_err();
        assert!(matches!(
            err,
            BinderError::CapacityReductionRequiresConfirmation { requested: 4, cards: 6 }
        ));
        assert_eq!(binder.slots().len(), 8);

        let result = run(&mut binder, 4, true).unwrap();
        assert_eq!(binder.slots().len(), 4);
        assert_eq!(result.messages[1].content, "Removed 2 cards that no longer fit");
    }

    #[test]
    fn unchanged_capacity_is_not_a_change() {
        let mut binder = binder_with_cards(1);
        let result = run(&mut binder, 3, false).unwrap();
        assert_eq!(result.commit, Commit::None);
    }

    #[test]
    fn add_page_appends_empties() {
        let mut binder = binder_with_cards(1);
        let result = add_page(&mut binder).unwrap();
        assert_eq!(binder.slots().len(), 8);
        assert_eq!(result.messages[0].content, "Page added (2 pages)");
    }
}
