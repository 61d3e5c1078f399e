use crate::binder::Binder;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{BinderError, Result};

pub fn run(binder: &mut Binder, index: usize) -> Result<CmdResult> {
    let len = binder.slots().len();
    if index >= len {
        return Err(BinderError::IndexOutOfRange { index, len });
    }
    if binder.slots().get(index).is_none() {
        return Ok(CmdResult::default()
            .with_message(CmdMessage::info(format!("Slot {} is already empty", index + 1))));
    }

    let removed = binder.delete_card(index)?;
    let title = removed.map(|card| card.title()).unwrap_or_default();
    Ok(CmdResult::mutated(format!(
        "Removed {} from slot {}",
        title,
        index + 1
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Commit;
    use crate::layout::Layout;
    use crate::model::Card;

    fn binder() -> Binder {
        let mut binder = Binder::default();
        binder.select_layout(Layout::new(2).unwrap());
        binder.place_card(Card::new("a.png", "A"), 0).unwrap();
        binder.place_card(Card::new("b.png", "B"), 1).unwrap();
        binder
    }

    #[test]
    fn removes_card_without_shrinking() {
        let mut binder = binder();
        let result = run(&mut binder, 1).unwrap();
        assert_eq!(result.commit, Commit::Checkpoint);
        assert_eq!(result.messages[0].content, "Removed B from slot 2");
        assert_eq!(binder.slots().len(), 4);
    }

    #[test]
    fn empty_slot_is_not_a_change() {
        let mut binder = binder();
        let result = run(&mut binder, 3).unwrap();
        assert_eq!(result.commit, Commit::None);
    }

    #[test]
    fn out_of_range() {
        let mut binder = binder();
        assert!(matches!(
            run(&mut binder, 9),
            Err(BinderError::IndexOutOfRange { index: 9, len: 4 })
        ));
    }
}
