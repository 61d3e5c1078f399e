use crate::binder::Binder;
use crate::commands::{CmdMessage, CmdResult, Commit};
use crate::error::Result;

/// Steps back one history entry. The restored state is saved but not
/// recorded again: the history pointer already sits on it.
pub fn run(binder: &mut Binder) -> Result<CmdResult> {
    if !binder.undo() {
        return Ok(CmdResult::default().with_message(CmdMessage::info("Nothing to undo")));
    }
    let tracker = binder.tracker();
    Ok(CmdResult::default()
        .with_commit(Commit::Save)
        .with_message(CmdMessage::success(format!(
            "Undone ({} cards, {} slots)",
            tracker.cards, tracker.slots
        ))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Layout;
    use crate::model::Card;

    #[test]
    fn undo_then_nothing_left() {
        let mut binder = Binder::default();
        binder.checkpoint();
        binder.select_layout(Layout::new(2).unwrap());
        binder.checkpoint();
        binder.place_card(Card::new("a.png", "A"), 0).unwrap();
        binder.checkpoint();

        let result = run(&mut binder).unwrap();
        assert_eq!(result.commit, Commit::Save);
        assert_eq!(result.messages[0].content, "Undone (0 cards, 4 slots)");

        run(&mut binder).unwrap();
        assert!(binder.layout().is_none());

        let result = run(&mut binder).unwrap();
        assert_eq!(result.commit, Commit::None);
        assert_eq!(binder.history().pointer(), 0);
        assert_eq!(binder.history().len(), 3);
    }
}
