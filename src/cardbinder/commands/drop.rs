use crate::binder::Binder;
use crate::commands::{add, move_card, CmdResult};
use crate::drag::DropAction;
use crate::error::Result;
use crate::hue::HueSource;

/// Applies the outcome of a finished drag.
pub fn run<H: HueSource + ?Sized>(
    binder: &mut Binder,
    hue: &mut H,
    action: DropAction,
) -> Result<CmdResult> {
    match action {
        DropAction::Swap { from, to } => move_card::run(binder, from, to),
        DropAction::Place { mut card, index } => {
            binder.require_layout()?;
            if card.is_direct_image && card.hue.is_none() {
                card.hue = hue.hue(&card.image_url);
            }
            add::place(binder, card, index)
        }
        DropAction::Nothing => Ok(CmdResult::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Commit;
    use crate::drag::{DragSource, DragState, DropTarget};
    use crate::hue::fixtures::FixedHue;
    use crate::layout::Layout;
    use crate::model::Card;

    #[test]
    fn dragged_search_result_lands_on_current_page_slot() {
        let mut binder = Binder::default();
        binder.select_layout(Layout::new(2).unwrap());
        binder.add_page().unwrap();
        binder.go_to_page(crate::binder::PageTarget::Last);

        let mut drag = DragState::default();
        drag.start(DragSource::Card(Card::new("https://img.example/m.png", "Mew")), (0.0, 0.0));
        let action = drag.drop(DropTarget::Slot(1), binder.current_page(), 4);

        let mut hue = FixedHue::new().with("https://img.example/m.png", 280.0);
        let result = run(&mut binder, &mut hue, action).unwrap();

        assert_eq!(result.commit, Commit::Checkpoint);
        let placed = binder.slots().get(5).unwrap();
        assert_eq!(placed.name, "Mew");
        assert_eq!(placed.hue, Some(280.0));
    }

    #[test]
    fn in_binder_drag_swaps() {
        let mut binder = Binder::default();
        binder.select_layout(Layout::new(2).unwrap());
        binder.place_card(Card::new("a.png", "A"), 0).unwrap();

        let result = run(
            &mut binder,
            &mut FixedHue::new(),
            DropAction::Swap { from: 0, to: 3 },
        )
        .unwrap();
        assert_eq!(result.commit, Commit::Checkpoint);
        assert_eq!(binder.slots().get(3).unwrap().name, "A");

        let result = run(&mut binder, &mut FixedHue::new(), DropAction::Nothing).unwrap();
        assert_eq!(result.commit, Commit::None);
    }
}
