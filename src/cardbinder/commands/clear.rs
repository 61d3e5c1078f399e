use crate::binder::Binder;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;

/// Removes every card and slot. Undo brings them back.
pub fn run(binder: &mut Binder) -> Result<CmdResult> {
    let cards = binder.tracker().cards;
    if binder.slots().is_empty() {
        return Ok(CmdResult::default().with_message(CmdMessage::info("Binder is already empty")));
    }
    binder.clear();
    Ok(CmdResult::mutated(format!("Cleared {} cards", cards)))
}
