use crate::binder::Binder;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;

/// Swaps two slots. Moving onto the same slot changes nothing.
pub fn run(binder: &mut Binder, from: usize, to: usize) -> Result<CmdResult> {
    if !binder.move_card(from, to)? {
        return Ok(CmdResult::default().with_message(CmdMessage::info("Nothing to move")));
    }
    Ok(CmdResult::mutated(format!(
        "Moved slot {} to slot {} (page {})",
        from + 1,
        to + 1,
        binder.current_page()
    )))
}
