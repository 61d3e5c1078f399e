use crate::binder::Binder;
use crate::cancel::CancelFlag;
use crate::commands::{CmdMessage, CmdResult, Commit};
use crate::csv_import::{fetch_cards, parse_csv};
use crate::error::{BinderError, Result};
use crate::hue::HueSource;
use crate::lookup::CardSearch;
use crate::merge::merge_cards;
use std::fs;
use std::path::Path;

/// Imports a PriceCharting CSV export: every row is looked up, then the
/// results are merged after the existing cards and the view returns to page 1.
pub fn run<C, H, P>(
    binder: &mut Binder,
    search: &mut C,
    hue: &mut H,
    path: &Path,
    placeholder_base: &str,
    cancel: &CancelFlag,
    progress: P,
) -> Result<CmdResult>
where
    C: CardSearch + ?Sized,
    H: HueSource + ?Sized,
    P: FnMut(usize, usize),
{
    let capacity = binder.require_layout()?.page_capacity();
    if !has_extension(path, "csv") {
        return Err(BinderError::InvalidFileFormat(format!(
            "{} is not a CSV file",
            path.display()
        )));
    }

    let text = fs::read_to_string(path)?;
    let parsed = parse_csv(&text, cancel)?;
    let batch = fetch_cards(
        &parsed.candidates,
        search,
        hue,
        placeholder_base,
        cancel,
        progress,
    );

    let merged = merge_cards(binder.slots(), batch.cards.clone(), capacity);
    binder.replace_slots(merged, 1);

    let cancelled = parsed.cancelled || batch.cancelled;
    let summary = if cancelled {
        CmdMessage::warning(batch.summary())
    } else {
        CmdMessage::success(batch.summary())
    };
    let mut result = CmdResult::default()
        .with_commit(Commit::Checkpoint)
        .with_message(summary);
    if parsed.skipped > 0 {
        result.add_message(CmdMessage::warning(format!(
            "Skipped {} rows with a missing name or set",
            parsed.skipped
        )));
    }
    Ok(result)
}

pub(crate) fn has_extension(path: &Path, expected: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(expected))
        .unwrap_or(false)
}
