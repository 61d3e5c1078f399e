use crate::binder::Binder;
use crate::cancel::CancelFlag;
use crate::commands::import_csv::has_extension;
use crate::commands::{CmdMessage, CmdResult, Commit};
use crate::error::{BinderError, Result};
use crate::hue::HueSource;
use crate::transfer::{import_file, ImportFile};
use std::fs;
use std::path::Path;

/// Replaces the binder with the contents of an exported JSON file.
pub fn run<H, P>(
    binder: &mut Binder,
    hue: &mut H,
    path: &Path,
    cancel: &CancelFlag,
    progress: P,
) -> Result<CmdResult>
where
    H: HueSource + ?Sized,
    P: FnMut(usize, usize),
{
    if !has_extension(path, "json") {
        return Err(BinderError::InvalidFileFormat(format!(
            "{} is not a JSON file",
            path.display()
        )));
    }
    let text = fs::read_to_string(path)?;
    let file = ImportFile::parse(&text)?;
    let imported = import_file(file, hue, cancel, progress);

    let message = if imported.cancelled {
        CmdMessage::warning(format!(
            "Import cancelled ({} cards loaded)",
            imported.imported
        ))
    } else {
        CmdMessage::success(format!(
            "Imported {} cards ({} layout)",
            imported.imported, imported.layout
        ))
    };
    binder.replace_contents(imported.slots, imported.layout, imported.current_page);

    Ok(CmdResult::default()
        .with_commit(Commit::Checkpoint)
        .with_message(message))
}
