use crate::binder::Binder;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::transfer::ExportFile;
use chrono::Local;
use std::fs;
use std::path::PathBuf;

/// `binder_YYYY-MM-DD.json`
pub fn default_filename() -> String {
    format!("binder_{}.json", Local::now().format("%Y-%m-%d"))
}

/// Writes the binder's cards to `path` (or the dated default in the working
/// directory). An empty binder is not exported.
pub fn run(binder: &Binder, path: Option<PathBuf>) -> Result<CmdResult> {
    let file = match ExportFile::from_binder(binder)? {
        Some(file) => file,
        None => {
            return Ok(CmdResult::default()
                .with_message(CmdMessage::warning("Binder is empty, nothing to export")))
        }
    };

    let path = path.unwrap_or_else(|| PathBuf::from(default_filename()));
    fs::write(&path, file.to_json()?)?;

    Ok(CmdResult::default()
        .with_message(CmdMessage::success(format!(
            "Exported {} cards to {}",
            file.cards.len(),
            path.display()
        )))
        .with_paths(vec![path]))
}
