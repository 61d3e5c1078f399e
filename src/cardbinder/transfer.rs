//! # Export / Import Files
//!
//! A binder file holds only the cards, not the empty slots between them:
//!
//! ```json
//! { "version": "1.0", "layout": 3, "currentPage": 2, "cards": [ ... ] }
//! ```
//!
//! Importing therefore repacks the cards from the front of a fresh binder.
//! Files written by the running version keep their hues; older files are
//! hydrated like old saved state.

use crate::binder::Binder;
use crate::cancel::CancelFlag;
use crate::error::{BinderError, Result};
use crate::hue::HueSource;
use crate::layout::{clamp_page, Layout};
use crate::merge::pack_cards;
use crate::model::Card;
use crate::persist::{hydrate_cards, StoredCard, APP_VERSION};
use crate::slots::SlotArray;
use log::{info, warn};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFile {
    pub version: String,
    pub layout: i64,
    pub current_page: usize,
    pub cards: Vec<Card>,
}

impl ExportFile {
    /// `None` when the binder has no cards to export.
    pub fn from_binder(binder: &Binder) -> Result<Option<Self>> {
        let layout = binder.require_layout()?;
        let cards: Vec<Card> = binder.slots().cards().cloned().collect();
        if cards.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self {
            version: APP_VERSION.to_string(),
            layout: layout.into(),
            current_page: binder.current_page(),
            cards,
        }))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// A validated binder file, cards not yet hydrated.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportFile {
    pub version: Option<String>,
    pub layout: Layout,
    pub current_page: usize,
    pub cards: Vec<Option<StoredCard>>,
}

impl ImportFile {
    /// Parses and validates the text of a binder file.
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| BinderError::InvalidFileFormat(format!("not valid JSON: {}", e)))?;
        let object = value
            .as_object()
            .ok_or_else(|| BinderError::InvalidFileFormat("expected a JSON object".into()))?;

        let layout = object
            .get("layout")
            .and_then(Value::as_i64)
            .filter(|n| *n > 0)
            .ok_or_else(|| BinderError::InvalidFileFormat("missing or invalid layout".into()))?;
        let cards = object
            .get("cards")
            .and_then(Value::as_array)
            .ok_or_else(|| BinderError::InvalidFileFormat("missing cards array".into()))?;

        let current_page = object
            .get("currentPage")
            .and_then(Value::as_u64)
            .map(|p| p as usize)
            .unwrap_or(1);

        Ok(Self {
            version: object
                .get("version")
                .and_then(Value::as_str)
                .map(str::to_string),
            layout: Layout::new(layout)?,
            current_page,
            cards: cards
                .iter()
                .map(|card| serde_json::from_value::<StoredCard>(card.clone()).ok())
                .collect(),
        })
    }

    pub fn is_current_version(&self) -> bool {
        self.version.as_deref() == Some(APP_VERSION)
    }
}

/// The binder contents rebuilt from an [`ImportFile`].
#[derive(Debug, Clone)]
pub struct ImportedBinder {
    pub slots: SlotArray,
    pub layout: Layout,
    pub current_page: usize,
    pub imported: usize,
    pub recomputed_hues: usize,
    pub cancelled: bool,
}

/// Hydrates the file's cards and packs them into a fresh slot array.
pub fn import_file<H, P>(
    file: ImportFile,
    hue: &mut H,
    cancel: &CancelFlag,
    progress: P,
) -> ImportedBinder
where
    H: HueSource + ?Sized,
    P: FnMut(usize, usize),
{
    let trusted = file.is_current_version();
    if !trusted {
        warn!(
            "binder file version {:?} differs from {}, recomputing hues",
            file.version, APP_VERSION
        );
    }
    let hydrated = hydrate_cards(file.cards, trusted, hue, cancel, progress);
    let cards: Vec<Card> = hydrated.slots.into_iter().flatten().collect();
    let imported = cards.len();
    let capacity = file.layout.page_capacity();
    let slots = pack_cards(cards, capacity);
    let current_page = clamp_page(file.current_page, slots.len(), capacity);

    info!(
        "imported {} cards into a {} binder ({} slots)",
        imported,
        file.layout,
        slots.len()
    );
    ImportedBinder {
        slots,
        layout: file.layout,
        current_page,
        imported,
        recomputed_hues: hydrated.recomputed_hues,
        cancelled: hydrated.cancelled,
    }
}
