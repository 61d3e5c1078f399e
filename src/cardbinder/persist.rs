//! # Persisted State
//!
//! Serializes the binder into the key-value store and brings it back at startup.
//!
//! The saved record keeps the field names of the browser-era format
//! (`cardsData`, `selectedLayout`, `currentPage`, `appVersion`) so old saves
//! still load. Cards written by the same [`APP_VERSION`] keep their stored hue
//! and image flag; anything else is re-derived ("hydrated") card by card.
//!
//! Loading never fails. A record that cannot be parsed is logged, removed from
//! the store and replaced by an empty binder with no layout; a history that
//! cannot be parsed is restarted from the loaded state.

use crate::binder::Binder;
use crate::cancel::CancelFlag;
use crate::error::{BinderError, Result};
use crate::history::History;
use crate::hue::HueSource;
use crate::layout::Layout;
use crate::model::{is_likely_image_url, Card, Slot};
use crate::slots::SlotArray;
use crate::store::KeyValueStore;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

pub const APP_VERSION: &str = "1.0";
pub const STATE_KEY: &str = "binderState";
pub const HISTORY_KEY: &str = "binderHistory";

/// A card as found on disk or in an import file. Every field is optional so
/// that older or hand-edited records still parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCard {
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_number: Option<String>,
    #[serde(default)]
    pub hue: Option<f64>,
    #[serde(default)]
    pub is_direct_image: Option<bool>,
}

impl From<&Card> for StoredCard {
    fn from(card: &Card) -> Self {
        Self {
            image_url: Some(card.image_url.clone()),
            name: Some(card.name.clone()),
            set_name: card.set_name.clone(),
            card_number: card.card_number.clone(),
            hue: card.hue,
            is_direct_image: Some(card.is_direct_image),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub cards_data: Vec<Option<StoredCard>>,
    #[serde(default)]
    pub selected_layout: Option<i64>,
    #[serde(default = "first_page")]
    pub current_page: i64,
    #[serde(default)]
    pub app_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

fn first_page() -> i64 {
    1
}

impl PersistedState {
    /// A record stamped with the running version.
    pub fn current(slots: Vec<Slot>, layout: Option<i64>, current_page: usize) -> Self {
        Self {
            cards_data: slots
                .iter()
                .map(|slot| slot.as_ref().map(StoredCard::from))
                .collect(),
            selected_layout: layout,
            current_page: current_page as i64,
            app_version: Some(APP_VERSION.to_string()),
            saved_at: Some(Utc::now()),
        }
    }

    pub fn from_binder(binder: &Binder) -> Self {
        Self::current(
            binder.slots().as_slice().to_vec(),
            binder.layout().map(i64::from),
            binder.current_page(),
        )
    }

    pub fn is_current_version(&self) -> bool {
        self.app_version.as_deref() == Some(APP_VERSION)
    }
}

/// Result of rebuilding cards from stored records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hydrated {
    pub slots: Vec<Slot>,
    pub recomputed_hues: usize,
    pub cancelled: bool,
}

/// Rebuilds stored cards one at a time.
///
/// A card keeps its stored `hue` and `isDirectImage` only when `trusted` and
/// both are present. Otherwise a URL that looks like an image gets its hue
/// recomputed and is marked direct, and anything else becomes a text
/// placeholder with no hue. Records without an image URL become empty slots.
///
/// Checks `cancel` before each card; on cancellation the cards already
/// processed are returned with `cancelled` set.
pub fn hydrate_cards<H, P>(
    records: Vec<Option<StoredCard>>,
    trusted: bool,
    hue: &mut H,
    cancel: &CancelFlag,
    mut progress: P,
) -> Hydrated
where
    H: HueSource + ?Sized,
    P: FnMut(usize, usize),
{
    let total = records.len();
    let mut hydrated = Hydrated::default();

    for (done, record) in records.into_iter().enumerate() {
        if cancel.is_cancelled() {
            info!("hydration cancelled after {} of {} cards", done, total);
            hydrated.cancelled = true;
            break;
        }

        let slot = record.and_then(|stored| {
            let image_url = stored.image_url.filter(|u| !u.is_empty())?;
            let likely = is_likely_image_url(&image_url);

            let (card_hue, is_direct) = match (trusted, stored.hue, stored.is_direct_image) {
                (true, Some(h), Some(direct)) => (Some(h), direct),
                _ if likely => {
                    hydrated.recomputed_hues += 1;
                    (hue.hue(&image_url), true)
                }
                _ => {
                    debug!("not sampling {}: does not look like an image", image_url);
                    (None, false)
                }
            };

            Some(Card {
                image_url,
                name: stored.name.unwrap_or_default(),
                set_name: stored.set_name.filter(|s| !s.is_empty()),
                card_number: stored.card_number.filter(|s| !s.is_empty()),
                hue: card_hue,
                is_direct_image: is_direct,
            })
        });

        hydrated.slots.push(slot);
        progress(done + 1, total);
    }

    hydrated
}

/// What happened while loading saved state.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub restored: bool,
    pub recomputed_hues: usize,
    pub cancelled: bool,
    pub saved_at: Option<DateTime<Utc>>,
    /// Set when the saved record was unreadable and has been discarded.
    pub discarded: Option<BinderError>,
}

/// Loads the binder and its history from `store`.
pub fn load_binder<S, H, P>(
    store: &mut S,
    hue: &mut H,
    cancel: &CancelFlag,
    max_history: usize,
    progress: P,
) -> (Binder, LoadReport)
where
    S: KeyValueStore,
    H: HueSource + ?Sized,
    P: FnMut(usize, usize),
{
    let mut report = LoadReport::default();
    let history = load_history(store, max_history);

    let state = match read_state(store) {
        Ok(Some(state)) => state,
        Ok(None) => {
            debug!("no saved binder state");
            return (finish(Binder::new(history)), report);
        }
        Err(err) => {
            warn!("discarding unreadable binder state: {}", err);
            if let Err(e) = store.remove(STATE_KEY) {
                warn!("could not remove unreadable state: {}", e);
            }
            if let Err(e) = store.remove(HISTORY_KEY) {
                warn!("could not remove history: {}", e);
            }
            report.discarded = Some(err);
            return (finish(Binder::new(History::new(max_history))), report);
        }
    };

    let trusted = state.is_current_version();
    debug!(
        "loading saved state (version {:?}, trusted = {})",
        state.app_version, trusted
    );
    let hydrated = hydrate_cards(state.cards_data, trusted, hue, cancel, progress);

    let layout = state.selected_layout.and_then(|n| match Layout::new(n) {
        Ok(layout) => Some(layout),
        Err(e) => {
            warn!("ignoring saved layout: {}", e);
            None
        }
    });
    let page = state.current_page.max(1) as usize;
    let binder = Binder::from_parts(SlotArray::from_slots(hydrated.slots), layout, page, history);

    report.restored = true;
    report.recomputed_hues = hydrated.recomputed_hues;
    report.cancelled = hydrated.cancelled;
    report.saved_at = state.saved_at;
    info!(
        "restored binder: {} cards in {} slots",
        binder.tracker().cards,
        binder.tracker().slots
    );
    (finish(binder), report)
}

/// Makes sure the history pointer names the live state. A difference in the
/// page alone is synced into the current entry rather than recorded.
fn finish(mut binder: Binder) -> Binder {
    let live = binder.snapshot();
    let (same, page_only) = match binder.history().current() {
        Some(entry) => (
            *entry == live,
            entry.slot_array == live.slot_array && entry.layout == live.layout,
        ),
        None => (false, false),
    };
    if page_only && !same {
        binder.sync_history_page();
    } else if !same {
        binder.checkpoint();
    }
    binder
}

fn read_state<S: KeyValueStore>(store: &S) -> Result<Option<PersistedState>> {
    let raw = match store.get(STATE_KEY)? {
        Some(raw) => raw,
        None => return Ok(None),
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| BinderError::PersistenceRead(e.to_string()))
}

fn load_history<S: KeyValueStore>(store: &S, max_history: usize) -> History {
    let raw = match store.get(HISTORY_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return History::new(max_history),
        Err(e) => {
            warn!("could not read history: {}", e);
            return History::new(max_history);
        }
    };
    match serde_json::from_str::<History>(&raw) {
        Ok(mut history) if history.is_consistent() => {
            history.set_max_size(max_history);
            history
        }
        Ok(_) => {
            warn!("saved history is inconsistent, starting over");
            History::new(max_history)
        }
        Err(e) => {
            warn!("saved history is unreadable, starting over: {}", e);
            History::new(max_history)
        }
    }
}

/// Writes the binder record and its history.
pub fn save_binder<S: KeyValueStore>(store: &mut S, binder: &Binder) -> Result<()> {
    let state = serde_json::to_string(&PersistedState::from_binder(binder))?;
    store.set(STATE_KEY, &state)?;
    let history = serde_json::to_string(binder.history())?;
    store.set(HISTORY_KEY, &history)?;
    debug!("binder state saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hue::fixtures::FixedHue;
    use crate::store::memory::fixtures::StoreFixture;
    use crate::store::memory::InMemoryStore;

    fn load(store: &mut InMemoryStore, hue: &mut FixedHue) -> (Binder, LoadReport) {
        load_binder(store, hue, &CancelFlag::new(), 20, |_, _| {})
    }

    #[test]
    fn empty_store_gives_empty_binder_without_layout() {
        let mut store = InMemoryStore::new();
        let (binder, report) = load(&mut store, &mut FixedHue::new());
        assert!(!report.restored);
        assert!(binder.layout().is_none());
        assert!(binder.slots().is_empty());
        assert_eq!(binder.history().len(), 1);
    }

    #[test]
    fn save_then_load_restores_everything() {
        let mut store = InMemoryStore::new();
        let mut binder = Binder::default();
        binder.select_layout(Layout::new(2).unwrap());
        binder
            .place_card(Card::new("https://img.example/a.png", "A").with_hue(Some(10.0)), 5)
            .unwrap();
        binder.checkpoint();
        save_binder(&mut store, &binder).unwrap();

        let mut hue = FixedHue::new();
        let (loaded, report) = load(&mut store, &mut hue);
        assert!(report.restored);
        assert_eq!(report.recomputed_hues, 0);
        assert!(hue.calls.is_empty());
        assert_eq!(loaded.slots(), binder.slots());
        assert_eq!(loaded.current_page(), 2);
        assert_eq!(loaded.history().len(), 1);
    }

    #[test]
    fn corrupt_state_is_discarded() {
        let mut store = StoreFixture::new()
            .with_raw(STATE_KEY, "{not json")
            .store;
        let (binder, report) = load(&mut store, &mut FixedHue::new());

        assert!(matches!(report.discarded, Some(BinderError::PersistenceRead(_))));
        assert!(binder.layout().is_none());
        assert!(binder.slots().is_empty());
        assert_eq!(store.get(STATE_KEY).unwrap(), None);
    }

    #[test]
    fn old_version_recomputes_hues_for_images_only() {
        let raw = r#"{
            "cardsData": [
                {"imageUrl": "https://img.example/a.png", "name": "A", "hue": 99, "isDirectImage": true},
                null,
                {"imageUrl": "https://placehold.co/150x210?text=Card+Not+Found", "name": "B"},
                {"name": "no image"}
            ],
            "selectedLayout": 2,
            "currentPage": 1,
            "appVersion": "0.9"
        }"#;
        let mut store = StoreFixture::new().with_raw(STATE_KEY, raw).store;
        let mut hue = FixedHue::new().with("https://img.example/a.png", 200.0);

        let (binder, report) = load(&mut store, &mut hue);
        assert_eq!(report.recomputed_hues, 1);
        let a = binder.slots().get(0).unwrap();
        assert_eq!(a.hue, Some(200.0));
        assert!(a.is_direct_image);
        let b = binder.slots().get(2).unwrap();
        assert_eq!(b.hue, None);
        assert!(!b.is_direct_image);
        assert!(binder.slots().get(3).is_none());
        assert_eq!(binder.slots().len(), 4);
    }

    #[test]
    fn current_version_without_hue_is_recomputed() {
        let state = PersistedState {
            cards_data: vec![Some(StoredCard {
                image_url: Some("https://img.example/a.png".into()),
                name: Some("A".into()),
                is_direct_image: Some(true),
                ..Default::default()
            })],
            selected_layout: Some(1),
            current_page: 1,
            app_version: Some(APP_VERSION.into()),
            saved_at: None,
        };
        let mut store = StoreFixture::new().with_state(state).store;
        let mut hue = FixedHue::new().with("https://img.example/a.png", 33.0);
        let (binder, _) = load(&mut store, &mut hue);
        assert_eq!(binder.slots().get(0).unwrap().hue, Some(33.0));
    }

    #[test]
    fn invalid_saved_layout_is_ignored() {
        let raw = r#"{"cardsData": [], "selectedLayout": 0, "currentPage": 3, "appVersion": "1.0"}"#;
        let mut store = StoreFixture::new().with_raw(STATE_KEY, raw).store;
        let (binder, report) = load(&mut store, &mut FixedHue::new());
        assert!(report.restored);
        assert!(binder.layout().is_none());
        assert_eq!(binder.current_page(), 1);
    }

    #[test]
    fn cancelled_load_keeps_processed_cards_aligned() {
        let mut store = StoreFixture::new().with_cards(2, 6).store;
        let cancel = CancelFlag::new();
        let flag = cancel.clone();
        let mut hue = FixedHue::new();

        let (binder, report) = load_binder(&mut store, &mut hue, &cancel, 20, move |done, _| {
            if done == 3 {
                flag.cancel();
            }
        });

        assert!(report.cancelled);
        assert_eq!(binder.tracker().cards, 3);
        assert_eq!(binder.slots().len(), 4);
    }

    #[test]
    fn unreadable_history_restarts_from_live_state() {
        let mut store = StoreFixture::new()
            .with_cards(3, 2)
            .with_raw(HISTORY_KEY, "garbage")
            .store;
        let (binder, _) = load(&mut store, &mut FixedHue::new());
        assert_eq!(binder.history().len(), 1);
        assert_eq!(binder.history().current(), Some(&binder.snapshot()));
    }

    #[test]
    fn page_only_difference_is_not_a_history_step() {
        let mut binder = Binder::default();
        binder.select_layout(Layout::new(1).unwrap());
        binder.checkpoint();
        binder.place_card(Card::new("a.png", "A"), 0).unwrap();
        binder.checkpoint();
        binder.place_card(Card::new("b.png", "B"), 1).unwrap();
        binder.checkpoint();
        // saved by an older build that did not sync the page
        binder.go_to_page(crate::binder::PageTarget::First);
        let mut store = InMemoryStore::new();
        save_binder(&mut store, &binder).unwrap();

        let (mut loaded, _) = load(&mut store, &mut FixedHue::new());
        assert_eq!(loaded.history().len(), 3);
        assert_eq!(loaded.current_page(), 1);
        assert!(loaded.undo());
        assert_eq!(loaded.tracker().cards, 1);
    }

    #[test]
    fn saved_oversized_layout_is_ignored() {
        let raw = r#"{"cardsData": [null], "selectedLayout": 5000000000, "currentPage": 1, "appVersion": "1.0"}"#;
        let mut store = StoreFixture::new().with_raw(STATE_KEY, raw).store;
        let (binder, report) = load(&mut store, &mut FixedHue::new());
        assert!(report.restored);
        assert!(binder.layout().is_none());
    }

    #[test]
    fn saved_record_uses_browser_field_names() {
        let mut binder = Binder::default();
        binder.select_layout(Layout::new(3).unwrap());
        let json = serde_json::to_value(PersistedState::from_binder(&binder)).unwrap();
        assert_eq!(json["selectedLayout"], 3);
        assert_eq!(json["currentPage"], 1);
        assert_eq!(json["appVersion"], APP_VERSION);
        assert_eq!(json["cardsData"].as_array().unwrap().len(), 9);
    }
}
