//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer. It is the single
//! entry point for every binder operation, whatever the UI.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Owns the live state**: one [`Binder`], loaded from the store on open
//! - **Dispatches** to the appropriate command function
//! - **Commits** what a command changed: records history and persists in a
//!   single step, so no caller ever sees a mutation that is saved but not
//!   undoable (or the reverse). Page turns are saved with the current history
//!   entry updated in place.
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! ## What the API Does NOT Do
//!
//! - **Business logic**: that belongs in `commands/*.rs`
//! - **Terminal I/O**: no stdout, stderr, prompts or formatting
//!
//! ## Generic Over Collaborators
//!
//! `BinderApi<S, H, C>` is generic over the store, the hue source and the card
//! search:
//! - Production: `BinderApi<FileStore, ImageHue, TcgApiSearch>`
//! - Testing: `BinderApi<InMemoryStore, FixedHue, ScriptedSearch>`

use crate::binder::{Binder, PageTarget};
use crate::cancel::CancelFlag;
use crate::commands::{self, Commit};
use crate::config::BinderConfig;
use crate::drag::DropAction;
use crate::error::Result;
use crate::hue::HueSource;
use crate::lookup::CardSearch;
use crate::persist::{load_binder, save_binder, LoadReport};
use crate::search::{Debouncer, SearchSession};
use crate::sort::SortOrder;
use crate::store::KeyValueStore;
use log::debug;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

pub use crate::commands::add::NewCard;
pub use crate::commands::config::ConfigAction;
pub use crate::commands::{CmdMessage, CmdResult, MessageLevel, PageView};

pub struct BinderApi<S: KeyValueStore, H: HueSource, C: CardSearch> {
    store: S,
    hue: H,
    search: C,
    binder: Binder,
    config: BinderConfig,
    data_dir: PathBuf,
    session: SearchSession,
    debouncer: Debouncer,
    cancel: CancelFlag,
    load_report: LoadReport,
}

impl<S: KeyValueStore, H: HueSource, C: CardSearch> BinderApi<S, H, C> {
    /// Loads the saved binder. `progress` sees `(done, total)` while old
    /// cards are rehydrated.
    pub fn open<P: FnMut(usize, usize)>(
        store: S,
        hue: H,
        search: C,
        config: BinderConfig,
        data_dir: PathBuf,
        progress: P,
    ) -> Self {
        Self::open_with_cancel(store, hue, search, config, data_dir, CancelFlag::new(), progress)
    }

    /// Like [`BinderApi::open`], but loading and later imports watch `cancel`,
    /// which the caller can set from another thread.
    pub fn open_with_cancel<P: FnMut(usize, usize)>(
        mut store: S,
        mut hue: H,
        search: C,
        config: BinderConfig,
        data_dir: PathBuf,
        cancel: CancelFlag,
        progress: P,
    ) -> Self {
        let (binder, load_report) =
            load_binder(&mut store, &mut hue, &cancel, config.max_history, progress);
        cancel.reset();
        let debouncer = search_debouncer(&config);

        Self {
            store,
            hue,
            search,
            binder,
            config,
            data_dir,
            session: SearchSession::new(),
            debouncer,
            cancel,
            load_report,
        }
    }

    pub fn binder(&self) -> &Binder {
        &self.binder
    }

    pub fn config(&self) -> &BinderConfig {
        &self.config
    }

    pub fn load_report(&self) -> &LoadReport {
        &self.load_report
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Handle for cancelling a running import from another thread.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn show(&self) -> Result<CmdResult> {
        commands::show::run(&self.binder)
    }

    /// Selects `size`, or the configured default layout.
    pub fn select_layout(&mut self, size: Option<i64>) -> Result<CmdResult> {
        let size = size.unwrap_or(self.config.default_layout);
        let result = commands::layout::run(&mut self.binder, size)?;
        self.commit(result)
    }

    pub fn add_card(
        &mut self,
        card: NewCard,
        target: Option<usize>,
    ) -> Result<CmdResult> {
        let result = commands::add::run(&mut self.binder, &mut self.hue, card, target)?;
        self.commit(result)
    }

    pub fn delete_card(&mut self, index: usize) -> Result<CmdResult> {
        let result = commands::delete::run(&mut self.binder, index)?;
        self.commit(result)
    }

    pub fn move_card(&mut self, from: usize, to: usize) -> Result<CmdResult> {
        let result = commands::move_card::run(&mut self.binder, from, to)?;
        self.commit(result)
    }

    pub fn apply_drop(&mut self, action: DropAction) -> Result<CmdResult> {
        let result = commands::drop::run(&mut self.binder, &mut self.hue, action)?;
        self.commit(result)
    }

    pub fn sort<P: FnMut(usize, usize)>(&mut self, order: SortOrder, progress: P) -> Result<CmdResult> {
        let result = commands::sort::run(&mut self.binder, &mut self.hue, order, progress)?;
        self.commit(result)
    }

    pub fn set_capacity(&mut self, slot_count: usize, confirmed: bool) -> Result<CmdResult> {
        let result = commands::capacity::run(&mut self.binder, slot_count, confirmed)?;
        self.commit(result)
    }

    pub fn add_page(&mut self) -> Result<CmdResult> {
        let result = commands::capacity::add_page(&mut self.binder)?;
        self.commit(result)
    }

    pub fn clear(&mut self) -> Result<CmdResult> {
        let result = commands::clear::run(&mut self.binder)?;
        self.commit(result)
    }

    pub fn undo(&mut self) -> Result<CmdResult> {
        let result = commands::undo::run(&mut self.binder)?;
        self.commit(result)
    }

    pub fn go_to_page(&mut self, target: PageTarget) -> Result<CmdResult> {
        let result = commands::page::run(&mut self.binder, target)?;
        self.commit(result)
    }

    pub fn import_csv<P: FnMut(usize, usize)>(&mut self, path: &Path, progress: P) -> Result<CmdResult> {
        self.cancel.reset();
        let result = commands::import_csv::run(
            &mut self.binder,
            &mut self.search,
            &mut self.hue,
            path,
            &self.config.placeholder_image_url,
            &self.cancel,
            progress,
        )?;
        self.commit(result)
    }

    pub fn import_binder<P: FnMut(usize, usize)>(&mut self, path: &Path, progress: P) -> Result<CmdResult> {
        self.cancel.reset();
        let result =
            commands::import::run(&mut self.binder, &mut self.hue, path, &self.cancel, progress)?;
        self.commit(result)
    }

    pub fn export(&self, path: Option<PathBuf>) -> Result<CmdResult> {
        commands::export::run(&self.binder, path)
    }

    pub fn search(&mut self, query: &str) -> Result<CmdResult> {
        commands::search::run(
            &self.session,
            &mut self.search,
            query,
            self.config.search_page_size,
        )
    }

    /// Feeds live search-box text. Nothing is sent until the text has been
    /// quiet for `search_debounce_ms`; the host then calls
    /// [`BinderApi::poll_search`].
    pub fn search_input(&mut self, text: &str, now: Instant) {
        self.debouncer.input(text, now);
    }

    /// Runs the pending search once its quiet period is over.
    pub fn poll_search(&mut self, now: Instant) -> Option<Result<CmdResult>> {
        let query = self.debouncer.poll(now)?;
        Some(self.search(&query))
    }

    pub fn configure(&mut self, action: ConfigAction) -> Result<CmdResult> {
        let result = commands::config::run(&self.data_dir, action)?;
        if let Some(config) = &result.config {
            self.config = config.clone();
            self.binder.history_mut().set_max_size(self.config.max_history);
            self.debouncer = search_debouncer(&self.config);
        }
        Ok(result)
    }

    fn commit(&mut self, result: CmdResult) -> Result<CmdResult> {
        match result.commit {
            Commit::None => {}
            Commit::Save => {
                self.binder.sync_history_page();
                save_binder(&mut self.store, &self.binder)?;
            }
            Commit::Checkpoint => {
                self.binder.checkpoint();
                save_binder(&mut self.store, &self.binder)?;
            }
        }
        debug!("committed {:?}", result.commit);
        Ok(result)
    }
}

fn search_debouncer(config: &BinderConfig) -> Debouncer {
    Debouncer::new(Duration::from_millis(config.search_debounce_ms))
}
