//! # Card Binder Architecture
//!
//! Card Binder is a **UI-agnostic library** for arranging trading-card images in a
//! paginated grid. The `binder` command-line tool is one client of it; a GUI or a
//! web shell could drive the same core.
//!
//! ## The Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, prompts, draws the grid                │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands                                │
//! │  - Checkpoints history and persists after each command      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - One business operation per file                          │
//! │  - Mutates a Binder, returns a CmdResult                    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Core (binder, slots, layout, history, sort, merge)         │
//! │  - Pure index arithmetic and array operations               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Beside the core sit the collaborators that touch the outside world, each
//! behind a trait so tests can swap them out:
//!
//! - [`store::KeyValueStore`]: where the binder and its history are saved
//! - [`hue::HueSource`]: the average hue of a card image
//! - [`lookup::CardSearch`]: remote card lookup
//!
//! ## Indexing
//!
//! Every card position is a **global index** into one flat slot array. A page is
//! a window of `layout²` consecutive slots; page numbers are 1-based, indexes
//! are 0-based. See [`layout`] for the arithmetic.
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code:
//! - Takes regular Rust function arguments
//! - Returns regular Rust types (`Result<CmdResult>`)
//! - **Never** writes to stdout/stderr
//! - **Never** calls `std::process::exit`
//!
//! Long operations (hue analysis, imports) take a `(done, total)` progress
//! callback and a [`cancel::CancelFlag`] instead of drawing anything.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: Business logic for each operation
//! - [`binder`]: The live state object
//! - [`layout`], [`slots`], [`history`]: Index arithmetic, the slot array, undo
//! - [`sort`], [`merge`]: Hue sorting and capacity-aware merging
//! - [`persist`], [`store`]: Saved state and its storage
//! - [`csv_import`], [`transfer`]: Bulk CSV import and JSON export/import
//! - [`lookup`], [`search`]: Remote lookup cascade and interactive search
//! - [`hue`]: Image hue extraction
//! - [`drag`]: Drag-and-drop state machine
//! - [`config`]: Configuration management
//! - [`error`]: Error types
//! - `cli`: Argument parsing and terminal output for the binary (not part of the lib API)

pub mod api;
pub mod binder;
pub mod cancel;
pub mod commands;
pub mod config;
pub mod csv_import;
pub mod drag;
pub mod error;
pub mod history;
pub mod hue;
pub mod layout;
pub mod lookup;
pub mod merge;
pub mod model;
pub mod persist;
pub mod search;
pub mod slots;
pub mod sort;
pub mod store;
pub mod transfer;
