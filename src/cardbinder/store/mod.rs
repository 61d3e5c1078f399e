//! # Storage Layer
//!
//! The binder persists through a plain key-value interface. The [`KeyValueStore`]
//! trait is all the rest of the crate knows about storage.
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: Production storage, one JSON file per key
//!   - `binderState.json`: the persisted binder record
//!   - `binderHistory.json`: the undo history
//!
//! - [`memory::InMemoryStore`]: In-memory storage for testing
//!   - No persistence
//!   - Fast, isolated test execution
//!
//! ## Storage Format
//!
//! For `FileStore`:
//! ```text
//! ~/.local/share/cardbinder/
//! ├── binderState.json    # {cardsData, selectedLayout, currentPage, appVersion}
//! ├── binderHistory.json  # {entries, pointer, maxSize}
//! └── config.json         # BinderConfig
//! ```
//!
//! Values are opaque strings here; serialization lives in [`crate::persist`].

use crate::error::Result;

pub mod fs;
pub mod memory;

/// Abstract string key-value storage.
pub trait KeyValueStore {
    /// Read a value, `None` if the key was never written or was removed
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove a key; removing a missing key is not an error
    fn remove(&mut self, key: &str) -> Result<()>;
}
