//! # Commands
//!
//! One business operation per module. Every `run` takes the live [`Binder`]
//! (plus whatever collaborators it needs) and returns a [`CmdResult`]: the
//! messages to show, any data to render, and a [`Commit`] telling the API what
//! to do with the new state.
//!
//! Commands never persist and never record history themselves. The API does
//! both in one step after a command returns, so a mutation is always saved
//! and checkpointed together.
//!
//! [`Binder`]: crate::binder::Binder

use crate::config::BinderConfig;
use crate::lookup::CardMatch;
use std::path::PathBuf;

pub mod add;
pub mod capacity;
pub mod clear;
pub mod config;
pub mod delete;
pub mod drop;
pub mod export;
pub mod import;
pub mod import_csv;
pub mod layout;
pub mod move_card;
pub mod page;
pub mod search;
pub mod show;
pub mod sort;
pub mod undo;

pub use show::PageView;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// What the API must do with the binder after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Commit {
    /// Nothing changed.
    #[default]
    None,
    /// Persist only (page navigation, undo).
    Save,
    /// Record a history entry, then persist.
    Checkpoint,
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub commit: Commit,
    pub page: Option<PageView>,
    pub matches: Vec<CardMatch>,
    pub config: Option<BinderConfig>,
    pub paths: Vec<PathBuf>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_message(mut self, message: CmdMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_commit(mut self, commit: Commit) -> Self {
        self.commit = commit;
        self
    }

    pub fn with_page(mut self, page: PageView) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_matches(mut self, matches: Vec<CardMatch>) -> Self {
        self.matches = matches;
        self
    }

    pub fn with_config(mut self, config: BinderConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.paths = paths;
        self
    }

    /// Convenience for a state-changing command with one success message.
    pub fn mutated(message: impl Into<String>) -> Self {
        Self::default()
            .with_commit(Commit::Checkpoint)
            .with_message(CmdMessage::success(message))
    }
}
