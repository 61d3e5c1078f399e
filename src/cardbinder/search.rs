//! Interactive card search.
//!
//! Keystrokes go through a [`Debouncer`]; only the text that has been quiet
//! for the configured delay becomes a request. Every request takes a ticket
//! from the shared [`SearchSession`], and results are applied only if their
//! ticket is still the newest one. A slow "pika" response arriving after the
//! "pikachu" response is therefore dropped.

use crate::error::Result;
use crate::lookup::{CardMatch, CardSearch};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Queries shorter than this (after trimming) never hit the network.
pub const MIN_QUERY_CHARS: usize = 2;

static PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.,/#!$%^&*;:{}=\-_`~()]").expect("punctuation pattern"));
static RUNS_OF_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").expect("space pattern"));

/// Turns raw search box text into the API search term, or `None` when the
/// input is too short to search.
pub fn clean_search_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.chars().count() < MIN_QUERY_CHARS {
        return None;
    }
    let stripped = PUNCTUATION.replace_all(trimmed, "");
    Some(RUNS_OF_SPACE.replace_all(&stripped, " ").into_owned())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTicket(u64);

/// Monotonic request-id counter. Shared between in-flight requests.
#[derive(Debug, Default)]
pub struct SearchSession {
    latest: AtomicU64,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new request; every older ticket becomes stale.
    pub fn begin(&self) -> SearchTicket {
        SearchTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: SearchTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Passes results through only for the newest ticket.
    pub fn complete(&self, ticket: SearchTicket, results: Vec<CardMatch>) -> Option<Vec<CardMatch>> {
        if self.is_current(ticket) {
            Some(results)
        } else {
            debug!(
                "ignoring results for search #{}, latest is #{}",
                ticket.0,
                self.latest.load(Ordering::SeqCst)
            );
            None
        }
    }

    /// Issues a ticket, cleans the text and searches.
    ///
    /// Short input still consumes a ticket so that it supersedes any request
    /// already in flight.
    pub fn run<C: CardSearch + ?Sized>(
        &self,
        search: &mut C,
        raw: &str,
        limit: usize,
    ) -> Result<Option<Vec<CardMatch>>> {
        let ticket = self.begin();
        let Some(text) = clean_search_text(raw) else {
            return Ok(Some(Vec::new()));
        };
        let results = search.search(&text, limit)?;
        Ok(self.complete(ticket, results))
    }
}

/// Trailing-edge debounce over caller-supplied instants.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<(String, Instant)>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Records new input, restarting the quiet period.
    pub fn input(&mut self, text: impl Into<String>, now: Instant) {
        self.pending = Some((text.into(), now));
    }

    /// Returns the pending text once it has been quiet for the full delay.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match &self.pending {
            Some((_, at)) if now.duration_since(*at) >= self.delay => {
                self.pending.take().map(|(text, _)| text)
            }
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
