//! # Remote Card Lookup
//!
//! The binder treats the card database as an opaque collaborator behind the
//! [`CardSearch`] trait. [`TcgApiSearch`] talks to the public Pokémon TCG API;
//! tests use scripted fakes.
//!
//! Bulk import rarely has an exact name/set/number match, so
//! [`cascade_lookup`] relaxes the query step by step:
//!
//! 1. name + set + number
//! 2. name + simplified set + number (only if simplifying changed the set)
//! 3. name + number
//! 4. name + set
//! 5. name alone
//!
//! The first hit wins. A failed request counts as a miss for that step. Steps
//! that render the same query back to back (no number) are sent once.

use crate::error::{BinderError, Result};
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::thread;
use std::time::Duration;

static POKEMON_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)pokemon").expect("pokemon pattern"));
static SET_NOISE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)base set|set|edition").expect("set noise pattern"));
static SHADOWLESS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)shadowless").expect("shadowless pattern"));

/// One structured query against the card database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardQuery {
    pub name: String,
    pub set_name: Option<String>,
    pub number: Option<String>,
}

impl CardQuery {
    pub fn name(name: &str) -> Self {
        Self {
            name: name.to_string(),
            set_name: None,
            number: None,
        }
    }

    pub fn set(mut self, set_name: &str) -> Self {
        self.set_name = Some(set_name.to_string());
        self
    }

    pub fn number(mut self, number: &str) -> Self {
        self.number = Some(number.to_string());
        self
    }

    /// Query-language rendering: `name:"…" set.name:"…" number:"…"`.
    pub fn render(&self) -> String {
        let mut query = format!("name:\"{}\"", self.name);
        if let Some(set) = &self.set_name {
            query.push_str(&format!(" set.name:\"{}\"", set));
        }
        if let Some(number) = &self.number {
            query.push_str(&format!(" number:\"{}\"", number));
        }
        query
    }
}

/// Card metadata returned by a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardMatch {
    pub image_url: String,
    pub name: String,
    pub set_name: String,
    pub card_number: String,
}

pub trait CardSearch {
    /// Best single match for a structured query, `None` on a miss.
    fn find_first(&mut self, query: &CardQuery) -> Result<Option<CardMatch>>;

    /// Free-text name search for the interactive search box.
    fn search(&mut self, text: &str, limit: usize) -> Result<Vec<CardMatch>>;
}

/// The ordered list of progressively looser queries for one card.
pub fn relaxation_queries(card_name: &str, set_name: &str, card_number: &str) -> Vec<CardQuery> {
    let name = card_name.replace('#', "").trim().to_string();
    let set = POKEMON_WORD.replace_all(set_name, "").trim().to_string();
    let number = card_number.trim();
    let has_set = !set.is_empty();
    let has_number = !number.is_empty();

    let with_number = |q: CardQuery| if has_number { q.number(number) } else { q };

    let mut queries = vec![with_number(CardQuery::name(&name).set(&set))];

    if has_set {
        let simplified = simplify_set_name(&set);
        if simplified != set {
            queries.push(with_number(CardQuery::name(&name).set(&simplified)));
        }
    }
    if has_number {
        queries.push(CardQuery::name(&name).number(number));
    }
    if has_set {
        queries.push(CardQuery::name(&name).set(&set));
    }
    queries.push(CardQuery::name(&name));
    queries.dedup();
    queries
}

/// Drops edition noise ("Base Set", "Set", "Edition", "Shadowless") from a set name.
pub fn simplify_set_name(set: &str) -> String {
    let without_noise = SET_NOISE.replace(set, "");
    SHADOWLESS.replace(&without_noise, "").trim().to_string()
}

/// Runs the relaxation cascade, returning the first hit.
pub fn cascade_lookup<C: CardSearch + ?Sized>(
    search: &mut C,
    card_name: &str,
    set_name: &str,
    card_number: &str,
) -> Option<CardMatch> {
    for query in relaxation_queries(card_name, set_name, card_number) {
        match search.find_first(&query) {
            Ok(Some(found)) => {
                info!(
                    "matched {} ({}) -> {} via {}",
                    card_name,
                    set_name,
                    found.name,
                    query.render()
                );
                return Some(found);
            }
            Ok(None) => debug!("no match for {}", query.render()),
            Err(e) => warn!("lookup failed for {}: {}", query.render(), e),
        }
    }
    None
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    data: Vec<ApiCard>,
}

#[derive(Debug, Deserialize)]
struct ApiCard {
    name: String,
    #[serde(default)]
    number: String,
    #[serde(default)]
    set: Option<ApiSet>,
    #[serde(default)]
    images: ApiImages,
}

#[derive(Debug, Deserialize)]
struct ApiSet {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct ApiImages {
    small: Option<String>,
    large: Option<String>,
}

impl ApiCard {
    fn into_match(self) -> Option<CardMatch> {
        let image_url = self.images.large.or(self.images.small)?;
        Some(CardMatch {
            image_url,
            name: self.name,
            set_name: self.set.map(|s| s.name).unwrap_or_default(),
            card_number: self.number,
        })
    }
}

/// Pokémon TCG API client (blocking). Sleeps `delay` before every request to
/// stay under the public rate limit.
pub struct TcgApiSearch {
    client: reqwest::blocking::Client,
    base_url: String,
    delay: Duration,
}

impl TcgApiSearch {
    pub fn new(base_url: impl Into<String>, delay: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .map_err(|e| BinderError::Lookup(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            delay,
        })
    }

    fn request(&self, q: &str, page_size: usize) -> Result<Vec<CardMatch>> {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        debug!("GET {} q={} pageSize={}", self.base_url, q, page_size);
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("q", q), ("pageSize", &page_size.to_string())])
            .send()
            .map_err(|e| BinderError::Lookup(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BinderError::Lookup(format!(
                "search for {} failed with status {}",
                q,
                response.status()
            )));
        }

        let body: ApiResponse = response
            .json()
            .map_err(|e| BinderError::Lookup(e.to_string()))?;
        Ok(body.data.into_iter().filter_map(ApiCard::into_match).collect())
    }
}

impl CardSearch for TcgApiSearch {
    fn find_first(&mut self, query: &CardQuery) -> Result<Option<CardMatch>> {
        Ok(self.request(&query.render(), 1)?.into_iter().next())
    }

    fn search(&mut self, text: &str, limit: usize) -> Result<Vec<CardMatch>> {
        self.request(&format!("name:*{}*", text), limit)
    }
}

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use std::collections::HashMap;

    /// Fake search answering rendered queries from a table and recording
    /// every query it receives.
    #[derive(Default)]
    pub struct ScriptedSearch {
        pub answers: HashMap<String, CardMatch>,
        pub failing: Vec<String>,
        pub results: Vec<CardMatch>,
        pub queries: Vec<String>,
    }

    impl ScriptedSearch {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn answer(mut self, query: &CardQuery, found: CardMatch) -> Self {
            self.answers.insert(query.render(), found);
            self
        }

        pub fn fail(mut self, query: &CardQuery) -> Self {
            self.failing.push(query.render());
            self
        }

        pub fn with_results(mut self, results: Vec<CardMatch>) -> Self {
            self.results = results;
            self
        }
    }

    pub fn card_match(name: &str, set: &str, number: &str) -> CardMatch {
        CardMatch {
            image_url: format!("https://images.example/{}_{}.png", set.replace(' ', ""), number),
            name: name.to_string(),
            set_name: set.to_string(),
            card_number: number.to_string(),
        }
    }

    impl CardSearch for ScriptedSearch {
        fn find_first(&mut self, query: &CardQuery) -> Result<Option<CardMatch>> {
            let rendered = query.render();
            self.queries.push(rendered.clone());
            if self.failing.contains(&rendered) {
                return Err(BinderError::Lookup("scripted failure".into()));
            }
            Ok(self.answers.get(&rendered).cloned())
        }

        fn search(&mut self, text: &str, limit: usize) -> Result<Vec<CardMatch>> {
            self.queries.push(format!("name:*{}*", text));
            Ok(self.results.iter().take(limit).cloned().collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{card_match, ScriptedSearch};
    use super::*;

    fn rendered(queries: &[CardQuery]) -> Vec<String> {
        queries.iter().map(CardQuery::render).collect()
    }

    #[test]
    fn full_cascade_for_name_set_and_number() {
        let queries = relaxation_queries("Charizard", "Pokemon Base Set Shadowless", "4");
        assert_eq!(
            rendered(&queries),
            vec![
                r#"name:"Charizard" set.name:"Base Set Shadowless" number:"4""#,
                r#"name:"Charizard" set.name:"" number:"4""#,
                r#"name:"Charizard" number:"4""#,
                r#"name:"Charizard" set.name:"Base Set Shadowless""#,
                r#"name:"Charizard""#,
            ]
        );
    }

    #[test]
    fn simplified_step_skipped_when_nothing_changes() {
        let queries = relaxation_queries("Pikachu #58", "Pokemon Jungle", "");
        assert_eq!(
            rendered(&queries),
            vec![
                r#"name:"Pikachu 58" set.name:"Jungle""#,
                r#"name:"Pikachu 58""#,
            ]
        );
    }

    #[test]
    fn set_only_query_is_not_repeated_without_number() {
        let queries = relaxation_queries("Onix", "Pokemon Base Set", "");
        assert_eq!(
            rendered(&queries),
            vec![
                r#"name:"Onix" set.name:"Base Set""#,
                r#"name:"Onix" set.name:"""#,
                r#"name:"Onix" set.name:"Base Set""#,
                r#"name:"Onix""#,
            ]
        );
    }

    #[test]
    fn simplify_removes_first_noise_word_and_shadowless() {
        assert_eq!(simplify_set_name("Base Set Shadowless"), "");
        assert_eq!(simplify_set_name("Base Set 2"), "2");
        assert_eq!(simplify_set_name("Team Rocket 1st Edition"), "Team Rocket 1st");
        assert_eq!(simplify_set_name("Fossil"), "Fossil");
    }

    #[test]
    fn cascade_returns_first_hit() {
        let hit = card_match("Charizard", "Base", "4");
        let mut search = ScriptedSearch::new()
            .answer(&CardQuery::name("Charizard").number("4"), hit.clone())
            .answer(&CardQuery::name("Charizard"), card_match("Charizard", "Other", "1"));

        let found = cascade_lookup(&mut search, "Charizard", "Base Set", "4");
        assert_eq!(found, Some(hit));
        assert_eq!(search.queries.len(), 3);
    }

    #[test]
    fn failed_requests_count_as_misses() {
        let hit = card_match("Mew", "Promo", "8");
        let first = CardQuery::name("Mew").set("Promo").number("8");
        let mut search = ScriptedSearch::new()
            .fail(&first)
            .answer(&CardQuery::name("Mew").number("8"), hit.clone());

        assert_eq!(cascade_lookup(&mut search, "Mew", "Promo", "8"), Some(hit));
    }

    #[test]
    fn total_miss_is_none() {
        let mut search = ScriptedSearch::new();
        assert_eq!(cascade_lookup(&mut search, "Missingno", "Glitch", ""), None);
        assert_eq!(search.queries.len(), 2);
        assert_eq!(search.queries.last().unwrap(), r#"name:"Missingno""#);
    }

    #[test]
    fn api_card_prefers_large_image() {
        let json = r#"{"data": [
            {"name": "Pikachu", "number": "58", "set": {"name": "Base"},
             "images": {"small": "s.png", "large": "l.png"}},
            {"name": "NoImage", "number": "1"}
        ]}"#;
        let body: ApiResponse = serde_json::from_str(json).unwrap();
        let matches: Vec<CardMatch> = body.data.into_iter().filter_map(ApiCard::into_match).collect();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].image_url, "l.png");
        assert_eq!(matches[0].set_name, "Base");
    }
}
