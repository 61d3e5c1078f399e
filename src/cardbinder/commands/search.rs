use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::lookup::CardSearch;
use crate::search::{clean_search_text, SearchSession, MIN_QUERY_CHARS};
use log::warn;

/// Runs one interactive search. Results from a superseded request are
/// dropped; a failed request is reported, not propagated.
pub fn run<C: CardSearch + ?Sized>(
    session: &SearchSession,
    search: &mut C,
    query: &str,
    limit: usize,
) -> Result<CmdResult> {
    if clean_search_text(query).is_none() {
        session.begin();
        return Ok(CmdResult::default().with_message(CmdMessage::info(format!(
            "Type at least {} characters to search",
            MIN_QUERY_CHARS
        ))));
    }

    match session.run(search, query, limit) {
        Ok(Some(matches)) if matches.is_empty() => {
            Ok(CmdResult::default().with_message(CmdMessage::info("No cards found")))
        }
        Ok(Some(matches)) => Ok(CmdResult::default().with_matches(matches)),
        Ok(None) => Ok(CmdResult::default()),
        Err(e) => {
            warn!("search for {:?} failed: {}", query, e);
            Ok(CmdResult::default()
                .with_message(CmdMessage::error("Error searching cards. Please try again.")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;
    use crate::lookup::fixtures::{card_match, ScriptedSearch};

    #[test]
    fn returns_matches() {
        let session = SearchSession::new();
        let mut search = ScriptedSearch::new().with_results(vec![
            card_match("Pikachu", "Base", "58"),
            card_match("Pikachu", "Jungle", "60"),
        ]);
        let result = run(&session, &mut search, "pikachu", 1).unwrap();
        assert_eq!(result.matches.len(), 1);
        assert!(result.messages.is_empty());
    }

    #[test]
    fn short_query_and_no_results() {
        let session = SearchSession::new();
        let mut search = ScriptedSearch::new();
        let result = run(&session, &mut search, " p ", 20).unwrap();
        assert_eq!(result.messages[0].content, "Type at least 2 characters to search");
        assert!(search.queries.is_empty());

        let result = run(&session, &mut search, "zzz", 20).unwrap();
        assert_eq!(result.messages[0].content, "No cards found");
        assert_eq!(result.messages[0].level, MessageLevel::Info);
    }
}
