//! Merge, rank, dedupe and truncate.
//!
//! Aggregation is re-run from scratch over whatever result sets are available
//! each time a source reports in. Candidates are folded into a keyed map in a
//! fixed order:
//!
//! 1. what-you-typed (default engine)
//! 2. keyword history, then default history
//! 3. keyword suggestions, then default suggestions
//!
//! The map is keyed by lower-cased query text. A later candidate replaces an
//! earlier one only with a strictly higher relevance, so exact ties go to the
//! earlier insertion. Navigation matches are appended afterwards and never
//! deduplicated against queries.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::providers::{AcceptedSuggestion, ProviderSlot, SlotPair};
use crate::sources::{BookmarkStore, HistoryResult};

use super::matches::{Match, MatchBuilder, MatchType};
use super::relevance;
use super::response::SuggestResults;

/// Results accumulated for the current query, per provider slot.
#[derive(Debug, Clone, Default)]
pub struct ResultSets {
    pub history: SlotPair<Vec<HistoryResult>>,
    pub suggest: SlotPair<SuggestResults>,
}

impl ResultSets {
    pub fn clear_history(&mut self) {
        self.history.keyword.clear();
        self.history.default.clear();
    }

    pub fn clear_suggest(&mut self) {
        self.suggest = SlotPair::default();
    }
}

/// Query matches keyed by lower-cased contents, in insertion order.
#[derive(Debug, Default)]
struct MatchMap {
    matches: Vec<Match>,
    index: HashMap<String, usize>,
}

impl MatchMap {
    fn insert(&mut self, candidate: Match) {
        let key = candidate.contents.to_lowercase();
        match self.index.get(&key) {
            Some(&i) => {
                if candidate.relevance > self.matches[i].relevance {
                    self.matches[i] = candidate;
                }
            }
            None => {
                self.index.insert(key, self.matches.len());
                self.matches.push(candidate);
            }
        }
    }
}

/// Accepted-suggestion marker for non-suggestion matches attributed to `slot`.
fn unaccepted_marker(results: &ResultSets, slot: ProviderSlot) -> AcceptedSuggestion {
    if results.suggest[slot].suggestions.is_empty() {
        AcceptedSuggestion::NoSuggestionsAvailable
    } else {
        AcceptedSuggestion::NoSuggestionChosen
    }
}

/// Build the ordered match list for the current query.
///
/// Returns at most `max_matches + 1` matches sorted by descending relevance,
/// with equal scores kept in insertion order.
pub fn aggregate(
    builder: &MatchBuilder<'_>,
    results: &ResultSets,
    max_matches: usize,
    now: DateTime<Utc>,
    bookmarks: &dyn BookmarkStore,
) -> Vec<Match> {
    let providers = builder.providers;
    let input_type = builder.input.input_type();
    let mut map = MatchMap::default();

    if providers.has(ProviderSlot::Default) {
        let relevance =
            relevance::for_what_you_typed(input_type, providers.has(ProviderSlot::Keyword));
        if let Some(m) = builder.query_match(
            builder.input.text(),
            relevance,
            MatchType::SearchWhatYouTyped,
            unaccepted_marker(results, ProviderSlot::Default),
            ProviderSlot::Default,
        ) {
            map.insert(m);
        }
    }

    for slot in ProviderSlot::ALL {
        let is_primary = providers.is_primary(slot);
        let marker = unaccepted_marker(results, slot);
        for entry in &results.history[slot] {
            let relevance = relevance::for_history_at(entry.last_used, now, is_primary, input_type);
            if let Some(m) =
                builder.query_match(&entry.term, relevance, MatchType::SearchHistory, marker, slot)
            {
                map.insert(m);
            }
        }
    }

    for slot in ProviderSlot::ALL {
        let is_primary = providers.is_primary(slot);
        let suggestions = &results.suggest[slot].suggestions;
        for (rank, suggestion) in suggestions.iter().enumerate() {
            let relevance =
                relevance::for_suggestion(suggestions.len(), rank, is_primary, input_type);
            if let Some(m) = builder.query_match(
                suggestion,
                relevance,
                MatchType::SearchSuggest,
                AcceptedSuggestion::Accepted(rank),
                slot,
            ) {
                map.insert(m);
            }
        }
    }

    let mut matches = map.matches;

    for slot in ProviderSlot::ALL {
        let navigation = &results.suggest[slot].navigation;
        if let (Some(first), true) = (navigation.first(), providers.has(slot)) {
            let relevance =
                relevance::for_navigation(navigation.len(), 0, providers.is_primary(slot));
            matches.push(builder.navigation_match(first, relevance, slot));
        }
    }

    matches.sort_by(|a, b| b.relevance.cmp(&a.relevance));
    let candidates = matches.len();
    matches.truncate(max_matches.saturating_add(1));

    for m in &mut matches {
        m.starred = bookmarks.is_bookmarked(&m.destination_url);
    }

    debug!(
        candidates,
        kept = matches.len(),
        top = matches.first().map(|m| m.relevance),
        "Aggregated matches"
    );
    matches
}
