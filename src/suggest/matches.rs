//! Presentable match records and the builder that produces them.

use std::ops::BitOr;

use serde::Serialize;
use tracing::warn;
use url::Url;

use crate::input::{fixup_url, format_url_for_display, has_http_scheme, InputSnapshot};
use crate::providers::{AcceptedSuggestion, ProviderDescriptor, ProviderSlot, Providers};

use super::response::NavigationResult;

/// Contents shown for the bare `?` placeholder.
pub const EMPTY_KEYWORD_VALUE: &str = "<Enter query>";

/// Description for a search on `engine`.
pub fn search_description(engine: &str) -> String {
    format!("Search {}", engine)
}

/// Text style bits for a highlighted span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Style(u8);

impl Style {
    pub const NONE: Style = Style(0);
    /// Rendered as a URL.
    pub const URL: Style = Style(1 << 0);
    /// Emphasized (bold).
    pub const MATCH: Style = Style(1 << 1);
    /// De-emphasized.
    pub const DIM: Style = Style(1 << 2);

    pub fn contains(self, other: Style) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Style {
    type Output = Style;

    fn bitor(self, rhs: Style) -> Style {
        Style(self.0 | rhs.0)
    }
}

/// A style that applies from `offset` (a byte offset) to the next span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub offset: usize,
    pub style: Style,
}

impl Span {
    pub fn new(offset: usize, style: Style) -> Self {
        Self { offset, style }
    }
}

/// Where a match came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// Search for exactly what was typed.
    SearchWhatYouTyped,
    /// A past search term.
    SearchHistory,
    /// A remote query suggestion.
    SearchSuggest,
    /// A remote suggestion that is a URL.
    NavSuggest,
}

/// How navigating to the match should be recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// Produced through an explicitly invoked keyword engine.
    Keyword,
    /// Produced automatically rather than typed.
    Generated,
}

/// One ranked autocomplete entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    pub relevance: u32,
    #[serde(rename = "type")]
    pub kind: MatchType,
    pub contents: String,
    pub contents_spans: Vec<Span>,
    pub description: String,
    pub description_spans: Vec<Span>,
    pub destination_url: String,
    /// Text placed in the edit field when the match is selected.
    pub fill_text: String,
    /// Byte offset in `fill_text` where inline completion starts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_autocomplete_offset: Option<usize>,
    pub is_keyword: bool,
    pub transition: Transition,
    pub starred: bool,
}

impl Match {
    /// Whether the match is derived from a remote suggest response.
    pub fn is_remote(&self) -> bool {
        matches!(self.kind, MatchType::SearchSuggest | MatchType::NavSuggest)
    }
}

/// Everything needed to turn scored candidates into matches for one query.
#[derive(Debug, Clone, Copy)]
pub struct MatchBuilder<'a> {
    pub input: &'a InputSnapshot,
    /// Input text with the engine keyword stripped.
    pub keyword_input_text: &'a str,
    pub providers: &'a Providers,
}

impl<'a> MatchBuilder<'a> {
    /// The text the user typed for `slot`'s engine.
    pub fn input_text(&self, slot: ProviderSlot) -> &'a str {
        match slot {
            ProviderSlot::Keyword => self.keyword_input_text,
            ProviderSlot::Default => self.input.text(),
        }
    }

    /// Build a query match; `None` when the slot has no engine or the
    /// destination URL cannot be produced.
    pub fn query_match(
        &self,
        query: &str,
        relevance: u32,
        kind: MatchType,
        accepted: AcceptedSuggestion,
        slot: ProviderSlot,
    ) -> Option<Match> {
        let provider = self.providers.get(slot)?;
        let input_text = self.input_text(slot);

        let (contents_spans, description, description_spans) = if query != input_text {
            (classify_suggestion(input_text, query), String::new(), Vec::new())
        } else {
            (
                vec![Span::new(0, Style::NONE)],
                search_description(&provider.short_name),
                vec![Span::new(0, Style::DIM)],
            )
        };

        let mut fill_text = String::new();
        if self.input.is_forced_query() {
            fill_text.push('?');
        }
        if slot.is_keyword() {
            fill_text.push_str(&provider.keyword);
            fill_text.push(' ');
        }
        let search_start = fill_text.len();
        fill_text.push_str(query);

        let inline_autocomplete_offset = (!self.input.prevent_inline_autocomplete()
            && fill_text[search_start..].starts_with(input_text))
        .then(|| search_start + input_text.len());

        let destination_url = match provider.search_url_for(query, accepted, input_text) {
            Ok(url) => url.to_string(),
            Err(e) => {
                warn!(provider = %provider.short_name, "Dropping match: {}", e);
                return None;
            }
        };

        Some(Match {
            relevance,
            kind,
            contents: query.to_string(),
            contents_spans,
            description,
            description_spans,
            destination_url,
            fill_text,
            inline_autocomplete_offset,
            is_keyword: slot.is_keyword(),
            transition: transition_for(slot),
            starred: false,
        })
    }

    /// Build a navigation match for a URL suggestion.
    pub fn navigation_match(
        &self,
        navigation: &NavigationResult,
        relevance: u32,
        slot: ProviderSlot,
    ) -> Match {
        let input_text = self.input_text(slot);
        let contents = format_url_for_display(&navigation.url, !has_http_scheme(input_text));
        let contents_spans = classify_match_in_string(input_text, &contents, Style::URL);
        let description_spans =
            classify_match_in_string(input_text, &navigation.site_name, Style::NONE);

        let mut fill_text = String::new();
        if self.input.is_forced_query() {
            fill_text.push('?');
        }
        fill_text.push_str(&equivalent_display_string(&navigation.url, &contents));

        Match {
            relevance,
            kind: MatchType::NavSuggest,
            contents,
            contents_spans,
            description: navigation.site_name.clone(),
            description_spans,
            destination_url: navigation.url.to_string(),
            fill_text,
            inline_autocomplete_offset: None,
            is_keyword: slot.is_keyword(),
            transition: transition_for(slot),
            starred: false,
        }
    }
}

/// Placeholder shown when only the `?` trigger has been typed.
pub fn placeholder_match(provider: &ProviderDescriptor) -> Match {
    Match {
        relevance: 0,
        kind: MatchType::SearchWhatYouTyped,
        contents: EMPTY_KEYWORD_VALUE.to_string(),
        contents_spans: vec![Span::new(0, Style::NONE)],
        description: search_description(&provider.short_name),
        description_spans: vec![Span::new(0, Style::DIM)],
        destination_url: String::new(),
        fill_text: "?".to_string(),
        inline_autocomplete_offset: None,
        is_keyword: false,
        transition: Transition::Generated,
        starred: false,
    }
}

fn transition_for(slot: ProviderSlot) -> Transition {
    if slot.is_keyword() {
        Transition::Keyword
    } else {
        Transition::Generated
    }
}

/// Highlight a query suggestion against the typed text.
///
/// The first occurrence of the typed text is dimmed since the user already
/// typed it; the rest stays plain. When the typed text does not occur at all
/// the suggestion is a correction and is emphasized as a whole. Only the first
/// occurrence is marked.
pub fn classify_suggestion(input_text: &str, suggestion: &str) -> Vec<Span> {
    let Some(position) = suggestion.find(input_text).filter(|_| !input_text.is_empty()) else {
        return vec![Span::new(0, Style::MATCH)];
    };

    let mut spans = Vec::with_capacity(3);
    if position != 0 {
        spans.push(Span::new(0, Style::NONE));
    }
    spans.push(Span::new(position, Style::DIM));
    let next = position + input_text.len();
    if next < suggestion.len() {
        spans.push(Span::new(next, Style::NONE));
    }
    spans
}

/// Mark the first ASCII-case-insensitive occurrence of `find` in `text` with
/// `style | MATCH`, everything else with `style`.
pub fn classify_match_in_string(find: &str, text: &str, style: Style) -> Vec<Span> {
    let location = if find.is_empty() {
        None
    } else {
        text.to_ascii_lowercase().find(&find.to_ascii_lowercase())
    };

    let mut spans = Vec::with_capacity(3);
    if location != Some(0) {
        spans.push(Span::new(0, style));
    }
    let Some(location) = location else {
        return spans;
    };
    spans.push(Span::new(location, style | Style::MATCH));
    let after = location + find.len();
    if after < text.len() {
        spans.push(Span::new(after, style));
    }
    spans
}

/// The display string if it still navigates to `url`, otherwise the full URL.
fn equivalent_display_string(url: &Url, display: &str) -> String {
    match fixup_url(display) {
        Some(fixed) if fixed == *url => display.to_string(),
        _ => url.to_string(),
    }
}
