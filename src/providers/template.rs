//! Search URL templates.
//!
//! Templates use OpenSearch-style placeholders:
//!
//! - `{searchTerms}`: the form-encoded query (required for replacement)
//! - `{google:acceptedSuggestion}`: `aq=<index>&`, `aq=f&` or nothing
//! - `{google:originalQueryForSuggestion}`: `oq=<typed text>&` when a
//!   suggestion was accepted
//!
//! ```
//! use omnisuggest::providers::template::{substitute, AcceptedSuggestion};
//!
//! let url = substitute(
//!     "https://search.example/?{google:acceptedSuggestion}q={searchTerms}",
//!     "you tube",
//!     AcceptedSuggestion::Accepted(1),
//!     "you",
//! )
//! .unwrap();
//! assert_eq!(url.as_str(), "https://search.example/?aq=1&q=you+tube");
//! ```

use serde::Serialize;
use url::{form_urlencoded, Url};

use crate::error::{Result, SuggestError};

const SEARCH_TERMS: &str = "{searchTerms}";
const ACCEPTED_SUGGESTION: &str = "{google:acceptedSuggestion}";
const ORIGINAL_QUERY: &str = "{google:originalQueryForSuggestion}";

/// Which suggestion, if any, produced the navigation. Used for click tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "index")]
pub enum AcceptedSuggestion {
    /// The suggest service returned nothing for this provider.
    NoSuggestionsAvailable,
    /// Suggestions were shown but the user went with something else.
    NoSuggestionChosen,
    /// The suggestion at this rank was accepted.
    Accepted(usize),
}

/// Whether `template` can have search terms substituted into it.
pub fn supports_replacement(template: &str) -> bool {
    template.contains(SEARCH_TERMS)
}

/// Substitute `query` into `template`, producing a navigable URL.
pub fn substitute(
    template: &str,
    query: &str,
    accepted: AcceptedSuggestion,
    original_input: &str,
) -> Result<Url> {
    if !supports_replacement(template) {
        return Err(SuggestError::Provider(format!(
            "template has no {} placeholder: {}",
            SEARCH_TERMS, template
        )));
    }

    let accepted_param = match accepted {
        AcceptedSuggestion::NoSuggestionsAvailable => String::new(),
        AcceptedSuggestion::NoSuggestionChosen => "aq=f&".to_string(),
        AcceptedSuggestion::Accepted(index) => format!("aq={}&", index),
    };
    let original_param = match accepted {
        AcceptedSuggestion::Accepted(_) if !original_input.is_empty() => {
            format!("oq={}&", encode(original_input))
        }
        _ => String::new(),
    };

    let expanded = template
        .replace(ACCEPTED_SUGGESTION, &accepted_param)
        .replace(ORIGINAL_QUERY, &original_param)
        .replace(SEARCH_TERMS, &encode(query));

    Url::parse(&expanded)
        .map_err(|e| SuggestError::Provider(format!("invalid expanded URL '{}': {}", expanded, e)))
}

fn encode(text: &str) -> String {
    form_urlencoded::byte_serialize(text.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supports_replacement() {
        assert!(supports_replacement("https://a.example/?q={searchTerms}"));
        assert!(!supports_replacement("https://a.example/"));
    }

    #[test]
    fn test_substitute_encodes_terms() {
        let url = substitute(
            "https://a.example/search?q={searchTerms}",
            "rust & tokio",
            AcceptedSuggestion::NoSuggestionsAvailable,
            "",
        )
        .unwrap();
        assert_eq!(url.as_str(), "https://a.example/search?q=rust+%26+tokio");
    }

    #[test]
    fn test_substitute_marks_no_suggestion_chosen() {
        let url = substitute(
            "https://a.example/?{google:acceptedSuggestion}q={searchTerms}",
            "you",
            AcceptedSuggestion::NoSuggestionChosen,
            "you",
        )
        .unwrap();
        assert_eq!(url.as_str(), "https://a.example/?aq=f&q=you");
    }

    #[test]
    fn test_substitute_original_query_only_when_accepted() {
        let template =
            "https://a.example/?{google:originalQueryForSuggestion}{google:acceptedSuggestion}q={searchTerms}";
        let accepted =
            substitute(template, "youtube", AcceptedSuggestion::Accepted(0), "you").unwrap();
        assert_eq!(accepted.as_str(), "https://a.example/?oq=you&aq=0&q=youtube");

        let none = substitute(
            template,
            "youtube",
            AcceptedSuggestion::NoSuggestionsAvailable,
            "you",
        )
        .unwrap();
        assert_eq!(none.as_str(), "https://a.example/?q=youtube");
    }

    #[test]
    fn test_substitute_rejects_template_without_terms() {
        let err = substitute(
            "https://a.example/",
            "x",
            AcceptedSuggestion::NoSuggestionsAvailable,
            "",
        )
        .unwrap_err();
        assert!(matches!(err, SuggestError::Provider(_)));
    }
}
