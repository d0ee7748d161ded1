//! Remote suggest response decoding.
//!
//! Responses follow the OpenSearch suggestions format with the Google
//! extension for result types:
//!
//! ```text
//! [ "query", ["cand1", "cand2"], ["desc1", "desc2"], ["url1", "url2"],
//!   { "google:suggesttype": ["QUERY", "NAVIGATION"] } ]
//! ```
//!
//! Only the echoed query and the candidate list are required. Candidates typed
//! `NAVIGATION` are URLs and need a site name in the description list.

use encoding_rs::Encoding;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::{Result, SuggestError};
use crate::input::fixup_url;

const SUGGEST_TYPE_KEY: &str = "google:suggesttype";
const NAVIGATION_TYPE: &str = "NAVIGATION";

/// Raw result of one suggest fetch, as reported by the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchResponse {
    /// The request completed at the transport level.
    pub success: bool,
    pub status: u16,
    pub body: Vec<u8>,
    /// Charset declared by the server, e.g. from `Content-Type`.
    pub charset: Option<String>,
}

impl FetchResponse {
    /// Successful 200 response with a UTF-8 body.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            success: true,
            status: 200,
            body: body.into(),
            charset: None,
        }
    }

    /// Transport-level failure.
    pub fn failed() -> Self {
        Self::default()
    }
}

/// A suggestion that is a destination rather than a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationResult {
    pub url: Url,
    pub site_name: String,
}

/// Parsed results from one engine's suggest service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestResults {
    /// Query suggestions in server rank order.
    pub suggestions: Vec<String>,
    /// Navigation suggestions in server rank order.
    pub navigation: Vec<NavigationResult>,
}

impl SuggestResults {
    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty() && self.navigation.is_empty()
    }
}

/// Decode a fetch into results for `input_text`, keeping at most `max_per_kind`
/// suggestions and navigation results.
pub fn parse_fetch(
    response: &FetchResponse,
    input_text: &str,
    max_per_kind: usize,
) -> Result<SuggestResults> {
    if !response.success {
        return Err(SuggestError::Transport("fetch failed".to_string()));
    }
    if response.status != 200 {
        return Err(SuggestError::Transport(format!(
            "unexpected status {}",
            response.status
        )));
    }
    let text = decode_body(&response.body, response.charset.as_deref());
    parse_suggest_json(&text, input_text, max_per_kind)
}

/// Decode `body` as UTF-8, or with the declared charset when one is given.
///
/// A charset that is unknown or fails to decode cleanly falls back to the
/// bytes as UTF-8.
pub fn decode_body(body: &[u8], charset: Option<&str>) -> String {
    if let Some(label) = charset {
        match Encoding::for_label(label.trim().as_bytes()) {
            Some(encoding) => {
                if let Some(decoded) =
                    encoding.decode_without_bom_handling_and_without_replacement(body)
                {
                    return decoded.into_owned();
                }
                warn!(charset = %label, "Suggest body failed to decode, using raw bytes");
            }
            None => debug!(charset = %label, "Unknown charset label, using raw bytes"),
        }
    }
    String::from_utf8_lossy(body).into_owned()
}

/// Parse a suggest JSON document.
///
/// Trailing commas are tolerated. The document is rejected when it is not an
/// array, echoes a different query, lacks the candidate list, or has a
/// non-string candidate.
pub fn parse_suggest_json(
    text: &str,
    input_text: &str,
    max_per_kind: usize,
) -> Result<SuggestResults> {
    let root: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(strict) => json5::from_str(text)
            .map_err(|_| SuggestError::Parse(format!("invalid JSON: {}", strict)))?,
    };

    let list = root
        .as_array()
        .ok_or_else(|| SuggestError::Parse("root is not an array".to_string()))?;
    if list.len() < 2 {
        return Err(SuggestError::Parse("array too short".to_string()));
    }
    match list[0].as_str() {
        Some(echoed) if echoed == input_text => {}
        _ => return Err(SuggestError::Parse("echoed query mismatch".to_string())),
    }
    let candidates = list[1]
        .as_array()
        .ok_or_else(|| SuggestError::Parse("candidates are not an array".to_string()))?;

    let descriptions = list.get(2).and_then(Value::as_array);
    let types = list
        .get(4)
        .and_then(Value::as_object)
        .and_then(|extras| extras.get(SUGGEST_TYPE_KEY))
        .and_then(Value::as_array);

    let mut results = SuggestResults::default();
    for (index, candidate) in candidates.iter().enumerate() {
        let candidate = candidate
            .as_str()
            .ok_or_else(|| SuggestError::Parse(format!("candidate {} is not a string", index)))?;
        if candidate.is_empty() {
            continue;
        }

        let is_navigation = types
            .and_then(|t| t.get(index))
            .and_then(Value::as_str)
            .is_some_and(|t| t == NAVIGATION_TYPE);

        if is_navigation {
            if results.navigation.len() >= max_per_kind {
                continue;
            }
            let site_name = descriptions
                .and_then(|d| d.get(index))
                .and_then(Value::as_str)
                .filter(|name| !name.is_empty());
            let Some(site_name) = site_name else {
                debug!(index, "Navigation suggestion without site name dropped");
                continue;
            };
            match fixup_url(candidate) {
                Some(url) => results.navigation.push(NavigationResult {
                    url,
                    site_name: site_name.to_string(),
                }),
                None => debug!(index, candidate, "Invalid navigation URL dropped"),
            }
        } else if results.suggestions.len() < max_per_kind {
            results.suggestions.push(candidate.to_string());
        }
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_suggestions() {
        let results = parse_suggest_json(r#"["you", ["youtube", "you tube"]]"#, "you", 3).unwrap();
        assert_eq!(results.suggestions, vec!["youtube", "you tube"]);
        assert!(results.navigation.is_empty());
    }

    #[test]
    fn test_parse_navigation() {
        let json = r#"["you", ["yahoo"], ["Yahoo"], [], {"google:suggesttype": ["NAVIGATION"]}]"#;
        let results = parse_suggest_json(json, "you", 3).unwrap();
        assert!(results.suggestions.is_empty());
        assert_eq!(results.navigation.len(), 1);
        assert_eq!(results.navigation[0].site_name, "Yahoo");
        assert_eq!(results.navigation[0].url.as_str(), "http://yahoo/");
    }

    #[test]
    fn test_navigation_without_site_name_dropped() {
        let json = r#"["y", ["yahoo.com"], [""], [], {"google:suggesttype": ["NAVIGATION"]}]"#;
        let results = parse_suggest_json(json, "y", 3).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_invalid_navigation_url_dropped_not_whole_response() {
        let json = r#"["y", ["bad url", "yes"], ["Bad", ""], [],
            {"google:suggesttype": ["NAVIGATION", "QUERY"]}]"#;
        let results = parse_suggest_json(json, "y", 3).unwrap();
        assert!(results.navigation.is_empty());
        assert_eq!(results.suggestions, vec!["yes"]);
    }

    #[test]
    fn test_rejects_mismatched_echo() {
        let err = parse_suggest_json(r#"["yo", ["youtube"]]"#, "you", 3).unwrap_err();
        assert!(matches!(err, SuggestError::Parse(_)));
    }

    #[test]
    fn test_rejects_bad_shapes() {
        for json in [
            r#"{"q": "you"}"#,
            r#"["you"]"#,
            r#"["you", "youtube"]"#,
            r#"[1, ["youtube"]]"#,
            r#"["you", ["youtube", 5]]"#,
            "not json",
        ] {
            assert!(parse_suggest_json(json, "you", 3).is_err(), "{}", json);
        }
    }

    #[test]
    fn test_empty_candidates_skipped_and_capped() {
        let json = r#"["a", ["", "a1", "a2", "a3", "a4"]]"#;
        let results = parse_suggest_json(json, "a", 3).unwrap();
        assert_eq!(results.suggestions, vec!["a1", "a2", "a3"]);
    }

    #[test]
    fn test_trailing_comma_tolerated() {
        let results = parse_suggest_json(r#"["a", ["ab", "ac",],]"#, "a", 3).unwrap();
        assert_eq!(results.suggestions, vec!["ab", "ac"]);
    }

    #[test]
    fn test_parse_fetch_status_checks() {
        let body = r#"["a", ["ab"]]"#;
        assert!(parse_fetch(&FetchResponse::failed(), "a", 3).is_err());
        let not_found = FetchResponse {
            status: 404,
            ..FetchResponse::ok(body)
        };
        assert!(parse_fetch(&not_found, "a", 3).is_err());
        assert_eq!(
            parse_fetch(&FetchResponse::ok(body), "a", 3)
                .unwrap()
                .suggestions,
            vec!["ab"]
        );
    }

    #[test]
    fn test_decode_declared_charset() {
        // "café" in ISO-8859-1
        let body = [b'c', b'a', b'f', 0xE9];
        assert_eq!(decode_body(&body, Some("iso-8859-1")), "café");
    }

    #[test]
    fn test_decode_failure_falls_back_to_raw_bytes() {
        let body = [b'o', b'k', 0xFF];
        let decoded = decode_body(&body, Some("utf-8"));
        assert!(decoded.starts_with("ok"));
        assert_eq!(decode_body(b"plain", Some("x-no-such-charset")), "plain");
    }
}
