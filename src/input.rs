//! Typed-input snapshots and classification.
//!
//! An [`InputSnapshot`] captures everything the engine needs to know about one
//! keystroke: the raw text, its classification, the URL components that matter
//! for privacy checks, and the per-query flags. Snapshots are immutable and are
//! replaced wholesale on every input change.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// Schemes that are treated as real URL schemes rather than `host:port` or
/// `word:` prefixes.
const KNOWN_SCHEMES: &[&str] = &[
    "http",
    "https",
    "ftp",
    "file",
    "about",
    "data",
    "javascript",
    "mailto",
    "chrome",
    "view-source",
];

static SCHEME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z][A-Za-z0-9+.\-]*):").expect("valid scheme regex"));

static HOST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(localhost|(\d{1,3}\.){3}\d{1,3}|([A-Za-z0-9\-]+\.)+[A-Za-z]{2,})(:\d*)?$")
        .expect("valid host regex")
});

/// Classification of typed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    /// Empty or otherwise unusable input.
    Invalid,
    /// Could be either a search or a navigation.
    Unknown,
    /// Almost certainly a URL the user asked for with ctrl+enter.
    RequestedUrl,
    /// Looks like a URL.
    Url,
    /// Looks like a search query.
    Query,
    /// Prefixed with `?`; the user explicitly asked for a search.
    ForcedQuery,
}

impl InputType {
    /// Whether the relevance model should treat this input as URL-shaped.
    pub fn is_url(self) -> bool {
        self == InputType::Url
    }
}

/// The URL components the suggest privacy rules care about.
///
/// Only presence is tracked: a component counts as present when the typed
/// text contains it with at least one character.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlParts {
    /// Lower-cased scheme when one was typed explicitly.
    pub scheme: Option<String>,
    pub has_username: bool,
    pub has_port: bool,
    pub has_path: bool,
    pub has_query: bool,
    pub has_ref: bool,
}

impl UrlParts {
    /// Split `text` into URL components without normalizing it.
    ///
    /// `url::Url` always materializes a `/` path for special schemes, which
    /// would hide whether the user actually typed one, so the raw text is
    /// segmented by hand.
    pub fn parse(text: &str) -> Self {
        let mut parts = UrlParts::default();
        let mut rest = text;

        if let Some(caps) = SCHEME_RE.captures(text) {
            let scheme = caps[1].to_ascii_lowercase();
            let after = &text[caps[0].len()..];
            let is_port = after.chars().next().is_some_and(|c| c.is_ascii_digit())
                && !KNOWN_SCHEMES.contains(&scheme.as_str());
            if !is_port {
                parts.scheme = Some(scheme);
                rest = after.trim_start_matches('/');
            }
        }

        let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
        let (authority, tail) = rest.split_at(authority_end);

        let host_port = match authority.rfind('@') {
            Some(at) => {
                let userinfo = &authority[..at];
                let username = userinfo.split(':').next().unwrap_or("");
                parts.has_username = !username.is_empty();
                &authority[at + 1..]
            }
            None => authority,
        };
        let host_port = match host_port.rfind(']') {
            Some(bracket) => &host_port[bracket + 1..],
            None => host_port,
        };
        if let Some(colon) = host_port.rfind(':') {
            parts.has_port = colon + 1 < host_port.len();
        }

        let path_end = tail.find(['?', '#']).unwrap_or(tail.len());
        parts.has_path = path_end > 0;

        let after_path = &tail[path_end..];
        let (query, fragment) = match after_path.find('#') {
            Some(hash) => (&after_path[..hash], &after_path[hash + 1..]),
            None => (after_path, ""),
        };
        parts.has_query = query.len() > 1;
        parts.has_ref = !fragment.is_empty();

        parts
    }
}

/// Immutable per-keystroke view of the typed input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSnapshot {
    text: String,
    input_type: InputType,
    parts: UrlParts,
    prevent_inline_autocomplete: bool,
    synchronous_only: bool,
}

impl Default for InputSnapshot {
    fn default() -> Self {
        Self {
            text: String::new(),
            input_type: InputType::Invalid,
            parts: UrlParts::default(),
            prevent_inline_autocomplete: false,
            synchronous_only: false,
        }
    }
}

impl InputSnapshot {
    /// Classify `raw` and build a snapshot with default flags.
    ///
    /// A leading `?` marks a forced query and is stripped from the text.
    pub fn new(raw: &str) -> Self {
        let (input_type, text) = classify(raw);
        let parts = UrlParts::parse(&text);
        Self {
            text,
            input_type,
            parts,
            ..Self::default()
        }
    }

    /// Override the classification (the caller may know better, e.g. ctrl+enter).
    pub fn with_type(mut self, input_type: InputType) -> Self {
        self.input_type = input_type;
        self
    }

    /// Suppress inline autocompletion for this keystroke (e.g. after a backspace).
    pub fn with_prevent_inline_autocomplete(mut self, prevent: bool) -> Self {
        self.prevent_inline_autocomplete = prevent;
        self
    }

    /// Restrict this keystroke to synchronous work only.
    pub fn with_synchronous_only(mut self, synchronous_only: bool) -> Self {
        self.synchronous_only = synchronous_only;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn input_type(&self) -> InputType {
        self.input_type
    }

    pub fn parts(&self) -> &UrlParts {
        &self.parts
    }

    /// Scheme typed by the user, if any.
    pub fn scheme(&self) -> Option<&str> {
        self.parts.scheme.as_deref()
    }

    pub fn prevent_inline_autocomplete(&self) -> bool {
        self.prevent_inline_autocomplete
    }

    pub fn synchronous_only(&self) -> bool {
        self.synchronous_only
    }

    /// Whether the user explicitly asked for a search with a leading `?`.
    pub fn is_forced_query(&self) -> bool {
        self.input_type == InputType::ForcedQuery
    }
}

/// Classify raw typed text, returning the type and the text to search for.
pub fn classify(raw: &str) -> (InputType, String) {
    let trimmed = raw.trim();
    if let Some(rest) = trimmed.strip_prefix('?') {
        return (InputType::ForcedQuery, rest.trim_start().to_string());
    }
    if trimmed.is_empty() {
        return (InputType::Invalid, String::new());
    }

    let text = trimmed.to_string();
    if trimmed.chars().any(char::is_whitespace) {
        return (InputType::Query, text);
    }

    if let Some(scheme) = UrlParts::parse(trimmed).scheme {
        let kind = if KNOWN_SCHEMES.contains(&scheme.as_str()) {
            InputType::Url
        } else {
            InputType::Unknown
        };
        return (kind, text);
    }

    let authority_end = trimmed.find(['/', '?', '#']).unwrap_or(trimmed.len());
    let authority = &trimmed[..authority_end];
    let host = authority.rsplit('@').next().unwrap_or(authority);
    if HOST_RE.is_match(host) {
        return (InputType::Url, text);
    }

    (InputType::Unknown, text)
}

/// Whether `text` starts with an explicit `http` or `https` scheme.
pub fn has_http_scheme(text: &str) -> bool {
    let lower = text.trim_start().to_ascii_lowercase();
    lower.starts_with("http:") || lower.starts_with("https:")
}

/// Turn loosely typed URL text into a valid URL, assuming `http` when no
/// scheme was given. Returns `None` for text that cannot be a usable URL.
pub fn fixup_url(text: &str) -> Option<Url> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
        return None;
    }

    let has_scheme = UrlParts::parse(trimmed).scheme.is_some();
    let candidate = if has_scheme {
        Url::parse(trimmed).ok()?
    } else {
        Url::parse(&format!("http://{}", trimmed)).ok()?
    };

    match candidate.scheme() {
        "http" | "https" | "ftp" if candidate.host_str().map_or(true, str::is_empty) => None,
        _ => Some(candidate),
    }
}

/// Render `url` for display, dropping `http://` when `omit_http` is set and a
/// bare trailing `/`.
pub fn format_url_for_display(url: &Url, omit_http: bool) -> String {
    let mut display = url.as_str().to_string();
    if omit_http && url.scheme() == "http" {
        if let Some(stripped) = display.strip_prefix("http://") {
            display = stripped.to_string();
        }
    }
    if url.path() == "/" && url.query().is_none() && url.fragment().is_none() {
        if let Some(stripped) = display.strip_suffix('/') {
            display = stripped.to_string();
        }
    }
    display
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_plain_word_is_unknown() {
        let input = InputSnapshot::new("you");
        assert_eq!(input.input_type(), InputType::Unknown);
        assert_eq!(input.text(), "you");
        assert_eq!(input.scheme(), None);
    }

    #[test]
    fn test_classify_words_with_spaces_is_query() {
        assert_eq!(InputSnapshot::new("you tube").input_type(), InputType::Query);
    }

    #[test]
    fn test_query_with_url_keeps_url_parts() {
        let input = InputSnapshot::new("http://user@example.com:81/a?b=c d");
        assert_eq!(input.input_type(), InputType::Query);
        assert_eq!(input.scheme(), Some("http"));
        let parts = input.parts();
        assert!(parts.has_username);
        assert!(parts.has_port);
        assert!(parts.has_path);
        assert!(parts.has_query);
    }

    #[test]
    fn test_classify_forced_query_strips_marker() {
        let input = InputSnapshot::new("?rust lang");
        assert_eq!(input.input_type(), InputType::ForcedQuery);
        assert!(input.is_forced_query());
        assert_eq!(input.text(), "rust lang");
    }

    #[test]
    fn test_classify_bare_question_mark_is_forced_and_empty() {
        let input = InputSnapshot::new("?");
        assert_eq!(input.input_type(), InputType::ForcedQuery);
        assert!(input.text().is_empty());
    }

    #[test]
    fn test_classify_empty_is_invalid() {
        assert_eq!(InputSnapshot::new("   ").input_type(), InputType::Invalid);
    }

    #[test]
    fn test_classify_hostnames_are_urls() {
        assert_eq!(InputSnapshot::new("example.com").input_type(), InputType::Url);
        assert_eq!(
            InputSnapshot::new("https://example.com/a").input_type(),
            InputType::Url
        );
        assert_eq!(InputSnapshot::new("localhost:8080").input_type(), InputType::Url);
    }

    #[test]
    fn test_classify_unknown_scheme() {
        let input = InputSnapshot::new("foo:bar");
        assert_eq!(input.input_type(), InputType::Unknown);
        assert_eq!(input.scheme(), Some("foo"));
    }

    #[test]
    fn test_parts_detect_components() {
        let parts = UrlParts::parse("http://user:pw@example.com:81/p?q=1#frag");
        assert_eq!(parts.scheme.as_deref(), Some("http"));
        assert!(parts.has_username);
        assert!(parts.has_port);
        assert!(parts.has_path);
        assert!(parts.has_query);
        assert!(parts.has_ref);
    }

    #[test]
    fn test_parts_bare_host() {
        let parts = UrlParts::parse("https://example.com");
        assert_eq!(parts.scheme.as_deref(), Some("https"));
        assert!(!parts.has_path);
        assert!(!parts.has_port);
        assert!(!parts.has_query);
    }

    #[test]
    fn test_parts_host_port_without_scheme() {
        let parts = UrlParts::parse("localhost:8080");
        assert_eq!(parts.scheme, None);
        assert!(parts.has_port);
    }

    #[test]
    fn test_parts_empty_query_marker_is_not_a_query() {
        assert!(!UrlParts::parse("example.com/?").has_query);
    }

    #[test]
    fn test_fixup_url() {
        assert_eq!(
            fixup_url("www.yahoo.com").map(|u| u.to_string()),
            Some("http://www.yahoo.com/".to_string())
        );
        assert_eq!(
            fixup_url("https://rust-lang.org/learn").map(|u| u.to_string()),
            Some("https://rust-lang.org/learn".to_string())
        );
        assert!(fixup_url("").is_none());
        assert!(fixup_url("not a url").is_none());
        assert!(fixup_url("http://").is_none());
    }

    #[test]
    fn test_format_url_for_display() {
        let url = Url::parse("http://www.yahoo.com/").unwrap();
        assert_eq!(format_url_for_display(&url, true), "www.yahoo.com");
        assert_eq!(format_url_for_display(&url, false), "http://www.yahoo.com");

        let https = Url::parse("https://example.com/a/b").unwrap();
        assert_eq!(format_url_for_display(&https, true), "https://example.com/a/b");
    }

    #[test]
    fn test_has_http_scheme() {
        assert!(has_http_scheme("http://a"));
        assert!(has_http_scheme("HTTPS://a"));
        assert!(!has_http_scheme("ftp://a"));
        assert!(!has_http_scheme("yahoo"));
    }
}
