//! Privacy rules for sending typed text to a remote suggest service.

use crate::input::{InputSnapshot, InputType};

/// Schemes whose URLs may be sent to a suggest service after further checks.
const SENDABLE_SCHEMES: &[&str] = &["http", "https", "ftp"];

/// Session-level switches that gate remote suggest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestPolicy {
    pub off_the_record: bool,
    pub suggest_enabled: bool,
    pub have_suggest_provider: bool,
}

impl SuggestPolicy {
    /// Whether `input` may be sent to a remote suggest service.
    pub fn allows(&self, input: &InputSnapshot) -> bool {
        if self.off_the_record || !self.suggest_enabled || !self.have_suggest_provider {
            return false;
        }
        is_input_suitable_for_suggest(input)
    }
}

/// Input-only half of the policy.
///
/// Forced queries are always sendable. Inputs with an exotic scheme (`file:`,
/// `data:`, or a `user:` prefix that is really a credential) are only sent when
/// the classifier is confident they are plain searches. Anything else that
/// could be a URL must not carry a username, port, query or fragment, and
/// `https` inputs may not carry a path.
pub fn is_input_suitable_for_suggest(input: &InputSnapshot) -> bool {
    if input.input_type() == InputType::ForcedQuery {
        return true;
    }

    let scheme = input.scheme();
    if let Some(scheme) = scheme {
        if !SENDABLE_SCHEMES.contains(&scheme) {
            return input.input_type() == InputType::Query;
        }
    }

    let parts = input.parts();
    if parts.has_username || parts.has_port || parts.has_query || parts.has_ref {
        return false;
    }

    if scheme == Some("https") && parts.has_path {
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_policy() -> SuggestPolicy {
        SuggestPolicy {
            off_the_record: false,
            suggest_enabled: true,
            have_suggest_provider: true,
        }
    }

    #[test]
    fn test_session_switches_reject() {
        let input = InputSnapshot::new("rust");
        assert!(open_policy().allows(&input));

        let otr = SuggestPolicy {
            off_the_record: true,
            ..open_policy()
        };
        assert!(!otr.allows(&input));

        let disabled = SuggestPolicy {
            suggest_enabled: false,
            ..open_policy()
        };
        assert!(!disabled.allows(&input));

        let no_provider = SuggestPolicy {
            have_suggest_provider: false,
            ..open_policy()
        };
        assert!(!no_provider.allows(&input));
    }

    #[test]
    fn test_forced_query_always_sendable() {
        let input = InputSnapshot::new("?http://user@host:99/p?q#r");
        assert!(is_input_suitable_for_suggest(&input));
    }

    #[test]
    fn test_exotic_scheme_only_for_queries() {
        assert!(!is_input_suitable_for_suggest(&InputSnapshot::new(
            "file:///etc/passwd"
        )));
        assert!(!is_input_suitable_for_suggest(&InputSnapshot::new(
            "user:secret@host"
        )));
        let query = InputSnapshot::new("foo:bar").with_type(InputType::Query);
        assert!(is_input_suitable_for_suggest(&query));
    }

    #[test]
    fn test_private_components_rejected() {
        for text in [
            "http://user@example.com",
            "example.com:8080",
            "http://example.com/?q=1",
            "ftp://example.com/#top",
        ] {
            assert!(
                !is_input_suitable_for_suggest(&InputSnapshot::new(text)),
                "{} should be rejected",
                text
            );
        }
    }

    #[test]
    fn test_url_with_whitespace_still_checked() {
        let input = InputSnapshot::new("https://mail.example.com/inbox?token=abc def");
        assert_eq!(input.input_type(), InputType::Query);
        assert_eq!(input.scheme(), Some("https"));
        assert!(!is_input_suitable_for_suggest(&input));

        assert!(!is_input_suitable_for_suggest(&InputSnapshot::new(
            "https://bank.example.com/statements 2024"
        )));
        assert!(is_input_suitable_for_suggest(&InputSnapshot::new("rust async book")));
    }

    #[test]
    fn test_https_path_rejected_but_host_allowed() {
        assert!(!is_input_suitable_for_suggest(&InputSnapshot::new(
            "https://example.com/account"
        )));
        assert!(is_input_suitable_for_suggest(&InputSnapshot::new(
            "https://example.com"
        )));
        assert!(is_input_suitable_for_suggest(&InputSnapshot::new(
            "http://example.com/docs"
        )));
    }

    #[test]
    fn test_plain_words_allowed() {
        assert!(is_input_suitable_for_suggest(&InputSnapshot::new("you")));
        assert!(is_input_suitable_for_suggest(&InputSnapshot::new("you tube")));
    }
}
