//! Configuration for OmniSuggest
//!
//! Configuration is read from `~/.omnisuggest/config.json` (when present) and
//! then adjusted by environment variables:
//!
//! | Variable                      | Field             |
//! |-------------------------------|-------------------|
//! | `OMNISUGGEST_SUGGEST_ENABLED` | `suggest_enabled` |
//! | `OMNISUGGEST_OFF_THE_RECORD`  | `off_the_record`  |
//! | `OMNISUGGEST_DEBOUNCE_MS`     | `debounce.delay_ms` |
//! | `OMNISUGGEST_MAX_MATCHES`     | `max_matches`     |
//!
//! # Example config.json
//!
//! ```json
//! {
//!     "suggest_enabled": true,
//!     "debounce": { "delay_ms": 150 },
//!     "default_provider": "w",
//!     "providers": [
//!         {
//!             "id": 10,
//!             "short_name": "Wikipedia",
//!             "keyword": "w",
//!             "search_url": "https://en.wikipedia.org/w/index.php?search={searchTerms}",
//!             "suggest_url": "https://en.wikipedia.org/w/api.php?action=opensearch&search={searchTerms}"
//!         }
//!     ]
//! }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, SuggestError};
use crate::providers::ProviderDescriptor;

/// Default delay between the last keystroke and the remote suggest request.
pub const DEFAULT_DEBOUNCE_MS: u64 = 200;

/// Default cap on matches kept per category and engine.
pub const DEFAULT_MAX_MATCHES: usize = 3;

/// Default HTTP timeout for suggest fetches.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Debounce settings for remote suggest requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebounceConfig {
    /// Delay in milliseconds before a suggest request is sent.
    pub delay_ms: u64,
    /// Fire suggest requests with no delay at all. Intended for tests.
    pub immediate: bool,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_DEBOUNCE_MS,
            immediate: false,
        }
    }
}

impl DebounceConfig {
    /// Zero-delay configuration.
    pub fn immediate() -> Self {
        Self {
            immediate: true,
            ..Self::default()
        }
    }

    /// Effective delay, honoring the `immediate` override.
    pub fn delay(&self) -> Duration {
        if self.immediate {
            Duration::ZERO
        } else {
            Duration::from_millis(self.delay_ms)
        }
    }
}

/// Top-level configuration.
///
/// # Defaults
///
/// - `suggest_enabled`: `true`
/// - `off_the_record`: `false`
/// - `debounce.delay_ms`: `200`
/// - `max_matches`: `3`
/// - `providers`: empty (the built-in engines are used)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestConfig {
    /// Whether typed text may be sent to remote suggest services.
    pub suggest_enabled: bool,
    /// Private browsing session; never sends anything remotely.
    pub off_the_record: bool,
    pub debounce: DebounceConfig,
    /// Maximum results kept per category and provider.
    pub max_matches: usize,
    /// Timeout for each suggest fetch.
    pub request_timeout_secs: u64,
    /// Keyword of the default engine. Defaults to the first engine.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_provider: Option<String>,
    /// Configured engines. Empty means use the built-ins.
    pub providers: Vec<ProviderDescriptor>,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            suggest_enabled: true,
            off_the_record: false,
            debounce: DebounceConfig::default(),
            max_matches: DEFAULT_MAX_MATCHES,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            default_provider: None,
            providers: Vec::new(),
        }
    }
}

impl SuggestConfig {
    /// Path of the default config file (`~/.omnisuggest/config.json`).
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".omnisuggest").join("config.json"))
    }

    /// Load configuration from a JSON file.
    ///
    /// Strict JSON is tried first; files with comments or trailing commas are
    /// accepted through a JSON5 fallback.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = match serde_json::from_str::<Self>(&content) {
            Ok(config) => config,
            Err(strict) => json5::from_str::<Self>(&content).map_err(|e| {
                SuggestError::Config(format!(
                    "failed to parse {}: {} ({})",
                    path.display(),
                    strict,
                    e
                ))
            })?,
        };
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Load the default config file if it exists, then apply env overrides.
    pub fn load_default() -> Result<Self> {
        let mut config = match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path)?,
            _ => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply `OMNISUGGEST_*` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Some(v) = env_parse::<bool>("OMNISUGGEST_SUGGEST_ENABLED") {
            self.suggest_enabled = v;
        }
        if let Some(v) = env_parse::<bool>("OMNISUGGEST_OFF_THE_RECORD") {
            self.off_the_record = v;
        }
        if let Some(v) = env_parse::<u64>("OMNISUGGEST_DEBOUNCE_MS") {
            self.debounce.delay_ms = v;
        }
        if let Some(v) = env_parse::<usize>("OMNISUGGEST_MAX_MATCHES") {
            self.max_matches = v.max(1);
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring invalid value for {}: {:?}", key, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = SuggestConfig::default();
        assert!(config.suggest_enabled);
        assert!(!config.off_the_record);
        assert_eq!(config.max_matches, 3);
        assert_eq!(config.debounce.delay(), Duration::from_millis(200));
    }

    #[test]
    fn test_immediate_debounce_has_zero_delay() {
        assert_eq!(DebounceConfig::immediate().delay(), Duration::ZERO);
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"off_the_record": true, "debounce": {{"delay_ms": 50}}}}"#).unwrap();

        let config = SuggestConfig::load(file.path()).unwrap();
        assert!(config.off_the_record);
        assert!(config.suggest_enabled);
        assert_eq!(config.debounce.delay_ms, 50);
        assert_eq!(config.max_matches, DEFAULT_MAX_MATCHES);
    }

    #[test]
    fn test_load_accepts_trailing_commas() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"max_matches\": 5,}}").unwrap();

        let config = SuggestConfig::load(file.path()).unwrap();
        assert_eq!(config.max_matches, 5);
    }

    #[test]
    fn test_load_rejects_garbage() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json at all").unwrap();

        let err = SuggestConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, SuggestError::Config(_)));
    }

    #[test]
    fn test_load_providers() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "default_provider": "x",
                "providers": [{{
                    "id": 7,
                    "short_name": "X",
                    "keyword": "x",
                    "search_url": "https://x.example/?q={{searchTerms}}"
                }}]
            }}"#
        )
        .unwrap();

        let config = SuggestConfig::load(file.path()).unwrap();
        assert_eq!(config.providers.len(), 1);
        assert_eq!(config.providers[0].suggest_url, None);
        assert_eq!(config.default_provider.as_deref(), Some("x"));
    }
}
