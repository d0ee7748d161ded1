//! Provider registry and resolution helpers.
//!
//! This module centralizes search engine metadata and the mapping from
//! configuration to the engines used for a given keystroke.

use tracing::debug;

use crate::config::SuggestConfig;
use crate::error::{Result, SuggestError};

use super::ProviderDescriptor;

/// Metadata for an engine that ships with OmniSuggest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinProvider {
    /// Stable id, also used as the history key.
    pub id: u64,
    /// Display name.
    pub short_name: &'static str,
    /// Address-bar keyword.
    pub keyword: &'static str,
    /// Search results template.
    pub search_url: &'static str,
    /// Suggest service template, if any.
    pub suggest_url: Option<&'static str>,
}

impl BuiltinProvider {
    pub fn to_descriptor(&self) -> ProviderDescriptor {
        ProviderDescriptor {
            id: self.id,
            short_name: self.short_name.to_string(),
            keyword: self.keyword.to_string(),
            search_url: self.search_url.to_string(),
            suggest_url: self.suggest_url.map(String::from),
        }
    }
}

/// Built-in engines in priority order.
///
/// When no engines are configured the first entry is the default.
pub const BUILTIN_PROVIDERS: &[BuiltinProvider] = &[
    BuiltinProvider {
        id: 1,
        short_name: "Google",
        keyword: "google.com",
        search_url: "https://www.google.com/search?{google:originalQueryForSuggestion}{google:acceptedSuggestion}q={searchTerms}",
        suggest_url: Some("https://www.google.com/complete/search?client=chrome&q={searchTerms}"),
    },
    BuiltinProvider {
        id: 2,
        short_name: "DuckDuckGo",
        keyword: "duckduckgo.com",
        search_url: "https://duckduckgo.com/?q={searchTerms}",
        suggest_url: Some("https://duckduckgo.com/ac/?type=list&q={searchTerms}"),
    },
    BuiltinProvider {
        id: 3,
        short_name: "Bing",
        keyword: "bing.com",
        search_url: "https://www.bing.com/search?q={searchTerms}",
        suggest_url: Some("https://api.bing.com/osjson.aspx?query={searchTerms}"),
    },
    BuiltinProvider {
        id: 4,
        short_name: "Wikipedia",
        keyword: "w",
        search_url: "https://en.wikipedia.org/w/index.php?search={searchTerms}",
        suggest_url: Some(
            "https://en.wikipedia.org/w/api.php?action=opensearch&search={searchTerms}",
        ),
    },
];

/// A keyword engine selected by the typed text, with the keyword stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordResolution {
    pub provider: ProviderDescriptor,
    /// The text after the keyword, which is what gets searched.
    pub remaining_text: String,
}

/// Read-only source of engines for the engine core.
pub trait ProviderRegistry: Send + Sync {
    /// The user's default engine, if one is configured.
    fn default_provider(&self) -> Option<ProviderDescriptor>;

    /// The engine invoked by a leading keyword in `text`, if any.
    fn resolve_keyword_provider(&self, text: &str) -> Option<KeywordResolution>;
}

/// Registry over a fixed list of engines.
#[derive(Debug, Clone, Default)]
pub struct StaticProviderRegistry {
    providers: Vec<ProviderDescriptor>,
    default_index: Option<usize>,
}

impl StaticProviderRegistry {
    /// Create a registry; `default_keyword` selects the default engine.
    pub fn new(providers: Vec<ProviderDescriptor>, default_keyword: Option<&str>) -> Result<Self> {
        let default_index = match default_keyword {
            Some(keyword) => Some(
                providers
                    .iter()
                    .position(|p| p.keyword.eq_ignore_ascii_case(keyword))
                    .ok_or_else(|| {
                        SuggestError::Config(format!("unknown default provider '{}'", keyword))
                    })?,
            ),
            None if providers.is_empty() => None,
            None => Some(0),
        };
        Ok(Self {
            providers,
            default_index,
        })
    }

    /// Registry built from the configured engines, or the built-ins if none.
    pub fn from_config(config: &SuggestConfig) -> Result<Self> {
        let providers = if config.providers.is_empty() {
            BUILTIN_PROVIDERS
                .iter()
                .map(BuiltinProvider::to_descriptor)
                .collect()
        } else {
            config.providers.clone()
        };
        Self::new(providers, config.default_provider.as_deref())
    }

    /// All engines in priority order.
    pub fn providers(&self) -> &[ProviderDescriptor] {
        &self.providers
    }
}

impl ProviderRegistry for StaticProviderRegistry {
    fn default_provider(&self) -> Option<ProviderDescriptor> {
        self.default_index
            .and_then(|index| self.providers.get(index))
            .cloned()
    }

    fn resolve_keyword_provider(&self, text: &str) -> Option<KeywordResolution> {
        let (keyword, rest) = text.split_once(char::is_whitespace)?;
        let provider = self
            .providers
            .iter()
            .find(|p| p.keyword.eq_ignore_ascii_case(keyword))?;
        debug!(keyword = %provider.keyword, "Resolved keyword provider");
        Some(KeywordResolution {
            provider: provider.clone(),
            remaining_text: rest.trim_start().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_defaults_to_first() {
        let registry = StaticProviderRegistry::from_config(&SuggestConfig::default()).unwrap();
        let default = registry.default_provider().expect("default should resolve");
        assert_eq!(default.short_name, "Google");
        assert_eq!(registry.providers().len(), BUILTIN_PROVIDERS.len());
    }

    #[test]
    fn test_default_by_keyword() {
        let config = SuggestConfig {
            default_provider: Some("duckduckgo.com".to_string()),
            ..Default::default()
        };
        let registry = StaticProviderRegistry::from_config(&config).unwrap();
        assert_eq!(registry.default_provider().unwrap().short_name, "DuckDuckGo");
    }

    #[test]
    fn test_unknown_default_is_config_error() {
        let config = SuggestConfig {
            default_provider: Some("nope".to_string()),
            ..Default::default()
        };
        let err = StaticProviderRegistry::from_config(&config).unwrap_err();
        assert!(matches!(err, SuggestError::Config(_)));
    }

    #[test]
    fn test_empty_registry_has_no_default() {
        let registry = StaticProviderRegistry::new(Vec::new(), None).unwrap();
        assert!(registry.default_provider().is_none());
    }

    #[test]
    fn test_resolve_keyword_strips_keyword() {
        let registry = StaticProviderRegistry::from_config(&SuggestConfig::default()).unwrap();
        let resolved = registry
            .resolve_keyword_provider("w  rust language")
            .expect("keyword should resolve");
        assert_eq!(resolved.provider.short_name, "Wikipedia");
        assert_eq!(resolved.remaining_text, "rust language");
    }

    #[test]
    fn test_resolve_keyword_requires_separator() {
        let registry = StaticProviderRegistry::from_config(&SuggestConfig::default()).unwrap();
        assert!(registry.resolve_keyword_provider("w").is_none());
        assert!(registry.resolve_keyword_provider("wiki rust").is_none());
    }

    #[test]
    fn test_builtins_support_replacement() {
        for builtin in BUILTIN_PROVIDERS {
            let descriptor = builtin.to_descriptor();
            assert!(descriptor.supports_replacement(), "{}", builtin.short_name);
            assert!(descriptor.supports_suggestions(), "{}", builtin.short_name);
        }
    }
}
