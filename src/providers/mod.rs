//! Search engine providers.
//!
//! A query can involve up to two engines at once:
//!
//! - the **default** engine configured by the user, and
//! - a **keyword** engine the user invoked explicitly by typing its keyword
//!   (e.g. `w rust` for a Wikipedia engine with keyword `w`).
//!
//! Every piece of per-engine state in the engine is stored in a [`SlotPair`]
//! indexed by [`ProviderSlot`], so "which engine does this belong to" is never a
//! bare boolean.

pub mod registry;
pub mod template;

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Result;

pub use registry::{KeywordResolution, ProviderRegistry, StaticProviderRegistry, BUILTIN_PROVIDERS};
pub use template::AcceptedSuggestion;

/// Read-only metadata for one search engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    /// Stable identifier used to key history lookups.
    pub id: u64,
    /// Human-readable name ("Google", "Wikipedia").
    pub short_name: String,
    /// Keyword that invokes this engine from the address bar.
    pub keyword: String,
    /// Search results URL template.
    pub search_url: String,
    /// Remote suggest URL template, if the engine has a suggest service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggest_url: Option<String>,
}

impl ProviderDescriptor {
    /// Whether search terms can be substituted into the search URL.
    pub fn supports_replacement(&self) -> bool {
        template::supports_replacement(&self.search_url)
    }

    /// Whether the engine has a usable remote suggest endpoint.
    pub fn supports_suggestions(&self) -> bool {
        self.suggest_url
            .as_deref()
            .is_some_and(template::supports_replacement)
    }

    /// Destination URL for searching `query` on this engine.
    pub fn search_url_for(
        &self,
        query: &str,
        accepted: AcceptedSuggestion,
        original_input: &str,
    ) -> Result<Url> {
        template::substitute(&self.search_url, query, accepted, original_input)
    }

    /// Suggest-service URL for `text`, if the engine has one.
    pub fn suggest_url_for(&self, text: &str) -> Option<Result<Url>> {
        self.suggest_url.as_deref().map(|t| {
            template::substitute(t, text, AcceptedSuggestion::NoSuggestionsAvailable, "")
        })
    }
}

/// Which of the two provider slots a piece of state belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderSlot {
    Keyword,
    Default,
}

impl ProviderSlot {
    /// Both slots, keyword first. This is also the merge precedence order.
    pub const ALL: [ProviderSlot; 2] = [ProviderSlot::Keyword, ProviderSlot::Default];

    pub fn is_keyword(self) -> bool {
        self == ProviderSlot::Keyword
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProviderSlot::Keyword => "keyword",
            ProviderSlot::Default => "default",
        }
    }
}

/// A value per provider slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotPair<T> {
    pub keyword: T,
    pub default: T,
}

impl<T> SlotPair<T> {
    pub fn new(keyword: T, default: T) -> Self {
        Self { keyword, default }
    }

    /// Iterate `(slot, value)` pairs, keyword first.
    pub fn iter(&self) -> impl Iterator<Item = (ProviderSlot, &T)> {
        [
            (ProviderSlot::Keyword, &self.keyword),
            (ProviderSlot::Default, &self.default),
        ]
        .into_iter()
    }
}

impl<T> Index<ProviderSlot> for SlotPair<T> {
    type Output = T;

    fn index(&self, slot: ProviderSlot) -> &T {
        match slot {
            ProviderSlot::Keyword => &self.keyword,
            ProviderSlot::Default => &self.default,
        }
    }
}

impl<T> IndexMut<ProviderSlot> for SlotPair<T> {
    fn index_mut(&mut self, slot: ProviderSlot) -> &mut T {
        match slot {
            ProviderSlot::Keyword => &mut self.keyword,
            ProviderSlot::Default => &mut self.default,
        }
    }
}

/// The engines active for the current query.
///
/// Stores owned copies, which double as the snapshot used to detect that the
/// configured engines changed between keystrokes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Providers {
    slots: SlotPair<Option<ProviderDescriptor>>,
}

impl Providers {
    /// Build the pair, collapsing a keyword engine identical to the default.
    pub fn new(
        default_provider: Option<ProviderDescriptor>,
        keyword_provider: Option<ProviderDescriptor>,
    ) -> Self {
        let keyword_provider = match (&default_provider, keyword_provider) {
            (Some(d), Some(k)) if d.id == k.id => None,
            (_, k) => k,
        };
        Self {
            slots: SlotPair::new(keyword_provider, default_provider),
        }
    }

    pub fn get(&self, slot: ProviderSlot) -> Option<&ProviderDescriptor> {
        self.slots[slot].as_ref()
    }

    pub fn has(&self, slot: ProviderSlot) -> bool {
        self.slots[slot].is_some()
    }

    pub fn is_empty(&self) -> bool {
        !self.has(ProviderSlot::Default) && !self.has(ProviderSlot::Keyword)
    }

    /// Whether `slot` has an engine with a usable suggest endpoint.
    pub fn valid_suggest_for(&self, slot: ProviderSlot) -> bool {
        self.get(slot)
            .is_some_and(ProviderDescriptor::supports_suggestions)
    }

    /// Whether either slot can be asked for remote suggestions.
    pub fn any_suggest_capable(&self) -> bool {
        ProviderSlot::ALL
            .iter()
            .any(|slot| self.valid_suggest_for(*slot))
    }

    /// A slot is primary unless it is the default engine while a distinct
    /// keyword engine is active.
    pub fn is_primary(&self, slot: ProviderSlot) -> bool {
        slot.is_keyword() || !self.has(ProviderSlot::Keyword)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn descriptor(id: u64, keyword: &str, suggest: bool) -> ProviderDescriptor {
        ProviderDescriptor {
            id,
            short_name: format!("Engine {}", keyword.to_uppercase()),
            keyword: keyword.to_string(),
            search_url: format!("https://{}.example/search?q={{searchTerms}}", keyword),
            suggest_url: suggest
                .then(|| format!("https://{}.example/suggest?q={{searchTerms}}", keyword)),
        }
    }

    #[test]
    fn test_duplicate_keyword_collapses_to_default() {
        let d = descriptor(1, "g", true);
        let providers = Providers::new(Some(d.clone()), Some(d));
        assert!(providers.has(ProviderSlot::Default));
        assert!(!providers.has(ProviderSlot::Keyword));
    }

    #[test]
    fn test_primary_rules() {
        let only_default = Providers::new(Some(descriptor(1, "g", true)), None);
        assert!(only_default.is_primary(ProviderSlot::Default));

        let both = Providers::new(Some(descriptor(1, "g", true)), Some(descriptor(2, "w", true)));
        assert!(both.is_primary(ProviderSlot::Keyword));
        assert!(!both.is_primary(ProviderSlot::Default));
    }

    #[test]
    fn test_suggest_capability() {
        let providers = Providers::new(Some(descriptor(1, "g", false)), None);
        assert!(!providers.any_suggest_capable());

        let providers = Providers::new(Some(descriptor(1, "g", false)), Some(descriptor(2, "w", true)));
        assert!(providers.any_suggest_capable());
        assert!(providers.valid_suggest_for(ProviderSlot::Keyword));
        assert!(!providers.valid_suggest_for(ProviderSlot::Default));
    }

    #[test]
    fn test_change_detection_by_equality() {
        let a = Providers::new(Some(descriptor(1, "g", true)), None);
        let b = Providers::new(Some(descriptor(1, "g", true)), None);
        let mut renamed = descriptor(1, "g", true);
        renamed.short_name = "Renamed".to_string();
        let c = Providers::new(Some(renamed), None);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_slot_pair_indexing() {
        let mut pair = SlotPair::new(1, 2);
        pair[ProviderSlot::Default] += 10;
        assert_eq!(pair[ProviderSlot::Keyword], 1);
        assert_eq!(pair[ProviderSlot::Default], 12);
        let slots: Vec<_> = pair.iter().map(|(s, _)| s).collect();
        assert_eq!(slots, vec![ProviderSlot::Keyword, ProviderSlot::Default]);
    }

    #[test]
    fn test_suggest_url_for() {
        let url = descriptor(1, "g", true)
            .suggest_url_for("you")
            .unwrap()
            .unwrap();
        assert_eq!(url.as_str(), "https://g.example/suggest?q=you");
        assert!(descriptor(1, "g", false).suggest_url_for("you").is_none());
    }
}
