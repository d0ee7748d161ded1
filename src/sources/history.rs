//! Search-term history.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{Result, SuggestError};

/// A past search for `term`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryResult {
    pub term: String,
    pub last_used: DateTime<Utc>,
}

/// Source of past search terms.
///
/// Implementations must return results most-recent-first. The aggregator
/// breaks exact relevance ties in favor of the earlier entry, so this order
/// decides which spelling wins between terms that differ only in case.
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Up to `limit` terms searched on `provider_id` that start with `text`.
    async fn recent_terms(
        &self,
        provider_id: u64,
        text: &str,
        limit: usize,
    ) -> Result<Vec<HistoryResult>>;
}

/// A history record tagged with its engine, as stored in history files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub provider_id: u64,
    pub term: String,
    pub last_used: DateTime<Utc>,
}

/// History kept in memory, keyed by engine id.
#[derive(Debug, Default)]
pub struct InMemoryHistory {
    terms: RwLock<HashMap<u64, Vec<HistoryResult>>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = HistoryEntry>) -> Self {
        let mut terms: HashMap<u64, Vec<HistoryResult>> = HashMap::new();
        for entry in entries {
            terms.entry(entry.provider_id).or_default().push(HistoryResult {
                term: entry.term,
                last_used: entry.last_used,
            });
        }
        Self {
            terms: RwLock::new(terms),
        }
    }

    /// Load a JSON array of [`HistoryEntry`] records.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let entries: Vec<HistoryEntry> = serde_json::from_str(&content).map_err(|e| {
            SuggestError::History(format!("failed to parse {}: {}", path.display(), e))
        })?;
        Ok(Self::from_entries(entries))
    }

    /// Record a search for `term` on `provider_id`.
    pub async fn record(&self, provider_id: u64, term: &str, at: DateTime<Utc>) {
        let mut terms = self.terms.write().await;
        terms.entry(provider_id).or_default().push(HistoryResult {
            term: term.to_string(),
            last_used: at,
        });
    }
}

#[async_trait]
impl HistorySource for InMemoryHistory {
    async fn recent_terms(
        &self,
        provider_id: u64,
        text: &str,
        limit: usize,
    ) -> Result<Vec<HistoryResult>> {
        let prefix = text.to_lowercase();
        let terms = self.terms.read().await;
        let mut found: Vec<HistoryResult> = terms
            .get(&provider_id)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|e| e.term.to_lowercase().starts_with(&prefix))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        found.sort_by(|a, b| b.last_used.cmp(&a.last_used));
        found.truncate(limit);
        Ok(found)
    }
}
