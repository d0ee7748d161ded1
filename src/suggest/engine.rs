//! The search suggestion session.
//!
//! [`SearchSuggester`] owns all per-query state and is driven from a single
//! task. Asynchronous work (the debounce timer, history lookups, suggest
//! fetches) runs in spawned Tokio tasks that post a [`SuggestEvent`] back to
//! the owner when they finish. The owner feeds each event to
//! [`SearchSuggester::handle_event`], one at a time.
//!
//! Every event carries the generation of the source that issued it. Stopping a
//! source bumps its generation, so completions that were already queued when
//! the source was stopped are recognised as stale and dropped without touching
//! state or notifying the listener.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::SuggestConfig;
use crate::error::Result;
use crate::input::{InputSnapshot, InputType};
use crate::providers::{ProviderRegistry, ProviderSlot, Providers, SlotPair};
use crate::sources::{BookmarkStore, HistoryResult, HistorySource, NoBookmarks, SuggestTransport};

use super::aggregate::{aggregate, ResultSets};
use super::debounce::Debouncer;
use super::eligibility::SuggestPolicy;
use super::gate::{self, GateDecision, GateInput};
use super::matches::{placeholder_match, Match, MatchBuilder};
use super::response::{parse_fetch, FetchResponse};

/// Completion of a piece of asynchronous work.
#[derive(Debug)]
pub enum SuggestEvent {
    /// The debounce timer elapsed; remote requests may be issued.
    DebounceFired { generation: u64 },
    /// History lookup `request` finished. The slot it serves is looked up
    /// from the outstanding request table.
    HistoryLoaded {
        generation: u64,
        request: u64,
        results: Result<Vec<HistoryResult>>,
    },
    /// A suggest fetch for `slot` finished.
    SuggestFetched {
        generation: u64,
        slot: ProviderSlot,
        response: FetchResponse,
    },
}

/// Receives a callback after every aggregation pass triggered by an event.
pub trait SuggestListener: Send + Sync {
    /// `has_remote_results` is set when the pass included results from a
    /// remote suggest service (or, for history passes, any history results).
    fn on_matches_updated(&self, has_remote_results: bool);
}

/// Asynchronous search suggestion engine for one input field.
///
/// Must be used from within a Tokio runtime.
pub struct SearchSuggester {
    config: SuggestConfig,
    registry: Arc<dyn ProviderRegistry>,
    history: Arc<dyn HistorySource>,
    transport: Arc<dyn SuggestTransport>,
    bookmarks: Arc<dyn BookmarkStore>,
    listener: Option<Arc<dyn SuggestListener>>,
    events: UnboundedSender<SuggestEvent>,

    input: InputSnapshot,
    keyword_input_text: String,
    providers: Providers,
    results: ResultSets,
    matches: Vec<Match>,
    done: bool,

    history_generation: u64,
    next_history_request: u64,
    history_requests: HashMap<u64, (ProviderSlot, JoinHandle<()>)>,
    history_pending: bool,
    have_history_results: bool,

    suggest_generation: u64,
    debouncer: Debouncer,
    fetches: SlotPair<Option<JoinHandle<()>>>,
    suggest_pending: usize,
    have_suggest_results: bool,
}

impl SearchSuggester {
    pub fn new(
        config: SuggestConfig,
        registry: Arc<dyn ProviderRegistry>,
        history: Arc<dyn HistorySource>,
        transport: Arc<dyn SuggestTransport>,
        events: UnboundedSender<SuggestEvent>,
    ) -> Self {
        let debouncer = Debouncer::new(&config.debounce);
        Self {
            config,
            registry,
            history,
            transport,
            bookmarks: Arc::new(NoBookmarks),
            listener: None,
            events,
            input: InputSnapshot::default(),
            keyword_input_text: String::new(),
            providers: Providers::default(),
            results: ResultSets::default(),
            matches: Vec::new(),
            done: true,
            history_generation: 0,
            next_history_request: 0,
            history_requests: HashMap::new(),
            history_pending: false,
            have_history_results: false,
            suggest_generation: 0,
            debouncer,
            fetches: SlotPair::default(),
            suggest_pending: 0,
            have_suggest_results: false,
        }
    }

    pub fn with_bookmarks(mut self, bookmarks: Arc<dyn BookmarkStore>) -> Self {
        self.bookmarks = bookmarks;
        self
    }

    pub fn with_listener(mut self, listener: Arc<dyn SuggestListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Current matches, best first.
    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    /// No history lookup or suggest request is outstanding.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// The engines in use for the current query.
    pub fn providers(&self) -> &Providers {
        &self.providers
    }

    /// Begin (or continue) a query for `input`.
    ///
    /// With `minimal_changes`, in-flight work for the previous input is kept
    /// when the engines are unchanged. Matches available synchronously are
    /// ready on return; the listener is only notified for asynchronous updates.
    pub fn start(&mut self, input: InputSnapshot, minimal_changes: bool) {
        self.matches.clear();

        if input.input_type() == InputType::Invalid {
            self.stop();
            return;
        }

        let mut keyword_input_text = String::new();
        let keyword_provider = self
            .registry
            .resolve_keyword_provider(input.text())
            .and_then(|resolution| {
                if !resolution.provider.supports_replacement()
                    || resolution.remaining_text.is_empty()
                {
                    return None;
                }
                keyword_input_text = resolution.remaining_text;
                Some(resolution.provider)
            });
        let providers = Providers::new(self.registry.default_provider(), keyword_provider);

        if providers.is_empty() {
            debug!("No search engine available for input");
            self.stop();
            return;
        }

        if !self.done && (!minimal_changes || providers != self.providers) {
            debug!("Superseding in-flight query");
            self.stop();
        }
        self.providers = providers;

        if input.text().is_empty() {
            self.stop();
            if let Some(default_provider) = self.providers.get(ProviderSlot::Default) {
                self.matches.push(placeholder_match(default_provider));
            }
            return;
        }

        self.input = input;
        self.keyword_input_text = keyword_input_text;

        self.start_or_stop_history(minimal_changes);
        self.start_or_stop_suggest(minimal_changes);
        self.update_matches();
    }

    /// Cancel all outstanding work and discard accumulated results.
    ///
    /// The current match list is left as is.
    pub fn stop(&mut self) {
        self.stop_history();
        self.stop_suggest();
        self.done = true;
    }

    /// Apply one completion event.
    pub fn handle_event(&mut self, event: SuggestEvent) {
        match event {
            SuggestEvent::DebounceFired { generation } => {
                if generation != self.suggest_generation {
                    debug!(generation, "Dropping stale debounce");
                    return;
                }
                self.run_suggest();
            }
            SuggestEvent::HistoryLoaded {
                generation,
                request,
                results,
            } => {
                let outstanding = if generation == self.history_generation {
                    self.history_requests.remove(&request)
                } else {
                    None
                };
                let Some((slot, _)) = outstanding else {
                    debug!(generation, request, "Dropping stale history results");
                    return;
                };
                self.on_history_loaded(slot, results);
            }
            SuggestEvent::SuggestFetched {
                generation,
                slot,
                response,
            } => {
                if generation != self.suggest_generation || self.fetches[slot].take().is_none() {
                    debug!(generation, slot = slot.as_str(), "Dropping stale suggest response");
                    return;
                }
                self.on_suggest_fetched(slot, response);
            }
        }
    }

    fn input_text(&self, slot: ProviderSlot) -> &str {
        match slot {
            ProviderSlot::Keyword => &self.keyword_input_text,
            ProviderSlot::Default => self.input.text(),
        }
    }

    fn start_or_stop_history(&mut self, minimal_changes: bool) {
        let decision = gate::decide(GateInput {
            minimal_changes,
            have_results: self.have_history_results,
            currently_running: !self.done,
            synchronous_only: self.input.synchronous_only(),
        });
        if !decision.stops() {
            return;
        }
        self.stop_history();
        if decision == GateDecision::StayStopped {
            return;
        }

        for slot in ProviderSlot::ALL {
            if let Some(provider) = self.providers.get(slot) {
                let provider_id = provider.id;
                self.schedule_history(slot, provider_id);
            }
        }
    }

    fn schedule_history(&mut self, slot: ProviderSlot, provider_id: u64) {
        let request = self.next_history_request;
        self.next_history_request += 1;
        let generation = self.history_generation;
        let text = self.input_text(slot).to_string();
        let limit = self.config.max_matches;
        let history = Arc::clone(&self.history);
        let events = self.events.clone();

        debug!(slot = slot.as_str(), provider_id, request, "Querying search history");
        let handle = tokio::spawn(async move {
            let results = history.recent_terms(provider_id, &text, limit).await;
            let _ = events.send(SuggestEvent::HistoryLoaded {
                generation,
                request,
                results,
            });
        });
        self.history_requests.insert(request, (slot, handle));
        self.history_pending = true;
    }

    fn on_history_loaded(&mut self, slot: ProviderSlot, results: Result<Vec<HistoryResult>>) {
        let results = results.unwrap_or_else(|e| {
            warn!(slot = slot.as_str(), "History lookup failed: {}", e);
            Vec::new()
        });
        let has_results = !results.is_empty();
        self.results.history[slot] = results;

        if self.history_requests.is_empty() {
            self.history_pending = false;
            self.have_history_results = true;
        }
        self.update_matches();
        self.notify(has_results);
    }

    fn stop_history(&mut self) {
        self.history_generation += 1;
        for (_, (_, handle)) in self.history_requests.drain() {
            handle.abort();
        }
        self.results.clear_history();
        self.history_pending = false;
        self.have_history_results = false;
    }

    fn start_or_stop_suggest(&mut self, minimal_changes: bool) {
        let policy = SuggestPolicy {
            off_the_record: self.config.off_the_record,
            suggest_enabled: self.config.suggest_enabled,
            have_suggest_provider: self.providers.any_suggest_capable(),
        };
        if !policy.allows(&self.input) {
            self.stop_suggest();
            return;
        }

        let decision = gate::decide(GateInput {
            minimal_changes,
            have_results: self.have_suggest_results,
            currently_running: !self.done,
            synchronous_only: self.input.synchronous_only(),
        });
        if !decision.stops() {
            return;
        }
        self.stop_suggest();
        if decision == GateDecision::StayStopped {
            return;
        }

        // Counts the armed timer until the fetches are issued.
        self.suggest_pending = 1;
        let generation = self.suggest_generation;
        let events = self.events.clone();
        self.debouncer.schedule(move || {
            let _ = events.send(SuggestEvent::DebounceFired { generation });
        });
    }

    fn run_suggest(&mut self) {
        self.suggest_pending = 0;

        for slot in ProviderSlot::ALL {
            if !self.providers.valid_suggest_for(slot) {
                continue;
            }
            let Some(provider) = self.providers.get(slot) else {
                continue;
            };
            let url = match provider.suggest_url_for(self.input_text(slot)) {
                Some(Ok(url)) => url,
                Some(Err(e)) => {
                    warn!(provider = %provider.short_name, "Bad suggest URL: {}", e);
                    continue;
                }
                None => continue,
            };

            info!(slot = slot.as_str(), %url, "Requesting suggestions");
            let generation = self.suggest_generation;
            let transport = Arc::clone(&self.transport);
            let events = self.events.clone();
            let handle = tokio::spawn(async move {
                let response = transport.fetch(url).await;
                let _ = events.send(SuggestEvent::SuggestFetched {
                    generation,
                    slot,
                    response,
                });
            });
            if let Some(previous) = self.fetches[slot].replace(handle) {
                previous.abort();
            }
            self.suggest_pending += 1;
        }

        if self.suggest_pending == 0 {
            debug!("No suggest request issued, finishing round");
            self.update_matches();
            self.notify(false);
        }
    }

    fn on_suggest_fetched(&mut self, slot: ProviderSlot, response: FetchResponse) {
        self.suggest_pending = self.suggest_pending.saturating_sub(1);

        let parsed = parse_fetch(&response, self.input_text(slot), self.config.max_matches);
        self.results.suggest[slot] = match parsed {
            Ok(results) => {
                debug!(
                    slot = slot.as_str(),
                    suggestions = results.suggestions.len(),
                    navigation = results.navigation.len(),
                    "Suggest response parsed"
                );
                results
            }
            Err(e) => {
                warn!(slot = slot.as_str(), "Ignoring suggest response: {}", e);
                Default::default()
            }
        };

        let has_results = !self.results.suggest[slot].is_empty();
        self.have_suggest_results |= has_results;
        self.update_matches();
        self.notify(has_results);
    }

    fn stop_suggest(&mut self) {
        self.suggest_generation += 1;
        self.debouncer.cancel();
        for slot in ProviderSlot::ALL {
            if let Some(handle) = self.fetches[slot].take() {
                handle.abort();
            }
        }
        self.results.clear_suggest();
        self.suggest_pending = 0;
        self.have_suggest_results = false;
    }

    fn update_matches(&mut self) {
        let builder = MatchBuilder {
            input: &self.input,
            keyword_input_text: &self.keyword_input_text,
            providers: &self.providers,
        };
        self.matches = aggregate(
            &builder,
            &self.results,
            self.config.max_matches,
            Utc::now(),
            self.bookmarks.as_ref(),
        );
        self.done = !self.history_pending && self.suggest_pending == 0;
    }

    fn notify(&self, has_remote_results: bool) {
        if let Some(listener) = &self.listener {
            listener.on_matches_updated(has_remote_results);
        }
    }
}

impl Drop for SearchSuggester {
    fn drop(&mut self) {
        for (_, (_, handle)) in self.history_requests.drain() {
            handle.abort();
        }
        for slot in ProviderSlot::ALL {
            if let Some(handle) = self.fetches[slot].take() {
                handle.abort();
            }
        }
    }
}
