//! Event loop for a [`SearchSuggester`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::warn;

use crate::config::SuggestConfig;
use crate::input::InputSnapshot;
use crate::providers::ProviderRegistry;
use crate::sources::{BookmarkStore, HistorySource, SuggestTransport};

use super::engine::{SearchSuggester, SuggestEvent, SuggestListener};
use super::matches::Match;

/// Owns a [`SearchSuggester`] together with the receiving end of its event
/// channel.
///
/// ```no_run
/// use std::sync::Arc;
///
/// use omnisuggest::config::SuggestConfig;
/// use omnisuggest::input::InputSnapshot;
/// use omnisuggest::providers::StaticProviderRegistry;
/// use omnisuggest::sources::{HttpSuggestTransport, InMemoryHistory};
/// use omnisuggest::suggest::SuggestDriver;
///
/// tokio_test::block_on(async {
///     let config = SuggestConfig::default();
///     let registry = StaticProviderRegistry::from_config(&config).unwrap();
///     let mut driver = SuggestDriver::new(
///         config,
///         Arc::new(registry),
///         Arc::new(InMemoryHistory::new()),
///         Arc::new(HttpSuggestTransport::default()),
///     );
///     driver.start(InputSnapshot::new("rust"), false);
///     for m in driver.run_until_done().await {
///         println!("{} {}", m.relevance, m.contents);
///     }
/// });
/// ```
pub struct SuggestDriver {
    engine: SearchSuggester,
    events: UnboundedReceiver<SuggestEvent>,
}

impl SuggestDriver {
    pub fn new(
        config: SuggestConfig,
        registry: Arc<dyn ProviderRegistry>,
        history: Arc<dyn HistorySource>,
        transport: Arc<dyn SuggestTransport>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            engine: SearchSuggester::new(config, registry, history, transport, tx),
            events: rx,
        }
    }

    pub fn with_bookmarks(self, bookmarks: Arc<dyn BookmarkStore>) -> Self {
        Self {
            engine: self.engine.with_bookmarks(bookmarks),
            events: self.events,
        }
    }

    pub fn with_listener(self, listener: Arc<dyn SuggestListener>) -> Self {
        Self {
            engine: self.engine.with_listener(listener),
            events: self.events,
        }
    }

    pub fn engine(&self) -> &SearchSuggester {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut SearchSuggester {
        &mut self.engine
    }

    pub fn start(&mut self, input: InputSnapshot, minimal_changes: bool) {
        self.engine.start(input, minimal_changes);
    }

    /// Wait for one event and apply it. Returns `false` if the channel closed.
    pub async fn step(&mut self) -> bool {
        match self.events.recv().await {
            Some(event) => {
                self.engine.handle_event(event);
                true
            }
            None => false,
        }
    }

    /// Apply events until the current query is done.
    pub async fn run_until_done(&mut self) -> &[Match] {
        while !self.engine.is_done() {
            if !self.step().await {
                break;
            }
        }
        self.engine.matches()
    }

    /// Like [`SuggestDriver::run_until_done`], but stops the query if it has
    /// not finished within `limit`.
    pub async fn run_until_done_within(&mut self, limit: Duration) -> &[Match] {
        let finished = tokio::time::timeout(limit, async {
            while !self.engine.is_done() {
                if !self.step().await {
                    break;
                }
            }
        })
        .await;
        if finished.is_err() {
            warn!(limit_ms = limit.as_millis() as u64, "Query timed out, stopping");
            self.engine.stop();
        }
        self.engine.matches()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DebounceConfig;
    use crate::providers::tests::descriptor;
    use crate::providers::StaticProviderRegistry;
    use crate::sources::InMemoryHistory;
    use crate::suggest::engine::tests::FakeTransport;
    use crate::suggest::response::FetchResponse;
    use async_trait::async_trait;
    use url::Url;

    struct HangingTransport;

    #[async_trait]
    impl SuggestTransport for HangingTransport {
        async fn fetch(&self, _url: Url) -> FetchResponse {
            std::future::pending::<()>().await;
            FetchResponse::failed()
        }
    }

    fn driver(transport: Arc<dyn SuggestTransport>) -> SuggestDriver {
        let registry =
            StaticProviderRegistry::new(vec![descriptor(1, "g", true)], None).unwrap();
        let config = SuggestConfig {
            debounce: DebounceConfig::immediate(),
            ..Default::default()
        };
        SuggestDriver::new(
            config,
            Arc::new(registry),
            Arc::new(InMemoryHistory::new()),
            transport,
        )
    }

    #[tokio::test]
    async fn test_run_until_done_collects_suggestions() {
        let transport = Arc::new(FakeTransport::default());
        transport.respond(
            "https://g.example/suggest?q=tok",
            r#"["tok", ["tokio", "tokyo"]]"#,
        );
        let mut driver = driver(transport.clone());

        driver.start(InputSnapshot::new("tok"), false);
        let contents: Vec<String> = driver
            .run_until_done()
            .await
            .iter()
            .map(|m| m.contents.clone())
            .collect();
        assert_eq!(contents, vec!["tok", "tokio", "tokyo"]);
        assert!(driver.engine().is_done());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_until_done_within_stops_hung_query() {
        let mut driver = driver(Arc::new(HangingTransport));

        driver.start(InputSnapshot::new("tok"), false);
        let matches = driver
            .run_until_done_within(Duration::from_secs(1))
            .await
            .to_vec();
        assert!(driver.engine().is_done());
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].contents, "tok");
    }
}
