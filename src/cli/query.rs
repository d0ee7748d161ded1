//! `query` command: one full query lifecycle over HTTP.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use omnisuggest::config::SuggestConfig;
use omnisuggest::input::{InputSnapshot, InputType};
use omnisuggest::providers::StaticProviderRegistry;
use omnisuggest::sources::{HistorySource, HttpSuggestTransport, InMemoryHistory};
use omnisuggest::suggest::{Match, MatchType, SuggestDriver};

pub(crate) struct QueryOptions {
    pub forced: bool,
    pub prevent_inline: bool,
    pub history: Option<PathBuf>,
    pub json: bool,
}

pub(crate) async fn cmd_query(config: SuggestConfig, text: &str, options: QueryOptions) -> Result<()> {
    let registry =
        StaticProviderRegistry::from_config(&config).with_context(|| "Invalid provider setup")?;
    let history: Arc<dyn HistorySource> = match options.history.as_deref() {
        Some(path) => Arc::new(
            InMemoryHistory::load(path)
                .with_context(|| format!("Failed to load history from {}", path.display()))?,
        ),
        None => Arc::new(InMemoryHistory::new()),
    };
    let timeout = Duration::from_secs(config.request_timeout_secs);
    let transport = Arc::new(HttpSuggestTransport::new(timeout));

    let mut input = InputSnapshot::new(text).with_prevent_inline_autocomplete(options.prevent_inline);
    if options.forced {
        input = input.with_type(InputType::ForcedQuery);
    }

    let mut driver = SuggestDriver::new(config, Arc::new(registry), history, transport);
    driver.start(input, false);
    // Leave room for the debounce on top of the fetch timeout.
    let matches = driver
        .run_until_done_within(timeout + Duration::from_secs(1))
        .await;

    if options.json {
        println!("{}", serde_json::to_string_pretty(matches)?);
    } else if matches.is_empty() {
        println!("No matches.");
    } else {
        for m in matches {
            print_match(m);
        }
    }
    Ok(())
}

fn print_match(m: &Match) {
    let kind = match m.kind {
        MatchType::SearchWhatYouTyped => "typed",
        MatchType::SearchHistory => "history",
        MatchType::SearchSuggest => "suggest",
        MatchType::NavSuggest => "nav",
    };
    let star = if m.starred { "*" } else { " " };
    if m.description.is_empty() {
        println!("{:>5} {}{:<8} {}", m.relevance, star, kind, m.contents);
    } else {
        println!(
            "{:>5} {}{:<8} {} - {}",
            m.relevance, star, kind, m.contents, m.description
        );
    }
    println!("      {}", m.destination_url);
}
