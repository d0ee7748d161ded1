//! `providers` command.

use anyhow::{Context, Result};

use omnisuggest::config::SuggestConfig;
use omnisuggest::providers::{ProviderRegistry, StaticProviderRegistry};

pub(crate) fn cmd_providers(config: &SuggestConfig) -> Result<()> {
    let registry =
        StaticProviderRegistry::from_config(config).with_context(|| "Invalid provider setup")?;
    let default_id = registry.default_provider().map(|p| p.id);

    println!("Search engines:");
    for provider in registry.providers() {
        let marker = if Some(provider.id) == default_id { "*" } else { " " };
        let suggest = if provider.supports_suggestions() {
            "suggest"
        } else {
            "no suggest"
        };
        println!(
            " {} {:<12} keyword={:<16} {}",
            marker, provider.short_name, provider.keyword, suggest
        );
    }
    Ok(())
}
