//! Command-line interface.

mod providers;
mod query;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use omnisuggest::config::SuggestConfig;

#[derive(Parser)]
#[command(name = "omnisuggest")]
#[command(about = "Address-bar search suggestions from history and remote engines", long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.omnisuggest/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one query to completion and print the matches
    Query {
        /// Text as typed in the address bar
        text: String,
        /// Treat the input as a forced search (same as a leading '?')
        #[arg(long)]
        forced: bool,
        /// Disable inline autocompletion
        #[arg(long)]
        prevent_inline: bool,
        /// History file (JSON array of {provider_id, term, last_used})
        #[arg(long)]
        history: Option<PathBuf>,
        /// Print matches as JSON
        #[arg(long)]
        json: bool,
    },
    /// List configured search engines
    Providers,
    /// Show version information
    Version,
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<SuggestConfig> {
    match path {
        Some(path) => {
            let mut config = SuggestConfig::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            config.apply_env_overrides();
            Ok(config)
        }
        None => SuggestConfig::load_default().with_context(|| "Failed to load configuration"),
    }
}

pub(crate) async fn run() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_logging(cli.log_json);

    match cli.command {
        Some(Commands::Version) | None => {
            println!("omnisuggest {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Providers) => {
            let config = load_config(cli.config.as_ref())?;
            providers::cmd_providers(&config)?;
        }
        Some(Commands::Query {
            text,
            forced,
            prevent_inline,
            history,
            json,
        }) => {
            let config = load_config(cli.config.as_ref())?;
            let options = query::QueryOptions {
                forced,
                prevent_inline,
                history,
                json,
            };
            query::cmd_query(config, &text, options).await?;
        }
    }

    Ok(())
}
