//! OmniSuggest - asynchronous search suggestions for address-bar autocomplete
//!
//! Combines past searches with remote suggest services of up to two engines
//! (the default engine and an explicitly invoked keyword engine) into one
//! deduplicated, relevance-ordered match list that refines as sources report.

pub mod config;
pub mod error;
pub mod input;
pub mod providers;
pub mod sources;
pub mod suggest;

pub use config::SuggestConfig;
pub use error::{Result, SuggestError};
pub use input::InputSnapshot;
pub use suggest::{Match, SearchSuggester, SuggestDriver, SuggestEvent, SuggestListener};
