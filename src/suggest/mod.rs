//! Search suggestion engine.
//!
//! Leaf to root:
//!
//! - [`eligibility`]: whether typed text may leave the machine
//! - [`gate`]: whether in-flight work survives a keystroke
//! - [`debounce`]: coalescing of remote requests
//! - [`relevance`]: scoring bands
//! - [`matches`]: match records and highlighting
//! - [`response`]: suggest wire format
//! - [`aggregate`]: merge, rank, dedupe and truncate
//! - [`engine`]: the per-query session ([`SearchSuggester`])
//! - [`driver`]: runs a session against its event channel

pub mod aggregate;
pub mod debounce;
pub mod driver;
pub mod eligibility;
pub mod engine;
pub mod gate;
pub mod matches;
pub mod relevance;
pub mod response;

pub use aggregate::{aggregate, ResultSets};
pub use driver::SuggestDriver;
pub use engine::{SearchSuggester, SuggestEvent, SuggestListener};
pub use matches::{Match, MatchType, Span, Style, Transition};
pub use response::{FetchResponse, NavigationResult, SuggestResults};
