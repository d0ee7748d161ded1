//! External collaborators consumed by the engine.
//!
//! - **history**: past search terms per engine ([`HistorySource`])
//! - **transport**: remote suggest fetches ([`SuggestTransport`])
//! - **bookmarks**: starred state for matches ([`BookmarkStore`])
//!
//! Each seam is a trait with a production adapter and an in-memory one.

pub mod bookmarks;
pub mod history;
pub mod transport;

pub use bookmarks::{BookmarkStore, InMemoryBookmarks, NoBookmarks};
pub use history::{HistoryEntry, HistoryResult, HistorySource, InMemoryHistory};
pub use transport::{HttpSuggestTransport, SuggestTransport};
