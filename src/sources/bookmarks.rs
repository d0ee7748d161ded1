//! Bookmark lookups used to mark matches as starred.

use std::collections::HashSet;

/// Answers whether a destination URL is bookmarked.
#[cfg_attr(test, mockall::automock)]
pub trait BookmarkStore: Send + Sync {
    fn is_bookmarked(&self, url: &str) -> bool;
}

/// A store with no bookmarks.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBookmarks;

impl BookmarkStore for NoBookmarks {
    fn is_bookmarked(&self, _url: &str) -> bool {
        false
    }
}

/// Bookmarks held in a set of exact URL strings.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBookmarks {
    urls: HashSet<String>,
}

impl InMemoryBookmarks {
    pub fn new<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            urls: urls.into_iter().map(Into::into).collect(),
        }
    }
}

impl BookmarkStore for InMemoryBookmarks {
    fn is_bookmarked(&self, url: &str) -> bool {
        self.urls.contains(url)
    }
}
