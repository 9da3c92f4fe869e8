use serde::{Deserialize, Serialize};

use super::Article;

/// In-memory view of a feed. Transient: built by the parser on fetch, or
/// materialized from storage by the cache. The durable representation is the
/// item rows sharing `url` plus one metadata row.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Feed {
    pub url: String,
    pub title: String,
    pub link: String,
    pub items: Vec<Article>,
}

impl Feed {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|item| item.unread).count()
    }
}

/// Conditional-fetch metadata for one feed URL. An empty etag is a valid
/// stored value, not an absence marker.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FetchMeta {
    pub last_modified: i64,
    pub etag: String,
}
