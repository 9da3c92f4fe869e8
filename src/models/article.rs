use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Media attachment carried through the cache unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enclosure {
    pub url: String,
    pub mime_type: String,
}

/// A single article, identified by its GUID within the scope of one feed URL.
/// Values returned by the cache are independent copies; changing a flag here
/// does nothing until it is written back explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub feed_url: String,
    pub guid: String,
    pub title: String,
    pub link: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub unread: bool,
    pub deleted: bool,
    pub enclosure: Option<Enclosure>,
}

impl Default for Article {
    fn default() -> Self {
        Self {
            feed_url: String::new(),
            guid: String::new(),
            title: String::new(),
            link: String::new(),
            author: None,
            description: None,
            published_at: None,
            unread: true,
            deleted: false,
            enclosure: None,
        }
    }
}

impl Article {
    /// Stable storage key for this article within its feed.
    ///
    /// Prefers the parser-supplied GUID, then the link, then title plus
    /// publication time in Unix seconds. The mapping is part of the on-disk
    /// key contract: changing it remaps every existing row and resets the
    /// read state users have accumulated, so it must stay deterministic
    /// across runs and versions.
    pub fn storage_guid(&self) -> Option<String> {
        if !self.guid.is_empty() {
            return Some(self.guid.clone());
        }
        if !self.link.is_empty() {
            return Some(self.link.clone());
        }
        if !self.title.is_empty() || self.published_at.is_some() {
            let seconds = self.published_at.map(|dt| dt.timestamp()).unwrap_or(0);
            return Some(format!("{}{}", self.title, seconds));
        }
        None
    }
}
