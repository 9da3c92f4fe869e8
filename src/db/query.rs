use rusqlite::{params, OptionalExtension};

use crate::error::Result;
use crate::models::{Article, Feed};

use super::cache::{article_from_row, Cache, ITEM_COLUMNS};

impl Cache {
    /// Case-insensitive substring search over title, description and author.
    /// Pass a feed URL to search one feed, `None` for the whole cache. Only
    /// live items are returned, newest first, as independent copies.
    pub async fn search_for_items(
        &self,
        phrase: &str,
        feed_url: Option<&str>,
    ) -> Result<Vec<Article>> {
        let pattern = format!("%{}%", phrase);
        let url = feed_url.map(|s| s.to_string());

        let items = self
            .conn
            .call(move |conn| {
                let items = match url {
                    Some(url) => {
                        let mut stmt = conn.prepare(&format!(
                            "SELECT {ITEM_COLUMNS} FROM items
                             WHERE deleted = 0 AND feed_url = ?2
                               AND (title LIKE ?1 OR description LIKE ?1 OR author LIKE ?1)
                             ORDER BY published_at DESC NULLS LAST, id DESC"
                        ))?;
                        let rows = stmt
                            .query_map(params![pattern, url], |row| Ok(article_from_row(row)))?
                            .collect::<std::result::Result<Vec<_>, _>>()?;
                        rows
                    }
                    None => {
                        let mut stmt = conn.prepare(&format!(
                            "SELECT {ITEM_COLUMNS} FROM items
                             WHERE deleted = 0
                               AND (title LIKE ?1 OR description LIKE ?1 OR author LIKE ?1)
                             ORDER BY published_at DESC NULLS LAST, id DESC"
                        ))?;
                        let rows = stmt
                            .query_map(params![pattern], |row| Ok(article_from_row(row)))?
                            .collect::<std::result::Result<Vec<_>, _>>()?;
                        rows
                    }
                };
                Ok(items)
            })
            .await?;
        Ok(items)
    }

    /// Number of live unread items across all feeds, straight from storage.
    pub async fn get_unread_count(&self) -> Result<u64> {
        let count = self
            .conn
            .call(|conn| {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM items WHERE unread = 1 AND deleted = 0",
                    [],
                    |row| row.get(0),
                )?;
                Ok(count)
            })
            .await?;
        Ok(count as u64)
    }

    /// GUIDs of every live item marked read, across all feeds. Used to seed
    /// read state when importing subscriptions from another reader.
    pub async fn get_read_item_guids(&self) -> Result<Vec<String>> {
        let guids = self
            .conn
            .call(|conn| {
                let mut stmt =
                    conn.prepare("SELECT guid FROM items WHERE unread = 0 AND deleted = 0")?;
                let guids = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<std::result::Result<Vec<String>, _>>()?;
                Ok(guids)
            })
            .await?;
        Ok(guids)
    }

    /// Backfills descriptions stripped for list display: any item of `feed`
    /// with a non-empty stored description gets that stored value, replacing
    /// whatever the caller set.
    pub async fn fetch_descriptions(&self, feed: &mut Feed) -> Result<()> {
        let container_url = feed.url.clone();
        let keys: Vec<(usize, String, String)> = feed
            .items
            .iter()
            .enumerate()
            .filter_map(|(idx, item)| {
                let scope = if item.feed_url.is_empty() {
                    container_url.clone()
                } else {
                    item.feed_url.clone()
                };
                item.storage_guid().map(|guid| (idx, scope, guid))
            })
            .collect();

        let descriptions = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT description FROM items WHERE feed_url = ?1 AND guid = ?2",
                )?;
                let mut found = Vec::new();
                for (idx, feed_url, guid) in keys {
                    let description: Option<Option<String>> = stmt
                        .query_row(params![feed_url, guid], |row| row.get(0))
                        .optional()?;
                    if let Some(Some(description)) = description {
                        if !description.is_empty() {
                            found.push((idx, description));
                        }
                    }
                }
                Ok(found)
            })
            .await?;

        for (idx, description) in descriptions {
            feed.items[idx].description = Some(description);
        }
        Ok(())
    }
}
