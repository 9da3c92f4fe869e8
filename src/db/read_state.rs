use rusqlite::{params, OptionalExtension};

use crate::error::Result;
use crate::models::{Feed, FetchMeta};

use super::cache::Cache;

impl Cache {
    /// Marks every live item in the cache read.
    pub async fn catchup_all(&self) -> Result<()> {
        self.conn
            .call(|conn| {
                conn.execute("UPDATE items SET unread = 0 WHERE deleted = 0", [])?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    /// Marks every live item of one feed URL read.
    pub async fn catchup_feed(&self, feed_url: &str) -> Result<()> {
        let url = feed_url.to_string();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "UPDATE items SET unread = 0 WHERE feed_url = ?1 AND deleted = 0",
                    params![url],
                )?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    /// Marks read exactly the items listed in `feed`, each under its own
    /// `(feed_url, guid)` key. Sibling items of the same feed URL that are
    /// absent from `feed` keep their state.
    pub async fn catchup_items(&self, feed: &Feed) -> Result<()> {
        let container_url = feed.url.clone();
        let keys: Vec<(String, String)> = feed
            .items
            .iter()
            .filter_map(|item| {
                let scope = if item.feed_url.is_empty() {
                    container_url.clone()
                } else {
                    item.feed_url.clone()
                };
                item.storage_guid().map(|guid| (scope, guid))
            })
            .collect();

        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                {
                    let mut stmt = tx.prepare(
                        "UPDATE items SET unread = 0 WHERE feed_url = ?1 AND guid = ?2",
                    )?;
                    for (feed_url, guid) in keys {
                        stmt.execute(params![feed_url, guid])?;
                    }
                }
                tx.commit()?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    /// Explicit write-back for the unread flag of one stored item. Query
    /// results are value copies, so toggling a flag on one of them changes
    /// nothing until it lands here.
    pub async fn set_item_unread(&self, feed_url: &str, guid: &str, unread: bool) -> Result<()> {
        let url = feed_url.to_string();
        let guid = guid.to_string();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "UPDATE items SET unread = ?1 WHERE feed_url = ?2 AND guid = ?3",
                    params![unread, url, guid],
                )?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    /// Soft-deletes (or restores) one stored item. Deleted rows are hidden
    /// from internalize and queries until the cleanup pass drops them.
    pub async fn set_item_deleted(&self, feed_url: &str, guid: &str, deleted: bool) -> Result<()> {
        let url = feed_url.to_string();
        let guid = guid.to_string();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "UPDATE items SET deleted = ?1 WHERE feed_url = ?2 AND guid = ?3",
                    params![deleted, url, guid],
                )?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    /// Stores the conditional-fetch headers of the last successful download.
    /// Servers usually return only one of the two; a zero timestamp or empty
    /// etag does not clobber the stored counterpart unless both are given.
    pub async fn update_lastmodified(
        &self,
        feed_url: &str,
        last_modified: i64,
        etag: &str,
    ) -> Result<()> {
        let url = feed_url.to_string();
        let etag = etag.to_string();
        self.conn
            .call(move |conn| {
                if last_modified != 0 && !etag.is_empty() {
                    conn.execute(
                        "UPDATE feeds SET last_modified = ?1, etag = ?2 WHERE url = ?3",
                        params![last_modified, etag, url],
                    )?;
                } else if last_modified != 0 {
                    conn.execute(
                        "UPDATE feeds SET last_modified = ?1 WHERE url = ?2",
                        params![last_modified, url],
                    )?;
                } else if !etag.is_empty() {
                    conn.execute(
                        "UPDATE feeds SET etag = ?1 WHERE url = ?2",
                        params![etag, url],
                    )?;
                }
                Ok(())
            })
            .await?;
        Ok(())
    }

    /// Reads back the stored conditional-fetch metadata. Unknown feeds yield
    /// the zero value; an empty etag comes back as the empty string it is.
    pub async fn fetch_lastmodified(&self, feed_url: &str) -> Result<FetchMeta> {
        let url = feed_url.to_string();
        let meta = self
            .conn
            .call(move |conn| {
                let meta = conn
                    .query_row(
                        "SELECT last_modified, etag FROM feeds WHERE url = ?1",
                        params![url],
                        |row| {
                            Ok(FetchMeta {
                                last_modified: row.get(0)?,
                                etag: row.get(1)?,
                            })
                        },
                    )
                    .optional()?;
                Ok(meta)
            })
            .await?;
        Ok(meta.unwrap_or_default())
    }
}
