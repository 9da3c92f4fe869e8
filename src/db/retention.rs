use rusqlite::{params, params_from_iter};

use crate::error::Result;
use crate::models::Feed;

use super::cache::{datetime_to_sql, Cache};

impl Cache {
    /// Deletes every article whose publication date falls outside the
    /// configured retention window. Age is the sole criterion; read state
    /// does not matter. A no-op when `keep_articles_days` is 0 (or below).
    pub async fn clean_old_articles(&self) -> Result<()> {
        let Some(cutoff) = self.retention_cutoff() else {
            return Ok(());
        };

        let cutoff = datetime_to_sql(cutoff);
        let purged = self
            .conn
            .call(move |conn| {
                let purged = conn.execute(
                    "DELETE FROM items WHERE published_at IS NOT NULL AND published_at < ?1",
                    params![cutoff],
                )?;
                Ok(purged)
            })
            .await?;

        if purged > 0 {
            tracing::debug!(
                "Purged {} articles older than {} days",
                purged,
                self.config.keep_articles_days
            );
        }
        Ok(())
    }

    /// Reconciles storage against the set of feed URLs the application still
    /// tracks. Meant for the shutdown path; does nothing unless
    /// `cleanup_on_quit` is set.
    ///
    /// Feeds absent from `tracked_feed_urls` are purged entirely (metadata
    /// row and items). Soft-deleted items are dropped for good. When
    /// `delete_read_articles_on_quit` is also set, read items of the kept
    /// feeds go too; unread items are retained regardless of age. The three
    /// deletions cover disjoint rows, so their order is immaterial.
    pub async fn cleanup_cache(&self, tracked_feed_urls: &[String]) -> Result<()> {
        if !self.config.cleanup_on_quit {
            return Ok(());
        }

        let delete_read = self.config.delete_read_articles_on_quit;
        let urls = tracked_feed_urls.to_vec();
        let (dropped_feeds, dropped_items) = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                let dropped_feeds;
                let mut dropped_items = 0usize;
                {
                    if urls.is_empty() {
                        dropped_feeds = tx.execute("DELETE FROM feeds", [])?;
                    } else {
                        let placeholders = vec!["?"; urls.len()].join(", ");
                        let sql =
                            format!("DELETE FROM feeds WHERE url NOT IN ({placeholders})");
                        dropped_feeds = tx.execute(&sql, params_from_iter(urls.iter()))?;
                    }

                    dropped_items += tx.execute("DELETE FROM items WHERE deleted = 1", [])?;
                    if delete_read {
                        dropped_items += tx.execute("DELETE FROM items WHERE unread = 0", [])?;
                    }
                }
                tx.commit()?;
                Ok((dropped_feeds, dropped_items))
            })
            .await?;

        tracing::debug!(
            "Cleanup dropped {} untracked feeds and {} items",
            dropped_feeds,
            dropped_items
        );
        Ok(())
    }

    /// Ends the soft-delete grace period for `feed`: rows marked deleted
    /// whose GUIDs no longer appear in the freshly fetched document are
    /// removed for good. Rows still present in the document stay, so they
    /// are not re-inserted as new on the next externalize.
    pub async fn remove_old_deleted_items(&self, feed: &Feed) -> Result<()> {
        let url = feed.url.clone();
        let guids: Vec<String> = feed
            .items
            .iter()
            .filter_map(|item| item.storage_guid())
            .collect();

        self.conn
            .call(move |conn| {
                if guids.is_empty() {
                    conn.execute(
                        "DELETE FROM items WHERE feed_url = ?1 AND deleted = 1",
                        params![url],
                    )?;
                } else {
                    let placeholders = vec!["?"; guids.len()].join(", ");
                    let sql = format!(
                        "DELETE FROM items
                         WHERE feed_url = ? AND deleted = 1 AND guid NOT IN ({placeholders})"
                    );
                    conn.execute(
                        &sql,
                        params_from_iter(std::iter::once(url).chain(guids)),
                    )?;
                }
                Ok(())
            })
            .await?;
        Ok(())
    }
}
