use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tokio_rusqlite::Connection;

use crate::config::CacheConfig;
use crate::error::Result;
use crate::models::{Article, Enclosure, Feed};

use super::schema::SCHEMA;

pub(super) const ITEM_COLUMNS: &str = "feed_url, guid, title, link, author, description, \
     published_at, enclosure_url, enclosure_type, unread, deleted";

/// Handle to the article cache. One handle per database file; all operations
/// go through it, and every call materializes fresh values from storage.
///
/// Statements run on the connection's single worker thread, so writes are
/// serialized. Multi-row operations open an explicit transaction and either
/// commit whole or roll back whole.
pub struct Cache {
    pub(super) conn: Connection,
    pub(super) config: CacheConfig,
}

impl Cache {
    /// Opens (or creates) the cache database at `config.db_path` and applies
    /// the age-based retention policy, if one is configured.
    pub async fn open(config: &CacheConfig) -> Result<Self> {
        let conn = Connection::open(&config.db_path).await?;

        conn.call(|conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        let cache = Self {
            conn,
            config: config.clone(),
        };
        cache.clean_old_articles().await?;
        Ok(cache)
    }

    /// Persists a parsed feed, merging with whatever is already stored.
    ///
    /// The whole feed is one transaction. New `(feed_url, guid)` pairs are
    /// inserted with the parser's unread flag; existing rows get their
    /// content fields refreshed while unread and deleted stay untouched.
    /// Items lacking any stable key are skipped. With `skip_old_items` set
    /// and retention enabled, items older than the window are not inserted,
    /// so rows purged by the policy do not come back on the next fetch.
    pub async fn externalize_feed(&self, feed: &Feed, skip_old_items: bool) -> Result<()> {
        let url = feed.url.clone();
        let title = feed.title.clone();
        let link = feed.link.clone();
        let cutoff = if skip_old_items {
            self.retention_cutoff()
        } else {
            None
        };

        let mut rows = Vec::with_capacity(feed.items.len());
        for item in &feed.items {
            match item.storage_guid() {
                Some(guid) => rows.push((guid, item.clone())),
                None => tracing::warn!("Skipping item without guid or link in {}", feed.url),
            }
        }

        let stored = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                let mut stored = 0usize;
                {
                    tx.execute(
                        r#"INSERT INTO feeds (url, title, link) VALUES (?1, ?2, ?3)
                           ON CONFLICT(url) DO UPDATE SET
                               title = excluded.title,
                               link = excluded.link"#,
                        params![url, title, link],
                    )?;

                    let mut stmt = tx.prepare(
                        r#"INSERT INTO items (feed_url, guid, title, link, author, description,
                                              published_at, enclosure_url, enclosure_type, unread)
                           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                           ON CONFLICT(feed_url, guid) DO UPDATE SET
                               title = excluded.title,
                               link = excluded.link,
                               author = excluded.author,
                               description = excluded.description,
                               published_at = excluded.published_at,
                               enclosure_url = excluded.enclosure_url,
                               enclosure_type = excluded.enclosure_type"#,
                    )?;

                    for (guid, item) in rows {
                        if let (Some(cutoff), Some(published)) = (cutoff, item.published_at) {
                            if published < cutoff {
                                continue;
                            }
                        }
                        stmt.execute(params![
                            url,
                            guid,
                            item.title,
                            item.link,
                            item.author,
                            item.description,
                            item.published_at.map(datetime_to_sql),
                            item.enclosure.as_ref().map(|e| e.url.clone()),
                            item.enclosure.as_ref().map(|e| e.mime_type.clone()),
                            item.unread,
                        ])?;
                        stored += 1;
                    }
                }
                tx.commit()?;
                Ok(stored)
            })
            .await?;

        tracing::debug!("Externalized {} items for {}", stored, feed.url);
        Ok(())
    }

    /// Reconstructs a feed from storage. Unknown URLs yield an empty feed.
    ///
    /// Live items come back newest first, with the unread flags exactly as
    /// stored. `ignore` returns true for items to leave out of the result;
    /// rejected items stay in storage untouched.
    pub async fn internalize_feed<F>(&self, feed_url: &str, ignore: F) -> Result<Feed>
    where
        F: Fn(&Article) -> bool,
    {
        let url = feed_url.to_string();
        let loaded = self
            .conn
            .call(move |conn| {
                let meta = conn
                    .query_row(
                        "SELECT title, link FROM feeds WHERE url = ?1",
                        params![url],
                        |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
                    )
                    .optional()?;

                let mut items = Vec::new();
                if meta.is_some() {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {ITEM_COLUMNS} FROM items
                         WHERE feed_url = ?1 AND deleted = 0
                         ORDER BY published_at DESC NULLS LAST, id DESC"
                    ))?;
                    items = stmt
                        .query_map(params![url], |row| Ok(article_from_row(row)))?
                        .collect::<std::result::Result<Vec<_>, _>>()?;
                }
                Ok((meta, items))
            })
            .await?;

        let mut feed = Feed::new(feed_url);
        let (meta, items) = loaded;
        let Some((title, link)) = meta else {
            tracing::debug!("No cached feed for {}", feed_url);
            return Ok(feed);
        };
        feed.title = title;
        feed.link = link;
        feed.items = items.into_iter().filter(|item| !ignore(item)).collect();
        Ok(feed)
    }

    /// Compacts the database file. Run after the quit-time cleanup.
    pub async fn vacuum(&self) -> Result<()> {
        self.conn
            .call(|conn| {
                conn.execute("VACUUM", [])?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    pub(super) fn retention_cutoff(&self) -> Option<DateTime<Utc>> {
        self.config
            .retention_days()
            .map(|days| Utc::now() - Duration::days(days))
    }
}

/// Single text encoding for timestamps so that string comparison in SQL
/// agrees with chronological order.
pub(super) fn datetime_to_sql(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub(super) fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    // Try RFC3339 first (e.g., "2026-01-11T12:34:56Z")
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // Try SQLite datetime format (e.g., "2026-01-11 12:34:56")
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    None
}

pub(super) fn article_from_row(row: &Row) -> Article {
    let enclosure_url: Option<String> = row.get(7).unwrap();
    let enclosure_type: Option<String> = row.get(8).unwrap();
    Article {
        feed_url: row.get(0).unwrap(),
        guid: row.get(1).unwrap(),
        title: row.get(2).unwrap(),
        link: row.get(3).unwrap(),
        author: row.get(4).unwrap(),
        description: row.get(5).unwrap(),
        published_at: row
            .get::<_, Option<String>>(6)
            .unwrap()
            .and_then(|s| parse_datetime(&s)),
        enclosure: enclosure_url.map(|url| Enclosure {
            url,
            mime_type: enclosure_type.unwrap_or_default(),
        }),
        unread: row.get::<_, i64>(9).unwrap() != 0,
        deleted: row.get::<_, i64>(10).unwrap() != 0,
    }
}
