pub const SCHEMA: &str = r#"
-- feeds table: one row per feed URL, plus conditional-fetch metadata
CREATE TABLE IF NOT EXISTS feeds (
    url TEXT PRIMARY KEY,
    title TEXT NOT NULL DEFAULT '',
    link TEXT NOT NULL DEFAULT '',
    last_modified INTEGER NOT NULL DEFAULT 0,
    etag TEXT NOT NULL DEFAULT ''
);

-- items table: articles keyed by (feed_url, guid)
CREATE TABLE IF NOT EXISTS items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    feed_url TEXT NOT NULL REFERENCES feeds(url) ON DELETE CASCADE,
    guid TEXT NOT NULL,
    title TEXT NOT NULL DEFAULT '',
    link TEXT NOT NULL DEFAULT '',
    author TEXT,
    description TEXT,
    published_at TEXT,
    enclosure_url TEXT,
    enclosure_type TEXT,
    unread INTEGER NOT NULL DEFAULT 1,
    deleted INTEGER NOT NULL DEFAULT 0,
    UNIQUE(feed_url, guid)
);

CREATE INDEX IF NOT EXISTS idx_items_feed_url ON items(feed_url);
CREATE INDEX IF NOT EXISTS idx_items_published_at ON items(published_at DESC);
CREATE INDEX IF NOT EXISTS idx_items_unread ON items(unread);
CREATE INDEX IF NOT EXISTS idx_items_deleted ON items(deleted);
"#;
