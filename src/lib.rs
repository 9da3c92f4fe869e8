//! Persistence and reconciliation layer for a terminal RSS reader.
//!
//! The [`Cache`] merges freshly parsed feeds into SQLite storage
//! ([`Cache::externalize_feed`]) and rebuilds in-memory feeds from it
//! ([`Cache::internalize_feed`]) without ever losing the user's read state:
//! once an article row exists, re-fetching the feed refreshes its content
//! but leaves the unread flag alone. Retention policies
//! ([`Cache::clean_old_articles`], [`Cache::cleanup_cache`]) bound storage
//! growth, and a query surface answers unread counts, substring search and
//! conditional-fetch metadata lookups directly from storage.
//!
//! Feed fetching, parsing and the UI live elsewhere; this crate consumes
//! already-parsed [`Feed`] values and a caller-supplied ignore predicate.

pub mod config;
pub mod db;
pub mod error;
pub mod models;

pub use config::CacheConfig;
pub use db::Cache;
pub use error::{AppError, Result};
pub use models::{Article, Enclosure, Feed, FetchMeta};
