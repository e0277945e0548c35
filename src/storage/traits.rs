//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::storage::{IndexRecord, LemmaRecord, PageRecord, SiteRecord, SiteStatus};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Site not found: {0}")]
    SiteNotFound(String),

    #[error("Page not found: {0}")]
    PageNotFound(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Defines every table operation the crawler, indexer, and search engine
/// need. Callers serialize access through a shared mutex, which makes each
/// lemma/index upsert a single-writer unit.
pub trait Storage {
    // ===== Site Management =====

    /// Replaces any prior site row for the URL with a fresh INDEXING row
    ///
    /// A crawl restart is destructive: the old row and all of its pages,
    /// lemmas, and index rows are deleted before the new row is inserted.
    ///
    /// Returns the new site ID.
    fn replace_site(&mut self, url: &str, name: &str) -> StorageResult<i64>;

    /// Finds a site by its configured URL
    fn find_site_by_url(&self, url: &str) -> StorageResult<Option<SiteRecord>>;

    /// Transitions a site to a new status, stamping status_time
    fn update_site_status(
        &mut self,
        site_id: i64,
        status: SiteStatus,
        last_error: Option<&str>,
    ) -> StorageResult<()>;

    // ===== Page Management =====

    /// Inserts a page row for (site, path)
    ///
    /// Returns `None` when a row for the path already exists under the site;
    /// the duplicate-key race between sibling crawl units is absorbed here
    /// and never surfaced.
    fn insert_page(
        &mut self,
        site_id: i64,
        path: &str,
        code: u16,
        content: &str,
        title: Option<&str>,
    ) -> StorageResult<Option<i64>>;

    /// Whether a page row exists for (site, path)
    fn page_exists(&self, site_id: i64, path: &str) -> StorageResult<bool>;

    /// Gets a page by ID
    fn get_page(&self, page_id: i64) -> StorageResult<PageRecord>;

    // ===== Lemma / Index Writes =====

    /// Writes one (lemma, index) pair for a page as an atomic unit
    ///
    /// Upserts the lemma row (frequency starts at 1, otherwise +1, once per
    /// page regardless of `count`), upserts the index row with
    /// rank += `count`, and touches the site's status_time, all in one
    /// transaction. A failure leaves previously written pairs intact.
    fn write_lemma_index(
        &mut self,
        site_id: i64,
        page_id: i64,
        lemma: &str,
        count: u32,
    ) -> StorageResult<()>;

    // ===== Search Lookups =====

    /// Finds the lemma row for (site, lemma)
    fn find_lemma(&self, site_id: i64, lemma: &str) -> StorageResult<Option<LemmaRecord>>;

    /// All index rows for a lemma, ordered by page ID (discovery order)
    fn indexes_for_lemma(&self, lemma_id: i64) -> StorageResult<Vec<IndexRecord>>;

    /// Finds the index row for (page, lemma)
    fn find_index(&self, page_id: i64, lemma_id: i64) -> StorageResult<Option<IndexRecord>>;

    // ===== Statistics =====

    /// Number of pages stored for a site
    fn count_pages(&self, site_id: i64) -> StorageResult<u64>;

    /// Number of lemma rows stored for a site
    fn count_lemmas(&self, site_id: i64) -> StorageResult<u64>;
}
