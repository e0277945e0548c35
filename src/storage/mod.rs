//! Storage module for the site/page/lemma/index tables
//!
//! This module handles all database operations for the search engine:
//! - SQLite database initialization and schema management
//! - Site lifecycle (destructive replace, status transitions)
//! - Page persistence with per-site path uniqueness
//! - Lemma frequency and index rank upserts
//! - Lookups backing the query-time ranking pipeline

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::KorniError;

use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Storage handle shared across crawl units
///
/// All writes for a run go through this single handle, so
/// lemma-frequency and index-rank upserts from pages processed in
/// parallel are serialized and cannot lose updates.
pub type SharedStorage = Arc<Mutex<dyn Storage + Send>>;

/// Wraps a storage implementation into a shareable handle
pub fn shared<S: Storage + Send + 'static>(storage: S) -> SharedStorage {
    Arc::new(Mutex::new(storage))
}

/// Initializes or opens a storage database
pub fn open_storage(path: &Path) -> Result<SqliteStorage, KorniError> {
    SqliteStorage::new(path)
}

/// Indexing status of a site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteStatus {
    Indexing,
    Indexed,
    Failed,
}

impl SiteStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Indexing => "INDEXING",
            Self::Indexed => "INDEXED",
            Self::Failed => "FAILED",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "INDEXING" => Some(Self::Indexing),
            "INDEXED" => Some(Self::Indexed),
            "FAILED" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// Represents a site row
#[derive(Debug, Clone)]
pub struct SiteRecord {
    pub id: i64,
    pub url: String,
    pub name: String,
    pub status: SiteStatus,
    pub status_time: String,
    pub last_error: Option<String>,
}

/// Represents a page row
///
/// Pages are immutable once created: one row per discovered path per site.
#[derive(Debug, Clone)]
pub struct PageRecord {
    pub id: i64,
    pub site_id: i64,
    pub path: String,
    pub code: u16,
    pub content: String,
    pub title: Option<String>,
}

/// Represents a lemma row: a normalized root scoped to one site
///
/// `frequency` counts the pages on the site containing the lemma at least
/// once, never the raw occurrence count.
#[derive(Debug, Clone)]
pub struct LemmaRecord {
    pub id: i64,
    pub site_id: i64,
    pub lemma: String,
    pub frequency: u32,
}

/// Represents an index row: the page-lemma edge with its relevance rank
#[derive(Debug, Clone)]
pub struct IndexRecord {
    pub id: i64,
    pub page_id: i64,
    pub lemma_id: i64,
    pub rank: f32,
}
