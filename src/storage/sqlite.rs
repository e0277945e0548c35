//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{IndexRecord, LemmaRecord, PageRecord, SiteRecord, SiteStatus};
use crate::KorniError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance at the given path
    pub fn new(path: &Path) -> Result<Self, KorniError> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self, KorniError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn row_to_site(row: &rusqlite::Row<'_>) -> rusqlite::Result<SiteRecord> {
        Ok(SiteRecord {
            id: row.get(0)?,
            url: row.get(1)?,
            name: row.get(2)?,
            status: SiteStatus::from_db_string(&row.get::<_, String>(3)?)
                .unwrap_or(SiteStatus::Failed),
            status_time: row.get(4)?,
            last_error: row.get(5)?,
        })
    }

    fn row_to_page(row: &rusqlite::Row<'_>) -> rusqlite::Result<PageRecord> {
        Ok(PageRecord {
            id: row.get(0)?,
            site_id: row.get(1)?,
            path: row.get(2)?,
            code: row.get(3)?,
            content: row.get(4)?,
            title: row.get(5)?,
        })
    }
}

impl Storage for SqliteStorage {
    // ===== Site Management =====

    fn replace_site(&mut self, url: &str, name: &str) -> StorageResult<i64> {
        let tx = self.conn.transaction()?;

        // Cascades to pages, lemmas, and index rows
        tx.execute("DELETE FROM sites WHERE url = ?1", params![url])?;

        let now = Utc::now().to_rfc3339();
        tx.execute(
            "INSERT INTO sites (url, name, status, status_time) VALUES (?1, ?2, ?3, ?4)",
            params![url, name, SiteStatus::Indexing.to_db_string(), now],
        )?;
        let site_id = tx.last_insert_rowid();

        tx.commit()?;
        Ok(site_id)
    }

    fn find_site_by_url(&self, url: &str) -> StorageResult<Option<SiteRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, url, name, status, status_time, last_error FROM sites WHERE url = ?1",
        )?;

        let site = stmt
            .query_row(params![url], Self::row_to_site)
            .optional()?;

        Ok(site)
    }

    fn update_site_status(
        &mut self,
        site_id: i64,
        status: SiteStatus,
        last_error: Option<&str>,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "UPDATE sites SET status = ?1, status_time = ?2, last_error = ?3 WHERE id = ?4",
            params![status.to_db_string(), now, last_error, site_id],
        )?;
        Ok(())
    }

    // ===== Page Management =====

    fn insert_page(
        &mut self,
        site_id: i64,
        path: &str,
        code: u16,
        content: &str,
        title: Option<&str>,
    ) -> StorageResult<Option<i64>> {
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO pages (site_id, path, code, content, title)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![site_id, path, code, content, title],
        )?;

        if changed == 0 {
            // A sibling crawl unit won the race for this path
            return Ok(None);
        }

        Ok(Some(self.conn.last_insert_rowid()))
    }

    fn page_exists(&self, site_id: i64, path: &str) -> StorageResult<bool> {
        let existing: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM pages WHERE site_id = ?1 AND path = ?2",
                params![site_id, path],
                |row| row.get(0),
            )
            .optional()?;

        Ok(existing.is_some())
    }

    fn get_page(&self, page_id: i64) -> StorageResult<PageRecord> {
        let mut stmt = self.conn.prepare(
            "SELECT id, site_id, path, code, content, title FROM pages WHERE id = ?1",
        )?;

        let page = stmt
            .query_row(params![page_id], Self::row_to_page)
            .map_err(|_| StorageError::PageNotFound(page_id))?;

        Ok(page)
    }

    // ===== Lemma / Index Writes =====

    fn write_lemma_index(
        &mut self,
        site_id: i64,
        page_id: i64,
        lemma: &str,
        count: u32,
    ) -> StorageResult<()> {
        let tx = self.conn.transaction()?;

        // One frequency increment per page, regardless of occurrence count
        tx.execute(
            "INSERT INTO lemmas (site_id, lemma, frequency) VALUES (?1, ?2, 1)
             ON CONFLICT(site_id, lemma) DO UPDATE SET frequency = frequency + 1",
            params![site_id, lemma],
        )?;

        let lemma_id: i64 = tx.query_row(
            "SELECT id FROM lemmas WHERE site_id = ?1 AND lemma = ?2",
            params![site_id, lemma],
            |row| row.get(0),
        )?;

        tx.execute(
            "INSERT INTO indexes (page_id, lemma_id, rank) VALUES (?1, ?2, ?3)
             ON CONFLICT(page_id, lemma_id) DO UPDATE SET rank = rank + excluded.rank",
            params![page_id, lemma_id, count as f64],
        )?;

        let now = Utc::now().to_rfc3339();
        tx.execute(
            "UPDATE sites SET status_time = ?1 WHERE id = ?2",
            params![now, site_id],
        )?;

        tx.commit()?;
        Ok(())
    }

    // ===== Search Lookups =====

    fn find_lemma(&self, site_id: i64, lemma: &str) -> StorageResult<Option<LemmaRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, site_id, lemma, frequency FROM lemmas WHERE site_id = ?1 AND lemma = ?2",
        )?;

        let record = stmt
            .query_row(params![site_id, lemma], |row| {
                Ok(LemmaRecord {
                    id: row.get(0)?,
                    site_id: row.get(1)?,
                    lemma: row.get(2)?,
                    frequency: row.get(3)?,
                })
            })
            .optional()?;

        Ok(record)
    }

    fn indexes_for_lemma(&self, lemma_id: i64) -> StorageResult<Vec<IndexRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, page_id, lemma_id, rank FROM indexes WHERE lemma_id = ?1 ORDER BY page_id",
        )?;

        let records = stmt
            .query_map(params![lemma_id], |row| {
                Ok(IndexRecord {
                    id: row.get(0)?,
                    page_id: row.get(1)?,
                    lemma_id: row.get(2)?,
                    rank: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    fn find_index(&self, page_id: i64, lemma_id: i64) -> StorageResult<Option<IndexRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, page_id, lemma_id, rank FROM indexes WHERE page_id = ?1 AND lemma_id = ?2",
        )?;

        let record = stmt
            .query_row(params![page_id, lemma_id], |row| {
                Ok(IndexRecord {
                    id: row.get(0)?,
                    page_id: row.get(1)?,
                    lemma_id: row.get(2)?,
                    rank: row.get(3)?,
                })
            })
            .optional()?;

        Ok(record)
    }

    // ===== Statistics =====

    fn count_pages(&self, site_id: i64) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM pages WHERE site_id = ?1",
            params![site_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_lemmas(&self, site_id: i64) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM lemmas WHERE site_id = ?1",
            params![site_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}
