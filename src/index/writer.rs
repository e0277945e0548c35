//! Index writer
//!
//! Persists the lemma counts of a single page. Every (lemma, index) pair
//! is written as its own transaction through the shared storage handle,
//! so a failure partway leaves the already-written pairs intact and only
//! the remaining pairs for that page are abandoned.

use crate::lemma::LemmaExtractor;
use crate::storage::SharedStorage;
use crate::Result;

use std::sync::Arc;

/// Writes lemma and index rows for crawled pages
#[derive(Clone)]
pub struct IndexWriter {
    storage: SharedStorage,
    extractor: Arc<LemmaExtractor>,
}

impl IndexWriter {
    pub fn new(storage: SharedStorage, extractor: Arc<LemmaExtractor>) -> Self {
        Self { storage, extractor }
    }

    /// Extracts lemmas from a page's plain text and persists them
    ///
    /// Lemma frequency grows by one per page regardless of how many times
    /// the root occurs; index rank records the in-page occurrence count.
    /// The first failed pair aborts the remaining pairs and is returned
    /// to the caller.
    pub async fn index_page(&self, site_id: i64, page_id: i64, text: &str) -> Result<()> {
        let lemma_counts = self.extractor.collect_lemmas(text);

        let mut storage = self.storage.lock().await;
        for (lemma, count) in &lemma_counts {
            storage.write_lemma_index(site_id, page_id, lemma, *count)?;
        }

        Ok(())
    }
}
