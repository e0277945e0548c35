//! Crawler module for recursive site discovery
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with rate-limit pacing
//! - HTML parsing and link extraction
//! - The recursive fork/join walker with cooperative cancellation

mod fetcher;
mod parser;
mod walker;

pub use fetcher::{build_http_client, fetch_page, FetchOutcome, FetchedPage};
pub use parser::{extract_title, parse_html, plain_text, ParsedPage};
pub use walker::{CrawlEnd, SiteWalker, STOPPED_BY_USER};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cooperative cancellation handle for one indexing run
///
/// Every crawl unit of a run carries a clone of this handle and checks it
/// after processing each eligible link. Stopping is cooperative: units
/// already past their check point finish their current fetch before
/// observing the change.
#[derive(Debug, Clone, Default)]
pub struct CrawlSignal {
    running: Arc<AtomicBool>,
}

impl CrawlSignal {
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Marks the run as in progress
    pub fn start(&self) {
        self.running.store(true, Ordering::SeqCst);
    }

    /// Requests a cooperative stop
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}
