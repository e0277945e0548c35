//! Statistics over the stored index
//!
//! One detailed entry per configured site plus aggregate totals,
//! mirroring what the crawl has actually persisted. Sites never crawled
//! report a NOT INDEXED placeholder status.

use crate::config::Config;
use crate::crawler::CrawlSignal;
use crate::storage::SharedStorage;
use crate::Result;

use chrono::DateTime;

/// Placeholder status for a configured site with no stored state
pub const NOT_INDEXED: &str = "NOT INDEXED";

/// Aggregate counters across all configured sites
#[derive(Debug, Clone)]
pub struct TotalStatistics {
    pub sites: usize,
    pub pages: u64,
    pub lemmas: u64,
    pub indexing: bool,
}

/// Per-site statistics entry
#[derive(Debug, Clone)]
pub struct SiteStatistics {
    pub url: String,
    pub name: String,
    pub status: String,
    /// Milliseconds since the Unix epoch of the last status change
    pub status_time: i64,
    pub last_error: Option<String>,
    pub pages: u64,
    pub lemmas: u64,
}

/// A complete statistics report
#[derive(Debug, Clone)]
pub struct StatisticsReport {
    pub total: TotalStatistics,
    pub detailed: Vec<SiteStatistics>,
}

/// Builds statistics reports from configuration and storage
pub struct StatisticsService {
    config: Config,
    storage: SharedStorage,
    signal: CrawlSignal,
}

impl StatisticsService {
    pub fn new(config: Config, storage: SharedStorage, signal: CrawlSignal) -> Self {
        Self {
            config,
            storage,
            signal,
        }
    }

    pub async fn collect(&self) -> Result<StatisticsReport> {
        let storage = self.storage.lock().await;

        let mut detailed = Vec::with_capacity(self.config.sites.len());
        let mut total_pages = 0;
        let mut total_lemmas = 0;

        for site in &self.config.sites {
            let entry = match storage.find_site_by_url(&site.url)? {
                Some(row) => {
                    let pages = storage.count_pages(row.id)?;
                    let lemmas = storage.count_lemmas(row.id)?;
                    SiteStatistics {
                        url: site.url.clone(),
                        name: site.name.clone(),
                        status: row.status.to_db_string().to_string(),
                        status_time: status_time_millis(&row.status_time),
                        last_error: row.last_error,
                        pages,
                        lemmas,
                    }
                }
                None => SiteStatistics {
                    url: site.url.clone(),
                    name: site.name.clone(),
                    status: NOT_INDEXED.to_string(),
                    status_time: 0,
                    last_error: None,
                    pages: 0,
                    lemmas: 0,
                },
            };

            total_pages += entry.pages;
            total_lemmas += entry.lemmas;
            detailed.push(entry);
        }

        Ok(StatisticsReport {
            total: TotalStatistics {
                sites: self.config.sites.len(),
                pages: total_pages,
                lemmas: total_lemmas,
                indexing: self.signal.is_running(),
            },
            detailed,
        })
    }
}

fn status_time_millis(rfc3339: &str) -> i64 {
    DateTime::parse_from_rfc3339(rfc3339)
        .map(|t| t.timestamp_millis())
        .unwrap_or_default()
}
