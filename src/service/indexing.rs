//! Indexing orchestration
//!
//! Dispatches one crawl per configured site on a bounded pool and owns
//! the site status transitions around each crawl. A failed crawl marks
//! its site FAILED with the error text; other sites continue.

use crate::config::{Config, SiteConfig};
use crate::crawler::{build_http_client, CrawlEnd, CrawlSignal, SiteWalker};
use crate::index::IndexWriter;
use crate::lemma::LemmaExtractor;
use crate::storage::{SharedStorage, SiteStatus};
use crate::{KorniError, Result};

use reqwest::Client;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info};

/// Starts and stops crawls for the configured sites
#[derive(Clone)]
pub struct IndexingService {
    config: Config,
    storage: SharedStorage,
    extractor: Arc<LemmaExtractor>,
    signal: CrawlSignal,
}

impl IndexingService {
    pub fn new(
        config: Config,
        storage: SharedStorage,
        extractor: Arc<LemmaExtractor>,
        signal: CrawlSignal,
    ) -> Self {
        Self {
            config,
            storage,
            extractor,
            signal,
        }
    }

    /// Requests a cooperative stop of all in-flight crawls
    pub fn stop(&self) {
        self.signal.stop();
    }

    /// Indexes every configured site, each from a fresh state
    ///
    /// Root dispatch is bounded to the machine's available parallelism;
    /// the recursive fan-out below each root is unbounded. A site whose
    /// crawl fails is marked FAILED and does not stop the others.
    pub async fn index_all_sites(&self) -> Result<()> {
        self.signal.start();

        let client = build_http_client(&self.config.connection)?;
        let parallelism = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let permits = Arc::new(Semaphore::new(parallelism));

        let mut crawls: JoinSet<()> = JoinSet::new();
        for site in self.config.sites.clone() {
            let service = self.clone();
            let client = client.clone();
            let permits = Arc::clone(&permits);

            crawls.spawn(async move {
                let Ok(_permit) = permits.acquire().await else {
                    return;
                };
                service.index_site(&client, site).await;
            });
        }

        while let Some(joined) = crawls.join_next().await {
            joined?;
        }

        Ok(())
    }

    /// Indexes a single page, gated to the configured site owning it
    pub async fn index_page(&self, url: &str) -> Result<()> {
        let site = self
            .config
            .site_for_url(url)
            .cloned()
            .ok_or_else(|| KorniError::PageOutsideSites(url.to_string()))?;

        self.signal.start();
        let client = build_http_client(&self.config.connection)?;

        let site_id = {
            let mut storage = self.storage.lock().await;
            match storage.find_site_by_url(&site.url)? {
                Some(row) => row.id,
                None => storage.replace_site(&site.url, &site.name)?,
            }
        };

        self.run_walker(&client, &site, site_id, url).await
    }

    /// One full-site crawl: destructive restart, walk, final status
    async fn index_site(&self, client: &Client, site: SiteConfig) {
        info!(site = %site.url, "Indexing site");

        let site_id = {
            let mut storage = self.storage.lock().await;
            match storage.replace_site(&site.url, &site.name) {
                Ok(id) => id,
                Err(e) => {
                    error!(site = %site.url, error = %e, "Could not reset site state");
                    return;
                }
            }
        };

        if let Err(e) = self.run_walker(client, &site, site_id, &site.url).await {
            error!(site = %site.url, error = %e, "Site indexing failed");
            let mut storage = self.storage.lock().await;
            if let Err(e) = storage.update_site_status(
                site_id,
                SiteStatus::Failed,
                Some(&e.to_string()),
            ) {
                error!(site = %site.url, error = %e, "Could not record failure");
            }
        }
    }

    /// Runs a walker from `start_url` and applies the terminal status
    ///
    /// A crawl-level error is returned for the caller to record as
    /// FAILED; cancellation has already been recorded by the walker.
    async fn run_walker(
        &self,
        client: &Client,
        site: &SiteConfig,
        site_id: i64,
        start_url: &str,
    ) -> Result<()> {
        let writer = IndexWriter::new(Arc::clone(&self.storage), Arc::clone(&self.extractor));
        let walker = Arc::new(SiteWalker::new(
            client.clone(),
            self.config.connection.clone(),
            Arc::clone(&self.storage),
            writer,
            self.signal.clone(),
            site_id,
            site.url.clone(),
        ));

        match walker.run(start_url).await? {
            CrawlEnd::Completed => {
                let mut storage = self.storage.lock().await;
                storage.update_site_status(site_id, SiteStatus::Indexed, None)?;
                info!(site = %site.url, "Site indexed");
            }
            CrawlEnd::Stopped => {
                info!(site = %site.url, "Indexing stopped before completion");
            }
        }

        Ok(())
    }
}
