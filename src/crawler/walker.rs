//! Recursive site walker
//!
//! One `SiteWalker` drives the crawl of a single site: a parent crawl
//! unit fetches eligible links, persists and indexes each page, then
//! forks one child unit per link and waits for the whole subtree to
//! finish before it is itself done. Cancellation is cooperative: every
//! unit checks the shared signal after each eligible link.

use crate::config::ConnectionConfig;
use crate::crawler::{fetch_page, parse_html, plain_text, CrawlSignal, FetchOutcome};
use crate::index::IndexWriter;
use crate::storage::{SharedStorage, SiteStatus};
use crate::url::{canonical_path, is_eligible_link};
use crate::{KorniError, Result};

use reqwest::Client;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use url::Url;

/// Error message recorded on a site when a crawl is stopped by request
pub const STOPPED_BY_USER: &str = "Indexing stopped by user";

/// How a crawl subtree ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlEnd {
    /// Every reachable page was processed
    Completed,

    /// The cancellation signal was observed; the site is already FAILED
    Stopped,
}

/// Recursive fork/join crawler for one site
pub struct SiteWalker {
    client: Client,
    connection: ConnectionConfig,
    storage: SharedStorage,
    writer: IndexWriter,
    signal: CrawlSignal,
    site_id: i64,
    root_prefix: String,
}

impl SiteWalker {
    pub fn new(
        client: Client,
        connection: ConnectionConfig,
        storage: SharedStorage,
        writer: IndexWriter,
        signal: CrawlSignal,
        site_id: i64,
        root_prefix: String,
    ) -> Self {
        Self {
            client,
            connection,
            storage,
            writer,
            signal,
            site_id,
            root_prefix,
        }
    }

    /// Crawls the subtree rooted at `start_url`
    ///
    /// The start node itself is fetched, persisted, and indexed here; an
    /// unreachable start node is a crawl-level failure and is returned as
    /// an error. Everything below it is walked recursively.
    pub async fn run(self: Arc<Self>, start_url: &str) -> Result<CrawlEnd> {
        info!(url = start_url, "Starting crawl");

        let page = match fetch_page(&self.client, start_url, &self.connection).await {
            FetchOutcome::Fetched(page) => page,
            FetchOutcome::Timeout => {
                return Err(KorniError::Timeout {
                    url: start_url.to_string(),
                })
            }
            FetchOutcome::ConnectionFailed(reason) | FetchOutcome::Other(reason) => {
                return Err(KorniError::Fetch {
                    url: start_url.to_string(),
                    reason,
                });
            }
        };

        let path = canonical_path(start_url)
            .ok_or_else(|| crate::UrlError::Parse(start_url.to_string()))?;
        let title = crate::crawler::extract_title(&page.body);

        let page_id = {
            let mut storage = self.storage.lock().await;
            storage.insert_page(
                self.site_id,
                &path,
                page.status_code,
                &page.body,
                title.as_deref(),
            )?
        };

        if page.is_dead_end() {
            debug!(url = start_url, code = page.status_code, "Start node is a dead end");
            return Ok(CrawlEnd::Completed);
        }

        if let Some(page_id) = page_id {
            if let Err(e) = self
                .writer
                .index_page(self.site_id, page_id, &plain_text(&page.body))
                .await
            {
                warn!(url = start_url, error = %e, "Indexing failed for page, continuing");
            }
        }

        if !self.signal.is_running() {
            self.mark_stopped().await?;
            return Ok(CrawlEnd::Stopped);
        }

        self.crawl_node(start_url.to_string(), page.body).await
    }

    /// Processes one already-fetched node: enumerate its links, persist
    /// and index each eligible one, then fork a child unit per link and
    /// join them all.
    fn crawl_node(
        self: Arc<Self>,
        url: String,
        body: String,
    ) -> Pin<Box<dyn Future<Output = Result<CrawlEnd>> + Send>> {
        Box::pin(async move {
            let base_url = Url::parse(&url)?;
            let parsed = parse_html(&body, &base_url);

            let mut children: JoinSet<Result<CrawlEnd>> = JoinSet::new();
            let mut end = CrawlEnd::Completed;

            for link in parsed.links {
                if !self.link_is_new(&link).await? {
                    continue;
                }

                match fetch_page(&self.client, &link, &self.connection).await {
                    FetchOutcome::Fetched(page) => {
                        if let Some(path) = canonical_path(&link) {
                            let title = crate::crawler::extract_title(&page.body);
                            let inserted = {
                                let mut storage = self.storage.lock().await;
                                storage.insert_page(
                                    self.site_id,
                                    &path,
                                    page.status_code,
                                    &page.body,
                                    title.as_deref(),
                                )?
                            };

                            // None means a sibling unit won the insert race;
                            // that unit owns the page and its subtree.
                            let Some(page_id) = inserted else {
                                continue;
                            };

                            if page.is_dead_end() {
                                debug!(url = %link, code = page.status_code, "Dead end");
                            } else {
                                if let Err(e) = self
                                    .writer
                                    .index_page(self.site_id, page_id, &plain_text(&page.body))
                                    .await
                                {
                                    warn!(url = %link, error = %e, "Indexing failed for page, continuing");
                                }

                                let walker = Arc::clone(&self);
                                let child_link = link.clone();
                                let child_body = page.body;
                                children
                                    .spawn(async move { walker.crawl_node(child_link, child_body).await });
                            }
                        }
                    }
                    FetchOutcome::Timeout => {
                        debug!(url = %link, "Fetch timed out, skipping link");
                    }
                    FetchOutcome::ConnectionFailed(reason) | FetchOutcome::Other(reason) => {
                        debug!(url = %link, reason = %reason, "Fetch failed, skipping link");
                    }
                }

                if !self.signal.is_running() {
                    self.mark_stopped().await?;
                    end = CrawlEnd::Stopped;
                    break;
                }
            }

            while let Some(joined) = children.join_next().await {
                if joined?? == CrawlEnd::Stopped {
                    end = CrawlEnd::Stopped;
                }
            }

            Ok(end)
        })
    }

    /// Whether a link passes the eligibility gate and has no page row yet
    async fn link_is_new(&self, link: &str) -> Result<bool> {
        if !is_eligible_link(link, &self.root_prefix) {
            return Ok(false);
        }

        let path = match canonical_path(link) {
            Some(path) => path,
            None => return Ok(false),
        };

        let storage = self.storage.lock().await;
        Ok(!storage.page_exists(self.site_id, &path)?)
    }

    async fn mark_stopped(&self) -> Result<()> {
        info!(site_id = self.site_id, "Crawl stopped by user");
        let mut storage = self.storage.lock().await;
        storage.update_site_status(self.site_id, SiteStatus::Failed, Some(STOPPED_BY_USER))?;
        Ok(())
    }
}
