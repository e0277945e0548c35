//! Ranked query engine
//!
//! Resolves a free-text query against the inverted index of one or all
//! configured sites with AND semantics: only pages containing every
//! query root survive. Ranking is relative relevance: the page's
//! accumulated rank divided by the best accumulated rank in the result
//! set.

use crate::config::SiteConfig;
use crate::crawler::plain_text;
use crate::lemma::LemmaExtractor;
use crate::search::SnippetGenerator;
use crate::storage::{LemmaRecord, SharedStorage, SiteStatus};
use crate::{KorniError, Result};

use std::cmp::Ordering;
use std::sync::Arc;
use tracing::debug;

/// Lemmas at or above this page frequency are too common to
/// discriminate and are excluded from matching.
pub const POPULARITY_CEILING: u32 = 50;

/// One ranked search hit
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Root URL of the site the page belongs to
    pub site: String,

    /// Configured human-readable site name
    pub site_name: String,

    /// Canonical page path under the site
    pub uri: String,

    /// Page title captured at crawl time
    pub title: String,

    /// Highlighted text fragment around the first hit
    pub snippet: String,

    /// Relative relevance in (0, 1]
    pub relevance: f32,
}

/// A complete query answer
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Total number of matching pages before pagination
    pub count: usize,

    /// The requested window of ranked results
    pub results: Vec<SearchResult>,
}

impl SearchOutcome {
    fn empty() -> Self {
        Self {
            count: 0,
            results: Vec::new(),
        }
    }
}

struct Candidate {
    site: SiteConfig,
    page_id: i64,
    absolute: f32,
}

/// Query engine over the stored index
pub struct SearchEngine {
    storage: SharedStorage,
    extractor: Arc<LemmaExtractor>,
    snippets: SnippetGenerator,
    sites: Vec<SiteConfig>,
}

impl SearchEngine {
    pub fn new(
        storage: SharedStorage,
        extractor: Arc<LemmaExtractor>,
        sites: Vec<SiteConfig>,
    ) -> Self {
        let snippets = SnippetGenerator::new(Arc::clone(&extractor));
        Self {
            storage,
            extractor,
            snippets,
            sites,
        }
    }

    /// Runs a ranked query
    ///
    /// `site_scope` limits the search to one configured site URL; `None`
    /// searches every configured site. Every scoped site must be in
    /// status INDEXED, otherwise the whole query is rejected.
    pub async fn search(
        &self,
        query: &str,
        site_scope: Option<&str>,
        offset: usize,
        limit: usize,
    ) -> Result<SearchOutcome> {
        if query.trim().is_empty() {
            return Err(KorniError::EmptyQuery);
        }

        let scoped = self.scoped_sites(site_scope)?;

        let storage = self.storage.lock().await;

        // Reject before searching: no partial answers over a half-built index.
        let mut site_rows = Vec::with_capacity(scoped.len());
        for site in &scoped {
            match storage.find_site_by_url(&site.url)? {
                Some(row) if row.status == SiteStatus::Indexed => site_rows.push((site, row)),
                _ => return Err(KorniError::SiteNotIndexed(site.url.clone())),
            }
        }

        let roots = self.extractor.query_lemmas(query);
        if roots.is_empty() {
            return Ok(SearchOutcome::empty());
        }

        let mut candidates: Vec<Candidate> = Vec::new();

        for (site, row) in &site_rows {
            let mut matched: Vec<LemmaRecord> = Vec::new();
            for root in &roots {
                if let Some(lemma) = storage.find_lemma(row.id, root)? {
                    if lemma.frequency < POPULARITY_CEILING {
                        matched.push(lemma);
                    }
                }
            }

            // AND semantics need every query root resolvable on the site.
            if matched.len() != roots.len() {
                debug!(site = %site.url, "Not every query root matched, skipping site");
                continue;
            }

            matched.sort_by_key(|lemma| lemma.frequency);

            let mut pages: Vec<(i64, f32)> = storage
                .indexes_for_lemma(matched[0].id)?
                .into_iter()
                .map(|index| (index.page_id, index.rank))
                .collect();

            for lemma in &matched[1..] {
                let mut surviving = Vec::with_capacity(pages.len());
                for (page_id, score) in pages {
                    if let Some(index) = storage.find_index(page_id, lemma.id)? {
                        surviving.push((page_id, score + index.rank));
                    }
                }
                pages = surviving;
            }

            for (page_id, absolute) in pages {
                candidates.push(Candidate {
                    site: (*site).clone(),
                    page_id,
                    absolute,
                });
            }
        }

        if candidates.is_empty() {
            return Ok(SearchOutcome::empty());
        }

        let max_absolute = candidates
            .iter()
            .map(|c| c.absolute)
            .fold(f32::MIN, f32::max);

        // Stable sort: equal-relevance pages keep discovery order.
        candidates.sort_by(|a, b| {
            b.absolute
                .partial_cmp(&a.absolute)
                .unwrap_or(Ordering::Equal)
        });

        let count = candidates.len();
        let mut results = Vec::new();

        for candidate in candidates.into_iter().skip(offset).take(limit) {
            let page = storage.get_page(candidate.page_id)?;
            let snippet = self
                .snippets
                .build(&plain_text(&page.content), &roots);

            results.push(SearchResult {
                site: candidate.site.url.clone(),
                site_name: candidate.site.name.clone(),
                uri: page.path,
                title: page.title.unwrap_or_default(),
                snippet,
                relevance: candidate.absolute / max_absolute,
            });
        }

        Ok(SearchOutcome { count, results })
    }

    /// Resolves the site scope against the configured site list
    fn scoped_sites(&self, site_scope: Option<&str>) -> Result<Vec<SiteConfig>> {
        match site_scope {
            None => Ok(self.sites.clone()),
            Some(url) => {
                let normalized = url.trim_end_matches('/');
                self.sites
                    .iter()
                    .find(|site| site.url == normalized)
                    .cloned()
                    .map(|site| vec![site])
                    .ok_or_else(|| KorniError::SiteNotIndexed(url.to_string()))
            }
        }
    }
}
