//! Snippet generation for search results
//!
//! Produces a short text fragment around the first query-term hit, with
//! every matching word wrapped in `<b>` markers. The fragment start is a
//! heuristic sentence boundary, not a grammatical guarantee.

use crate::lemma::LemmaExtractor;

use regex::Regex;
use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

/// Maximum snippet length in characters, before the ellipsis
pub const SNIPPET_LENGTH: usize = 270;

fn word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new("[А-я]+").expect("static pattern is valid"))
}

/// Builds result snippets from page text
pub struct SnippetGenerator {
    extractor: Arc<LemmaExtractor>,
}

impl SnippetGenerator {
    pub fn new(extractor: Arc<LemmaExtractor>) -> Self {
        Self { extractor }
    }

    /// Builds a snippet from plain page text for a set of query lemmas
    ///
    /// Words whose normal form matches a query lemma are wrapped in
    /// `<b>…</b>`. The snippet starts at the nearest earlier position
    /// that looks like a sentence start (an uppercase letter immediately
    /// preceded by a space), falls back to the beginning of the text,
    /// and is capped at [`SNIPPET_LENGTH`] characters plus an ellipsis.
    pub fn build(&self, text: &str, query_lemmas: &HashSet<String>) -> String {
        let highlighted = self.highlight(text, query_lemmas);

        let start = match highlighted.find("<b>") {
            Some(first_hit) => sentence_start(&highlighted, first_hit),
            None => 0,
        };

        let mut snippet: String = highlighted[start..].chars().take(SNIPPET_LENGTH).collect();
        snippet.push_str("...");
        snippet
    }

    /// Wraps every query-matching word in the text in `<b>` markers
    fn highlight(&self, text: &str, query_lemmas: &HashSet<String>) -> String {
        let mut out = String::with_capacity(text.len());
        let mut last_end = 0;

        for hit in word_pattern().find_iter(text) {
            out.push_str(&text[last_end..hit.start()]);

            if self.extractor.word_matches(hit.as_str(), query_lemmas) {
                out.push_str("<b>");
                out.push_str(hit.as_str());
                out.push_str("</b>");
            } else {
                out.push_str(hit.as_str());
            }

            last_end = hit.end();
        }

        out.push_str(&text[last_end..]);
        out
    }
}

/// Scans backward from `from` for an uppercase letter immediately
/// preceded by a space; returns 0 when none is found.
fn sentence_start(text: &str, from: usize) -> usize {
    let mut previous: Option<(usize, char)> = None;

    let mut candidate = 0;
    for (idx, c) in text[..from].char_indices() {
        if c.is_uppercase() {
            if let Some((_, prev)) = previous {
                if prev == ' ' {
                    candidate = idx;
                }
            }
        }
        previous = Some((idx, c));
    }

    candidate
}
