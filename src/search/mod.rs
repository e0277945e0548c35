//! Search module: ranked queries over the stored index
//!
//! The engine resolves query roots against the lemma tables with AND
//! semantics and relative-relevance ranking; the snippet generator
//! produces the highlighted fragments shown with each hit.

mod engine;
mod snippet;

pub use engine::{SearchEngine, SearchOutcome, SearchResult, POPULARITY_CEILING};
pub use snippet::{SnippetGenerator, SNIPPET_LENGTH};
