//! Lemma extraction
//!
//! A single extractor serves both the indexing path and the query path, so
//! the roots written into the index and the roots looked up at query time
//! always agree.

mod extractor;

pub use extractor::LemmaExtractor;
