//! Inverted index construction
//!
//! Turns the lemma counts of a page into lemma frequency and index rank
//! rows, one serialized write per (lemma, index) pair.

mod writer;

pub use writer::IndexWriter;
