//! Morphological analysis seam
//!
//! The indexing and query pipelines reduce surface word forms to dictionary
//! roots through the [`Morphology`] trait. The crate ships a self-contained
//! Russian implementation; anything that can tag function words and produce
//! normal forms can be plugged in instead.

mod russian;

pub use russian::RussianMorphology;

/// Grammatical class of a word, as far as indexing cares
///
/// The four function-word classes form the exclusion set: words tagged with
/// any of them contribute to neither lemma frequency nor index rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartOfSpeech {
    Interjection,
    Preposition,
    Conjunction,
    Particle,
    Content,
}

impl PartOfSpeech {
    /// Whether this class is excluded from indexing
    pub fn is_excluded(&self) -> bool {
        !matches!(self, PartOfSpeech::Content)
    }
}

/// Result of analyzing a single surface word
#[derive(Debug, Clone)]
pub struct WordAnalysis {
    /// Grammatical tags for the word (closed-class words carry one tag)
    pub tags: Vec<PartOfSpeech>,

    /// Candidate dictionary roots, primary form first; never empty
    pub normal_forms: Vec<String>,
}

impl WordAnalysis {
    /// The primary dictionary root of the word
    pub fn primary_normal_form(&self) -> &str {
        &self.normal_forms[0]
    }

    /// Whether any tag belongs to the exclusion set
    pub fn is_function_word(&self) -> bool {
        self.tags.iter().any(PartOfSpeech::is_excluded)
    }
}

/// Reduces a surface word form to dictionary roots with grammatical tags
///
/// Implementations must be deterministic: the same instance serves both the
/// indexing path and the query path, and extraction results must agree.
pub trait Morphology: Send + Sync {
    /// Analyzes a single lowercase word
    fn analyze(&self, word: &str) -> WordAnalysis;
}
