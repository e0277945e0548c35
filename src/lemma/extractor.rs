//! Raw text to lemma-count mapping

use crate::morphology::Morphology;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Extracts normalized word roots and their occurrence counts from raw text
pub struct LemmaExtractor {
    morphology: Arc<dyn Morphology>,
}

impl LemmaExtractor {
    pub fn new(morphology: Arc<dyn Morphology>) -> Self {
        Self { morphology }
    }

    /// Collects lemma occurrence counts from raw text
    ///
    /// Characters outside the target alphabet and whitespace are stripped,
    /// tokens are lowercased, function words (interjections, prepositions,
    /// conjunctions, particles) are discarded entirely, and surviving tokens
    /// accumulate one count per occurrence of their primary root form.
    pub fn collect_lemmas(&self, text: &str) -> HashMap<String, u32> {
        let mut lemmas = HashMap::new();

        for word in tokenize(text) {
            let analysis = self.morphology.analyze(&word);
            if analysis.is_function_word() {
                continue;
            }
            let root = analysis.primary_normal_form().to_string();
            *lemmas.entry(root).or_insert(0) += 1;
        }

        lemmas
    }

    /// Distinct query roots for the ranking pipeline
    pub fn query_lemmas(&self, query: &str) -> HashSet<String> {
        self.collect_lemmas(query).into_keys().collect()
    }

    /// Whether any normal form of the word matches one of the given lemmas
    pub fn word_matches(&self, word: &str, lemmas: &HashSet<String>) -> bool {
        self.morphology
            .analyze(&word.to_lowercase())
            .normal_forms
            .iter()
            .any(|form| lemmas.contains(form))
    }
}

/// Keeps Cyrillic letters in the `А`..=`я` range and whitespace, splits on
/// whitespace, and lowercases each token
///
/// The range deliberately mirrors the alphabet filter the index was designed
/// around; `ё` falls outside it and is dropped with the rest.
pub fn tokenize(text: &str) -> Vec<String> {
    text.chars()
        .filter(|c| ('А'..='я').contains(c) || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .map(|word| word.to_lowercase())
        .collect()
}
