//! Built-in Russian morphology
//!
//! Function words (prepositions, conjunctions, particles, interjections) are
//! closed classes in Russian, so tagging works off embedded word lists.
//! Content words get a normal form from an ordered suffix-stripping table.
//! The output is heuristic but deterministic, which is what the index needs:
//! the same surface form always reduces to the same root on both the
//! indexing and the query path.

use crate::morphology::{Morphology, PartOfSpeech, WordAnalysis};

const PREPOSITIONS: &[&str] = &[
    "в", "во", "на", "с", "со", "к", "ко", "по", "за", "из", "изо", "у", "о", "об", "обо", "от",
    "ото", "до", "под", "подо", "над", "при", "про", "без", "безо", "для", "через", "между",
    "перед", "передо", "около", "среди", "возле", "вокруг",
];

const CONJUNCTIONS: &[&str] = &[
    "и", "а", "но", "или", "либо", "что", "чтобы", "если", "когда", "пока", "как", "будто",
    "словно", "зато", "однако", "тоже", "также", "да",
];

const PARTICLES: &[&str] = &[
    "не", "ни", "бы", "б", "же", "ж", "ли", "ль", "вот", "вон", "уж", "уже", "лишь", "только",
    "ведь", "пусть", "пускай", "даже", "именно", "разве", "неужели", "почти",
];

const INTERJECTIONS: &[&str] = &[
    "ах", "ох", "эх", "ух", "ой", "эй", "ай", "увы", "ура", "ну", "ого", "ба",
];

/// Inflectional endings, ordered longest first so the most specific rule wins
const SUFFIXES: &[&str] = &[
    "иями", "ями", "ами", "ием", "иях", "ией", "ого", "его", "ому", "ему", "ыми", "ими", "ает",
    "яет", "ала", "яла", "или", "ыли", "ах", "ях", "ов", "ев", "ей", "ой", "ий", "ый", "ая",
    "яя", "ое", "ее", "ут", "ют", "ит", "ат", "ят", "ет", "ла", "ло", "ли", "ть", "а", "я",
    "о", "е", "ы", "и", "у", "ю", "ь",
];

/// Minimum stem length (in characters) left after stripping a suffix
const MIN_STEM_CHARS: usize = 2;

/// Self-contained Russian morphology adapter
#[derive(Debug, Default)]
pub struct RussianMorphology;

impl RussianMorphology {
    pub fn new() -> Self {
        Self
    }

    fn closed_class_tag(word: &str) -> Option<PartOfSpeech> {
        if PREPOSITIONS.contains(&word) {
            Some(PartOfSpeech::Preposition)
        } else if CONJUNCTIONS.contains(&word) {
            Some(PartOfSpeech::Conjunction)
        } else if PARTICLES.contains(&word) {
            Some(PartOfSpeech::Particle)
        } else if INTERJECTIONS.contains(&word) {
            Some(PartOfSpeech::Interjection)
        } else {
            None
        }
    }

    fn stem(word: &str) -> String {
        let word_chars = word.chars().count();

        for suffix in SUFFIXES {
            if let Some(stemmed) = word.strip_suffix(suffix) {
                let suffix_chars = suffix.chars().count();
                if word_chars - suffix_chars >= MIN_STEM_CHARS {
                    return stemmed.to_string();
                }
            }
        }

        word.to_string()
    }
}

impl Morphology for RussianMorphology {
    fn analyze(&self, word: &str) -> WordAnalysis {
        if let Some(tag) = Self::closed_class_tag(word) {
            return WordAnalysis {
                tags: vec![tag],
                normal_forms: vec![word.to_string()],
            };
        }

        WordAnalysis {
            tags: vec![PartOfSpeech::Content],
            normal_forms: vec![Self::stem(word)],
        }
    }
}
