use super::core::{Word, WordCatalog};
use rand::seq::SliceRandom;

/// Trait for different word sampling strategies
pub trait WordSampler {
    /// Pick up to `count` distinct words for a session. Strategies fall back
    /// to the whole catalog when the requested language has no candidates.
    fn sample(&self, catalog: &WordCatalog, language: Option<&str>, count: usize) -> Vec<Word>;
}

fn candidates_with_fallback(catalog: &WordCatalog, language: Option<&str>) -> Vec<Word> {
    let words = catalog.words_for(language);
    if words.is_empty() && language.is_some() {
        return catalog.words_for(None);
    }
    words
}

/// Uniform random sampling across the whole dictionary for a language.
pub struct RandomSampler;

impl WordSampler for RandomSampler {
    fn sample(&self, catalog: &WordCatalog, language: Option<&str>, count: usize) -> Vec<Word> {
        let candidates = candidates_with_fallback(catalog, language);
        let mut rng = rand::thread_rng();
        candidates
            .choose_multiple(&mut rng, count)
            .cloned()
            .collect()
    }
}

/// Sampling restricted to words of an exact letter count. The board grows one
/// goal slot per letter, so this pins the board size for the whole session.
pub struct LengthSampler {
    pub length: usize,
}

impl WordSampler for LengthSampler {
    fn sample(&self, catalog: &WordCatalog, language: Option<&str>, count: usize) -> Vec<Word> {
        let candidates: Vec<Word> = candidates_with_fallback(catalog, language)
            .into_iter()
            .filter(|w| w.letter_count() == self.length)
            .collect();
        let mut rng = rand::thread_rng();
        candidates
            .choose_multiple(&mut rng, count)
            .cloned()
            .collect()
    }
}
