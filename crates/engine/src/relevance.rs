//! Keyword relevance scoring.
//!
//! A dependency-free scorer for sources that want query-aware ranking
//! without an embedding model: the share of distinct query terms that appear
//! in the item's content.

use crate::scoring::MEDIUM_SCORE;
use ctxpack_core::{Item, Scorer};
use std::collections::HashSet;

/// Terms shorter than this are ignored ("a", "is", "to", ...).
const MIN_TERM_LEN: usize = 3;

/// Scores items by query term overlap, scaled onto `[0, max_score]`.
#[derive(Debug, Clone)]
pub struct KeywordScorer {
    max_score: f64,
}

impl KeywordScorer {
    pub fn new(max_score: f64) -> Self {
        Self { max_score }
    }

    /// Fraction of distinct query terms found in `text` (0.0–1.0).
    pub fn overlap(query: &str, text: &str) -> f64 {
        let terms = terms(query);
        if terms.is_empty() {
            return 0.0;
        }
        let haystack = terms_of_text(text);
        let hits = terms.iter().filter(|t| haystack.contains(*t)).count();
        hits as f64 / terms.len() as f64
    }
}

impl Default for KeywordScorer {
    fn default() -> Self {
        Self::new(MEDIUM_SCORE)
    }
}

impl Scorer for KeywordScorer {
    fn score(&self, item: &Item, query: &str) -> f64 {
        Self::overlap(query, &item.content) * self.max_score
    }
}

fn terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= MIN_TERM_LEN)
        .map(str::to_lowercase)
        .collect()
}

fn terms_of_text(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}
