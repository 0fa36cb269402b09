//! Scorer capability: per-source relevance against the pack query.

use crate::item::Item;

/// Scores an item against a query.
///
/// Invoked only when a query is present and only for non-required items of
/// the source it is attached to. The returned value replaces the
/// priority-derived score outright.
pub trait Scorer: Send + Sync {
    fn score(&self, item: &Item, query: &str) -> f64;
}

impl<F> Scorer for F
where
    F: Fn(&Item, &str) -> f64 + Send + Sync,
{
    fn score(&self, item: &Item, query: &str) -> f64 {
        self(item, query)
    }
}
