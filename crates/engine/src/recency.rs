//! Age-based score decay for sources using [`DropStrategy::Oldest`].
//!
//! [`DropStrategy::Oldest`]: ctxpack_core::DropStrategy::Oldest

use ctxpack_core::Item;

/// Factor applied to the oldest item of a source.
pub const MIN_RECENCY_FACTOR: f64 = 0.1;

/// Rescale scores linearly from 10% (oldest) to 100% (newest).
///
/// Position is taken from `index` across the whole source, so the factor
/// reflects true age even when some items are required. Required items keep
/// their infinite score. A single item is left as is.
pub fn apply_recency(mut items: Vec<Item>) -> Vec<Item> {
    if items.len() < 2 {
        return items;
    }

    items.sort_by_key(|item| item.index);
    let span = (items.len() - 1) as f64;

    for (position, item) in items.iter_mut().enumerate() {
        if item.is_required() {
            continue;
        }
        let factor = MIN_RECENCY_FACTOR + (1.0 - MIN_RECENCY_FACTOR) * (position as f64 / span);
        item.score *= factor;
    }

    items
}
