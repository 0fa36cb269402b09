//! Greedy budget-constrained selection.

use ctxpack_core::Item;
use std::cmp::Ordering;

/// Result of a packing pass.
#[derive(Debug, Clone, Default)]
pub struct PackOutcome {
    /// Required items first, then selected items in score order.
    pub included: Vec<Item>,
    /// Every rejected item, in the order it was considered.
    pub dropped: Vec<Item>,
}

impl PackOutcome {
    pub fn included_tokens(&self) -> usize {
        self.included.iter().map(|i| i.tokens).sum()
    }
}

/// Descending score; for exact ties, the cheaper item first.
pub fn compare_candidates(a: &Item, b: &Item) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.tokens.cmp(&b.tokens))
}

/// Select items for `budget` tokens.
///
/// Required items go in unconditionally, even if they alone overrun the
/// budget. What remains (floored at zero) is filled by a single scan over the
/// other items in [`compare_candidates`] order. An item that does not fit is
/// skipped, not a reason to stop: a later, smaller item may still fit.
pub fn pack_greedy(items: Vec<Item>, budget: usize) -> PackOutcome {
    let (mut included, mut candidates): (Vec<Item>, Vec<Item>) =
        items.into_iter().partition(Item::is_required);

    let required_tokens: usize = included.iter().map(|i| i.tokens).sum();
    let mut remaining = budget.saturating_sub(required_tokens);

    candidates.sort_by(compare_candidates);

    let mut dropped = Vec::new();
    for item in candidates {
        if item.tokens <= remaining {
            remaining -= item.tokens;
            included.push(item);
        } else {
            dropped.push(item);
        }
    }

    PackOutcome { included, dropped }
}
