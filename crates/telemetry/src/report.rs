//! Token and utilization breakdown of a pack result.

use ctxpack_core::{DroppedItem, PackedItem};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregate numbers for one pack call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackStats {
    /// Budget the call was packed against.
    pub budget: usize,
    /// Tokens of everything placed, required content included.
    pub total_tokens: usize,
    /// `budget - total_tokens`, floored at zero.
    pub remaining: usize,
    /// `total_tokens / budget`. Above 1.0 when required content overruns.
    #[serde(with = "ctxpack_core::score")]
    pub utilization: f64,
    /// Tokens of required items alone.
    pub required_tokens: usize,
    pub included_count: usize,
    pub dropped_count: usize,
    /// Per-source breakdown, keyed by source name.
    pub by_source: BTreeMap<String, SourceStats>,
}

/// Per-source slice of [`PackStats`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStats {
    /// Tokens this source contributed to the output.
    pub tokens: usize,
    pub items_included: usize,
    /// Candidates the source produced (included + dropped).
    pub items_total: usize,
}

/// Build the report for a placed selection.
pub fn summarize(
    items: &[PackedItem],
    dropped: &[DroppedItem],
    required_tokens: usize,
    budget: usize,
) -> PackStats {
    let mut by_source: BTreeMap<String, SourceStats> = BTreeMap::new();

    for item in items {
        let stats = by_source.entry(item.source.clone()).or_default();
        stats.tokens += item.tokens;
        stats.items_included += 1;
        stats.items_total += 1;
    }
    for item in dropped {
        by_source.entry(item.source.clone()).or_default().items_total += 1;
    }

    let total_tokens: usize = items.iter().map(|i| i.tokens).sum();

    PackStats {
        budget,
        total_tokens,
        remaining: budget.saturating_sub(total_tokens),
        utilization: utilization(total_tokens, budget),
        required_tokens,
        included_count: items.len(),
        dropped_count: dropped.len(),
        by_source,
    }
}

fn utilization(total: usize, budget: usize) -> f64 {
    match (total, budget) {
        (0, _) => 0.0,
        (_, 0) => f64::INFINITY,
        (total, budget) => total as f64 / budget as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctxpack_core::{DropReason, Item, Placement};

    fn packed(id: &str, source: &str, tokens: usize) -> PackedItem {
        PackedItem::from_item(Item::new(id, source, id).with_tokens(tokens), Placement::Middle)
    }

    fn dropped(id: &str, source: &str, tokens: usize) -> DroppedItem {
        DroppedItem::from_item(&Item::new(id, source, id).with_tokens(tokens), DropReason::BudgetExhausted)
    }

    #[test]
    fn totals_and_per_source_breakdown() {
        let items = vec![packed("sys", "system", 30), packed("d0", "docs", 20), packed("d1", "docs", 10)];
        let drops = vec![dropped("d2", "docs", 50), dropped("h0", "history", 5)];
        let stats = summarize(&items, &drops, 30, 100);

        assert_eq!(stats.total_tokens, 60);
        assert_eq!(stats.remaining, 40);
        assert!((stats.utilization - 0.6).abs() < 1e-9);
        assert_eq!(stats.included_count, 3);
        assert_eq!(stats.dropped_count, 2);

        let docs = &stats.by_source["docs"];
        assert_eq!(docs.tokens, 30);
        assert_eq!(docs.items_included, 2);
        assert_eq!(docs.items_total, 3);

        let history = &stats.by_source["history"];
        assert_eq!(history.items_included, 0);
        assert_eq!(history.items_total, 1);
    }

    #[test]
    fn overrun_reports_utilization_above_one() {
        let stats = summarize(&[packed("sys", "system", 150)], &[], 150, 100);
        assert!(stats.utilization > 1.0);
        assert_eq!(stats.remaining, 0);
    }

    #[test]
    fn empty_result_has_zero_utilization() {
        let stats = summarize(&[], &[], 0, 0);
        assert_eq!(stats.utilization, 0.0);
        assert!(stats.by_source.is_empty());
    }

    #[test]
    fn zero_budget_with_content_is_infinite() {
        let stats = summarize(&[packed("sys", "system", 1)], &[], 1, 0);
        assert!(stats.utilization.is_infinite());
    }
}
