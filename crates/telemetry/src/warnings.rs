//! Classification of a pack result against fixed thresholds.

use crate::report::PackStats;
use ctxpack_core::Constraint;
use serde::{Deserialize, Serialize};

/// Utilization at or above which the window is reported as nearly full.
pub const NEAR_CAPACITY_THRESHOLD: f64 = 0.95;

/// Share of candidates dropped above which dropping is reported as heavy.
pub const HEAVY_DROP_RATIO: f64 = 0.5;

/// Category of a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Required content alone is larger than the budget.
    RequiredExceedsBudget,
    /// The window is almost full.
    NearCapacity,
    /// More than half of the candidates were dropped.
    HeavyDropping,
    /// A source produced candidates but none made it in.
    SourceFullyDropped,
    /// A required item was kept although its dependency could not be.
    UnresolvedConstraint,
}

impl std::fmt::Display for WarningKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RequiredExceedsBudget => write!(f, "required_exceeds_budget"),
            Self::NearCapacity => write!(f, "near_capacity"),
            Self::HeavyDropping => write!(f, "heavy_dropping"),
            Self::SourceFullyDropped => write!(f, "source_fully_dropped"),
            Self::UnresolvedConstraint => write!(f, "unresolved_constraint"),
        }
    }
}

/// A classified observation about a pack result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
    /// Source the warning concerns, when it concerns one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Warning {
    fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    fn for_source(kind: WarningKind, source: &str, message: impl Into<String>) -> Self {
        Self {
            source: Some(source.to_string()),
            ..Self::new(kind, message)
        }
    }
}

/// Inspect the report and unmet constraints of a pack call.
pub fn detect_warnings(stats: &PackStats, unresolved: &[Constraint]) -> Vec<Warning> {
    let mut warnings = Vec::new();

    if stats.required_tokens > stats.budget {
        warnings.push(Warning::new(
            WarningKind::RequiredExceedsBudget,
            format!(
                "Required content ({} tokens) exceeds the budget ({} tokens)",
                stats.required_tokens, stats.budget
            ),
        ));
    } else if stats.utilization >= NEAR_CAPACITY_THRESHOLD && stats.utilization <= 1.0 {
        warnings.push(Warning::new(
            WarningKind::NearCapacity,
            format!(
                "Context is {:.1}% full ({} of {} tokens)",
                stats.utilization * 100.0,
                stats.total_tokens,
                stats.budget
            ),
        ));
    }

    let candidates = stats.included_count + stats.dropped_count;
    if candidates > 0 && stats.dropped_count as f64 / candidates as f64 > HEAVY_DROP_RATIO {
        warnings.push(Warning::new(
            WarningKind::HeavyDropping,
            format!("{} of {} items were dropped", stats.dropped_count, candidates),
        ));
    }

    for (source, source_stats) in &stats.by_source {
        if source_stats.items_total > 0 && source_stats.items_included == 0 {
            warnings.push(Warning::for_source(
                WarningKind::SourceFullyDropped,
                source,
                format!("All {} items from '{}' were dropped", source_stats.items_total, source),
            ));
        }
    }

    for constraint in unresolved {
        warnings.push(Warning::new(
            WarningKind::UnresolvedConstraint,
            format!(
                "Required item '{}' kept without its dependency '{}'",
                constraint.if_included, constraint.then_require
            ),
        ));
    }

    warnings
}
