//! Output records of a pack call.

use crate::item::{Item, Placement};
use serde::{Deserialize, Serialize};

/// An item that made it into the packed output, tagged with its zone.
///
/// Selection-internal fields (priority, position hint, index) are not
/// carried over.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackedItem {
    pub id: String,
    pub source: String,
    pub content: String,
    pub value: serde_json::Value,
    pub tokens: usize,
    #[serde(with = "crate::score")]
    pub score: f64,
    pub placement: Placement,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl PackedItem {
    pub fn from_item(item: Item, placement: Placement) -> Self {
        Self {
            id: item.id,
            source: item.source,
            content: item.content,
            value: item.value,
            tokens: item.tokens,
            score: item.score,
            placement,
            role: item.role,
        }
    }
}

/// Why an item was left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DropReason {
    #[serde(rename = "budget exhausted")]
    BudgetExhausted,
    #[serde(rename = "constraint dependency unavailable")]
    ConstraintDependencyUnavailable,
}

impl DropReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BudgetExhausted => "budget exhausted",
            Self::ConstraintDependencyUnavailable => "constraint dependency unavailable",
        }
    }
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reporting record for an item that did not make it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DroppedItem {
    pub id: String,
    pub source: String,
    pub tokens: usize,
    #[serde(with = "crate::score")]
    pub score: f64,
    pub reason: DropReason,
}

impl DroppedItem {
    pub fn from_item(item: &Item, reason: DropReason) -> Self {
        Self {
            id: item.id.clone(),
            source: item.source.clone(),
            tokens: item.tokens,
            score: item.score,
            reason,
        }
    }
}
