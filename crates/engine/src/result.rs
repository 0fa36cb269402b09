//! The output of a pack call and its convenience views.

use ctxpack_core::{DroppedItem, PackedItem};
use ctxpack_telemetry::{CostEstimate, PackStats, PricingTable, Warning};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placed items plus everything needed to explain the selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackResult {
    /// Final order, each tagged with its placement zone.
    pub items: Vec<PackedItem>,
    pub stats: PackStats,
    pub warnings: Vec<Warning>,
    pub dropped: Vec<DroppedItem>,
}

impl PackResult {
    /// Item contents in placed order, separated by blank lines.
    pub fn text(&self) -> String {
        self.items
            .iter()
            .map(|item| item.content.as_str())
            .filter(|content| !content.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Message objects in placed order.
    ///
    /// Turns are expanded back into their member messages. Items whose
    /// payload is not message-shaped (`{role, ...}`) are skipped.
    pub fn messages(&self) -> Vec<Value> {
        let mut messages = Vec::new();
        for item in &self.items {
            match &item.value {
                Value::Array(members) => {
                    messages.extend(members.iter().filter(|m| is_message(m)).cloned());
                }
                value if is_message(value) => messages.push(value.clone()),
                _ => {}
            }
        }
        messages
    }

    pub fn total_tokens(&self) -> usize {
        self.stats.total_tokens
    }

    /// Whether an item with this id made it into the output.
    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    /// Cost of sending the packed context to `model`.
    pub fn estimate_cost(
        &self,
        pricing: &PricingTable,
        model: &str,
        output_tokens: usize,
    ) -> Option<CostEstimate> {
        pricing.estimate(model, self.stats.total_tokens, output_tokens)
    }

    pub fn to_json_pretty(&self) -> ctxpack_core::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn is_message(value: &Value) -> bool {
    value.get("role").is_some_and(Value::is_string)
}
