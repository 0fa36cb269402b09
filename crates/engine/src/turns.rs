//! Conversational turn grouping.
//!
//! A turn opens at every message whose role is the initiator (normally
//! `user`) and absorbs everything after it, assistant replies and tool
//! traffic included, until the next initiator message. A leading run of
//! non-initiator messages forms an implicit turn 0. The packer then keeps or
//! drops each turn as a whole, so a tool result never survives without the
//! call that produced it.

use ctxpack_core::Item;
use serde_json::Value;

/// Role that opens a new turn unless a source overrides it.
pub const DEFAULT_TURN_INITIATOR: &str = "user";

/// Collapse a source's messages into turns.
///
/// If no item carries a role there is nothing to group by and the items are
/// returned untouched.
pub fn group_turns(source: &str, items: Vec<Item>, initiator: &str) -> Vec<Item> {
    if !items.iter().any(|item| item.role.is_some()) {
        return items;
    }

    let mut groups: Vec<Vec<Item>> = Vec::new();
    for item in items {
        let opens_turn = item.role.as_deref() == Some(initiator);
        if opens_turn || groups.is_empty() {
            groups.push(vec![item]);
        } else if let Some(current) = groups.last_mut() {
            current.push(item);
        }
    }

    groups
        .into_iter()
        .enumerate()
        .map(|(turn, members)| merge_turn(source, turn, members))
        .collect()
}

fn merge_turn(source: &str, turn: usize, members: Vec<Item>) -> Item {
    let tokens = members.iter().map(|m| m.tokens).sum();
    let content = members
        .iter()
        .map(|m| m.content.as_str())
        // Empty members (tool-call-only assistant messages) are elided so the
        // join never produces blank lines; their payloads stay in `value`.
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    let priority = members.first().map(|m| m.priority).unwrap_or_default();
    let position = members.first().and_then(|m| m.position);
    let value = Value::Array(members.into_iter().map(|m| m.value).collect());

    let mut item = Item::new(format!("{source}_turn_{turn}"), source, content)
        .with_tokens(tokens)
        .with_priority(priority)
        .with_index(turn);
    item.value = value;
    item.position = position;
    item
}
