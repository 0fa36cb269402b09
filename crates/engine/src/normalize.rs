//! Raw source payloads to measured items.
//!
//! A JSON array expands into one item per element; any other value is a
//! single item named after its source. Tokens are measured here, once, and
//! never again for the rest of the call.

use ctxpack_core::{Item, Tokenizer};
use serde_json::Value;
use std::collections::HashSet;

/// Build measured items from a source's raw content.
///
/// Priority, score, and position are left at their defaults; the optimizer
/// applies the source's options afterwards.
pub fn normalize_source(source: &str, content: &Value, tokenizer: &dyn Tokenizer) -> Vec<Item> {
    match content {
        Value::Array(elements) => elements
            .iter()
            .enumerate()
            .map(|(index, element)| {
                build_item(element_id(source, element, index), source, element, index, tokenizer)
            })
            .collect(),
        single => vec![build_item(source.to_string(), source, single, 0, tokenizer)],
    }
}

fn build_item(id: String, source: &str, value: &Value, index: usize, tokenizer: &dyn Tokenizer) -> Item {
    let content = content_text(value);
    let tokens = tokenizer.count(&content);
    let mut item = Item::new(id, source, content).with_tokens(tokens).with_index(index);
    item.value = value.clone();
    item.role = extract_role(value);
    item
}

/// `{source}_{key}` where key is the element's `id`, else its `name`, else
/// its position.
pub fn element_id(source: &str, element: &Value, index: usize) -> String {
    let key = ["id", "name"]
        .iter()
        .find_map(|field| element.get(field).and_then(Value::as_str));
    match key {
        Some(key) => format!("{source}_{key}"),
        None => format!("{source}_{index}"),
    }
}

/// Text used for measurement and display.
///
/// Strings are used verbatim. Message-shaped objects (`{role, content}`)
/// contribute their content. Everything else is compact JSON.
pub fn content_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(map) if map.get("role").is_some_and(Value::is_string) => match map.get("content") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        },
        other => other.to_string(),
    }
}

/// The `role` field of an object payload, if it is a string.
pub fn extract_role(value: &Value) -> Option<String> {
    value.get("role").and_then(Value::as_str).map(str::to_string)
}

/// Make item ids unique across one pack call.
///
/// The first item to claim an id keeps it. Later duplicates get the
/// smallest `{id}_{n}` (n ≥ 2) not used by any item. Returns the number of
/// items renamed.
pub fn disambiguate_ids(items: &mut [Item]) -> usize {
    let mut taken: HashSet<String> = items.iter().map(|item| item.id.clone()).collect();
    let mut seen: HashSet<String> = HashSet::with_capacity(items.len());
    let mut renamed = 0;

    for item in items.iter_mut() {
        if seen.insert(item.id.clone()) {
            continue;
        }
        let mut n = 2;
        let id = loop {
            let candidate = format!("{}_{n}", item.id);
            if !taken.contains(&candidate) {
                break candidate;
            }
            n += 1;
        };
        taken.insert(id.clone());
        seen.insert(id.clone());
        item.id = id;
        renamed += 1;
    }
    renamed
}
