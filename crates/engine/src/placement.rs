//! Attention-aware ordering of the final selection.
//!
//! Models attend most to the start and end of the window and least to its
//! center. Pinned items keep their declared edge; floating items are dealt
//! out by score so the strongest sit nearest the start and the weakest
//! gather around the center.

use ctxpack_core::{Item, PackedItem, Placement, Position};

/// Order items and tag each with its zone.
///
/// Final order: pinned-beginning (original order), lead-in floaters
/// (even ranks, descending score), middle floaters (odd ranks, reversed so
/// the lowest scores sit at the center), pinned-end (original order), and
/// the query item last.
pub fn place(items: Vec<Item>) -> Vec<PackedItem> {
    let mut pinned_start = Vec::new();
    let mut pinned_end = Vec::new();
    let mut queries = Vec::new();
    let mut floating = Vec::new();

    for item in items {
        if item.is_query() {
            queries.push(item);
        } else {
            match item.position {
                Some(Position::Beginning) => pinned_start.push(item),
                Some(Position::End) => pinned_end.push(item),
                None => floating.push(item),
            }
        }
    }

    pinned_start.sort_by_key(|item| item.ordinal);
    pinned_end.sort_by_key(|item| item.ordinal);
    floating.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.ordinal.cmp(&b.ordinal)));

    let mut lead_in = Vec::new();
    let mut middle = Vec::new();
    for (rank, item) in floating.into_iter().enumerate() {
        if rank % 2 == 0 {
            lead_in.push(item);
        } else {
            middle.push(item);
        }
    }
    middle.reverse();

    let tag = |items: Vec<Item>, zone: Placement| {
        items
            .into_iter()
            .map(move |item| PackedItem::from_item(item, zone))
    };

    tag(pinned_start, Placement::Beginning)
        .chain(tag(lead_in, Placement::Beginning))
        .chain(tag(middle, Placement::Middle))
        .chain(tag(pinned_end, Placement::End))
        .chain(tag(queries, Placement::End))
        .collect()
}
