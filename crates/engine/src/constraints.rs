//! Dependency constraint enforcement.
//!
//! Runs after packing and repairs the selection so that every included
//! trigger has its dependency included too. Dependencies are pulled back from
//! the items the packer dropped when they fit the budget; otherwise the
//! trigger is removed. Chains (A requires B, B requires C) resolve across
//! passes: pulling B in exposes B's own constraint on the next pass, and
//! failing C removes B, which in turn removes A.
//!
//! # Termination
//!
//! `failed` memoizes dependency ids that can never be satisfied. Every pass
//! that reports a change either shrinks `available`, shrinks `included`, or
//! grows `failed`, and each of those is bounded by the item count.

use ctxpack_core::{Constraint, Item};
use std::collections::HashSet;
use tracing::debug;

/// Result of constraint enforcement.
#[derive(Debug, Clone, Default)]
pub struct EnforceOutcome {
    pub included: Vec<Item>,
    /// Packer rejects that stayed out.
    pub available: Vec<Item>,
    /// Ids pulled in to satisfy a dependency, in the order they were added.
    pub added: Vec<String>,
    /// Items removed because a dependency could not be satisfied.
    pub removed: Vec<Item>,
    /// Constraints left unmet because their trigger is required.
    pub unresolved: Vec<Constraint>,
}

/// Enforce `constraints` over a packed selection.
///
/// `budget` bounds the total tokens of `included` when pulling dependencies
/// in. Required triggers are never removed; their unmet constraints are
/// reported in [`EnforceOutcome::unresolved`].
pub fn enforce_constraints(
    mut included: Vec<Item>,
    mut available: Vec<Item>,
    constraints: &[Constraint],
    budget: usize,
) -> EnforceOutcome {
    let mut failed: HashSet<&str> = HashSet::new();
    let mut added = Vec::new();
    let mut removed = Vec::new();
    let mut total: usize = included.iter().map(|i| i.tokens).sum();

    loop {
        let mut changed = false;

        for constraint in constraints {
            let trigger = constraint.if_included.as_str();
            let dependency = constraint.then_require.as_str();

            let Some(trigger_pos) = position_of(&included, trigger) else {
                continue;
            };
            if position_of(&included, dependency).is_some() {
                continue;
            }

            if failed.contains(dependency) {
                if included[trigger_pos].is_required() {
                    continue;
                }
                let item = included.remove(trigger_pos);
                total -= item.tokens;
                debug!(trigger, dependency, "removing trigger with unavailable dependency");
                removed.push(item);
                changed = true;
                continue;
            }

            let Some(dep_pos) = position_of(&available, dependency) else {
                debug!(dependency, "dependency not available");
                failed.insert(dependency);
                changed = true;
                continue;
            };

            if total + available[dep_pos].tokens <= budget {
                let item = available.remove(dep_pos);
                total += item.tokens;
                debug!(trigger, dependency, tokens = item.tokens, "pulled dependency in");
                added.push(item.id.clone());
                included.push(item);
            } else {
                debug!(trigger, dependency, "dependency does not fit");
                failed.insert(dependency);
                if !included[trigger_pos].is_required() {
                    let item = included.remove(trigger_pos);
                    total -= item.tokens;
                    removed.push(item);
                }
            }
            changed = true;
        }

        if !changed {
            break;
        }
    }

    let unresolved = constraints
        .iter()
        .filter(|c| {
            position_of(&included, &c.if_included).is_some()
                && position_of(&included, &c.then_require).is_none()
        })
        .cloned()
        .collect();

    EnforceOutcome {
        included,
        available,
        added,
        removed,
        unresolved,
    }
}

fn position_of(items: &[Item], id: &str) -> Option<usize> {
    items.iter().position(|item| item.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctxpack_core::Priority;

    fn item(id: &str, tokens: usize) -> Item {
        Item::new(id, "tools", id).with_tokens(tokens).with_score(10.0)
    }

    fn ids(items: &[Item]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn satisfied_constraints_change_nothing() {
        let outcome = enforce_constraints(
            vec![item("a", 10), item("b", 10)],
            vec![],
            &[Constraint::new("a", "b")],
            100,
        );
        assert_eq!(ids(&outcome.included), vec!["a", "b"]);
        assert!(outcome.added.is_empty());
        assert!(outcome.removed.is_empty());
    }

    #[test]
    fn dependency_pulled_in_when_it_fits() {
        let outcome = enforce_constraints(
            vec![item("a", 10)],
            vec![item("b", 20)],
            &[Constraint::new("a", "b")],
            30,
        );
        assert_eq!(ids(&outcome.included), vec!["a", "b"]);
        assert_eq!(outcome.added, vec!["b"]);
        assert!(outcome.available.is_empty());
    }

    #[test]
    fn trigger_removed_when_dependency_does_not_fit() {
        let outcome = enforce_constraints(
            vec![item("a", 10)],
            vec![item("b", 25)],
            &[Constraint::new("a", "b")],
            30,
        );
        assert!(outcome.included.is_empty());
        assert_eq!(ids(&outcome.removed), vec!["a"]);
        assert_eq!(ids(&outcome.available), vec!["b"]);
    }

    #[test]
    fn missing_dependency_removes_trigger() {
        let outcome = enforce_constraints(
            vec![item("a", 10), item("x", 5)],
            vec![],
            &[Constraint::new("a", "ghost")],
            100,
        );
        assert_eq!(ids(&outcome.included), vec!["x"]);
        assert_eq!(ids(&outcome.removed), vec!["a"]);
    }

    #[test]
    fn transitive_chain_all_added() {
        let outcome = enforce_constraints(
            vec![item("a", 10)],
            vec![item("b", 10), item("c", 10)],
            &[Constraint::new("a", "b"), Constraint::new("b", "c")],
            30,
        );
        assert_eq!(ids(&outcome.included), vec!["a", "b", "c"]);
        assert_eq!(outcome.added.len(), 2);
    }

    #[test]
    fn transitive_chain_collapses_when_tail_does_not_fit() {
        let outcome = enforce_constraints(
            vec![item("a", 10)],
            vec![item("b", 10), item("c", 50)],
            &[Constraint::new("a", "b"), Constraint::new("b", "c")],
            30,
        );
        assert!(outcome.included.is_empty());
        assert_eq!(ids(&outcome.removed), vec!["b", "a"]);
        assert_eq!(ids(&outcome.available), vec!["c"]);
    }

    #[test]
    fn required_trigger_kept_and_reported_unresolved() {
        let sys = item("sys", 10).with_priority(Priority::Required);
        let outcome = enforce_constraints(
            vec![sys],
            vec![item("big", 500)],
            &[Constraint::new("sys", "big")],
            100,
        );
        assert_eq!(ids(&outcome.included), vec!["sys"]);
        assert!(outcome.removed.is_empty());
        assert_eq!(outcome.unresolved, vec![Constraint::new("sys", "big")]);
    }

    #[test]
    fn shared_dependency_added_once() {
        let outcome = enforce_constraints(
            vec![item("a", 5), item("b", 5)],
            vec![item("shared", 5)],
            &[Constraint::new("a", "shared"), Constraint::new("b", "shared")],
            100,
        );
        assert_eq!(outcome.added, vec!["shared"]);
        assert_eq!(outcome.included.len(), 3);
    }

    #[test]
    fn cycle_terminates() {
        let outcome = enforce_constraints(
            vec![item("a", 5)],
            vec![item("b", 5)],
            &[Constraint::new("a", "b"), Constraint::new("b", "a")],
            100,
        );
        assert_eq!(ids(&outcome.included), vec!["a", "b"]);
    }

    #[test]
    fn constraints_on_excluded_triggers_are_ignored() {
        let outcome = enforce_constraints(
            vec![item("x", 5)],
            vec![item("a", 5)],
            &[Constraint::new("a", "ghost")],
            100,
        );
        assert_eq!(ids(&outcome.included), vec!["x"]);
        assert!(outcome.removed.is_empty());
        assert_eq!(ids(&outcome.available), vec!["a"]);
    }
}
