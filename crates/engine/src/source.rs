//! Source registrations and their packing options.

use ctxpack_core::{Constraint, DropStrategy, Position, Priority, Scorer};
use std::sync::Arc;

use crate::turns::DEFAULT_TURN_INITIATOR;

/// How a source's raw items are merged before scoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupBy {
    /// Conversational turns opened by messages with the `initiator` role.
    Turns { initiator: String },
}

impl GroupBy {
    /// Turns opened by `user` messages.
    pub fn turns() -> Self {
        Self::Turns {
            initiator: DEFAULT_TURN_INITIATOR.to_string(),
        }
    }
}

/// Options attached to a source when it is added.
#[derive(Clone, Default)]
pub struct AddOptions {
    pub priority: Priority,
    /// Pin every item of the source to one edge of the window.
    pub position: Option<Position>,
    /// Promote the last N units (turns, if grouped) to required.
    pub keep_last: Option<usize>,
    pub drop_strategy: DropStrategy,
    pub group_by: Option<GroupBy>,
    /// Replaces priority scores of non-required items when a query is given.
    pub scorer: Option<Arc<dyn Scorer>>,
    /// Dependency constraints declared by this source.
    pub requires: Vec<Constraint>,
}

impl AddOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_keep_last(mut self, count: usize) -> Self {
        self.keep_last = Some(count);
        self
    }

    pub fn with_drop_strategy(mut self, strategy: DropStrategy) -> Self {
        self.drop_strategy = strategy;
        self
    }

    pub fn with_group_by(mut self, group_by: GroupBy) -> Self {
        self.group_by = Some(group_by);
        self
    }

    pub fn with_scorer(mut self, scorer: Arc<dyn Scorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    /// Declare that including `trigger` requires including `dependency`.
    pub fn with_requires(mut self, trigger: impl Into<String>, dependency: impl Into<String>) -> Self {
        self.requires.push(Constraint::new(trigger, dependency));
        self
    }
}

impl std::fmt::Debug for AddOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddOptions")
            .field("priority", &self.priority)
            .field("position", &self.position)
            .field("keep_last", &self.keep_last)
            .field("drop_strategy", &self.drop_strategy)
            .field("group_by", &self.group_by)
            .field("scorer", &self.scorer.as_ref().map(|_| "<scorer>"))
            .field("requires", &self.requires)
            .finish()
    }
}

/// A named registration: raw content plus options.
#[derive(Debug, Clone)]
pub(crate) struct Source {
    pub name: String,
    pub content: serde_json::Value,
    pub options: AddOptions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_medium_unpinned_score_ordered() {
        let options = AddOptions::new();
        assert_eq!(options.priority, Priority::Medium);
        assert_eq!(options.position, None);
        assert_eq!(options.keep_last, None);
        assert_eq!(options.drop_strategy, DropStrategy::Score);
        assert!(options.group_by.is_none());
        assert!(options.scorer.is_none());
    }

    #[test]
    fn requires_accumulate() {
        let options = AddOptions::new()
            .with_requires("tools_a", "tools_b")
            .with_requires("tools_a", "tools_c");
        assert_eq!(options.requires.len(), 2);
        assert_eq!(options.requires[1], Constraint::new("tools_a", "tools_c"));
    }

    #[test]
    fn debug_hides_scorer() {
        let scorer: Arc<dyn Scorer> = Arc::new(|_: &ctxpack_core::Item, _: &str| 1.0);
        let rendered = format!("{:?}", AddOptions::new().with_scorer(scorer));
        assert!(rendered.contains("<scorer>"));
    }

    #[test]
    fn turns_default_to_user_initiator() {
        assert_eq!(
            GroupBy::turns(),
            GroupBy::Turns {
                initiator: "user".into()
            }
        );
    }
}
