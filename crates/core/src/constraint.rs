//! Inclusion constraints between items.

use serde::{Deserialize, Serialize};

/// "If `if_included` ends up in the packed output, `then_require` must too."
///
/// Constraints are declared per source and pooled across all sources before
/// enforcement. Several constraints may share a trigger or a dependency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Constraint {
    /// Trigger item id.
    pub if_included: String,
    /// Dependency item id.
    pub then_require: String,
}

impl Constraint {
    pub fn new(if_included: impl Into<String>, then_require: impl Into<String>) -> Self {
        Self {
            if_included: if_included.into(),
            then_require: then_require.into(),
        }
    }
}

impl std::fmt::Display for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.if_included, self.then_require)
    }
}
