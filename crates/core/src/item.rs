//! The `Item` record and its small vocabulary enums.
//!
//! Items are rebuilt from registered sources on every pack call. Stages of
//! the pipeline receive items by value and hand back new collections, so a
//! registered source never observes per-call scoring.

use serde::{Deserialize, Serialize};

/// Priority tier of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Always included, never removed.
    Required,
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "required" => Ok(Self::Required),
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(format!("unknown priority '{other}'")),
        }
    }
}

/// Caller-supplied placement hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Beginning,
    End,
}

/// Zone an item lands in after placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    Beginning,
    Middle,
    End,
}

impl std::fmt::Display for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Beginning => write!(f, "beginning"),
            Self::Middle => write!(f, "middle"),
            Self::End => write!(f, "end"),
        }
    }
}

/// How a source's items compete once the budget runs short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropStrategy {
    /// Pure score order.
    #[default]
    Score,
    /// Scores decay with age so the oldest items are dropped first.
    Oldest,
}

/// Where an item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemOrigin {
    /// Built from a registered source.
    #[default]
    Source,
    /// The synthetic item standing in for the pack query.
    Query,
}

/// A single unit of content competing for the token budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// Unique within one pack call.
    pub id: String,

    /// Name of the source that produced this item
    pub source: String,

    /// Text used for measurement and display
    pub content: String,

    /// The original payload (an array of member payloads for a turn)
    pub value: serde_json::Value,

    /// Measured once from `content`
    pub tokens: usize,

    pub priority: Priority,

    /// `f64::INFINITY` for required items.
    #[serde(with = "crate::score")]
    pub score: f64,

    /// Original order within the source
    pub index: usize,

    /// Registration order across all sources
    pub ordinal: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(default)]
    pub origin: ItemOrigin,
}

impl Item {
    /// Create a medium-priority item with zero tokens and score.
    ///
    /// The engine fills in tokens and scores; this constructor is mainly for
    /// building fixtures.
    pub fn new(id: impl Into<String>, source: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            id: id.into(),
            source: source.into(),
            value: serde_json::Value::String(content.clone()),
            content,
            tokens: 0,
            priority: Priority::Medium,
            score: 0.0,
            index: 0,
            ordinal: 0,
            position: None,
            role: None,
            origin: ItemOrigin::Source,
        }
    }

    pub fn with_tokens(mut self, tokens: usize) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }

    /// Set the tier. `Required` also pins the score to infinity.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        if priority == Priority::Required {
            self.score = f64::INFINITY;
        }
        self
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self.ordinal = index;
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Whether this item must be included regardless of budget.
    pub fn is_required(&self) -> bool {
        self.priority == Priority::Required
    }

    /// Whether this is the synthetic query item.
    pub fn is_query(&self) -> bool {
        self.origin == ItemOrigin::Query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_parses_case_insensitively() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("required".parse::<Priority>().unwrap(), Priority::Required);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn priority_default_is_medium() {
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn drop_strategy_serializes_snake_case() {
        let json = serde_json::to_string(&DropStrategy::Oldest).unwrap();
        assert_eq!(json, "\"oldest\"");
    }

    #[test]
    fn builder_sets_fields() {
        let item = Item::new("docs_0", "docs", "hello")
            .with_tokens(3)
            .with_priority(Priority::Required)
            .with_position(Position::Beginning)
            .with_role("user");
        assert_eq!(item.tokens, 3);
        assert!(item.is_required());
        assert!(!item.is_query());
        assert_eq!(item.position, Some(Position::Beginning));
        assert_eq!(item.value, serde_json::json!("hello"));
    }

    #[test]
    fn required_priority_pins_score_to_infinity() {
        let item = Item::new("sys", "sys", "rules")
            .with_score(3.0)
            .with_priority(Priority::Required);
        assert_eq!(item.score, f64::INFINITY);

        let low = Item::new("doc", "docs", "text")
            .with_score(3.0)
            .with_priority(Priority::Low);
        assert_eq!(low.score, 3.0);
    }

    #[test]
    fn required_item_score_survives_json() {
        let item = Item::new("sys", "sys", "rules").with_score(f64::INFINITY);
        let json = serde_json::to_string(&item).unwrap();
        let back: Item = serde_json::from_str(&json).unwrap();
        assert!(back.score.is_infinite());
    }
}
