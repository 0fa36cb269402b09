//! The pipeline orchestrator.
//!
//! Owns the registered sources and runs one pack call end to end:
//!
//! 1. **Normalize** each source into measured items (tokens counted once)
//! 2. **Group** conversational sources into turns
//! 3. **Score** by priority, promote `keep_last`, apply custom scorers
//!    (query present) and recency decay
//! 4. **Pack** greedily against the budget
//! 5. **Constrain**: pull dependencies in, remove triggers that cannot be satisfied
//! 6. **Place** the selection for positional attention
//! 7. **Report**: stats and warnings
//!
//! # Purity
//!
//! `pack` takes `&self`. Items are rebuilt from the registered raw content on
//! every call, so scores from one call (custom scorers, recency) can never
//! leak into the next one or into the registration itself.

use crate::constraints::enforce_constraints;
use crate::normalize::{disambiguate_ids, normalize_source};
use crate::packer::pack_greedy;
use crate::placement::place;
use crate::recency::apply_recency;
use crate::result::PackResult;
use crate::scoring::base_score;
use crate::source::{AddOptions, GroupBy, Source};
use crate::token::{HeuristicTokenizer, tokenizer_for};
use crate::turns::group_turns;
use ctxpack_config::AppConfig;
use ctxpack_core::{
    DropReason, DropStrategy, DroppedItem, Error, Item, ItemOrigin, Position, Priority, Result,
    Tokenizer,
};
use ctxpack_telemetry::{detect_warnings, summarize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Source name (and item id) of the synthetic query item.
pub const QUERY_SOURCE: &str = "query";

/// Per-call options for [`ContextOptimizer::pack`].
#[derive(Debug, Clone, Default)]
pub struct PackOptions {
    /// Appended as a required item at the very end; enables custom scorers.
    pub query: Option<String>,
    /// Overrides the optimizer's budget for this call.
    pub budget: Option<usize>,
}

impl PackOptions {
    pub fn with_query(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            budget: None,
        }
    }

    pub fn budget(mut self, budget: usize) -> Self {
        self.budget = Some(budget);
        self
    }
}

/// Selects and arranges registered content within a token budget.
pub struct ContextOptimizer {
    budget: usize,
    tokenizer: Arc<dyn Tokenizer>,
    sources: Vec<Source>,
}

impl ContextOptimizer {
    /// Create an optimizer with the heuristic tokenizer.
    pub fn new(budget: usize) -> Self {
        Self {
            budget,
            tokenizer: Arc::new(HeuristicTokenizer),
            sources: Vec::new(),
        }
    }

    /// Build an optimizer from loaded configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let tokenizer = tokenizer_for(&config.tokenizer).ok_or_else(|| Error::Config {
            message: format!("unknown tokenizer '{}'", config.tokenizer),
        })?;
        Ok(Self::new(config.budget).with_tokenizer(tokenizer))
    }

    /// Replace the token counter.
    pub fn with_tokenizer(mut self, tokenizer: Arc<dyn Tokenizer>) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    pub fn tokenizer_name(&self) -> &str {
        self.tokenizer.name()
    }

    /// Register a source. Re-adding a name replaces the earlier registration
    /// in place.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        content: impl Into<Value>,
        options: AddOptions,
    ) -> Result<()> {
        let name = name.into();
        validate_source(&name, &options)?;

        let source = Source {
            name: name.clone(),
            content: content.into(),
            options,
        };

        match self.sources.iter_mut().find(|s| s.name == name) {
            Some(existing) => {
                debug!(source = %name, "replacing source");
                *existing = source;
            }
            None => {
                debug!(source = %name, "adding source");
                self.sources.push(source);
            }
        }
        Ok(())
    }

    /// Remove a source. Returns whether it was registered.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.sources.len();
        self.sources.retain(|s| s.name != name);
        self.sources.len() != before
    }

    /// Remove every source.
    pub fn clear(&mut self) {
        self.sources.clear();
    }

    /// Registered source names, in registration order.
    pub fn sources(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Run the full pipeline against the registered sources.
    pub fn pack(&self, options: &PackOptions) -> PackResult {
        let budget = options.budget.unwrap_or(self.budget);
        let query = options.query.as_deref().filter(|q| !q.trim().is_empty());

        let mut candidates = Vec::new();
        let mut constraints = Vec::new();
        for source in &self.sources {
            let ordinal_start = candidates.len();
            let items = self.prepare_source(source, query);
            candidates.extend(items.into_iter().enumerate().map(|(offset, mut item)| {
                item.ordinal = ordinal_start + offset;
                item
            }));
            constraints.extend(source.options.requires.iter().cloned());
        }
        let renamed = disambiguate_ids(&mut candidates);
        if renamed > 0 {
            debug!(renamed, "disambiguated duplicate item ids");
        }
        if let Some(query) = query {
            candidates.push(self.query_item(query, candidates.len()));
        }

        let required_tokens: usize = candidates
            .iter()
            .filter(|item| item.is_required())
            .map(|item| item.tokens)
            .sum();
        if required_tokens > budget {
            warn!(required_tokens, budget, "required content exceeds budget");
        }

        let candidate_count = candidates.len();
        let packed = pack_greedy(candidates, budget);
        debug!(
            included = packed.included.len(),
            dropped = packed.dropped.len(),
            "packed"
        );

        let enforced = enforce_constraints(packed.included, packed.dropped, &constraints, budget);
        if !enforced.added.is_empty() || !enforced.removed.is_empty() {
            debug!(
                added = enforced.added.len(),
                removed = enforced.removed.len(),
                "constraints enforced"
            );
        }

        let dropped: Vec<DroppedItem> = enforced
            .available
            .iter()
            .map(|item| DroppedItem::from_item(item, DropReason::BudgetExhausted))
            .chain(
                enforced
                    .removed
                    .iter()
                    .map(|item| DroppedItem::from_item(item, DropReason::ConstraintDependencyUnavailable)),
            )
            .collect();

        let items = place(enforced.included);
        let stats = summarize(&items, &dropped, required_tokens, budget);
        let warnings = detect_warnings(&stats, &enforced.unresolved);

        info!(
            budget,
            total_tokens = stats.total_tokens,
            candidates = candidate_count,
            included = stats.included_count,
            dropped = stats.dropped_count,
            warnings = warnings.len(),
            "context packed"
        );

        PackResult {
            items,
            stats,
            warnings,
            dropped,
        }
    }

    /// Normalize, group, and score one source's items, in index order.
    fn prepare_source(&self, source: &Source, query: Option<&str>) -> Vec<Item> {
        let options = &source.options;
        let mut items = normalize_source(&source.name, &source.content, self.tokenizer.as_ref());

        if let Some(GroupBy::Turns { initiator }) = &options.group_by {
            let raw = items.len();
            items = group_turns(&source.name, items, initiator);
            debug!(source = %source.name, messages = raw, turns = items.len(), "grouped turns");
        }

        for item in &mut items {
            item.priority = options.priority;
            item.position = options.position;
            item.score = base_score(options.priority);
        }

        if let Some(keep) = options.keep_last {
            let start = items.len().saturating_sub(keep);
            for item in &mut items[start..] {
                item.priority = Priority::Required;
                item.score = base_score(Priority::Required);
            }
        }

        if let (Some(query), Some(scorer)) = (query, &options.scorer) {
            for item in items.iter_mut().filter(|item| !item.is_required()) {
                item.score = scorer.score(item, query);
            }
        }

        if options.drop_strategy == DropStrategy::Oldest {
            items = apply_recency(items);
        }

        items.sort_by_key(|item| item.index);
        items
    }

    fn query_item(&self, query: &str, ordinal: usize) -> Item {
        let mut item = Item::new(QUERY_SOURCE, QUERY_SOURCE, query)
            .with_tokens(self.tokenizer.count(query))
            .with_priority(Priority::Required)
            .with_score(base_score(Priority::Required))
            .with_position(Position::End)
            .with_role("user");
        item.value = serde_json::json!({ "role": "user", "content": query });
        item.origin = ItemOrigin::Query;
        item.ordinal = ordinal;
        item
    }
}

impl std::fmt::Debug for ContextOptimizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextOptimizer")
            .field("budget", &self.budget)
            .field("tokenizer", &self.tokenizer.name())
            .field("sources", &self.sources())
            .finish()
    }
}

fn validate_source(name: &str, options: &AddOptions) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidSource {
            name: name.to_string(),
            reason: "name must not be empty".into(),
        });
    }
    if name == QUERY_SOURCE {
        return Err(Error::InvalidSource {
            name: name.to_string(),
            reason: "name is reserved for the pack query".into(),
        });
    }
    for constraint in &options.requires {
        let reason = if constraint.if_included.is_empty() || constraint.then_require.is_empty() {
            "item ids must not be empty"
        } else if constraint.if_included == constraint.then_require {
            "an item cannot require itself"
        } else {
            continue;
        };
        return Err(Error::InvalidConstraint {
            trigger: constraint.if_included.clone(),
            dependency: constraint.then_require.clone(),
            reason: reason.into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relevance::KeywordScorer;
    use ctxpack_core::{Placement, Scorer};
    use ctxpack_telemetry::WarningKind;
    use serde_json::json;

    /// One token per whitespace-separated word.
    fn words() -> Arc<dyn Tokenizer> {
        Arc::new(|text: &str| text.split_whitespace().count())
    }

    fn optimizer(budget: usize) -> ContextOptimizer {
        ContextOptimizer::new(budget).with_tokenizer(words())
    }

    fn ids(result: &PackResult) -> Vec<&str> {
        result.items.iter().map(|item| item.id.as_str()).collect()
    }

    #[test]
    fn required_content_survives_an_undersized_budget() {
        let mut opt = optimizer(2);
        opt.add(
            "system",
            "you are a careful assistant",
            AddOptions::new().with_priority(Priority::Required),
        )
        .unwrap();
        opt.add("docs", json!(["one two", "three"]), AddOptions::new())
            .unwrap();

        let result = opt.pack(&PackOptions::default());

        assert_eq!(ids(&result), vec!["system"]);
        assert_eq!(result.stats.required_tokens, 5);
        assert_eq!(result.dropped.len(), 2);
        assert!(
            result
                .warnings
                .iter()
                .any(|w| w.kind == WarningKind::RequiredExceedsBudget)
        );
    }

    #[test]
    fn higher_priority_wins_the_budget() {
        let mut opt = optimizer(3);
        opt.add("low", "a b c", AddOptions::new().with_priority(Priority::Low))
            .unwrap();
        opt.add("high", "d e f", AddOptions::new().with_priority(Priority::High))
            .unwrap();

        let result = opt.pack(&PackOptions::default());
        assert_eq!(ids(&result), vec!["high"]);
        assert_eq!(result.dropped[0].id, "low");
        assert_eq!(result.dropped[0].reason, DropReason::BudgetExhausted);
    }

    #[test]
    fn pack_is_pure_across_queries() {
        let mut opt = optimizer(3);
        let scorer: Arc<dyn Scorer> = Arc::new(KeywordScorer::default());
        opt.add(
            "docs",
            json!(["rust ownership", "python decorators"]),
            AddOptions::new().with_scorer(scorer),
        )
        .unwrap();

        let rust = opt.pack(&PackOptions::with_query("rust"));
        let python = opt.pack(&PackOptions::with_query("python"));
        let rust_again = opt.pack(&PackOptions::with_query("rust"));

        assert_eq!(ids(&rust), vec!["docs_0", "query"]);
        assert_eq!(ids(&python), vec!["docs_1", "query"]);
        assert_eq!(ids(&rust), ids(&rust_again));
        assert_eq!(rust.items[0].score, rust_again.items[0].score);
    }

    #[test]
    fn scorer_never_rescores_required_items() {
        let mut opt = optimizer(100);
        let zero: Arc<dyn Scorer> = Arc::new(|_: &Item, _: &str| 0.0);
        opt.add(
            "chat",
            json!(["a", "b", "c"]),
            AddOptions::new()
                .with_scorer(zero)
                .with_keep_last(1)
                .with_drop_strategy(DropStrategy::Oldest),
        )
        .unwrap();

        let result = opt.pack(&PackOptions::with_query("q"));
        let score_of = |id: &str| {
            result
                .items
                .iter()
                .find(|item| item.id == id)
                .map(|item| item.score)
        };
        assert_eq!(score_of("chat_2"), Some(f64::INFINITY));
        assert_eq!(score_of("chat_0"), Some(0.0));
        assert_eq!(score_of("chat_1"), Some(0.0));
    }

    #[test]
    fn colliding_item_ids_are_made_unique() {
        let mut opt = optimizer(100);
        opt.add(
            "tools",
            json!([{"name": "search"}, {"name": "search"}]),
            AddOptions::new(),
        )
        .unwrap();
        opt.add("tools_search", "another source", AddOptions::new())
            .unwrap();

        let result = opt.pack(&PackOptions::default());
        let unique: std::collections::HashSet<&str> = ids(&result).into_iter().collect();
        assert_eq!(result.items.len(), 3);
        assert_eq!(unique.len(), 3);
        assert!(result.contains("tools_search"));
        assert!(result.contains("tools_search_2"));
        assert!(result.contains("tools_search_3"));
    }

    #[test]
    fn scorer_is_ignored_without_a_query() {
        let mut opt = optimizer(100);
        let zero: Arc<dyn Scorer> = Arc::new(|_: &Item, _: &str| 0.0);
        opt.add("docs", json!(["alpha"]), AddOptions::new().with_scorer(zero))
            .unwrap();

        let result = opt.pack(&PackOptions::default());
        assert_eq!(result.items[0].score, 100.0);
    }

    #[test]
    fn keep_last_counts_turns_when_grouped() {
        let mut opt = optimizer(0);
        opt.add(
            "chat",
            json!([
                {"role": "user", "content": "first question"},
                {"role": "assistant", "content": "first answer"},
                {"role": "user", "content": "second question"},
                {"role": "assistant", "content": "second answer"},
            ]),
            AddOptions::new()
                .with_group_by(GroupBy::turns())
                .with_keep_last(1),
        )
        .unwrap();

        let result = opt.pack(&PackOptions::default());
        assert_eq!(ids(&result), vec!["chat_turn_1"]);
        assert_eq!(result.items[0].tokens, 4);

        let messages = result.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["content"], "second question");
    }

    #[test]
    fn oldest_strategy_prefers_recent_items() {
        let mut opt = optimizer(2);
        opt.add(
            "log",
            json!(["old entry", "mid entry", "new entry"]),
            AddOptions::new().with_drop_strategy(DropStrategy::Oldest),
        )
        .unwrap();

        let result = opt.pack(&PackOptions::default());
        assert_eq!(ids(&result), vec!["log_2"]);
    }

    #[test]
    fn satisfied_constraints_keep_both_items() {
        let mut opt = optimizer(10);
        opt.add(
            "tools",
            json!([
                {"name": "deploy", "content": "deploy"},
                {"name": "build", "content": "build"},
            ]),
            AddOptions::new().with_requires("tools_deploy", "tools_build"),
        )
        .unwrap();

        let result = opt.pack(&PackOptions::default());
        assert!(result.contains("tools_deploy"));
        assert!(result.contains("tools_build"));
        assert!(result.dropped.is_empty());
    }

    #[test]
    fn missing_dependency_cascades_through_the_chain() {
        let mut opt = optimizer(10);
        opt.add(
            "deploy",
            "deploy the service",
            AddOptions::new()
                .with_priority(Priority::High)
                .with_requires("deploy", "build"),
        )
        .unwrap();
        opt.add(
            "build",
            "build it",
            AddOptions::new()
                .with_priority(Priority::Low)
                .with_requires("build", "lint"),
        )
        .unwrap();
        opt.add("notes", "keep me", AddOptions::new()).unwrap();

        let result = opt.pack(&PackOptions::default());
        assert_eq!(ids(&result), vec!["notes"]);
        assert_eq!(result.dropped.len(), 2);
        assert!(
            result
                .dropped
                .iter()
                .all(|d| d.reason == DropReason::ConstraintDependencyUnavailable)
        );
    }

    #[test]
    fn required_trigger_without_dependency_is_reported() {
        let mut opt = optimizer(10);
        opt.add(
            "system",
            "rules",
            AddOptions::new()
                .with_priority(Priority::Required)
                .with_requires("system", "glossary"),
        )
        .unwrap();

        let result = opt.pack(&PackOptions::default());
        assert!(result.contains("system"));
        assert!(
            result
                .warnings
                .iter()
                .any(|w| w.kind == WarningKind::UnresolvedConstraint)
        );
    }

    #[test]
    fn query_lands_last_and_pins_hold_their_edges() {
        let mut opt = optimizer(100);
        opt.add(
            "system",
            "rules",
            AddOptions::new()
                .with_priority(Priority::Required)
                .with_position(Position::Beginning),
        )
        .unwrap();
        opt.add("docs", json!(["a", "b", "c"]), AddOptions::new())
            .unwrap();
        opt.add(
            "reminder",
            "be brief",
            AddOptions::new().with_position(Position::End),
        )
        .unwrap();

        let result = opt.pack(&PackOptions::with_query("what now"));
        let order = ids(&result);
        assert_eq!(order.first(), Some(&"system"));
        assert_eq!(order.last(), Some(&"query"));
        assert_eq!(order[order.len() - 2], "reminder");
        assert_eq!(result.items.last().map(|i| i.placement), Some(Placement::End));
        assert_eq!(result.items[0].placement, Placement::Beginning);
    }

    #[test]
    fn blank_query_is_ignored() {
        let mut opt = optimizer(10);
        opt.add("docs", "a", AddOptions::new()).unwrap();
        let result = opt.pack(&PackOptions::with_query("   "));
        assert!(!result.contains("query"));
    }

    #[test]
    fn budget_override_applies_to_one_call() {
        let mut opt = optimizer(100);
        opt.add("docs", json!(["a b", "c d"]), AddOptions::new())
            .unwrap();

        assert_eq!(opt.pack(&PackOptions::default().budget(2)).items.len(), 1);
        assert_eq!(opt.pack(&PackOptions::default()).items.len(), 2);
    }

    #[test]
    fn readding_a_source_replaces_it_in_place() {
        let mut opt = optimizer(100);
        opt.add("a", "one", AddOptions::new()).unwrap();
        opt.add("b", "two", AddOptions::new()).unwrap();
        opt.add("a", "three", AddOptions::new()).unwrap();

        assert_eq!(opt.sources(), vec!["a", "b"]);
        assert!(opt.pack(&PackOptions::default()).text().contains("three"));
        assert!(opt.remove("a"));
        assert!(!opt.remove("a"));
        opt.clear();
        assert!(opt.is_empty());
    }

    #[test]
    fn add_rejects_invalid_registrations() {
        let mut opt = optimizer(100);
        assert!(matches!(
            opt.add("", "x", AddOptions::new()),
            Err(Error::InvalidSource { .. })
        ));
        assert!(matches!(
            opt.add(QUERY_SOURCE, "x", AddOptions::new()),
            Err(Error::InvalidSource { .. })
        ));
        assert!(matches!(
            opt.add("tools", "x", AddOptions::new().with_requires("a", "a")),
            Err(Error::InvalidConstraint { .. })
        ));
        assert!(opt.is_empty());
    }

    #[test]
    fn from_config_selects_the_tokenizer() {
        let mut config = AppConfig::default();
        config.tokenizer = "chars".into();
        config.budget = 77;
        let opt = ContextOptimizer::from_config(&config).unwrap();
        assert_eq!(opt.tokenizer_name(), "chars");
        assert_eq!(opt.budget(), 77);

        config.tokenizer = "bpe".into();
        assert!(matches!(
            ContextOptimizer::from_config(&config),
            Err(Error::Config { .. })
        ));
    }
}
