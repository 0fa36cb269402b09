//! `ctxpack pack`: Pack a JSON manifest of sources.
//!
//! Manifest shape:
//!
//! ```json
//! {
//!   "budget": 2000,
//!   "query": "how do I rotate keys?",
//!   "sources": [
//!     { "name": "system", "content": "You are...", "priority": "required", "position": "beginning" },
//!     { "name": "history", "content": [ {"role": "user", "content": "..."} ],
//!       "group_by": "turns", "keep_last": 2, "drop_strategy": "oldest" },
//!     { "name": "docs", "content": ["...", "..."], "scorer": "keyword" },
//!     { "name": "tools", "content": [ {"name": "deploy"}, {"name": "build"} ],
//!       "requires": { "tools_deploy": "tools_build" } }
//!   ]
//! }
//! ```

use anyhow::{Context, bail};
use ctxpack_config::AppConfig;
use ctxpack_core::{DropStrategy, Position, Priority};
use ctxpack_engine::{AddOptions, ContextOptimizer, GroupBy, KeywordScorer, PackOptions, PackResult};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub budget: Option<usize>,
    #[serde(default)]
    pub query: Option<String>,
    pub sources: Vec<SourceEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceEntry {
    pub name: String,
    pub content: Value,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub keep_last: Option<usize>,
    #[serde(default)]
    pub drop_strategy: DropStrategy,
    /// Only `"turns"` is recognized.
    #[serde(default)]
    pub group_by: Option<String>,
    /// Role that opens a turn (default `user`).
    #[serde(default)]
    pub initiator: Option<String>,
    /// Only `"keyword"` is recognized.
    #[serde(default)]
    pub scorer: Option<String>,
    /// Trigger item id → dependency id(s).
    #[serde(default)]
    pub requires: BTreeMap<String, Dependencies>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Dependencies {
    One(String),
    Many(Vec<String>),
}

impl SourceEntry {
    fn options(&self) -> anyhow::Result<AddOptions> {
        let mut options = AddOptions::new()
            .with_priority(self.priority)
            .with_drop_strategy(self.drop_strategy);

        if let Some(position) = self.position {
            options = options.with_position(position);
        }
        if let Some(count) = self.keep_last {
            options = options.with_keep_last(count);
        }

        match self.group_by.as_deref() {
            None => {}
            Some("turns") => {
                let group = match &self.initiator {
                    Some(initiator) => GroupBy::Turns {
                        initiator: initiator.clone(),
                    },
                    None => GroupBy::turns(),
                };
                options = options.with_group_by(group);
            }
            Some(other) => bail!("source '{}': unknown group_by '{other}'", self.name),
        }

        match self.scorer.as_deref() {
            None => {}
            Some("keyword") => options = options.with_scorer(Arc::new(KeywordScorer::default())),
            Some(other) => bail!("source '{}': unknown scorer '{other}'", self.name),
        }

        for (trigger, dependencies) in &self.requires {
            let dependencies = match dependencies {
                Dependencies::One(id) => std::slice::from_ref(id),
                Dependencies::Many(ids) => ids.as_slice(),
            };
            for dependency in dependencies {
                options = options.with_requires(trigger.clone(), dependency.clone());
            }
        }

        Ok(options)
    }
}

impl Manifest {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse manifest {}", path.display()))
    }

    /// Register every source on `optimizer`.
    pub fn register(&self, optimizer: &mut ContextOptimizer) -> anyhow::Result<()> {
        for source in &self.sources {
            optimizer
                .add(source.name.clone(), source.content.clone(), source.options()?)
                .with_context(|| format!("invalid source '{}'", source.name))?;
        }
        Ok(())
    }
}

pub fn run(
    input: &Path,
    query: Option<String>,
    budget: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    let manifest = Manifest::from_path(input)?;
    tracing::debug!(
        path = %input.display(),
        sources = manifest.sources.len(),
        "manifest loaded"
    );

    let mut optimizer = ContextOptimizer::from_config(&config)?;
    manifest.register(&mut optimizer)?;

    let options = PackOptions {
        query: query.or_else(|| manifest.query.clone()),
        budget: budget.or(manifest.budget),
    };
    let result = optimizer.pack(&options);

    if json {
        println!("{}", result.to_json_pretty()?);
    } else {
        print_report(&result, &config);
    }
    Ok(())
}

fn print_report(result: &PackResult, config: &AppConfig) {
    let stats = &result.stats;

    println!("📦 Packed Context");
    println!("─────────────────────────────────────────────────────");
    println!("{:<32} {:<10} {:>8} {:>10}", "Item", "Zone", "Tokens", "Score");
    for item in &result.items {
        println!(
            "{:<32} {:<10} {:>8} {:>10}",
            item.id,
            item.placement.to_string(),
            item.tokens,
            format_score(item.score)
        );
    }

    println!();
    println!(
        "  Tokens:     {} / {} ({:.1}%)",
        stats.total_tokens,
        stats.budget,
        stats.utilization * 100.0
    );
    println!("  Required:   {}", stats.required_tokens);
    println!("  Included:   {}", stats.included_count);
    println!("  Dropped:    {}", stats.dropped_count);

    if !stats.by_source.is_empty() {
        println!();
        println!("  By source:");
        for (source, s) in &stats.by_source {
            println!(
                "    {source}: {} tokens, {}/{} items",
                s.tokens, s.items_included, s.items_total
            );
        }
    }

    if !result.dropped.is_empty() {
        println!();
        println!("  Dropped items:");
        for d in &result.dropped {
            println!("    {} ({} tokens): {}", d.id, d.tokens, d.reason);
        }
    }

    if !result.warnings.is_empty() {
        println!();
        for w in &result.warnings {
            println!("   ⚠️  {}", w.message);
        }
    }

    let table = super::pricing_table(config);
    println!();
    match result.estimate_cost(&table, &config.model, config.expected_output_tokens) {
        Some(cost) => println!(
            "  💵 {}: ${:.6} ({} in / {} out)",
            cost.model, cost.total_cost_usd, cost.input_tokens, cost.output_tokens
        ),
        None => println!("  No pricing data for '{}'", config.model),
    }
}

fn format_score(score: f64) -> String {
    if score.is_infinite() {
        "required".into()
    } else {
        format!("{score:.2}")
    }
}
