//! Built-in pricing table for common LLM models.
//!
//! Prices are in USD per 1 million tokens. Each model has an input and
//! output price. Custom pricing can be added at runtime or via TOML config.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-million-token pricing for a model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelPricing {
    /// Price per 1M input tokens in USD.
    pub input_per_m: f64,
    /// Price per 1M output tokens in USD.
    pub output_per_m: f64,
}

impl ModelPricing {
    pub fn new(input_per_m: f64, output_per_m: f64) -> Self {
        Self {
            input_per_m,
            output_per_m,
        }
    }

    /// Compute cost for the given token counts.
    pub fn cost(&self, input_tokens: usize, output_tokens: usize) -> f64 {
        (input_tokens as f64 * self.input_per_m + output_tokens as f64 * self.output_per_m)
            / 1_000_000.0
    }
}

/// Cost breakdown for one prospective model call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    /// Table key the model resolved to.
    pub model: String,
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub input_cost_usd: f64,
    pub output_cost_usd: f64,
    pub total_cost_usd: f64,
}

/// Model pricing with built-in defaults and custom overrides.
#[derive(Debug, Clone)]
pub struct PricingTable {
    prices: HashMap<String, ModelPricing>,
}

impl PricingTable {
    /// Create a pricing table with built-in model prices.
    pub fn with_defaults() -> Self {
        let mut prices = HashMap::new();

        // ── Anthropic ──────────────────────────────────────────────
        prices.insert("anthropic/claude-sonnet-4".into(), ModelPricing::new(3.0, 15.0));
        prices.insert("anthropic/claude-opus-4".into(), ModelPricing::new(15.0, 75.0));
        prices.insert("anthropic/claude-3.5-sonnet".into(), ModelPricing::new(3.0, 15.0));
        prices.insert("anthropic/claude-3.5-haiku".into(), ModelPricing::new(0.8, 4.0));
        prices.insert("anthropic/claude-3-haiku".into(), ModelPricing::new(0.25, 1.25));

        // ── OpenAI ─────────────────────────────────────────────────
        prices.insert("openai/gpt-4o".into(), ModelPricing::new(2.5, 10.0));
        prices.insert("openai/gpt-4o-mini".into(), ModelPricing::new(0.15, 0.6));
        prices.insert("openai/gpt-4-turbo".into(), ModelPricing::new(10.0, 30.0));
        prices.insert("openai/o1".into(), ModelPricing::new(15.0, 60.0));
        prices.insert("openai/o1-mini".into(), ModelPricing::new(3.0, 12.0));
        prices.insert("openai/o3-mini".into(), ModelPricing::new(1.1, 4.4));

        // ── Google ─────────────────────────────────────────────────
        prices.insert("google/gemini-2.0-flash".into(), ModelPricing::new(0.1, 0.4));
        prices.insert("google/gemini-2.0-pro".into(), ModelPricing::new(1.25, 10.0));
        prices.insert("google/gemini-1.5-pro".into(), ModelPricing::new(1.25, 5.0));
        prices.insert("google/gemini-1.5-flash".into(), ModelPricing::new(0.075, 0.3));

        // ── Mistral ────────────────────────────────────────────────
        prices.insert("mistral/mistral-large".into(), ModelPricing::new(2.0, 6.0));
        prices.insert("mistral/mistral-small".into(), ModelPricing::new(0.2, 0.6));

        // ── DeepSeek ───────────────────────────────────────────────
        prices.insert("deepseek/deepseek-v3".into(), ModelPricing::new(0.27, 1.1));
        prices.insert("deepseek/deepseek-r1".into(), ModelPricing::new(0.55, 2.19));

        Self { prices }
    }

    /// Create an empty pricing table.
    pub fn empty() -> Self {
        Self {
            prices: HashMap::new(),
        }
    }

    /// Look up pricing for an exact model key.
    pub fn get(&self, model: &str) -> Option<ModelPricing> {
        self.prices.get(model).copied()
    }

    /// Add or update pricing for a model.
    pub fn set(&mut self, model: impl Into<String>, pricing: ModelPricing) {
        self.prices.insert(model.into(), pricing);
    }

    /// Resolve a model name to a table entry.
    ///
    /// Tries an exact match first, then common provider prefixes
    /// (`gpt-4o` → `openai/gpt-4o`), then the longest key whose bare name is
    /// a prefix of the model (`gpt-4o-mini-2024-07-18` → `gpt-4o-mini`).
    pub fn resolve(&self, model: &str) -> Option<(&str, ModelPricing)> {
        if let Some((key, p)) = self.prices.get_key_value(model) {
            return Some((key.as_str(), *p));
        }

        for provider in ["openai", "anthropic", "google", "mistral", "deepseek"] {
            let name = format!("{provider}/{model}");
            if let Some((key, p)) = self.prices.get_key_value(name.as_str()) {
                return Some((key.as_str(), *p));
            }
        }

        let model_lower = model.to_lowercase();
        let bare_model = model_lower.rsplit('/').next().unwrap_or(&model_lower);

        let best = self
            .prices
            .iter()
            .filter_map(|(key, p)| {
                let bare_key = key.rsplit('/').next().unwrap_or(key.as_str());
                bare_model
                    .starts_with(&bare_key.to_lowercase())
                    .then_some((key, p, bare_key.len()))
            })
            .max_by(|a, b| a.2.cmp(&b.2).then_with(|| b.0.cmp(a.0)))
            .map(|(key, p, _)| (key, p));

        if let Some((key, p)) = best {
            tracing::debug!(model, resolved = %key, "pricing resolved by prefix");
            return Some((key.as_str(), *p));
        }

        None
    }

    /// Estimate the cost of a call. `None` if the model is unknown.
    pub fn estimate(&self, model: &str, input_tokens: usize, output_tokens: usize) -> Option<CostEstimate> {
        let (key, pricing) = self.resolve(model)?;
        let input_cost_usd = pricing.cost(input_tokens, 0);
        let output_cost_usd = pricing.cost(0, output_tokens);
        Some(CostEstimate {
            model: key.to_string(),
            input_tokens,
            output_tokens,
            input_cost_usd,
            output_cost_usd,
            total_cost_usd: input_cost_usd + output_cost_usd,
        })
    }

    /// List all known model names, sorted.
    pub fn models(&self) -> Vec<String> {
        let mut names: Vec<String> = self.prices.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl Default for PricingTable {
    fn default() -> Self {
        Self::with_defaults()
    }
}
