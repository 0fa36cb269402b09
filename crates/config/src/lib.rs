//! Configuration loading, validation, and management for ctxpack.
//!
//! Loads configuration from `~/.ctxpack/config.toml` with environment
//! variable overrides. Validates all settings at load time.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Tokenizer names the engine knows how to build.
pub const KNOWN_TOKENIZERS: &[&str] = &["heuristic", "chars"];

/// The root configuration structure.
///
/// Maps directly to `~/.ctxpack/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default token budget for a pack call
    #[serde(default = "default_budget")]
    pub budget: usize,

    /// Token estimator: "heuristic" or "chars"
    #[serde(default = "default_tokenizer")]
    pub tokenizer: String,

    /// Model used for cost estimates
    #[serde(default = "default_model")]
    pub model: String,

    /// Expected completion length used for cost estimates
    #[serde(default = "default_expected_output_tokens")]
    pub expected_output_tokens: usize,

    /// Custom model pricing overrides (model name → pricing)
    #[serde(default)]
    pub custom_pricing: BTreeMap<String, PricingOverrideConfig>,
}

fn default_budget() -> usize {
    4096
}
fn default_tokenizer() -> String {
    "heuristic".into()
}
fn default_model() -> String {
    "anthropic/claude-sonnet-4".into()
}
fn default_expected_output_tokens() -> usize {
    1024
}

/// Custom per-million-token pricing for a model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingOverrideConfig {
    /// Price per 1M input tokens in USD
    pub input_per_m: f64,
    /// Price per 1M output tokens in USD
    pub output_per_m: f64,
}

impl AppConfig {
    /// Load configuration from the default path (~/.ctxpack/config.toml).
    ///
    /// Environment variables override file values:
    /// - `CTXPACK_BUDGET`
    /// - `CTXPACK_MODEL`
    /// - `CTXPACK_TOKENIZER`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// [`AppConfig::load`]).
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(budget) = lookup("CTXPACK_BUDGET") {
            self.budget = budget.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!("CTXPACK_BUDGET must be a token count, got '{budget}'"))
            })?;
        }

        if let Some(model) = lookup("CTXPACK_MODEL") {
            self.model = model;
        }

        if let Some(tokenizer) = lookup("CTXPACK_TOKENIZER") {
            self.tokenizer = tokenizer;
        }

        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".ctxpack")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.budget == 0 {
            return Err(ConfigError::ValidationError("budget must be greater than 0".into()));
        }

        if !KNOWN_TOKENIZERS.contains(&self.tokenizer.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "unknown tokenizer '{}' (expected one of: {})",
                self.tokenizer,
                KNOWN_TOKENIZERS.join(", ")
            )));
        }

        for (model, pricing) in &self.custom_pricing {
            let valid = |price: f64| price.is_finite() && price >= 0.0;
            if !valid(pricing.input_per_m) || !valid(pricing.output_per_m) {
                return Err(ConfigError::ValidationError(format!(
                    "pricing for '{model}' must be finite and non-negative"
                )));
            }
        }

        Ok(())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            budget: default_budget(),
            tokenizer: default_tokenizer(),
            model: default_model(),
            expected_output_tokens: default_expected_output_tokens(),
            custom_pricing: BTreeMap::new(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
