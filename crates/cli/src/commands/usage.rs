//! CLI commands for pricing and cost estimation.

use anyhow::Context;
use ctxpack_config::AppConfig;

/// List available model pricing.
pub fn pricing() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    let table = super::pricing_table(&config);
    let models = table.models();

    println!("💰 Model Pricing (per 1M tokens)");
    println!("─────────────────────────────────────────────────────");
    println!("{:<40} {:>10} {:>10}", "Model", "Input", "Output");
    println!("{:<40} {:>10} {:>10}", "─────", "─────", "──────");

    for name in &models {
        if let Some(p) = table.get(name) {
            println!(
                "{:<40} ${:>8.3} ${:>8.3}",
                name, p.input_per_m, p.output_per_m
            );
        }
    }

    println!();
    println!("  {} models with pricing data", models.len());

    Ok(())
}

/// Estimate cost for a given model and token counts.
pub fn estimate(
    model: &str,
    input_tokens: usize,
    output_tokens: Option<usize>,
) -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    let table = super::pricing_table(&config);
    let output_tokens = output_tokens.unwrap_or(config.expected_output_tokens);

    match table.estimate(model, input_tokens, output_tokens) {
        Some(cost) => {
            println!("💵 Cost estimate for {}", cost.model);
            println!("   Input tokens:  {} (${:.6})", cost.input_tokens, cost.input_cost_usd);
            println!("   Output tokens: {} (${:.6})", cost.output_tokens, cost.output_cost_usd);
            println!("   Estimated cost: ${:.6}", cost.total_cost_usd);
        }
        None => {
            println!("⚠ Model '{}' not found in pricing table.", model);
            println!("  Use `ctxpack pricing` to see available models.");
        }
    }

    Ok(())
}
