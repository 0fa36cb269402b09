//! `ctxpack config`: Configuration management commands.

use anyhow::Context;
use ctxpack_config::AppConfig;

pub fn validate() -> anyhow::Result<()> {
    println!("🔍 Validating configuration...");

    match AppConfig::load() {
        Ok(config) => {
            println!("   ✅ Config parsed successfully");

            let unknown: Vec<&String> = config
                .custom_pricing
                .keys()
                .filter(|model| !model.contains('/'))
                .collect();
            if unknown.is_empty() {
                println!("   ✅ All checks passed");
            } else {
                println!();
                for model in unknown {
                    println!("   ⚠️  Custom pricing key '{model}' has no provider prefix");
                }
            }

            println!();
            println!("   Budget:     {} tokens", config.budget);
            println!("   Tokenizer:  {}", config.tokenizer);
            println!("   Model:      {}", config.model);
            println!("   Output:     {} tokens expected", config.expected_output_tokens);
            println!("   Pricing:    {} custom entries", config.custom_pricing.len());
        }
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

pub fn show() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load config")?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

pub fn path() -> anyhow::Result<()> {
    let config_path = AppConfig::config_dir().join("config.toml");
    println!("{}", config_path.display());
    Ok(())
}

pub fn default() -> anyhow::Result<()> {
    println!("{}", AppConfig::default_toml());
    Ok(())
}
