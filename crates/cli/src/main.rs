//! ctxpack CLI: the main entry point.
//!
//! Commands:
//! - `pack`: Pack a JSON manifest of sources into a budget
//! - `pricing`: List model pricing
//! - `estimate`: Estimate the cost of a request
//! - `config`: Show, locate, validate, or print the default config

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "ctxpack",
    about = "ctxpack: fit LLM context into a token budget",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Pack a manifest of sources into the token budget
    Pack {
        /// Path to the JSON manifest
        #[arg(short, long)]
        input: PathBuf,

        /// Query appended last; enables relevance scorers
        #[arg(short, long)]
        query: Option<String>,

        /// Override the token budget
        #[arg(short, long)]
        budget: Option<usize>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List model pricing (per 1M tokens)
    Pricing,

    /// Estimate the cost of a request
    Estimate {
        /// Model name, e.g. openai/gpt-4o or gpt-4o
        #[arg(short, long)]
        model: String,

        /// Input (prompt) tokens
        #[arg(short, long)]
        input_tokens: usize,

        /// Output (completion) tokens; defaults to the configured expectation
        #[arg(short, long)]
        output_tokens: Option<usize>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Print the config file path
    Path,
    /// Validate the config file
    Validate,
    /// Print the default config file
    Default,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Pack {
            input,
            query,
            budget,
            json,
        } => commands::pack::run(&input, query, budget, json)?,
        Commands::Pricing => commands::usage::pricing()?,
        Commands::Estimate {
            model,
            input_tokens,
            output_tokens,
        } => commands::usage::estimate(&model, input_tokens, output_tokens)?,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show()?,
            ConfigAction::Path => commands::config_cmd::path()?,
            ConfigAction::Validate => commands::config_cmd::validate()?,
            ConfigAction::Default => commands::config_cmd::default()?,
        },
    }

    Ok(())
}
