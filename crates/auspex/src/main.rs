use std::io::Read;
use std::time::Duration;

use anyhow::{Context, Result};
use auspex_models::config::AuspexConfig;
use auspex_models::market::AnalysisInput;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "auspex", about = "Prediction-market trading signal pipeline")]
struct Cli {
    /// Path to configuration file (defaults are used when omitted)
    #[arg(short, long)]
    config: Option<String>,

    /// Read the analysis input JSON from a file instead of stdin
    #[arg(short, long)]
    input: Option<String>,

    /// Override the configured model
    #[arg(long)]
    model: Option<String>,

    /// Pretty-print the output JSON
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            let config_str = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {path}"))?;
            toml::from_str::<AuspexConfig>(&config_str).with_context(|| "Failed to parse config")?
        }
        None => AuspexConfig::default(),
    };
    if let Some(model) = cli.model {
        config.pipeline.model = model;
    }

    let input_json = if let Some(input_path) = &cli.input {
        std::fs::read_to_string(input_path)
            .with_context(|| format!("Failed to read input: {input_path}"))?
    } else {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read from stdin")?;
        buf
    };

    let input: AnalysisInput =
        serde_json::from_str(&input_json).context("Failed to parse analysis input JSON")?;

    let pipeline = auspex::build_pipeline(&config).context("Failed to build pipeline")?;

    let output = auspex::analyze(
        &pipeline,
        &input.research,
        &input.markets,
        Duration::from_secs(config.total_timeout_seconds),
    )
    .await?;

    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{rendered}");

    Ok(())
}
