//! Auspex - prediction-market trading signal pipeline.
//!
//! Turns a set of prediction-market questions plus prior research context
//! into trading signals by delegating reasoning to an LLM completion service:
//! markets are analyzed in concurrent batches with retry and deterministic
//! fallback, then reconciled in a second pass for cross-market consistency.
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use auspex::models::{AnalysisInput, AuspexConfig, Market, ResearchContext};
//! use auspex::pipeline::{CompletionClient, OpenAiClient, Pipeline};
//! ```

pub use auspex_models as models;
pub use auspex_pipeline as pipeline;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use auspex_models::config::AuspexConfig;
use auspex_models::market::{Market, ResearchContext};
use auspex_models::signal::AnalysisOutput;
use auspex_pipeline::client::{CompletionClient, OpenAiClient};
use auspex_pipeline::pipeline::Pipeline;

/// Build a pipeline from configuration. The API key is read from the
/// environment variable named in the client config.
pub fn build_pipeline(config: &AuspexConfig) -> Result<Pipeline, anyhow::Error> {
    let api_key = std::env::var(&config.client.api_key_env)
        .with_context(|| format!("missing API key env var: {}", config.client.api_key_env))?;
    let client = OpenAiClient::new(&config.client, api_key, config.pipeline.model.clone())
        .map_err(|e| anyhow::anyhow!("failed to build completion client: {e}"))?;
    Ok(Pipeline::new(
        Arc::new(client) as Arc<dyn CompletionClient>,
        config.pipeline.clone(),
    ))
}

/// Run the analysis under the caller-level total timeout. Component failures
/// inside the pipeline degrade to fallbacks; only this outer timeout aborts.
pub async fn analyze(
    pipeline: &Pipeline,
    research: &ResearchContext,
    markets: &[Market],
    total_timeout: Duration,
) -> Result<AnalysisOutput, anyhow::Error> {
    tokio::time::timeout(total_timeout, pipeline.run(research, markets))
        .await
        .map_err(|_| anyhow::anyhow!("analysis timed out after {}s", total_timeout.as_secs()))
}
