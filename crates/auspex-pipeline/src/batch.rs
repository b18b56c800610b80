use std::collections::HashMap;
use std::time::Instant;

use auspex_models::config::PipelineConfig;
use auspex_models::market::{Market, ResearchContext};
use auspex_models::signal::Signal;
use tracing::{info, warn};

use crate::client::CompletionClient;
use crate::parser::{parse_json_object, signals_from_parsed};
use crate::prompts::{format_batch_prompt, BATCH_SYSTEM_PROMPT};
use crate::retry::Retryable;

/// Partition an ordered market list into fixed-size batches.
///
/// Concatenating the batches in order reproduces the input exactly. Callers
/// must supply `batch_size >= 1`.
pub fn plan_batches(markets: &[Market], batch_size: usize) -> Vec<Vec<Market>> {
    markets
        .chunks(batch_size)
        .map(|chunk| chunk.to_vec())
        .collect()
}

/// Output from a single batch analysis call.
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    pub batch_index: usize,
    pub signals: Vec<Signal>,
    pub error: Option<String>,
}

impl BatchResult {
    /// A batch that produced no signals is useless to the caller, so a clean
    /// but empty reply still counts as a failure.
    pub fn success(&self) -> bool {
        self.error.is_none() && !self.signals.is_empty()
    }

    fn failed(batch_index: usize, error: String) -> Self {
        Self {
            batch_index,
            signals: Vec::new(),
            error: Some(error),
        }
    }
}

impl Retryable for BatchResult {
    fn succeeded(&self) -> bool {
        self.success()
    }
}

/// Analyze one batch of markets against the shared research context.
///
/// The whole request + parse sequence is bounded by the per-batch timeout.
/// Failures are captured on the result, never returned as errors.
pub async fn analyze_batch(
    client: &dyn CompletionClient,
    ctx: &ResearchContext,
    markets: &[Market],
    batch_index: usize,
    config: &PipelineConfig,
) -> BatchResult {
    let prompt = format_batch_prompt(ctx, markets);
    let started = Instant::now();

    let attempt = tokio::time::timeout(config.per_batch_timeout(), async {
        let reply = client.complete(BATCH_SYSTEM_PROMPT, &prompt).await?;
        let text = reply.into_text();
        parse_json_object(text.trim())
    })
    .await;

    let parsed = match attempt {
        Ok(Ok(parsed)) => parsed,
        Ok(Err(e)) => {
            warn!(batch_index, error = %e, "batch analysis failed");
            return BatchResult::failed(batch_index, format!("batch {batch_index} failed: {e}"));
        }
        Err(_) => {
            warn!(
                batch_index,
                timeout_s = config.per_batch_timeout_seconds,
                "batch analysis timed out"
            );
            return BatchResult::failed(
                batch_index,
                format!(
                    "batch {batch_index} timed out after {}s",
                    config.per_batch_timeout_seconds
                ),
            );
        }
    };

    // The reconciler needs prices; attach them from the input markets rather
    // than trusting anything the model echoed.
    let price_index: HashMap<String, Option<f64>> = markets
        .iter()
        .map(|m| (m.id.clone(), m.current_price))
        .collect();
    let signals = signals_from_parsed(&parsed, Some(&price_index));

    info!(
        batch_index,
        signals = signals.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "batch analysis complete"
    );

    BatchResult {
        batch_index,
        signals,
        error: None,
    }
}
