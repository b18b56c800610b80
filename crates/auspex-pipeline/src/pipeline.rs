use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use auspex_models::config::PipelineConfig;
use auspex_models::market::{Market, ResearchContext};
use auspex_models::signal::{AnalysisOutput, Signal};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::batch::{analyze_batch, plan_batches, BatchResult};
use crate::client::CompletionClient;
use crate::fallback::{fallback_batch, fallback_reconciliation};
use crate::reconcile::reconcile_signals;
use crate::retry::with_retry;

/// Coordinates batch analysis and reconciliation over a completion client.
pub struct Pipeline {
    client: Arc<dyn CompletionClient>,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(client: Arc<dyn CompletionClient>, config: PipelineConfig) -> Self {
        Self { client, config }
    }

    /// Run the full analysis: batch fan-out with retry and fallback, a barrier,
    /// then one reconciliation pass with its own retry and fallback.
    ///
    /// Model flakiness never surfaces as an error; every batch and the
    /// reconciliation step degrade to deterministic substitutes instead.
    pub async fn run(&self, ctx: &ResearchContext, markets: &[Market]) -> AnalysisOutput {
        let run_id = Uuid::new_v4();
        let started = Instant::now();
        let batches = plan_batches(markets, self.config.batch_size);
        info!(
            %run_id,
            markets = markets.len(),
            batches = batches.len(),
            "starting analysis"
        );

        let shared_ctx = Arc::new(ctx.clone());
        let mut handles = Vec::with_capacity(batches.len());
        for (batch_index, batch) in batches.iter().cloned().enumerate() {
            let client = Arc::clone(&self.client);
            let config = self.config.clone();
            let ctx = Arc::clone(&shared_ctx);
            handles.push(tokio::spawn(async move {
                let result = with_retry(&config, || {
                    analyze_batch(client.as_ref(), &ctx, &batch, batch_index, &config)
                })
                .await;
                if result.success() {
                    result
                } else {
                    let reason = result
                        .error
                        .unwrap_or_else(|| format!("batch {batch_index} produced no signals"));
                    warn!(batch_index, reason = %reason, "batch exhausted retries, applying fallback");
                    fallback_batch(&batch, batch_index, &reason)
                }
            }));
        }

        // Barrier: every batch reaches a terminal state before reconciliation.
        // Joining in spawn order keeps the flattened list in batch order.
        let mut results: Vec<BatchResult> = Vec::with_capacity(handles.len());
        for (batch_index, handle) in handles.into_iter().enumerate() {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => {
                    error!(batch_index, error = %e, "batch task panicked");
                    results.push(fallback_batch(
                        &batches[batch_index],
                        batch_index,
                        "analysis task panicked",
                    ));
                }
            }
        }

        let merged: Vec<Signal> = results.into_iter().flat_map(|r| r.signals).collect();

        let reconciled = with_retry(&self.config, || {
            reconcile_signals(self.client.as_ref(), ctx, &merged, &self.config)
        })
        .await;

        let outcome = if reconciled.success() {
            reconciled
        } else {
            let reason = reconciled
                .error
                .unwrap_or_else(|| "reconciliation produced no signals".to_string());
            warn!(%run_id, reason = %reason, "reconciliation exhausted retries, applying fallback");
            fallback_reconciliation(merged, ctx.sentiment, &reason)
        };

        // Prices on output signals always come from the input markets, never
        // from anything the model echoed back.
        let price_index: HashMap<&str, Option<f64>> = markets
            .iter()
            .map(|m| (m.id.as_str(), m.current_price))
            .collect();
        let mut signals = outcome.signals;
        for signal in &mut signals {
            signal.current_price = price_index
                .get(signal.market_id.as_str())
                .copied()
                .flatten();
        }

        info!(
            %run_id,
            signals = signals.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "analysis complete"
        );

        AnalysisOutput {
            signals,
            overall_analysis: outcome.overall_analysis,
            generated_at: chrono::Utc::now(),
        }
    }
}
