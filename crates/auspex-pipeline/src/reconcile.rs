use std::time::Instant;

use auspex_models::config::PipelineConfig;
use auspex_models::market::ResearchContext;
use auspex_models::signal::Signal;
use serde_json::Value;
use tracing::{info, warn};

use crate::client::CompletionClient;
use crate::parser::{parse_json_object, signals_from_parsed};
use crate::prompts::{format_reconciliation_prompt, RECONCILIATION_SYSTEM_PROMPT};
use crate::retry::Retryable;

/// Output from the reconciliation call.
#[derive(Debug, Clone, Default)]
pub struct ReconciliationResult {
    pub signals: Vec<Signal>,
    pub overall_analysis: String,
    pub error: Option<String>,
}

impl ReconciliationResult {
    pub fn success(&self) -> bool {
        self.error.is_none() && !self.signals.is_empty()
    }

    fn failed(error: String) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }
}

impl Retryable for ReconciliationResult {
    fn succeeded(&self) -> bool {
        self.success()
    }
}

/// Review the merged batch signals for cross-market consistency in a single
/// completion call. On success the model's signal list replaces the input.
pub async fn reconcile_signals(
    client: &dyn CompletionClient,
    ctx: &ResearchContext,
    all_signals: &[Signal],
    config: &PipelineConfig,
) -> ReconciliationResult {
    let prompt = format_reconciliation_prompt(ctx, all_signals);
    let started = Instant::now();

    let attempt = tokio::time::timeout(config.reconciliation_timeout(), async {
        let reply = client.complete(RECONCILIATION_SYSTEM_PROMPT, &prompt).await?;
        let text = reply.into_text();
        parse_json_object(text.trim())
    })
    .await;

    let parsed = match attempt {
        Ok(Ok(parsed)) => parsed,
        Ok(Err(e)) => {
            warn!(error = %e, "reconciliation failed");
            return ReconciliationResult::failed(format!("reconciliation failed: {e}"));
        }
        Err(_) => {
            warn!(
                timeout_s = config.reconciliation_timeout_seconds,
                "reconciliation timed out"
            );
            return ReconciliationResult::failed(format!(
                "reconciliation timed out after {}s",
                config.reconciliation_timeout_seconds
            ));
        }
    };

    let signals = signals_from_parsed(&parsed, None);
    let overall_analysis = match parsed.get("overall_analysis") {
        None => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    };

    info!(
        signals = signals.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "reconciliation complete"
    );

    ReconciliationResult {
        signals,
        overall_analysis,
        error: None,
    }
}
