use auspex_models::market::{Market, Sentiment};
use auspex_models::signal::{Confidence, Prediction, Signal};

use crate::batch::BatchResult;
use crate::reconcile::ReconciliationResult;

/// Deterministic substitute for a batch whose retries are exhausted: NO with
/// low confidence for every market, priced from the market itself.
pub fn fallback_batch(markets: &[Market], batch_index: usize, reason: &str) -> BatchResult {
    let signals = markets
        .iter()
        .map(|market| Signal {
            market_id: market.id.clone(),
            market_title: market.title.clone(),
            prediction: Prediction::No,
            confidence: Confidence::Low,
            rationale: format!(
                "Analysis unavailable ({reason}). Defaulting to NO until analysis can be \
                 completed."
            ),
            current_price: market.current_price,
        })
        .collect();

    BatchResult {
        batch_index,
        signals,
        error: None,
    }
}

/// Pass the merged batch signals through unmodified when reconciliation fails,
/// with a narrative flagging the skipped consistency check.
pub fn fallback_reconciliation(
    signals: Vec<Signal>,
    sentiment: Sentiment,
    reason: &str,
) -> ReconciliationResult {
    ReconciliationResult {
        overall_analysis: format!(
            "Cross-batch reconciliation was unavailable ({reason}). Signals below are from \
             independent batch analysis and have not been checked for cross-market consistency. \
             Research sentiment is {sentiment}. Manual review is recommended before acting on \
             these signals."
        ),
        signals,
        error: None,
    }
}
