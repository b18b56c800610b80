//! End-to-end pipeline scenarios driven by scripted completion clients.
//!
//! Each test wires a deterministic mock client into the full pipeline and
//! checks the merged, reconciled output including fallback behavior.

use std::sync::Arc;
use std::time::Duration;

use auspex_models::config::PipelineConfig;
use auspex_models::market::Market;
use auspex_models::signal::{Confidence, Prediction};
use auspex_pipeline::fallback::fallback_batch;
use auspex_pipeline::test_support::{sample_context, RuleClient, ScriptedClient, ScriptedReply};
use auspex_pipeline::{CompletionClient, Pipeline};

fn config(batch_size: usize) -> PipelineConfig {
    PipelineConfig {
        batch_size,
        per_batch_timeout_seconds: 1,
        reconciliation_timeout_seconds: 2,
        max_retries: 2,
        retry_delay_ms: 10,
        ..PipelineConfig::default()
    }
}

fn market(id: &str, price: f64) -> Market {
    Market {
        id: id.to_string(),
        title: format!("Market {id}?"),
        current_price: Some(price),
    }
}

#[tokio::test(start_paused = true)]
async fn timed_out_batch_degrades_to_fallback_signals() {
    let markets = vec![market("a", 0.3), market("b", 0.6)];
    // The whole market list fits one batch; every analysis call hangs past the
    // per-batch timeout, so retries exhaust and the fallback set is produced.
    let expected = fallback_batch(&markets, 0, "batch 0 timed out after 1s").signals;

    let reconciliation_reply = serde_json::json!({
        "signals": expected,
        "overall_analysis": "Only conservative fallback signals; no ordering violations."
    });
    let client = Arc::new(RuleClient::new(vec![
        ("## SIGNALS", ScriptedReply::json(reconciliation_reply)),
        ("## MARKETS", ScriptedReply::Hang(Duration::from_secs(10))),
    ]));

    let pipeline = Pipeline::new(client.clone() as Arc<dyn CompletionClient>, config(5));
    let output = pipeline.run(&sample_context(), &markets).await;

    assert_eq!(output.signals, expected);
    assert!(!output.overall_analysis.is_empty());
    // Three batch attempts (1 + 2 retries) plus one reconciliation call.
    assert_eq!(client.calls(), 4);
}

#[tokio::test]
async fn failed_batch_merges_with_successful_one() {
    let markets = vec![market("m1", 0.55), market("m2", 0.10)];

    let batch_one_reply = serde_json::json!({
        "signals": [{
            "market_id": "m1",
            "market_title": "Market m1?",
            "prediction": "yes",
            "confidence": "high",
            "rationale": "Research strongly supports this outcome."
        }]
    });
    // The reconciler echoes a wrong price for m1; the pipeline must re-pin it.
    let reconciliation_reply = serde_json::json!({
        "signals": [
            {
                "market_id": "m1",
                "market_title": "Market m1?",
                "prediction": "yes",
                "confidence": "high",
                "rationale": "Research strongly supports this outcome.",
                "current_price": 0.99
            },
            {
                "market_id": "m2",
                "market_title": "Market m2?",
                "prediction": "no",
                "confidence": "low",
                "rationale": "Analysis unavailable; conservative default kept.",
                "current_price": 0.10
            }
        ],
        "overall_analysis": "Signals are consistent across batches."
    });
    let client = Arc::new(RuleClient::new(vec![
        ("## SIGNALS", ScriptedReply::json(reconciliation_reply)),
        ("Market m2?", ScriptedReply::Fail("model unavailable".to_string())),
        ("## MARKETS", ScriptedReply::json(batch_one_reply)),
    ]));

    // batch_size 1: m1 and m2 are analyzed concurrently and independently.
    let pipeline = Pipeline::new(client.clone() as Arc<dyn CompletionClient>, config(1));
    let output = pipeline.run(&sample_context(), &markets).await;

    assert_eq!(output.signals.len(), 2);
    assert!(!output.overall_analysis.is_empty());

    let first = &output.signals[0];
    assert_eq!(first.market_id, "m1");
    assert_eq!(first.prediction, Prediction::Yes);
    assert_eq!(first.current_price, Some(0.55));

    let second = &output.signals[1];
    assert_eq!(second.market_id, "m2");
    assert_eq!(second.prediction, Prediction::No);
    assert_eq!(second.confidence, Confidence::Low);
    assert_eq!(second.current_price, Some(0.10));

    // One call for m1, three for m2 (retries exhausted), one reconciliation.
    assert_eq!(client.calls(), 5);
}

#[tokio::test]
async fn reconciliation_exhaustion_passes_batch_signals_through() {
    let markets = vec![market("m1", 0.4)];
    let batch_reply = serde_json::json!({
        "signals": [{
            "market_id": "m1",
            "market_title": "Market m1?",
            "prediction": "yes",
            "confidence": "medium",
            "rationale": "Favorable findings."
        }]
    });
    let client = Arc::new(RuleClient::new(vec![
        ("## SIGNALS", ScriptedReply::Fail("reconciler down".to_string())),
        ("## MARKETS", ScriptedReply::json(batch_reply)),
    ]));

    let pipeline = Pipeline::new(client as Arc<dyn CompletionClient>, config(5));
    let output = pipeline.run(&sample_context(), &markets).await;

    assert_eq!(output.signals.len(), 1);
    assert_eq!(output.signals[0].market_id, "m1");
    assert_eq!(output.signals[0].prediction, Prediction::Yes);
    assert_eq!(output.signals[0].current_price, Some(0.4));
    assert!(output
        .overall_analysis
        .contains("Cross-batch reconciliation was unavailable"));
    assert!(output.overall_analysis.contains("reconciler down"));
    assert!(output.overall_analysis.contains("Manual review"));
}

#[tokio::test]
async fn no_markets_yields_empty_output_with_narrative() {
    // Zero batches, so the only call is reconciliation over an empty list,
    // which can never succeed and falls back to pass-through.
    let client = Arc::new(ScriptedClient::repeating(ScriptedReply::json(
        serde_json::json!({"signals": [], "overall_analysis": "nothing to review"}),
    )));

    let pipeline = Pipeline::new(client.clone() as Arc<dyn CompletionClient>, config(5));
    let output = pipeline.run(&sample_context(), &[]).await;

    assert!(output.signals.is_empty());
    assert!(output
        .overall_analysis
        .contains("reconciliation produced no signals"));
    // Reconciliation still ran its full retry budget.
    assert_eq!(client.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn batch_failures_are_isolated_from_siblings() {
    // Three single-market batches: one hangs, one fails transport, one works.
    let markets = vec![market("ok", 0.5), market("hang", 0.5), market("dead", 0.5)];
    let good_reply = serde_json::json!({
        "signals": [{
            "market_id": "ok",
            "market_title": "Market ok?",
            "prediction": "yes",
            "confidence": "low",
            "rationale": "Fine."
        }]
    });
    let reconciliation_reply = serde_json::json!({
        "signals": [
            {"market_id": "ok", "prediction": "yes", "confidence": "low"},
            {"market_id": "hang", "prediction": "no", "confidence": "low"},
            {"market_id": "dead", "prediction": "no", "confidence": "low"},
        ],
        "overall_analysis": "Two fallbacks, one live signal; consistent."
    });
    let client = Arc::new(RuleClient::new(vec![
        ("## SIGNALS", ScriptedReply::json(reconciliation_reply)),
        ("Market hang?", ScriptedReply::Hang(Duration::from_secs(10))),
        ("Market dead?", ScriptedReply::Fail("boom".to_string())),
        ("## MARKETS", ScriptedReply::json(good_reply)),
    ]));

    let pipeline = Pipeline::new(client as Arc<dyn CompletionClient>, config(1));
    let output = pipeline.run(&sample_context(), &markets).await;

    // Order follows batch order regardless of which batch finished first.
    let ids: Vec<&str> = output.signals.iter().map(|s| s.market_id.as_str()).collect();
    assert_eq!(ids, vec!["ok", "hang", "dead"]);
}
