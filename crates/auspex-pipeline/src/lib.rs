//! Batch analysis and reconciliation pipeline for prediction-market signals.
//!
//! Markets are split into fixed-size batches, each analyzed by one concurrent
//! completion call. Replies are parsed tolerantly, failed batches are retried
//! and finally replaced by deterministic fallbacks, and a second completion
//! pass reconciles the merged signals for cross-market consistency. Model
//! flakiness never surfaces as an error to the caller.

pub mod batch;
pub mod client;
pub mod error;
pub mod fallback;
pub mod parser;
pub mod pipeline;
pub mod prompts;
pub mod reconcile;
pub mod retry;

pub mod test_support;

pub use batch::{analyze_batch, plan_batches, BatchResult};
pub use client::{CompletionClient, ContentSegment, OpenAiClient, ReplyContent};
pub use error::{ClientError, PipelineError};
pub use fallback::{fallback_batch, fallback_reconciliation};
pub use pipeline::Pipeline;
pub use reconcile::{reconcile_signals, ReconciliationResult};
pub use retry::{with_retry, Retryable};
