use std::future::Future;

use auspex_models::config::PipelineConfig;
use tokio::time::sleep;
use tracing::debug;

/// A result that knows whether its operation succeeded. Retry decisions are
/// made from this predicate alone; failures are carried inside the result,
/// never raised.
pub trait Retryable {
    fn succeeded(&self) -> bool;
}

/// Run `op` up to `1 + max_retries` times, sleeping `retry_delay` after each
/// failing attempt that is not the final one. Returns the first success, or
/// the last failing result once attempts are exhausted.
pub async fn with_retry<T, F, Fut>(config: &PipelineConfig, mut op: F) -> T
where
    T: Retryable,
    F: FnMut() -> Fut,
    Fut: Future<Output = T>,
{
    let mut attempt: u32 = 0;
    loop {
        let result = op().await;
        if result.succeeded() || attempt == config.max_retries {
            return result;
        }
        attempt += 1;
        debug!(attempt, max_retries = config.max_retries, "attempt failed, retrying");
        sleep(config.retry_delay()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use tokio::time::Instant;

    struct Probe {
        ok: bool,
    }

    impl Retryable for Probe {
        fn succeeded(&self) -> bool {
            self.ok
        }
    }

    fn config(max_retries: u32, retry_delay_ms: u64) -> PipelineConfig {
        PipelineConfig {
            max_retries,
            retry_delay_ms,
            ..PipelineConfig::default()
        }
    }

    #[tokio::test]
    async fn first_success_returns_immediately() {
        let calls = AtomicU32::new(0);
        let result = with_retry(&config(3, 1000), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Probe { ok: true } }
        })
        .await;
        assert!(result.succeeded());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_on_attempt_k_after_k_minus_one_sleeps() {
        let calls = AtomicU32::new(0);
        let started = Instant::now();
        let result = with_retry(&config(3, 1000), || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move { Probe { ok: n == 3 } }
        })
        .await;
        assert!(result.succeeded());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // Two failing attempts, two delays under the paused clock.
        assert_eq!(started.elapsed(), Duration::from_millis(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_returns_last_failure_and_sleeps_max_retries_times() {
        let calls = AtomicU32::new(0);
        let started = Instant::now();
        let result = with_retry(&config(2, 1000), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Probe { ok: false } }
        })
        .await;
        assert!(!result.succeeded());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(started.elapsed(), Duration::from_millis(2000));
    }

    #[tokio::test]
    async fn zero_retries_means_exactly_one_attempt() {
        let calls = AtomicU32::new(0);
        let result = with_retry(&config(0, 1000), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Probe { ok: false } }
        })
        .await;
        assert!(!result.succeeded());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
