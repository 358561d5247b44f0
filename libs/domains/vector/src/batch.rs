use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, error, warn};

/// Retry settings for chunked writes
///
/// Backoff is `base_delay * 2^attempt` with `attempt` counted from zero. There
/// is no jitter and no upper bound on the delay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per chunk, including the first one
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Sleep before the attempt that follows failed attempt `attempt`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

/// Outcome of a [`batch_store`] run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub chunks: usize,
    pub stored: usize,
    /// Store calls issued across all chunks, retries included
    pub attempts: usize,
    /// Start index of every chunk that exhausted its retries
    pub failed_starts: Vec<usize>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.failed_starts.is_empty() && self.stored == self.chunks
    }
}

/// Split `items` into contiguous chunks of `batch_size` and store each one,
/// retrying a failed chunk with exponential backoff.
///
/// `store_chunk` succeeds when it resolves to `Some(_)`. A chunk that fails
/// every attempt is logged and skipped; later chunks still run and nothing is
/// rolled back. Chunks run strictly one after another.
pub async fn batch_store<'a, T, R, F, Fut>(
    items: &'a [T],
    batch_size: usize,
    policy: &RetryPolicy,
    mut store_chunk: F,
) -> BatchReport
where
    F: FnMut(&'a [T]) -> Fut,
    Fut: Future<Output = Option<R>>,
{
    let mut report = BatchReport::default();

    if batch_size == 0 || policy.max_retries == 0 {
        warn!(
            batch_size,
            max_retries = policy.max_retries,
            "batch_size and max_retries must be positive, nothing stored"
        );
        return report;
    }

    for (index, chunk) in items.chunks(batch_size).enumerate() {
        let start = index * batch_size;
        report.chunks += 1;

        let mut stored = false;
        for attempt in 0..policy.max_retries {
            report.attempts += 1;

            if store_chunk(chunk).await.is_some() {
                debug!(start, len = chunk.len(), attempt, "chunk stored");
                stored = true;
                break;
            }

            if attempt + 1 < policy.max_retries {
                let delay = policy.delay_for(attempt);
                warn!(
                    start,
                    "Retry {}/{} failed, backing off {:?}",
                    attempt + 1,
                    policy.max_retries,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
        }

        if stored {
            report.stored += 1;
        } else {
            error!(start, "Failed to store batch starting at index {}", start);
            report.failed_starts.push(start);
        }
    }

    report
}
