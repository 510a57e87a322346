//! Randomized waits and cancellation.
//!
//! Every suspension point of a crawl goes through a [`Pacer`], so a cancelled
//! token interrupts whatever the controller is waiting on.

use crate::error::{CrawlError, Result};
use jobtrawl_core::DelayRange;
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Draw a uniform duration from `range`.
///
/// A collapsed or inverted range yields its lower bound.
#[must_use]
pub fn sample(range: &DelayRange) -> Duration {
    let (min, max) = (range.min(), range.max());
    if max <= min {
        return min;
    }
    let secs = rand::thread_rng().gen_range(min.as_secs_f64()..=max.as_secs_f64());
    Duration::from_secs_f64(secs)
}

/// Linear backoff before retry number `attempt` (1-based).
#[must_use]
pub fn backoff(base_ms: u64, attempt: u32) -> Duration {
    Duration::from_millis(base_ms.saturating_mul(u64::from(attempt)))
}

/// Cancellation-aware sleeping and waiting.
#[derive(Debug, Clone)]
pub struct Pacer {
    cancel: CancellationToken,
}

impl Pacer {
    pub fn new(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Fail fast if cancellation was requested.
    pub fn check(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            Err(CrawlError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Sleep for a random duration drawn from `range`.
    pub async fn pause(&self, range: &DelayRange) -> Result<()> {
        self.sleep(sample(range)).await
    }

    pub async fn sleep(&self, duration: Duration) -> Result<()> {
        self.guard(tokio::time::sleep(duration)).await
    }

    /// Run `future` unless cancellation fires first.
    pub async fn guard<F: Future>(&self, future: F) -> Result<F::Output> {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(CrawlError::Cancelled),
            output = future => Ok(output),
        }
    }
}
