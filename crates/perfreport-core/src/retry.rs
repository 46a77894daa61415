//! Bounded per-read retry with linear backoff.

use std::future::Future;
use std::time::Duration;

use crate::error::{ReadStep, ReportError};

/// How often, and how patiently, a single read is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per read, including the first.
    pub max_attempts: u32,
    /// Base delay; the wait after attempt `n` is `delay * n`.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Run `read` until it succeeds or the attempt budget is spent.
    ///
    /// Exhaustion is reported as [`ReportError::DataCollection`] carrying the
    /// step and the last underlying error.
    pub async fn run<T, F, Fut>(&self, step: ReadStep, mut read: F) -> Result<T, ReportError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            tracing::debug!(%step, attempt, "reading");
            match read().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt >= max_attempts => {
                    return Err(ReportError::DataCollection {
                        step,
                        attempts: attempt,
                        cause: e,
                    });
                }
                Err(e) => {
                    let wait = self.delay * attempt;
                    tracing::warn!(%step, attempt, ?wait, "read failed, retrying: {e:#}");
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
            }
        }
    }
}
