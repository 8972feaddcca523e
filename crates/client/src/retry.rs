//! Bounded retry with exponential backoff.

use crate::error::{ClientResult, Outcome};
use jukebox_core::config::SongServiceConfig;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per call, including the first one.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&SongServiceConfig::default())
    }
}

impl RetryPolicy {
    /// A single attempt, no retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    pub fn from_config(config: &SongServiceConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_backoff: config.initial_backoff(),
            max_backoff: config.max_backoff(),
        }
    }

    /// Delay before attempt `attempt + 1`, where `attempt` counts from 1.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Run `call` until it succeeds, fails permanently or runs out of attempts.
    ///
    /// `call` receives `maybe_applied`: true once an earlier attempt ended
    /// with an [`Outcome::Unknown`] error, i.e. the remote side may already
    /// hold the effect of this call.
    pub async fn run<T, F, Fut>(&self, op: &'static str, mut call: F) -> ClientResult<T>
    where
        F: FnMut(bool) -> Fut,
        Fut: Future<Output = ClientResult<T>>,
    {
        let mut maybe_applied = false;
        let mut attempt = 1;
        loop {
            match call(maybe_applied).await {
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    let delay = self.backoff(attempt);
                    warn!(
                        op,
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Song service call failed, retrying"
                    );
                    maybe_applied |= e.outcome() == Outcome::Unknown;
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}
