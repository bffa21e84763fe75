//! Whole-search retry with a growing overall budget.
//!
//! Only [`EngineError::CallerTimeout`] is retried. Cancellation and invalid
//! options are final.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use wayfind_core::AppConfig;

use crate::error::EngineError;

const MAX_DELAY_MS: u64 = 60_000;
const MAX_SHIFT: u32 = 10;

/// Attempt count, first-attempt budget and back-off base for
/// `resolve_with_retry`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Values below 1 act as 1.
    pub max_attempts: u32,
    /// Overall budget of attempt 0, used when the options carry none.
    pub base_budget_ms: u64,
    pub backoff_base_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_attempts: config.retry_max_attempts,
            base_budget_ms: config.default_timeout_ms,
            backoff_base_ms: config.retry_backoff_base_ms,
        }
    }

    /// `base × 2^attempt`, saturating.
    #[must_use]
    pub fn budget_for(base_ms: u64, attempt: u32) -> u64 {
        base_ms.saturating_mul(1u64 << attempt.min(MAX_SHIFT))
    }

    /// Un-jittered sleep after `attempt` fails, capped at 60 s.
    #[must_use]
    pub fn backoff_for(&self, attempt: u32) -> u64 {
        Self::budget_for(self.backoff_base_ms, attempt).min(MAX_DELAY_MS)
    }
}

pub(crate) fn is_retriable(err: &EngineError) -> bool {
    match err {
        EngineError::CallerTimeout { .. } => true,
        EngineError::Cancelled | EngineError::InvalidOptions(_) | EngineError::Setup(_) => false,
    }
}

/// Runs `operation(attempt)` until it succeeds, fails with a non-retriable
/// error, or `policy.max_attempts` is used up.
///
/// | Attempt | Sleep before next attempt          |
/// |---------|------------------------------------|
/// | 0       | `backoff_base_ms` × 2⁰ ± 25 %      |
/// | 1       | `backoff_base_ms` × 2¹ ± 25 %      |
/// | 2       | `backoff_base_ms` × 2² ± 25 %      |
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, EngineError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, EngineError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0u32;
    loop {
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt + 1 >= max_attempts {
                    return Err(err);
                }
                let capped = policy.backoff_for(attempt);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt = attempt + 1,
                    max_attempts,
                    delay_ms,
                    error = %err,
                    "location search timed out; retrying with a larger budget"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                attempt += 1;
            }
        }
    }
}
