//! Bounded exponential backoff for rate-limited describe calls.
//!
//! `delay = min(base * 2^attempt, max) + jitter`, where jitter is a
//! deterministic pseudo-random fraction of the computed delay. Only
//! `RateLimited` is retried; every other failure is terminal for the
//! resource.

use std::time::Duration;

use super::{InspectError, ResourceInspector};
use crate::resource::{AttrMap, DeclaredResourceState};

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts including the first call.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Jitter as a fraction of the computed delay (0.0–1.0).
    pub jitter_fraction: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            jitter_fraction: 0.25,
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry number `attempt` (0-indexed). The provider's
    /// `Retry-After` hint wins when it is longer than the computed delay.
    pub fn delay_for(&self, attempt: u32, retry_after: Option<u64>) -> Duration {
        let base = self.base_delay.as_millis() as f64;
        let raw = base * 2f64.powi(attempt as i32);
        let capped = raw.min(self.max_delay.as_millis() as f64);
        let with_jitter = capped + capped * self.jitter_fraction * pseudo_rand(attempt);
        let computed = Duration::from_millis(with_jitter.max(0.0) as u64);

        match retry_after {
            Some(secs) => computed.max(Duration::from_secs(secs)),
            None => computed,
        }
    }
}

/// Float in [-0.5, 0.5) from a simple LCG seeded by the attempt number.
/// Deterministic, which keeps backoff timing testable without a rand dep.
fn pseudo_rand(attempt: u32) -> f64 {
    const A: u64 = 1_664_525;
    const C: u64 = 1_013_904_223;
    const M: u64 = 1u64 << 32;
    let state = A.wrapping_mul(attempt as u64).wrapping_add(C) % M;
    (state as f64 / M as f64) - 0.5
}

/// Wrap one inspection call with the retry policy. Escalating to an
/// `InspectionFailed` record once the budget is exhausted is the
/// caller's job; this function just returns the final error.
pub async fn describe_with_retry(
    inspector: &dyn ResourceInspector,
    declared: &DeclaredResourceState,
    policy: &RetryPolicy,
) -> Result<Option<AttrMap>, InspectError> {
    let mut attempt = 0u32;
    loop {
        match inspector.describe(declared).await {
            Err(InspectError::RateLimited { retry_after })
                if attempt + 1 < policy.max_attempts =>
            {
                let delay = policy.delay_for(attempt, retry_after);
                tracing::debug!(
                    resource = %declared.address,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "rate limited, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            other => return other,
        }
    }
}
