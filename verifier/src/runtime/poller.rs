//! Verification Poller
//!
//! Gives transient, eventually-consistent external state (a freshly
//! deployed HTTP endpoint, IAM permission propagation) time to converge
//! without hanging forever. Runs on the calling task and blocks it for
//! at most `max_attempts * interval`.

use std::future::Future;
use std::time::Duration;

use shared::VerifyError;
use tokio::time::sleep;

/// Outcome reported by a single probe invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStatus {
    /// The observed state has converged; stop polling
    Ready,
    /// Not there yet; poll again if attempts remain
    Retry,
}

/// Immutable attempt budget for one polling call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollBudget {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl PollBudget {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }
}

/// Invoke `probe` until it reports ready or the budget is exhausted.
///
/// The probe is invoked immediately; on [`ProbeStatus::Retry`] with
/// attempts remaining the poller sleeps exactly `budget.interval` and
/// invokes again. A probe that is ready on attempt `k` is therefore
/// invoked exactly `k` times with `k - 1` waits in between.
///
/// Probe errors are non-fatal and count as not-ready: the error is
/// logged and folded into the retry path, never propagated. Exhausting
/// the budget is not an error either - callers assert on the state they
/// care about after polling exits. Probes are re-invoked as-is, so they
/// must be idempotent.
///
/// A budget with `max_attempts == 0` performs no invocation and returns
/// immediately.
pub async fn poll<F, Fut>(mut probe: F, budget: PollBudget)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<ProbeStatus, VerifyError>>,
{
    for attempt in 1..=budget.max_attempts {
        match probe().await {
            Ok(ProbeStatus::Ready) => {
                tracing::info!("✅ Probe ready after {} attempt(s)", attempt);
                return;
            }
            Ok(ProbeStatus::Retry) => {
                tracing::debug!(
                    "⏳ Probe not ready (attempt {}/{})",
                    attempt,
                    budget.max_attempts
                );
            }
            Err(e) => {
                tracing::debug!(
                    "⏳ Probe error treated as not ready (attempt {}/{}): {}",
                    attempt,
                    budget.max_attempts,
                    e
                );
            }
        }

        if attempt < budget.max_attempts {
            sleep(budget.interval).await;
        }
    }

    if budget.max_attempts > 0 {
        tracing::warn!(
            "⏰ Probe never became ready within {} attempts",
            budget.max_attempts
        );
    }
}
