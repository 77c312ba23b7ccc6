// Retry logic for transient external-command failures
use crate::application::constants::{
    DEFAULT_RETRY_BASE_DELAY, DEFAULT_RETRY_COUNT, DEFAULT_RETRY_MAX_DELAY,
    DEFAULT_RETRY_MULTIPLIER,
};
use crate::port::Sleeper;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Retry decision result
#[derive(Debug, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after the given backoff delay
    Retry(Duration),
    /// Do not retry, the operation has failed permanently
    Failed,
}

/// Bounded exponential backoff
///
/// Pure: maps an attempt number to a delay, independent of how the delay is
/// slept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub multiplier: u32,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_COUNT)
    }
}

impl RetryPolicy {
    /// Create a policy with the default backoff curve
    ///
    /// # Arguments
    /// * `max_attempts` - Total attempts including the first; clamped to at least 1
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: DEFAULT_RETRY_BASE_DELAY,
            multiplier: DEFAULT_RETRY_MULTIPLIER,
            max_delay: DEFAULT_RETRY_MAX_DELAY,
        }
    }

    /// Delay after the `attempt`-th failure (1-based)
    ///
    /// Backoff formula:
    /// delay = min(base_delay * (multiplier ^ attempt - 1), max_delay)
    ///
    /// With the defaults: 0.1s, 0.3s, 0.7s, 1.5s, ... capped at 20s.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = match self.multiplier.checked_pow(attempt) {
            Some(f) => f.saturating_sub(1),
            None => return self.max_delay,
        };

        self.base_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |d| d.min(self.max_delay))
    }

    /// Decide what happens after the `attempt`-th failure
    pub fn decide(&self, attempt: u32) -> RetryDecision {
        if attempt >= self.max_attempts {
            warn!(
                attempt = attempt,
                max_attempts = self.max_attempts,
                "Max retry attempts reached"
            );
            return RetryDecision::Failed;
        }
        RetryDecision::Retry(self.delay_for(attempt))
    }

    /// Upper bound on the time spent sleeping if every attempt fails
    pub fn worst_case_backoff(&self) -> Duration {
        (1..self.max_attempts).map(|a| self.delay_for(a)).sum()
    }
}

/// Run `op` until it succeeds or the policy gives up
///
/// `op` receives the 1-based attempt number. On exhaustion the last error is
/// returned unchanged.
///
/// # Example
/// ```text
/// let policy = RetryPolicy::new(3);
/// let out = run_with_retry(&policy, &TokioSleeper, |_| runner.run(&spec)).await?;
/// ```
pub async fn run_with_retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 0;

    loop {
        attempt += 1;

        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) => match policy.decide(attempt) {
                RetryDecision::Retry(delay) => {
                    error!("{}. Retrying.", e);
                    debug!("sleeping ({:.2} secs)", delay.as_secs_f64());
                    sleeper.sleep(delay).await;
                    debug!("retry {} of {}", attempt, policy.max_attempts);
                }
                RetryDecision::Failed => {
                    debug!("exceeded retry count");
                    return Err(e);
                }
            },
        }
    }
}
