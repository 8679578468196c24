use std::future::Future;
use std::time::Duration;

use tokio::time::timeout;

use crate::config;
use crate::providers::ProviderError;

/// Retry policy for external AI calls. Delay grows linearly: the pause
/// before retry n+1 is `base_delay * (n + 1)`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub attempt_timeout: Duration,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            attempt_timeout: Duration::from_secs(60),
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn from_env() -> Self {
        Self {
            max_attempts: *config::IMAGE_MAX_ATTEMPTS,
            attempt_timeout: Duration::from_secs(*config::IMAGE_TIMEOUT_SECS),
            ..Self::default()
        }
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * (attempt + 1)
    }
}

/// Runs `op` under the policy's per-attempt deadline, retrying retryable
/// failures. A terminal rejection surfaces immediately; after exhaustion the
/// last error surfaces. Attempts are independent, so a timed-out call may
/// still complete on the provider side; wrapped calls must tolerate that.
pub async fn call_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    mut op: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut last_error = None;

    for attempt in 0..policy.max_attempts {
        let outcome = match timeout(policy.attempt_timeout, op()).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout),
        };

        match outcome {
            Ok(value) => {
                if attempt > 0 {
                    tracing::info!(attempt = attempt + 1, "provider call succeeded after retry");
                }
                return Ok(value);
            }
            Err(error) if !error.is_retryable() => return Err(error),
            Err(error) => {
                tracing::warn!(
                    attempt = attempt + 1,
                    max_attempts = policy.max_attempts,
                    %error,
                    "provider call failed"
                );
                last_error = Some(error);
                if attempt + 1 < policy.max_attempts {
                    tokio::time::sleep(policy.delay_for(attempt)).await;
                }
            }
        }
    }

    Err(last_error.expect("at least one attempt was made"))
}
