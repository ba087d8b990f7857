use std::collections::BTreeSet;
use std::time::Duration;

use crate::config::ClientConfig;
use crate::Error;

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decision {
    Retry { delay: Duration },
    Fail,
}

/// Linear-backoff retry rules.
///
/// - `attempt` is 1-based (first failure => attempt=1).
/// - Only rate-limit and server errors whose status is in `statuses` retry.
/// - A server-sent `retry-after` always wins over the computed delay.
#[derive(Debug, Clone)]
pub(crate) struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub statuses: BTreeSet<u16>,
}

impl RetryPolicy {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: config.retry_delay,
            statuses: config.retry_statuses.clone(),
        }
    }

    pub fn decide(&self, err: &Error, attempt: u32) -> Decision {
        if !err.is_retryable_kind() || attempt > self.max_retries {
            return Decision::Fail;
        }
        match err.http_status() {
            Some(status) if self.statuses.contains(&status) => Decision::Retry {
                delay: self.backoff_delay(attempt, err.retry_after()),
            },
            _ => Decision::Fail,
        }
    }

    fn backoff_delay(&self, attempt: u32, retry_after: Option<u64>) -> Duration {
        match retry_after {
            Some(secs) => Duration::from_secs(secs),
            None => self.base_delay.saturating_mul(attempt),
        }
    }
}
