use std::time::Duration;

use reqwest::StatusCode;
use tokio::time::sleep;
use tracing::debug;

use configs::RetryConfig;

/// Exponential backoff for idempotent upstream reads.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff_base: Duration,
    backoff_max: Duration,
    enabled: bool,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_base: Duration, backoff_max: Duration, enabled: bool) -> Self {
        Self { max_attempts, backoff_base, backoff_max, enabled }
    }

    pub fn from_config(cfg: &RetryConfig) -> Self {
        Self::new(
            cfg.max_attempts,
            Duration::from_millis(cfg.backoff_base_ms),
            Duration::from_millis(cfg.backoff_max_ms),
            cfg.enabled,
        )
    }

    pub fn disabled() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO, false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn max_attempts(&self) -> u32 {
        if self.enabled {
            self.max_attempts.max(1)
        } else {
            1
        }
    }

    /// Rate limiting and gateway-level failures; everything else is final.
    pub fn is_retryable_status(status: StatusCode) -> bool {
        matches!(
            status,
            StatusCode::TOO_MANY_REQUESTS
                | StatusCode::BAD_GATEWAY
                | StatusCode::SERVICE_UNAVAILABLE
                | StatusCode::GATEWAY_TIMEOUT
        )
    }

    pub fn is_retryable_transport(err: &reqwest::Error) -> bool {
        err.is_timeout() || err.is_connect()
    }

    /// Delay before retry number `attempt` (1-based). An upstream `Retry-After`
    /// takes precedence but is still capped at `backoff_max`.
    pub fn backoff_for(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        if !self.enabled || attempt == 0 {
            return Duration::ZERO;
        }
        let computed = match retry_after {
            Some(d) => d,
            None => {
                let factor = 2_u32.saturating_pow(attempt - 1);
                self.backoff_base.saturating_mul(factor)
            }
        };
        computed.min(self.backoff_max)
    }

    pub async fn wait_before_retry(&self, attempt: u32, retry_after: Option<Duration>) {
        let delay = self.backoff_for(attempt, retry_after);
        debug!(?delay, attempt, "retrying upstream call");
        if !delay.is_zero() {
            sleep(delay).await;
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

/// Numeric `Retry-After` only; HTTP-date values fall back to computed backoff.
pub fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
