//! Fixed-delay rate limiting for answer fetches
//!
//! The remote API throttles aggressive clients, so the pipeline sleeps for
//! `1 / rate_limit` seconds before every answer request. Deliberately not a
//! token bucket or sliding window: the pipeline is strictly sequential and
//! a constant inter-request gap is enough to stay under the limit.

use std::time::Duration;

/// Enforces a minimum delay between consecutive requests.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    interval: Duration,
}

impl RateLimiter {
    /// Create a limiter allowing `rate_limit` requests per second.
    pub fn new(rate_limit: u32) -> Self {
        Self {
            interval: Duration::from_secs_f64(1.0 / f64::from(rate_limit.max(1))),
        }
    }

    /// The fixed inter-request interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Sleep for the fixed interval.
    pub async fn wait(&self) {
        tokio::time::sleep(self.interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_from_rate() {
        assert_eq!(RateLimiter::new(1).interval(), Duration::from_secs(1));
        assert_eq!(RateLimiter::new(10).interval(), Duration::from_millis(100));
        assert_eq!(RateLimiter::new(30).interval(), Duration::from_secs_f64(1.0 / 30.0));
    }

    #[test]
    fn test_zero_rate_clamped() {
        // A zero rate is rejected by config validation, but the limiter
        // still refuses to divide by zero.
        assert_eq!(RateLimiter::new(0).interval(), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_wait_sleeps_at_least_interval() {
        let limiter = RateLimiter::new(50);
        let start = std::time::Instant::now();
        limiter.wait().await;
        assert!(start.elapsed() >= limiter.interval());
    }
}
