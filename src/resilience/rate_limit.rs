//! Global outbound rate limiting.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::config::RateLimitConfig;

/// Longest single sleep while waiting for a token; waiters re-check after it.
const MAX_WAIT: Duration = Duration::from_secs(3600);

/// A simple token bucket rate limiter.
#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_update: Instant,
}

impl TokenBucket {
    fn new(capacity: f64) -> Self {
        Self {
            tokens: capacity,
            last_update: Instant::now(),
        }
    }

    fn refill(&mut self, capacity: f64, refill_rate: f64) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();
        self.tokens = (self.tokens + elapsed * refill_rate).min(capacity);
        self.last_update = now;
    }

    /// Consume a token, or report how long until one accrues.
    fn try_acquire(&mut self, capacity: f64, refill_rate: f64) -> Result<(), Duration> {
        self.refill(capacity, refill_rate);

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            Ok(())
        } else {
            let wait = Duration::try_from_secs_f64((1.0 - self.tokens) / refill_rate).unwrap_or(MAX_WAIT);
            Err(wait.min(MAX_WAIT))
        }
    }
}

/// Shared throttle bounding the total request rate of one client.
///
/// Waiters queue on a FIFO mutex and sleep exactly until the next token
/// accrues, so they are served in arrival order.
#[derive(Debug)]
pub struct RateLimiter {
    bucket: Option<Mutex<TokenBucket>>,
    capacity: f64,
    refill_rate: f64,
}

impl RateLimiter {
    pub fn new(capacity: u32, refill_per_second: f64) -> Self {
        let capacity = f64::from(capacity);
        Self {
            bucket: Some(Mutex::new(TokenBucket::new(capacity))),
            capacity,
            refill_rate: refill_per_second,
        }
    }

    /// A limiter that never waits.
    pub fn unlimited() -> Self {
        Self {
            bucket: None,
            capacity: f64::INFINITY,
            refill_rate: f64::INFINITY,
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        if !config.enabled || config.burst_size == 0 || !(config.requests_per_second > 0.0) {
            if config.enabled {
                tracing::warn!(
                    burst = config.burst_size,
                    rps = config.requests_per_second,
                    "Rate limit settings unusable, throttling disabled"
                );
            }
            return Self::unlimited();
        }
        Self::new(config.burst_size, config.requests_per_second)
    }

    /// Wait for and consume one token. Returns the time spent waiting.
    pub async fn acquire(&self) -> Duration {
        let Some(bucket) = &self.bucket else {
            return Duration::ZERO;
        };

        let started = Instant::now();
        let mut bucket = bucket.lock().await;
        while let Err(wait) = bucket.try_acquire(self.capacity, self.refill_rate) {
            tokio::time::sleep(wait).await;
        }
        started.elapsed()
    }

    /// Tokens currently available after refill.
    pub async fn available(&self) -> f64 {
        match &self.bucket {
            Some(bucket) => {
                let mut bucket = bucket.lock().await;
                bucket.refill(self.capacity, self.refill_rate);
                bucket.tokens
            }
            None => f64::INFINITY,
        }
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }
}
