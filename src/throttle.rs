//! Request pacing between thumbnail batches
//!
//! The thumbnails API expects clients to space out their requests. The pause
//! is a policy, not a correctness requirement, so it is injected through the
//! [`Throttle`] trait and tests can swap in [`NoThrottle`].

use crate::config::ThrottleConfig;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Pacing strategy awaited before each request after the first
#[async_trait]
pub trait Throttle: Send + Sync {
    /// Wait until the next request may be sent
    async fn acquire(&self);
}

/// Never waits
#[derive(Clone, Copy, Debug, Default)]
pub struct NoThrottle;

#[async_trait]
impl Throttle for NoThrottle {
    async fn acquire(&self) {}
}

/// Sleeps a fixed amount on every call
#[derive(Clone, Copy, Debug)]
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    /// Create a fixed-delay throttle
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Throttle for FixedDelay {
    async fn acquire(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Token bucket allowing `burst` requests at once, refilling at `rate` per second
///
/// # Algorithm
///
/// - Each request consumes one token
/// - Tokens refill continuously at the configured rate, capped at `burst`
/// - A request with no token available sleeps until one has accrued
#[derive(Clone)]
pub struct TokenBucket {
    rate: f64,
    capacity: f64,
    bucket: Arc<Mutex<Bucket>>,
}

impl TokenBucket {
    /// Create a full bucket
    ///
    /// `requests_per_second` and `burst` are clamped to at least 1.
    #[must_use]
    pub fn new(requests_per_second: u32, burst: u32) -> Self {
        let capacity = f64::from(burst.max(1));
        Self {
            rate: f64::from(requests_per_second.max(1)),
            capacity,
            bucket: Arc::new(Mutex::new(Bucket {
                tokens: capacity,
                last_refill: Instant::now(),
            })),
        }
    }

    #[cfg(test)]
    async fn available(&self) -> f64 {
        let mut bucket = self.bucket.lock().await;
        self.refill(&mut bucket);
        bucket.tokens
    }

    fn refill(&self, bucket: &mut Bucket) {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.rate).min(self.capacity);
        bucket.last_refill = now;
    }
}

#[async_trait]
impl Throttle for TokenBucket {
    async fn acquire(&self) {
        loop {
            let wait = {
                let mut bucket = self.bucket.lock().await;
                self.refill(&mut bucket);
                if bucket.tokens >= 1.0 {
                    bucket.tokens -= 1.0;
                    return;
                }
                Duration::from_secs_f64((1.0 - bucket.tokens) / self.rate)
            };
            tokio::time::sleep(wait).await;
        }
    }
}

/// Build the throttle described by the configuration
#[must_use]
pub fn from_config(config: &ThrottleConfig) -> Arc<dyn Throttle> {
    match config {
        ThrottleConfig::None => Arc::new(NoThrottle),
        ThrottleConfig::FixedDelay { delay } => Arc::new(FixedDelay::new(*delay)),
        ThrottleConfig::TokenBucket {
            requests_per_second,
            burst,
        } => Arc::new(TokenBucket::new(*requests_per_second, *burst)),
    }
}
