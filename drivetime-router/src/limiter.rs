use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Token bucket parameters: `capacity` calls may burst, and one token is
/// restored every `refill_every`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateLimitPolicy {
    pub capacity: u32,
    #[serde(with = "millis")]
    pub refill_every: Duration,
}

impl RateLimitPolicy {
    pub fn new(capacity: u32, refill_every: Duration) -> Self {
        Self {
            capacity: capacity.max(1),
            refill_every,
        }
    }

    /// No throttling at all. Useful against local mock providers.
    pub fn unlimited() -> Self {
        Self {
            capacity: 1,
            refill_every: Duration::ZERO,
        }
    }

    pub fn is_unlimited(&self) -> bool {
        self.refill_every.is_zero()
    }
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self::new(1, Duration::from_secs(1))
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[derive(Debug)]
pub struct RateLimiter {
    policy: RateLimitPolicy,
    tokens: f64,
    last_refill: Instant,
}

impl RateLimiter {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self {
            policy,
            tokens: policy.capacity as f64,
            last_refill: Instant::now(),
        }
    }

    /// Waits until a token is available and consumes it.
    pub async fn acquire(&mut self) {
        if self.policy.is_unlimited() {
            return;
        }

        self.refill();
        if self.tokens < 1.0 {
            let wait = self.policy.refill_every.mul_f64(1.0 - self.tokens);
            debug!("Rate limit reached, waiting {:?}", wait);
            tokio::time::sleep(wait).await;
            self.refill();
        }

        self.tokens = (self.tokens - 1.0).max(0.0);
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill);
        let restored = elapsed.as_secs_f64() / self.policy.refill_every.as_secs_f64();
        self.tokens = (self.tokens + restored).min(self.policy.capacity as f64);
        self.last_refill = now;
    }
}
