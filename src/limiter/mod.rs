// src/limiter/mod.rs
// Token-bucket rate limiter shared by the injector, crawler probes, and
// active triggers (4.1).

use crate::error::{RicochetError, RicochetResult};
use std::sync::Mutex;
use std::time::Instant;
use tokio::time::Duration;

struct BucketState {
    tokens: f64,
    last_update: Instant,
}

impl BucketState {
    fn refill(&mut self, rate: f64, burst: f64) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();
        self.tokens = (self.tokens + elapsed * rate).min(burst);
        self.last_update = now;
    }
}

/// Thread-safe token bucket rate limiter.
///
/// Mutations are serialized behind a single mutex; `acquire` releases the
/// lock while it sleeps so parallel acquirers still observe refills. Timing
/// uses `Instant`, a monotonic clock, so wall-clock adjustments never affect
/// behavior.
pub struct RateLimiter {
    rate: f64,
    burst: f64,
    state: Mutex<BucketState>,
}

impl RateLimiter {
    /// Construct a limiter with `rate` tokens/second and `burst` bucket
    /// capacity. The bucket starts full. Fails with `InvalidConfig` if
    /// `rate <= 0` or `burst < 1`.
    pub fn new(rate: f64, burst: u32) -> RicochetResult<Self> {
        if !(rate > 0.0) {
            return Err(RicochetError::InvalidConfig(format!(
                "rate must be positive, got {rate}"
            )));
        }
        if burst < 1 {
            return Err(RicochetError::InvalidConfig(format!(
                "burst must be at least 1, got {burst}"
            )));
        }
        let burst = burst as f64;
        Ok(Self {
            rate,
            burst,
            state: Mutex::new(BucketState {
                tokens: burst,
                last_update: Instant::now(),
            }),
        })
    }

    /// Acquire a token. If `blocking` is true, sleeps until one is
    /// available and always returns `true`. If false, returns immediately
    /// with whether a token was available. `acquire` itself never fails;
    /// cancellation of a blocking call is the caller's responsibility
    /// (e.g. wrapping the future in `tokio::select!`).
    pub async fn acquire(&self, blocking: bool) -> bool {
        loop {
            let wait = {
                let mut state = self.state.lock().expect("rate limiter mutex poisoned");
                state.refill(self.rate, self.burst);
                if state.tokens >= 1.0 {
                    state.tokens -= 1.0;
                    return true;
                }
                if !blocking {
                    return false;
                }
                (1.0 - state.tokens) / self.rate
            };
            // Lock is dropped before sleeping so other acquirers see refills.
            tokio::time::sleep(Duration::from_secs_f64(wait.max(0.0))).await;
        }
    }

    /// Non-blocking convenience wrapper.
    pub async fn try_acquire(&self) -> bool {
        self.acquire(false).await
    }

    /// Current number of available tokens (approximate; refills as a side
    /// effect, matching the bucket's lazy-refill design).
    pub fn available_tokens(&self) -> f64 {
        let mut state = self.state.lock().expect("rate limiter mutex poisoned");
        state.refill(self.rate, self.burst);
        state.tokens
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn burst(&self) -> u32 {
        self.burst as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Instant as StdInstant;

    #[test]
    fn rejects_non_positive_rate() {
        assert!(RateLimiter::new(0.0, 1).is_err());
        assert!(RateLimiter::new(-1.0, 1).is_err());
    }

    #[test]
    fn rejects_zero_burst() {
        assert!(RateLimiter::new(10.0, 0).is_err());
    }

    #[tokio::test]
    async fn bucket_starts_full_and_never_exceeds_burst() {
        let limiter = RateLimiter::new(5.0, 3).unwrap();
        assert!((limiter.available_tokens() - 3.0).abs() < 1e-6);
        for _ in 0..3 {
            assert!(limiter.try_acquire().await);
        }
        assert!(!limiter.try_acquire().await);
    }

    #[tokio::test]
    async fn non_blocking_returns_false_when_empty() {
        let limiter = RateLimiter::new(1.0, 1).unwrap();
        assert!(limiter.try_acquire().await);
        assert!(!limiter.try_acquire().await);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn burst_one_second_acquire_blocks_roughly_one_over_rate() {
        let limiter = RateLimiter::new(1.0, 1).unwrap();
        assert!(limiter.acquire(true).await);
        let start = StdInstant::now();
        assert!(limiter.acquire(true).await);
        let elapsed = start.elapsed().as_secs_f64();
        assert!((0.8..=1.3).contains(&elapsed), "elapsed={elapsed}");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn throughput_converges_under_contention() {
        let limiter = Arc::new(RateLimiter::new(10.0, 1).unwrap());
        let start = StdInstant::now();
        let mut handles = Vec::new();
        for _ in 0..4 {
            let limiter = Arc::clone(&limiter);
            handles.push(tokio::spawn(async move {
                for _ in 0..5 {
                    limiter.acquire(true).await;
                }
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        let elapsed = start.elapsed().as_secs_f64();
        // 20 acquires at 10/s with burst 1 should take ~1.9-2.3s wall clock.
        assert!((1.5..=2.6).contains(&elapsed), "elapsed={elapsed}");
    }
}
