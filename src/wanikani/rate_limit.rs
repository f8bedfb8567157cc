use std::{
    num::NonZeroU32,
    time::Duration,
};

use governor::{
    clock::{
        Clock,
        DefaultClock,
    },
    state::{
        direct::NotKeyed,
        InMemoryState,
    },
    middleware::NoOpMiddleware,
    Quota,
};
use reqwest::header::HeaderValue;
use tracing::info;

/// WaniKani allows 60 requests per rolling minute per token.
pub const REQUESTS_PER_MINUTE: u32 = 60;
const RESET_FALLBACK: Duration = Duration::from_secs(60);

/// Blocking wrapper over a direct `governor` limiter.
pub struct RateLimiter<C: Clock = DefaultClock> {
    limiter: governor::RateLimiter<NotKeyed, InMemoryState, C, NoOpMiddleware<C::Instant>>,
    clock: C,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::with_clock(wanikani_quota(), DefaultClock::default())
    }
}

pub fn wanikani_quota() -> Quota {
    Quota::per_minute(NonZeroU32::new(REQUESTS_PER_MINUTE).unwrap_or(NonZeroU32::MIN))
}

impl<C: Clock + Clone> RateLimiter<C> {
    pub fn with_clock(quota: Quota, clock: C) -> Self {
        Self { limiter: governor::RateLimiter::direct_with_clock(quota, clock.clone()), clock }
    }

    /// Takes a slot if one is free, otherwise reports how long until one is.
    pub fn try_acquire(&self) -> Result<(), Duration> {
        self.limiter.check().map_err(|not_until| not_until.wait_time_from(self.clock.now()))
    }

    /// Blocks until a request may be sent, then counts it.
    pub fn acquire(&self) {
        while let Err(delay) = self.try_acquire() {
            info!(
                "Rate limited; waiting {:.1}s for the rate limiting period to pass",
                delay.as_secs_f32()
            );
            std::thread::sleep(delay);
        }
    }
}

/// Wait derived from a `RateLimit-Reset` header (epoch seconds) after a 429.
pub fn reset_delay(reset: Option<&HeaderValue>, now_epoch: i64) -> Duration {
    let reset_at = reset.and_then(|v| v.to_str().ok()).and_then(|v| v.trim().parse::<i64>().ok());

    match reset_at {
        Some(at) => Duration::from_secs(at.saturating_sub(now_epoch).clamp(0, 60) as u64),
        None => RESET_FALLBACK,
    }
}

#[cfg(test)]
mod tests {
    use governor::clock::FakeRelativeClock;

    use super::*;

    fn per_minute(n: u32) -> Quota {
        Quota::per_minute(NonZeroU32::new(n).unwrap())
    }

    #[test]
    fn test_burst_is_allowed_up_to_quota() {
        let clock = FakeRelativeClock::default();
        let limiter = RateLimiter::with_clock(per_minute(3), clock.clone());

        for _ in 0..3 {
            assert_eq!(limiter.try_acquire(), Ok(()));
        }
        assert!(limiter.try_acquire().is_err());
    }

    #[test]
    fn test_delay_until_a_slot_replenishes() {
        let clock = FakeRelativeClock::default();
        let limiter = RateLimiter::with_clock(per_minute(2), clock.clone());
        limiter.try_acquire().unwrap();
        limiter.try_acquire().unwrap();

        // Two per minute replenishes one slot every 30 seconds.
        clock.advance(Duration::from_secs(10));
        assert_eq!(limiter.try_acquire(), Err(Duration::from_secs(20)));

        clock.advance(Duration::from_secs(20));
        assert_eq!(limiter.try_acquire(), Ok(()));
    }

    #[test]
    fn test_wanikani_quota_allows_a_full_minute_burst() {
        let limiter = RateLimiter::with_clock(wanikani_quota(), FakeRelativeClock::default());
        for _ in 0..REQUESTS_PER_MINUTE {
            assert!(limiter.try_acquire().is_ok());
        }
        assert!(limiter.try_acquire().is_err());
    }

    #[test]
    fn test_reset_delay_from_header() {
        let header = HeaderValue::from_static("1000");
        assert_eq!(reset_delay(Some(&header), 990), Duration::from_secs(10));
        assert_eq!(reset_delay(Some(&header), 1005), Duration::ZERO);
        assert_eq!(reset_delay(None, 0), RESET_FALLBACK);

        let garbage = HeaderValue::from_static("soon");
        assert_eq!(reset_delay(Some(&garbage), 0), RESET_FALLBACK);
    }
}
