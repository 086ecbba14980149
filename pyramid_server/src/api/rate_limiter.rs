//! Rate limiting for WebSocket messages.
//!
//! Every connection carries a short burst window and a longer sustained
//! window; a message is accepted only if both windows have room.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::config::RateLimitConfig;

/// Sliding-window counter
#[derive(Debug)]
pub struct RateLimiter {
    /// Timestamps of accepted messages still inside the window
    timestamps: VecDeque<Instant>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    /// Create a new rate limiter
    ///
    /// # Example
    ///
    /// ```
    /// use pyramid_server::api::rate_limiter::RateLimiter;
    /// use std::time::Duration;
    ///
    /// let mut limiter = RateLimiter::new(2, Duration::from_secs(1));
    /// assert!(limiter.check());
    /// assert!(limiter.check());
    /// assert!(!limiter.check());
    /// ```
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            timestamps: VecDeque::with_capacity(max_requests),
            max_requests,
            window,
        }
    }

    /// Record a message if the window has room
    ///
    /// Returns `true` if the message is allowed.
    pub fn check(&mut self) -> bool {
        self.check_at(Instant::now())
    }

    fn check_at(&mut self, now: Instant) -> bool {
        while let Some(ts) = self.timestamps.front() {
            if now.duration_since(*ts) >= self.window {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }

        if self.timestamps.len() >= self.max_requests {
            return false;
        }

        self.timestamps.push_back(now);
        true
    }

    /// Get the number of messages still allowed in the current window
    pub fn remaining(&self) -> usize {
        self.max_requests.saturating_sub(self.timestamps.len())
    }
}

/// Which window rejected a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Throttle {
    Burst,
    Sustained,
}

impl Throttle {
    pub fn message(self) -> &'static str {
        match self {
            Self::Burst => "Rate limit exceeded. Please slow down.",
            Self::Sustained => "Too many messages. Please wait before sending more.",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Burst => "burst",
            Self::Sustained => "sustained",
        }
    }
}

/// Burst and sustained limits for one connection
#[derive(Debug)]
pub struct MessageLimiter {
    burst: RateLimiter,
    sustained: RateLimiter,
}

impl MessageLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            burst: RateLimiter::new(config.burst_per_sec, Duration::from_secs(1)),
            sustained: RateLimiter::new(config.sustained_per_min, Duration::from_secs(60)),
        }
    }

    /// Admit one message, or report which window is full
    pub fn check(&mut self) -> Result<(), Throttle> {
        if !self.burst.check() {
            return Err(Throttle::Burst);
        }
        if !self.sustained.check() {
            return Err(Throttle::Sustained);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiter_blocks_over_limit() {
        let mut limiter = RateLimiter::new(3, Duration::from_secs(1));

        for _ in 0..3 {
            assert!(limiter.check());
        }

        assert!(!limiter.check(), "Should block request over limit");
        assert_eq!(limiter.remaining(), 0);
    }

    #[test]
    fn test_rate_limiter_window_slides() {
        let mut limiter = RateLimiter::new(2, Duration::from_millis(100));
        let start = Instant::now();

        assert!(limiter.check_at(start));
        assert!(limiter.check_at(start + Duration::from_millis(50)));
        assert!(!limiter.check_at(start + Duration::from_millis(60)));

        // Only the first timestamp has left the window
        assert!(limiter.check_at(start + Duration::from_millis(100)));
        assert!(!limiter.check_at(start + Duration::from_millis(120)));
    }

    #[test]
    fn test_message_limiter_reports_burst() {
        let mut limiter = MessageLimiter::new(&RateLimitConfig {
            burst_per_sec: 2,
            sustained_per_min: 10,
        });

        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_ok());
        assert_eq!(limiter.check(), Err(Throttle::Burst));
    }

    #[test]
    fn test_message_limiter_reports_sustained() {
        let mut limiter = MessageLimiter::new(&RateLimitConfig {
            burst_per_sec: 5,
            sustained_per_min: 1,
        });

        assert!(limiter.check().is_ok());
        assert_eq!(limiter.check(), Err(Throttle::Sustained));
    }
}
