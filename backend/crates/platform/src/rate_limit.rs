//! Rate Limiting Infrastructure
//!
//! Fixed-window counters: every request falls into the window starting at
//! `floor(now / window) * window`; storage backends count per (key, window).

use std::time::Duration;

/// Rate limit configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in the window
    pub max_requests: u32,
    /// Time window duration
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    pub fn window_ms(&self) -> i64 {
        self.window.as_millis() as i64
    }

    /// Start of the window containing `now_ms`
    pub fn window_start_ms(&self, now_ms: i64) -> i64 {
        let window_ms = self.window_ms().max(1);
        now_ms.div_euclid(window_ms) * window_ms
    }

    /// Whether the `count`-th request inside a window is allowed
    pub fn allows(&self, count: u32) -> bool {
        count <= self.max_requests
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let config = RateLimitConfig::default();
        assert_eq!(config.max_requests, 10);
        assert_eq!(config.window_ms(), 60_000);
    }

    #[test]
    fn test_window_start() {
        let config = RateLimitConfig::new(5, 60);
        assert_eq!(config.window_start_ms(0), 0);
        assert_eq!(config.window_start_ms(59_999), 0);
        assert_eq!(config.window_start_ms(60_000), 60_000);
        assert_eq!(config.window_start_ms(125_000), 120_000);
    }

    #[test]
    fn test_zero_window_does_not_divide_by_zero() {
        let config = RateLimitConfig::new(5, 0);
        assert_eq!(config.window_start_ms(1234), 1234);
    }

    #[test]
    fn test_allows() {
        let config = RateLimitConfig::new(3, 60);
        assert!(config.allows(1));
        assert!(config.allows(3));
        assert!(!config.allows(4));
    }
}
