//! Rate Limit Tracking
//!
//! Client-side request budget for the free tier plus rate-limit
//! metadata reported back by the service.
//!
//! The budget is advisory and local: the service applies its own
//! limit independently and a 429 from it is still surfaced as an API
//! error, never retried here.

use parking_lot::Mutex;
use reqwest::header::HeaderMap;
use std::time::{Duration, Instant};
use tracing::debug;

/// Free-tier request ceiling per window
pub const FREE_TIER_LIMIT: u32 = 45;

/// Length of the rate-limit window
pub const RATE_WINDOW: Duration = Duration::from_secs(60);

/// Counter state for the current window
#[derive(Debug)]
struct WindowState {
    count: u32,
    window_started: Instant,
}

/// Resetting-window request budget.
///
/// Counts requests attributed to the current window; once the window
/// is older than [`RATE_WINDOW`] the counter resets. Acquiring past
/// the ceiling fails before any network traffic.
#[derive(Debug)]
pub struct RequestBudget {
    limit: u32,
    window: Duration,
    state: Mutex<WindowState>,
}

impl RequestBudget {
    /// Create a budget with the given ceiling and window
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            state: Mutex::new(WindowState {
                count: 0,
                window_started: Instant::now(),
            }),
        }
    }

    /// Create the free-tier budget (45 requests per 60 seconds)
    pub fn free_tier() -> Self {
        Self::new(FREE_TIER_LIMIT, RATE_WINDOW)
    }

    /// The configured ceiling
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// The configured window
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Consume one unit of budget, resetting the window first if it
    /// has expired. Returns `false` when the ceiling is reached; the
    /// counter is not advanced in that case.
    pub fn try_acquire(&self) -> bool {
        let mut state = self.state.lock();

        if state.window_started.elapsed() > self.window {
            debug!(count = state.count, "rate-limit window expired, resetting");
            state.count = 0;
            state.window_started = Instant::now();
        }

        if state.count >= self.limit {
            return false;
        }

        state.count += 1;
        true
    }

    /// Units left in the current window
    pub fn remaining(&self) -> u32 {
        let state = self.state.lock();
        if state.window_started.elapsed() > self.window {
            return self.limit;
        }
        self.limit.saturating_sub(state.count)
    }

    /// Shift the window start back in time, for tests that need to
    /// simulate the window elapsing without sleeping
    #[cfg(test)]
    pub(crate) fn backdate_window(&self, by: Duration) {
        let mut state = self.state.lock();
        state.window_started = Instant::now() - by;
    }
}

/// Rate-limit metadata from the service's response headers.
///
/// The free tier reports the remaining request allowance in `X-Rl`
/// and the seconds until the allowance resets in `X-Ttl`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseMetadata {
    /// Remaining requests in the server-side window (`X-Rl`)
    pub requests_remaining: Option<u32>,

    /// Seconds until the server-side window resets (`X-Ttl`)
    pub seconds_until_reset: Option<u32>,
}

impl ResponseMetadata {
    /// Extract metadata from response headers; absent or unparsable
    /// headers become `None`
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            requests_remaining: parse_header(headers, "X-Rl"),
            seconds_until_reset: parse_header(headers, "X-Ttl"),
        }
    }
}

fn parse_header(headers: &HeaderMap, name: &str) -> Option<u32> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_exhaustion_and_reset() {
        let budget = RequestBudget::free_tier();

        for _ in 0..FREE_TIER_LIMIT {
            assert!(budget.try_acquire());
        }
        // 46th request in the same window fails
        assert!(!budget.try_acquire());
        assert_eq!(budget.remaining(), 0);

        // Simulate the window elapsing
        budget.backdate_window(RATE_WINDOW + Duration::from_secs(1));
        assert!(budget.try_acquire());
        assert_eq!(budget.remaining(), FREE_TIER_LIMIT - 1);
    }

    #[test]
    fn test_failed_acquire_does_not_consume() {
        let budget = RequestBudget::new(1, RATE_WINDOW);
        assert!(budget.try_acquire());
        assert!(!budget.try_acquire());
        assert!(!budget.try_acquire());
        assert_eq!(budget.remaining(), 0);
    }

    #[test]
    fn test_remaining_before_any_request() {
        let budget = RequestBudget::free_tier();
        assert_eq!(budget.remaining(), FREE_TIER_LIMIT);
    }

    #[test]
    fn test_metadata_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Rl", "42".parse().unwrap());
        headers.insert("X-Ttl", "17".parse().unwrap());

        let meta = ResponseMetadata::from_headers(&headers);
        assert_eq!(meta.requests_remaining, Some(42));
        assert_eq!(meta.seconds_until_reset, Some(17));
    }

    #[test]
    fn test_metadata_missing_headers() {
        let meta = ResponseMetadata::from_headers(&HeaderMap::new());
        assert_eq!(meta.requests_remaining, None);
        assert_eq!(meta.seconds_until_reset, None);
    }
}
