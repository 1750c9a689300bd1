//! Outbound rate limiter.
//!
//! Bounds calls to the upstream CRM to `capacity` per `period` over any
//! sliding window. Callers that would exceed the limit are suspended until
//! the oldest admission in the window expires.

use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::config::RateLimitConfig;
use crate::observability::metrics;

/// Admission log for the current window.
///
/// Holds the instants of the last `capacity` admissions, oldest first.
#[derive(Debug)]
struct RateLimiterState {
    admitted: VecDeque<Instant>,
}

impl RateLimiterState {
    fn evict_expired(&mut self, now: Instant, period: Duration) {
        while let Some(&oldest) = self.admitted.front() {
            if now.duration_since(oldest) >= period {
                self.admitted.pop_front();
            } else {
                break;
            }
        }
    }
}

/// Shared limiter for all outbound calls of one client.
///
/// The state sits behind a tokio `Mutex`, whose waiters are queued FIFO, and
/// the lock is held while a caller sleeps for its slot. Admission order is
/// therefore arrival order and no caller starves.
#[derive(Debug)]
pub struct RateLimiter {
    capacity: usize,
    period: Duration,
    state: Mutex<RateLimiterState>,
}

impl RateLimiter {
    /// Create a limiter admitting `capacity` calls per `period`.
    pub fn new(capacity: u32, period: Duration) -> Self {
        let capacity = capacity.max(1) as usize;
        Self {
            capacity,
            period,
            state: Mutex::new(RateLimiterState {
                admitted: VecDeque::with_capacity(capacity),
            }),
        }
    }

    /// Build from config. Returns `None` when limiting is disabled.
    pub fn from_config(config: &RateLimitConfig) -> Option<Self> {
        config
            .enabled
            .then(|| Self::new(config.capacity, config.period()))
    }

    /// Wait until one more call fits in the window, then record it.
    pub async fn acquire(&self) {
        let started = Instant::now();
        let mut state = self.state.lock().await;

        state.evict_expired(Instant::now(), self.period);
        if state.admitted.len() >= self.capacity {
            // The log is only mutated after the wait, so dropping this
            // future mid-sleep leaves the window intact.
            if let Some(oldest) = state.admitted.front().copied() {
                let ready_at = oldest + self.period;
                tracing::debug!(
                    wait_ms = ready_at.saturating_duration_since(Instant::now()).as_millis() as u64,
                    "Outbound rate limit reached, waiting for slot"
                );
                tokio::time::sleep_until(ready_at).await;
            }
            state.evict_expired(Instant::now(), self.period);
        }
        state.admitted.push_back(Instant::now());

        metrics::record_rate_limit_wait(started.elapsed());
    }

}
