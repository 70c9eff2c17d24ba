//! In-process sliding-window limiter
//!
//! Each key owns one deque of hit instants (epoch milliseconds) per window.
//! A hit stays in a window while `hit > now - size`; there are no fixed
//! buckets, so no burst is possible at a bucket boundary.

use std::collections::VecDeque;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::one::Ref;
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;

use auth_core::{DomainError, RateLimitDecision, RateLimitWindow, RateLimiter};

#[derive(Debug)]
struct KeyCounters {
    /// `hits[i]` belongs to `windows[i]`, oldest first
    hits: Vec<VecDeque<i64>>,
}

impl KeyCounters {
    fn new(windows: usize) -> Self {
        Self {
            hits: vec![VecDeque::new(); windows],
        }
    }

    fn prune(&mut self, windows: &[RateLimitWindow], now_ms: i64) {
        for (window, hits) in windows.iter().zip(self.hits.iter_mut()) {
            let cutoff = now_ms.saturating_sub(window.size_millis());
            while hits.front().is_some_and(|&t| t <= cutoff) {
                hits.pop_front();
            }
        }
    }

    fn record(&mut self, now_ms: i64) {
        for hits in &mut self.hits {
            // Keep the deque sorted even if the clock stepped backwards
            if hits.back().is_some_and(|&last| last > now_ms) {
                let at = hits.partition_point(|&t| t <= now_ms);
                hits.insert(at, now_ms);
            } else {
                hits.push_back(now_ms);
            }
        }
    }

    fn is_empty(&self) -> bool {
        self.hits.iter().all(VecDeque::is_empty)
    }
}

/// Multi-window sliding limiter held in process memory
///
/// Prune, check and record for one key run under that key's mutex; distinct
/// keys never contend beyond the map shard lookup.
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    windows: Vec<RateLimitWindow>,
    counters: DashMap<String, Mutex<KeyCounters>>,
}

impl SlidingWindowLimiter {
    /// Create a limiter enforcing every window at once
    pub fn new(windows: Vec<RateLimitWindow>) -> Self {
        Self {
            windows,
            counters: DashMap::new(),
        }
    }

    /// Configured windows
    pub fn windows(&self) -> &[RateLimitWindow] {
        &self.windows
    }

    /// Number of keys currently tracked
    pub fn tracked_keys(&self) -> usize {
        self.counters.len()
    }

    fn counters_for(&self, key: &str) -> Ref<'_, String, Mutex<KeyCounters>> {
        if let Some(existing) = self.counters.get(key) {
            return existing;
        }
        self.counters
            .entry(key.to_owned())
            .or_insert_with(|| Mutex::new(KeyCounters::new(self.windows.len())))
            .downgrade()
    }

    /// Decide for `key` at `now`, recording the hit only when admitted
    pub fn evaluate(&self, key: &str, now: DateTime<Utc>) -> RateLimitDecision {
        let entry = self.counters_for(key);
        let mut counters = entry.lock();
        self.decide(&mut counters, key, now, true)
    }

    /// Decide for `key` at `now` and record nothing, even on admit
    ///
    /// Unknown keys are admitted without being tracked.
    pub fn peek_at(&self, key: &str, now: DateTime<Utc>) -> RateLimitDecision {
        match self.counters.get(key) {
            Some(entry) => self.decide(&mut entry.lock(), key, now, false),
            None => self.decide(&mut KeyCounters::new(self.windows.len()), key, now, false),
        }
    }

    fn decide(
        &self,
        counters: &mut KeyCounters,
        key: &str,
        now: DateTime<Utc>,
        record: bool,
    ) -> RateLimitDecision {
        let now_ms = now.timestamp_millis();
        counters.prune(&self.windows, now_ms);

        // The most restrictive exceeded window is the one that frees up last
        let mut retry_after: Option<u64> = None;
        for (window, hits) in self.windows.iter().zip(counters.hits.iter()) {
            if hits.len() >= window.max_requests as usize {
                let oldest = hits.front().copied().unwrap_or(now_ms);
                let secs = window.retry_after_secs(oldest, now_ms);
                retry_after = Some(retry_after.map_or(secs, |r| r.max(secs)));
            }
        }

        match retry_after {
            Some(retry_after_secs) => {
                debug!(key = %key, retry_after_secs, "Rate limit exceeded");
                RateLimitDecision::Reject { retry_after_secs }
            }
            None => {
                if record {
                    counters.record(now_ms);
                }
                RateLimitDecision::Admit
            }
        }
    }

    /// Drop keys whose every window has emptied, returning how many went
    pub fn purge_idle(&self, now: DateTime<Utc>) -> usize {
        let now_ms = now.timestamp_millis();
        let before = self.counters.len();
        self.counters.retain(|_, counters| {
            let counters = counters.get_mut();
            counters.prune(&self.windows, now_ms);
            !counters.is_empty()
        });
        before.saturating_sub(self.counters.len())
    }
}

#[async_trait]
impl RateLimiter for SlidingWindowLimiter {
    async fn check(&self, key: &str, now: DateTime<Utc>) -> Result<RateLimitDecision, DomainError> {
        Ok(self.evaluate(key, now))
    }

    async fn peek(&self, key: &str, now: DateTime<Utc>) -> Result<RateLimitDecision, DomainError> {
        Ok(self.peek_at(key, now))
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
