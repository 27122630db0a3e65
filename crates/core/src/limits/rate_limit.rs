//! Per-user sliding-window rate limiting.
//!
//! The store is process-local. It is soft abuse prevention; the persisted
//! per-project quota is the hard limit.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::clock::Clock;
use crate::error::CoreError;
use crate::types::Timestamp;

/// Default maximum calls per window.
pub const DEFAULT_MAX_CALLS: usize = 10;

/// Default window length in seconds.
pub const DEFAULT_WINDOW_SECONDS: i64 = 60;

/// Counts calls per key. Checking never records; the caller records only
/// after the call succeeded.
pub trait CallCounter: Send + Sync {
    /// Whether another call for `key` fits in the current window.
    fn check(&self, key: &str) -> bool;

    /// Record one call for `key` at the current time.
    fn record(&self, key: &str);
}

/// In-memory [`CallCounter`] keeping the timestamps of recent calls.
///
/// Expired timestamps are pruned lazily whenever a key is checked, and a
/// key left without calls is dropped.
pub struct SlidingWindowCounter {
    max_calls: usize,
    window: chrono::Duration,
    clock: Arc<dyn Clock>,
    calls: Mutex<HashMap<String, VecDeque<Timestamp>>>,
}

impl SlidingWindowCounter {
    pub fn new(max_calls: usize, window: chrono::Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            max_calls,
            window,
            clock,
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Calls for `key` still inside the window.
    pub fn current_count(&self, key: &str) -> usize {
        let cutoff = self.clock.now() - self.window;
        let mut calls = self.calls.lock().unwrap_or_else(|e| e.into_inner());
        let Some(timestamps) = calls.get_mut(key) else {
            return 0;
        };
        prune(timestamps, cutoff);
        let count = timestamps.len();
        if count == 0 {
            calls.remove(key);
        }
        count
    }

    /// Number of keys with calls still in memory.
    pub fn tracked_keys(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

fn prune(timestamps: &mut VecDeque<Timestamp>, cutoff: Timestamp) {
    while timestamps.front().is_some_and(|t| *t <= cutoff) {
        timestamps.pop_front();
    }
}

impl CallCounter for SlidingWindowCounter {
    fn check(&self, key: &str) -> bool {
        self.current_count(key) < self.max_calls
    }

    fn record(&self, key: &str) {
        let now = self.clock.now();
        let cutoff = now - self.window;
        let mut calls = self.calls.lock().unwrap_or_else(|e| e.into_inner());
        // Users who never come back would otherwise keep their key forever.
        calls.retain(|_, timestamps| {
            prune(timestamps, cutoff);
            !timestamps.is_empty()
        });
        calls.entry(key.to_string()).or_default().push_back(now);
    }
}

/// Fail with [`CoreError::AiRateLimited`] when `key` has no room left.
pub fn check_rate_limit(counter: &dyn CallCounter, key: &str) -> Result<(), CoreError> {
    if counter.check(key) {
        Ok(())
    } else {
        Err(CoreError::AiRateLimited)
    }
}
