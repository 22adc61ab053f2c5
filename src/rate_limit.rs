//! Per-identifier token-bucket rate limiting.
//!
//! Buckets refill lazily in proportion to elapsed time, so no background
//! timer exists. Stale entries are dropped by a sweep that runs on every
//! Nth admission call, which bounds memory growth under sustained
//! distinct-identifier load.
//!
//! State lives in one process's memory only. Restarts and horizontal
//! scaling reset all counters, so this is a best-effort control, not a
//! security boundary. Callers needing cluster-wide enforcement must
//! externalize the counters to a shared store.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Entries whose last refill is older than this are dropped by the sweep.
const RETENTION_WINDOW: Duration = Duration::from_secs(600);

/// A sweep runs on every Nth admission call.
const SWEEP_EVERY: u64 = 20;

/// Remaining quota for a single identifier.
#[derive(Debug)]
struct Bucket {
    /// Remaining tokens, always within `[0, max_tokens]`.
    tokens: u32,
    /// Instant of the last non-zero refill (or bucket creation).
    last_refill: Instant,
}

struct Inner {
    buckets: HashMap<String, Bucket>,
    /// Admission calls since creation, drives the periodic sweep.
    calls: u64,
}

/// In-memory token-bucket rate limiter keyed by caller identifier.
///
/// `admit` never panics and always returns a boolean; a poisoned lock is
/// recovered because bucket state is valid after any partial mutation.
#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Mutex<Inner>>,
    max_tokens: u32,
    interval: Duration,
}

impl RateLimiter {
    /// Create a limiter admitting at most `max_tokens` requests per
    /// `interval` for each identifier.
    pub fn new(max_tokens: u32, interval: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                buckets: HashMap::new(),
                calls: 0,
            })),
            max_tokens,
            interval,
        }
    }

    /// Admit or reject a request attributed to `identifier`.
    pub fn admit(&self, identifier: &str) -> bool {
        self.admit_at(identifier, Instant::now())
    }

    /// Admission check against an explicit instant. Tests drive this with
    /// synthetic time; production code goes through [`admit`](Self::admit).
    fn admit_at(&self, identifier: &str, now: Instant) -> bool {
        let mut inner = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        inner.calls += 1;
        if inner.calls % SWEEP_EVERY == 0 {
            inner
                .buckets
                .retain(|_, bucket| now.duration_since(bucket.last_refill) <= RETENTION_WINDOW);
        }

        match inner.buckets.entry(identifier.to_string()) {
            Entry::Vacant(slot) => {
                // The admitting request consumes one token immediately.
                slot.insert(Bucket {
                    tokens: self.max_tokens.saturating_sub(1),
                    last_refill: now,
                });
                true
            }
            Entry::Occupied(mut slot) => {
                let bucket = slot.get_mut();
                let refill = self.refill_amount(now.duration_since(bucket.last_refill));
                if refill > 0 {
                    // The refill timestamp advances only when a non-zero
                    // refill occurs, so sub-interval elapsed time keeps
                    // accumulating against the original instant.
                    bucket.tokens = bucket.tokens.saturating_add(refill).min(self.max_tokens);
                    bucket.last_refill = now;
                }

                if bucket.tokens > 0 {
                    bucket.tokens -= 1;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Tokens accrued over `elapsed`: `floor(elapsed / interval * max)`.
    fn refill_amount(&self, elapsed: Duration) -> u32 {
        let interval_ms = self.interval.as_millis().max(1);
        let refill = elapsed.as_millis() * u128::from(self.max_tokens) / interval_ms;
        refill.min(u128::from(self.max_tokens)) as u32
    }
}
