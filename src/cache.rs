//! Scan result cache with in-flight request coalescing.
//!
//! One mutex guards both the result map and the pending map, so the
//! idle / cached / in-flight transitions are atomic: two concurrent misses
//! on the same key can never start two scans, and a waiter can never join a
//! scan that has already completed.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tokio::sync::oneshot;
use uuid::Uuid;

use crate::model::Coordinate;

/// Identity of one scan request. Two requests with equal keys always share
/// one underlying scan.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub region_id: String,
    pub actor: Uuid,
    pub filter_owner: Option<Uuid>,
}

/// Final outcome delivered to every waiter of one scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The filtered coordinate list, in enumeration order.
    Complete(Vec<Coordinate>),
    /// The region id no longer resolves in the actor's dimension.
    RegionNotFound,
    /// The actor went offline before the scan finished.
    Cancelled,
}

/// Result of [`ScanCache::try_coalesce`].
#[derive(Debug, PartialEq, Eq)]
pub enum Coalesce {
    /// A scan for this key is already running; the waiter was appended.
    Joined,
    /// No scan was running; the caller must run one and call `complete`.
    StartedNew,
}

struct CacheEntry {
    results: Vec<Coordinate>,
    created_at: Instant,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<CacheKey, CacheEntry>,
    pending: HashMap<CacheKey, Vec<oneshot::Sender<ScanOutcome>>>,
}

pub struct ScanCache {
    inner: Mutex<Inner>,
    ttl: Duration,
}

impl ScanCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            ttl,
        }
    }

    /// Return a non-expired cached result. Expired entries are evicted here,
    /// at read time; there is no background sweep.
    pub fn lookup(&self, key: &CacheKey) -> Option<Vec<Coordinate>> {
        let mut inner = self.inner.lock().ok()?;
        match inner.entries.get(key) {
            Some(entry) if entry.created_at.elapsed() < self.ttl => Some(entry.results.clone()),
            Some(_) => {
                inner.entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Join the in-flight scan for `key`, or register a new one seeded with
    /// `waiter`. The caller that gets [`Coalesce::StartedNew`] owns running
    /// the scan and must eventually call [`Self::complete`].
    pub fn try_coalesce(&self, key: CacheKey, waiter: oneshot::Sender<ScanOutcome>) -> Coalesce {
        let Ok(mut inner) = self.inner.lock() else {
            // Poisoned lock: drop the waiter, its receiver resolves as closed.
            return Coalesce::Joined;
        };
        match inner.pending.get_mut(&key) {
            Some(waiters) => {
                waiters.push(waiter);
                Coalesce::Joined
            }
            None => {
                inner.pending.insert(key, vec![waiter]);
                Coalesce::StartedNew
            }
        }
    }

    /// Finish the scan for `key`: store the result (successful outcomes
    /// only), clear the in-flight entry, and notify every waiter once, in
    /// join order.
    pub fn complete(&self, key: &CacheKey, outcome: ScanOutcome) {
        let waiters = {
            let Ok(mut inner) = self.inner.lock() else {
                return;
            };
            if let ScanOutcome::Complete(results) = &outcome {
                inner.entries.insert(
                    key.clone(),
                    CacheEntry {
                        results: results.clone(),
                        created_at: Instant::now(),
                    },
                );
            }
            inner.pending.remove(key).unwrap_or_default()
        };
        log::debug!(
            "vaultguard: scan for region {} finished, notifying {} waiter(s)",
            key.region_id,
            waiters.len()
        );
        for waiter in waiters {
            // A dropped receiver just means that caller stopped waiting.
            let _ = waiter.send(outcome.clone());
        }
    }

    /// Drop every cached entry. Scans already in flight are unaffected and
    /// will repopulate the cache when they complete.
    pub fn invalidate(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            let dropped = inner.entries.len();
            inner.entries.clear();
            log::info!("vaultguard: cache invalidated, {dropped} entries dropped");
        }
    }

    #[cfg(test)]
    fn has_pending(&self, key: &CacheKey) -> bool {
        self.inner
            .lock()
            .map_or(false, |inner| inner.pending.contains_key(key))
    }
}
