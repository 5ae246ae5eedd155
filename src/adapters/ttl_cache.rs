//! In-memory time-to-live cache shared by the series store and the advisor.
//!
//! Entries expire `ttl` after they were written; expired entries are dropped
//! lazily on read or by [`TtlCache::purge_expired`]. Values are computed
//! outside the map, so two callers missing on the same key both compute and
//! the last write wins.

use dashmap::DashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Source of "now" for expiry checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct Entry<V> {
    value: V,
    /// `None` when `now + ttl` is past what `Instant` can represent.
    expires_at: Option<Instant>,
}

impl<V> Entry<V> {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

pub struct TtlCache<K, V>
where
    K: Eq + Hash,
{
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: DashMap<K, Entry<V>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entries: DashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        // The shard read guard must be gone before `remove_if` takes the write lock.
        let live = self
            .entries
            .get(key)
            .and_then(|entry| entry.is_live(now).then(|| entry.value.clone()));
        if live.is_none() {
            self.entries.remove_if(key, |_, entry| !entry.is_live(now));
        }
        live
    }

    pub fn insert(&self, key: K, value: V) {
        let expires_at = self.clock.now().checked_add(self.ttl);
        self.entries.insert(key, Entry { value, expires_at });
    }

    /// Return the live value for `key`, or compute, store and return a new one.
    /// Errors from `compute` are returned and nothing is cached.
    pub fn get_or_try_insert_with<E, F>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        let value = compute()?;
        self.insert(key, value.clone());
        Ok(value)
    }

    pub fn invalidate(&self, key: &K) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Drop every entry whose key matches `pred`. Returns how many were removed.
    pub fn invalidate_where<P>(&self, mut pred: P) -> usize
    where
        P: FnMut(&K) -> bool,
    {
        let mut removed = 0;
        self.entries.retain(|k, _| {
            let drop = pred(k);
            removed += usize::from(drop);
            !drop
        });
        removed
    }

    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let live = entry.is_live(now);
            removed += usize::from(!live);
            live
        });
        removed
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Entries currently held, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> TtlCache<String, V>
where
    V: Clone,
{
    pub fn invalidate_prefix(&self, prefix: &str) -> usize {
        self.invalidate_where(|k| k.starts_with(prefix))
    }
}
