//! Bounded LRU memo in front of a tagger.
//!
//! Overlapping windows and repeated passages re-tag identical text; the cache keeps the most
//! recently used `capacity` results keyed by `(fnv1a64(text), text.len())`.
//!
//! # Invariants
//! - `entries.len() == recency.len() <= capacity`
//! - every entry's `tick` is its key in `recency`
//! - the cache lives as long as the tagger, i.e. one scan session

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tracing::debug;

use super::{TaggedStream, Tagger};
use crate::error::TaggerError;
use crate::hashing::fnv1a64;

type CacheKey = (u64, usize);

#[derive(Debug)]
struct Entry {
    value: TaggedStream,
    tick: u64,
}

/// Least-recently-used map with O(log n) eviction
#[derive(Debug)]
struct LruMap {
    capacity: usize,
    next_tick: u64,
    entries: HashMap<CacheKey, Entry>,
    recency: BTreeMap<u64, CacheKey>,
}

impl LruMap {
    fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            next_tick: 0,
            entries: HashMap::new(),
            recency: BTreeMap::new(),
        }
    }

    fn bump(&mut self) -> u64 {
        self.next_tick += 1;
        self.next_tick
    }

    fn get(&mut self, key: &CacheKey) -> Option<TaggedStream> {
        let tick = self.bump();
        let entry = self.entries.get_mut(key)?;
        self.recency.remove(&entry.tick);
        entry.tick = tick;
        self.recency.insert(tick, *key);
        Some(entry.value.clone())
    }

    fn insert(&mut self, key: CacheKey, value: TaggedStream) {
        let tick = self.bump();
        if let Some(old) = self.entries.insert(key, Entry { value, tick }) {
            self.recency.remove(&old.tick);
        } else if self.entries.len() > self.capacity {
            if let Some((_, evicted)) = self.recency.pop_first() {
                self.entries.remove(&evicted);
            }
        }
        self.recency.insert(tick, key);
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Hit/miss counters for logging
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Tagger wrapper memoizing results in a bounded LRU cache
///
/// The lock is never held while the inner tagger runs, so concurrent documents only contend on
/// lookups and inserts.
pub struct CachedTagger<T> {
    inner: T,
    cache: Mutex<LruMap>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<T: Tagger> CachedTagger<T> {
    pub fn new(inner: T, capacity: usize) -> Self {
        Self {
            inner,
            cache: Mutex::new(LruMap::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.cache.lock().map(|cache| cache.len()).unwrap_or(0);
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries,
        }
    }
}

impl<T: Tagger> Tagger for CachedTagger<T> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn cache_stats(&self) -> Option<CacheStats> {
        Some(self.stats())
    }

    fn tag(&self, text: &str) -> Result<TaggedStream, TaggerError> {
        let key = (fnv1a64(text.as_bytes()), text.len());

        // WHY: a poisoned lock only loses memoization, never correctness
        if let Ok(mut cache) = self.cache.lock() {
            if let Some(hit) = cache.get(&key) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(hit);
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let tagged = self.inner.tag(text)?;

        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, tagged.clone());
            debug!(entries = cache.len(), "tagger cache insert");
        }
        Ok(tagged)
    }
}
