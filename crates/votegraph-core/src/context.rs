//! Caller-owned memoization of per-focal-actor results.
//!
//! A [`CompareCache`] holds results for one raw-input snapshot at a time.
//! Asking for a different snapshot drops everything cached so far.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::normalize::keyify;

/// Identity of one load of raw records: the blake3 digest of its bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SnapshotId(pub [u8; 32]);

impl SnapshotId {
    pub fn from_content(bytes: &[u8]) -> Self {
        Self(*blake3::hash(bytes).as_bytes())
    }
}

/// First 8 bytes as hex, enough to tell snapshots apart in logs.
impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0[..8].iter().try_for_each(|b| write!(f, "{b:02x}"))
    }
}

/// Results keyed by `(snapshot, keyify(focal))`.
#[derive(Debug)]
pub struct CompareCache<T> {
    snapshot: Option<SnapshotId>,
    entries: HashMap<String, T>,
    hits: u64,
    misses: u64,
}

impl<T> Default for CompareCache<T> {
    fn default() -> Self {
        Self {
            snapshot: None,
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }
}

impl<T> CompareCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value for `focal` under `snapshot`, computing it with `f` at
    /// most once per key.
    pub fn get_or_compute<F>(&mut self, snapshot: SnapshotId, focal: &str, f: F) -> &T
    where
        F: FnOnce() -> T,
    {
        self.switch_to(snapshot);
        let key = keyify(focal);
        if self.entries.contains_key(&key) {
            self.hits += 1;
        } else {
            self.misses += 1;
            debug!(focal = %key, snapshot = %snapshot, "computing uncached result");
        }
        self.entries.entry(key).or_insert_with(f)
    }

    /// Cached value without computing, `None` for other snapshots.
    pub fn get(&self, snapshot: SnapshotId, focal: &str) -> Option<&T> {
        if self.snapshot != Some(snapshot) {
            return None;
        }
        self.entries.get(&keyify(focal))
    }

    /// Forget every entry, e.g. after the raw input was reloaded.
    pub fn invalidate(&mut self) {
        self.entries.clear();
        self.snapshot = None;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(hits, misses)` since creation.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    fn switch_to(&mut self, snapshot: SnapshotId) {
        if self.snapshot != Some(snapshot) {
            if !self.entries.is_empty() {
                debug!(dropped = self.entries.len(), "snapshot changed, clearing cache");
            }
            self.entries.clear();
            self.snapshot = Some(snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(raw: &str) -> SnapshotId {
        SnapshotId::from_content(raw.as_bytes())
    }

    #[test]
    fn computes_once_per_normalised_key() {
        let mut cache = CompareCache::new();
        let id = snap("one");
        let mut calls = 0;
        let v = *cache.get_or_compute(id, "สมชาย ใจดี", || {
            calls += 1;
            7
        });
        assert_eq!(v, 7);
        let v = *cache.get_or_compute(id, "  สมชาย   ใจดี ", || {
            calls += 1;
            8
        });
        assert_eq!(v, 7);
        assert_eq!(calls, 1);
        assert_eq!(cache.stats(), (1, 1));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn new_snapshot_clears_entries() {
        let mut cache = CompareCache::new();
        cache.get_or_compute(snap("one"), "a", || 1);
        cache.get_or_compute(snap("one"), "b", || 2);
        assert_eq!(cache.len(), 2);

        assert_eq!(*cache.get_or_compute(snap("two"), "a", || 10), 10);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(snap("one"), "a").is_none());
        assert_eq!(cache.get(snap("two"), "A"), Some(&10));
    }

    #[test]
    fn invalidate_forgets_everything() {
        let mut cache = CompareCache::new();
        cache.get_or_compute(snap("one"), "a", || 1);
        cache.invalidate();
        assert!(cache.is_empty());
        assert!(cache.get(snap("one"), "a").is_none());
    }

    #[test]
    fn content_hash_is_stable() {
        assert_eq!(SnapshotId::from_content(b"abc"), SnapshotId::from_content(b"abc"));
        assert_ne!(SnapshotId::from_content(b"abc"), SnapshotId::from_content(b"abd"));
        // Known blake3 digest of the empty input.
        assert_eq!(SnapshotId::from_content(b"").to_string(), "af1349b9f5f9a1a6");
    }
}
