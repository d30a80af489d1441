//! Thread-safe bounded cache.

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use parking_lot::Mutex;
use tracing::debug;

use super::entry::CacheEntry;
use super::policy::{EvictionPolicy, EvictionPolicyKind};
use crate::domain::CacheStats;

/// Bounded string-keyed cache.
///
/// All operations take the cache's own mutex; there is no cross-cache
/// locking. Entries are kept ordered by key.
///
/// # Example
///
/// ```
/// use trademem::cache::{BoundedCache, EvictionPolicyKind};
///
/// let cache = BoundedCache::new("prices", 2, EvictionPolicyKind::Lru);
/// cache.put("a", 1, 0.0);
/// cache.put("b", 2, 0.0);
/// cache.get("a");
/// cache.put("c", 3, 0.0); // evicts "b", the least recently used
///
/// assert!(cache.contains("a"));
/// assert!(!cache.contains("b"));
/// assert_eq!(cache.stats().evictions, 1);
/// ```
#[derive(Debug)]
pub struct BoundedCache<V> {
    name: String,
    max_size: usize,
    policy: Box<dyn EvictionPolicy>,
    inner: Mutex<Inner<V>>,
}

#[derive(Debug)]
struct Inner<V> {
    entries: BTreeMap<String, CacheEntry<V>>,
    hits: u64,
    misses: u64,
    evictions: u64,
    touch_seq: u64,
}

impl<V> Inner<V> {
    fn next_seq(&mut self) -> u64 {
        self.touch_seq += 1;
        self.touch_seq
    }
}

impl<V: Clone> BoundedCache<V> {
    /// Create a cache using one of the builtin policies.
    ///
    /// A `max_size` of zero is raised to one.
    pub fn new(name: impl Into<String>, max_size: usize, policy: EvictionPolicyKind) -> Self {
        Self::with_policy(name, max_size, policy.build())
    }

    /// Create a cache with a custom policy.
    pub fn with_policy(
        name: impl Into<String>,
        max_size: usize,
        policy: Box<dyn EvictionPolicy>,
    ) -> Self {
        Self {
            name: name.into(),
            max_size: max_size.max(1),
            policy,
            inner: Mutex::new(Inner {
                entries: BTreeMap::new(),
                hits: 0,
                misses: 0,
                evictions: 0,
                touch_seq: 0,
            }),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn max_size(&self) -> usize {
        self.max_size
    }

    #[must_use]
    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// Look up a value, counting a hit or miss.
    ///
    /// A hit touches the entry and increments its access count.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let seq = inner.next_seq();
        match inner.entries.get_mut(key) {
            Some(entry) => {
                entry.record_access(Utc::now(), seq);
                let value = entry.value.clone();
                inner.hits += 1;
                Some(value)
            }
            None => {
                inner.misses += 1;
                None
            }
        }
    }

    /// Read an entry without touching it or the hit/miss counters.
    #[must_use]
    pub fn peek(&self, key: &str) -> Option<CacheEntry<V>> {
        self.inner.lock().entries.get(key).cloned()
    }

    /// Insert or update a value.
    ///
    /// Updating an existing key replaces its value and touches it without
    /// counting an access; its prefetch hint is kept, so `prefetch_hint` only
    /// seeds new entries. Use [`update_prefetch_hints`](Self::update_prefetch_hints)
    /// to change the hint of a cached key. Inserting a new key into a full cache
    /// first evicts one victim per iteration until there is room. Returns the
    /// evicted keys.
    pub fn put(&self, key: impl Into<String>, value: V, prefetch_hint: f64) -> Vec<String> {
        let key = key.into();
        let now = Utc::now();
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let seq = inner.next_seq();

        if let Some(entry) = inner.entries.get_mut(&key) {
            entry.value = value;
            entry.touch(now, seq);
            return Vec::new();
        }

        let mut evicted = Vec::new();
        while inner.entries.len() >= self.max_size {
            let victim = {
                let mut candidates = inner
                    .entries
                    .iter()
                    .map(|(k, entry)| (k.as_str(), entry.metadata()));
                self.policy
                    .select_victim(&mut candidates, now)
                    .map(str::to_string)
            };
            let Some(victim) = victim else { break };
            inner.entries.remove(&victim);
            inner.evictions += 1;
            debug!(cache = %self.name, policy = self.policy.name(), key = %victim, "evicted entry");
            evicted.push(victim);
        }

        inner
            .entries
            .insert(key, CacheEntry::new(value, prefetch_hint, now, seq));
        evicted
    }

    /// Remove a key, returning whether it was present.
    pub fn delete(&self, key: &str) -> bool {
        self.inner.lock().entries.remove(key).is_some()
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.inner.lock().entries.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All keys in key order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.inner.lock().entries.keys().cloned().collect()
    }

    /// Drop every entry. Counters are kept.
    pub fn clear(&self) {
        self.inner.lock().entries.clear();
    }

    /// Counted read of up to `limit` of `keys`, most recently touched first.
    ///
    /// Every returned entry counts a hit and is touched as by
    /// [`get`](Self::get); every key no longer cached counts a miss. Cached
    /// keys beyond `limit` are not read. The returned entries keep their
    /// relative recency order.
    pub fn get_many<'k, I>(&self, keys: I, limit: usize) -> Vec<(String, CacheEntry<V>)>
    where
        I: IntoIterator<Item = &'k str>,
    {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let mut present = Vec::new();
        for key in keys {
            match inner.entries.get(key) {
                Some(entry) => present.push((entry.metadata().recency(), key)),
                None => inner.misses += 1,
            }
        }
        present.sort_by(|(a, _), (b, _)| b.cmp(a));
        present.truncate(limit);
        let selected = present.into_iter().map(|(_, key)| key.to_string()).collect();
        Self::read_selected(inner, selected)
    }

    /// Counted read of the `limit` most recently touched entries.
    pub fn get_recent(&self, limit: usize) -> Vec<(String, CacheEntry<V>)> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let mut ranked: Vec<_> = inner
            .entries
            .iter()
            .map(|(key, entry)| (entry.metadata().recency(), key))
            .collect();
        ranked.sort_by(|(a, _), (b, _)| b.cmp(a));
        let selected = ranked
            .into_iter()
            .take(limit)
            .map(|(_, key)| key.clone())
            .collect();
        Self::read_selected(inner, selected)
    }

    /// Record a hit on each of `keys`, given newest first. Touching runs
    /// oldest first so the newest key stays newest.
    fn read_selected(inner: &mut Inner<V>, keys: Vec<String>) -> Vec<(String, CacheEntry<V>)> {
        let now = Utc::now();
        let mut out = Vec::with_capacity(keys.len());
        for key in keys.into_iter().rev() {
            let seq = inner.next_seq();
            if let Some(entry) = inner.entries.get_mut(&key) {
                entry.record_access(now, seq);
                out.push((key, entry.clone()));
                inner.hits += 1;
            }
        }
        out.reverse();
        out
    }

    /// Overwrite prefetch hints in bulk.
    ///
    /// Hints are clamped to [0, 1] and absent keys are ignored. Returns the
    /// number of entries updated.
    pub fn update_prefetch_hints(&self, hints: &HashMap<String, f64>) -> usize {
        let mut guard = self.inner.lock();
        let mut updated = 0;
        for (key, &hint) in hints {
            if let Some(entry) = guard.entries.get_mut(key) {
                entry.set_hint(hint);
                updated += 1;
            }
        }
        updated
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            size: inner.entries.len(),
            max_size: self.max_size,
            hits: inner.hits,
            misses: inner.misses,
            hit_rate: CacheStats::compute_hit_rate(inner.hits, inner.misses),
            evictions: inner.evictions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_counts_hits_and_misses() {
        let cache = BoundedCache::new("t", 4, EvictionPolicyKind::Lru);
        cache.put("k", 1, 0.0);
        assert_eq!(cache.get("k"), Some(1));
        assert_eq!(cache.get("missing"), None);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hit_rate, 0.5);
    }

    #[test]
    fn get_increments_access_count_but_put_does_not() {
        let cache = BoundedCache::new("t", 4, EvictionPolicyKind::Lru);
        cache.put("k", 1, 0.0);
        cache.get("k");
        cache.get("k");
        cache.put("k", 2, 0.0);

        let entry = cache.peek("k").unwrap();
        assert_eq!(entry.value, 2);
        assert_eq!(entry.access_count(), 2);
    }

    #[test]
    fn peek_does_not_touch_stats() {
        let cache = BoundedCache::new("t", 4, EvictionPolicyKind::Lru);
        cache.put("k", 1, 0.0);
        let _ = cache.peek("k");
        let _ = cache.peek("nope");
        assert_eq!(cache.stats().hits + cache.stats().misses, 0);
    }

    #[test]
    fn never_exceeds_max_size() {
        let cache = BoundedCache::new("t", 3, EvictionPolicyKind::Lru);
        for i in 0..10 {
            cache.put(format!("k{i}"), i, 0.0);
            assert!(cache.len() <= 3);
        }
        let stats = cache.stats();
        assert_eq!(stats.size, 3);
        assert_eq!(stats.evictions, 7);
    }

    #[test]
    fn single_put_at_capacity_evicts_exactly_one() {
        let cache = BoundedCache::new("t", 2, EvictionPolicyKind::Lru);
        cache.put("a", 1, 0.0);
        cache.put("b", 2, 0.0);
        assert_eq!(cache.put("c", 3, 0.0), vec!["a".to_string()]);
        assert!(cache.put("c", 4, 0.0).is_empty());
    }

    #[test]
    fn lru_evicts_least_recently_read() {
        let cache = BoundedCache::new("t", 2, EvictionPolicyKind::Lru);
        cache.put("a", 1, 0.0);
        cache.put("b", 2, 0.0);
        cache.get("a");
        cache.put("c", 3, 0.0);
        assert_eq!(cache.keys(), vec!["a".to_string(), "c".to_string()]);
    }

    #[test]
    fn lfu_evicts_least_frequently_read() {
        let cache = BoundedCache::new("t", 2, EvictionPolicyKind::Lfu);
        cache.put("a", 1, 0.0);
        cache.put("b", 2, 0.0);
        cache.get("b");
        cache.get("b");
        cache.get("a");
        cache.put("c", 3, 0.0);
        assert!(!cache.contains("a"));
        assert!(cache.contains("b"));
    }

    #[test]
    fn weighted_evicts_lower_hint() {
        let cache = BoundedCache::new("t", 2, EvictionPolicyKind::Weighted);
        cache.put("keep", 1, 0.9);
        cache.put("drop", 2, 0.1);
        cache.put("new", 3, 0.5);
        assert!(cache.contains("keep"));
        assert!(!cache.contains("drop"));
    }

    #[test]
    fn delete_reports_presence() {
        let cache = BoundedCache::new("t", 2, EvictionPolicyKind::Lru);
        cache.put("a", 1, 0.0);
        assert!(cache.delete("a"));
        assert!(!cache.delete("a"));
        assert!(cache.is_empty());
    }

    #[test]
    fn zero_max_size_is_raised_to_one() {
        let cache = BoundedCache::new("t", 0, EvictionPolicyKind::Lru);
        cache.put("a", 1, 0.0);
        cache.put("b", 2, 0.0);
        assert_eq!(cache.max_size(), 1);
        assert_eq!(cache.keys(), vec!["b".to_string()]);
    }

    #[test]
    fn get_recent_orders_by_touch_and_counts_hits() {
        let cache = BoundedCache::new("t", 8, EvictionPolicyKind::Lru);
        cache.put("a", 1, 0.0);
        cache.put("b", 2, 0.0);
        cache.put("c", 3, 0.0);
        cache.get("a");

        let keys: Vec<_> = cache.get_recent(2).into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a".to_string(), "c".to_string()]);
        assert_eq!(cache.stats().hits, 3);
        assert_eq!(cache.peek("c").unwrap().access_count(), 1);
        assert_eq!(cache.peek("b").unwrap().access_count(), 0);

        // Reading keeps the relative order of what was read.
        let again: Vec<_> = cache.get_recent(3).into_iter().map(|(k, _)| k).collect();
        assert_eq!(again, vec!["a".to_string(), "c".to_string(), "b".to_string()]);
    }

    #[test]
    fn get_many_counts_missing_keys_as_misses() {
        let cache = BoundedCache::new("t", 8, EvictionPolicyKind::Lru);
        cache.put("a", 1, 0.0);
        cache.put("c", 3, 0.0);

        let found = cache.get_many(["a", "b", "c", "d"], 10);
        let keys: Vec<_> = found.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["c", "a"]);
        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses), (2, 2));
    }

    #[test]
    fn get_many_reads_only_up_to_limit() {
        let cache = BoundedCache::new("t", 8, EvictionPolicyKind::Lru);
        for key in ["a", "b", "c"] {
            cache.put(key, 0, 0.0);
        }
        let found = cache.get_many(["a", "b", "c"], 1);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, "c");
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.peek("a").unwrap().access_count(), 0);
    }

    #[test]
    fn overwriting_keeps_prefetch_hint() {
        let cache = BoundedCache::new("t", 8, EvictionPolicyKind::Weighted);
        cache.put("a", 1, 0.0);
        cache.update_prefetch_hints(&HashMap::from([("a".to_string(), 0.8)]));
        cache.put("a", 2, 0.0);

        let entry = cache.peek("a").unwrap();
        assert_eq!(entry.value, 2);
        assert_eq!(entry.prefetch_hint(), 0.8);
    }

    #[test]
    fn prefetch_hints_update_present_keys_only() {
        let cache = BoundedCache::new("t", 8, EvictionPolicyKind::Weighted);
        cache.put("a", 1, 0.0);
        let hints = HashMap::from([("a".to_string(), 2.0), ("ghost".to_string(), 0.5)]);
        assert_eq!(cache.update_prefetch_hints(&hints), 1);
        assert_eq!(cache.peek("a").unwrap().prefetch_hint(), 1.0);
    }

    #[test]
    fn clear_keeps_counters() {
        let cache = BoundedCache::new("t", 1, EvictionPolicyKind::Lru);
        cache.put("a", 1, 0.0);
        cache.put("b", 2, 0.0);
        cache.get("b");
        cache.clear();
        let stats = cache.stats();
        assert_eq!(stats.size, 0);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.hits, 1);
    }
}
