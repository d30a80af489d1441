//! Co-access prefetch prediction.
//!
//! The predictor watches the sequence of accessed keys and counts how often
//! two keys are touched close together. It is passive: predictions only
//! influence eviction once an integrator pushes them into a cache with
//! [`BoundedCache::update_prefetch_hints`](crate::cache::BoundedCache::update_prefetch_hints).
//!
//! Counts only cover keys still in the access history: when the history is
//! trimmed, pairs involving trimmed keys are forgotten.

use std::collections::{HashMap, HashSet, VecDeque};

use parking_lot::Mutex;
use tracing::debug;

use crate::config::PrefetchConfig;
use crate::domain::PrefetchStats;

/// Predicts keys likely to be accessed alongside a given key.
///
/// # Example
///
/// ```
/// use trademem::config::PrefetchConfig;
/// use trademem::prefetch::PrefetchPredictor;
///
/// let predictor = PrefetchPredictor::new(&PrefetchConfig::default());
/// for key in ["BTC:1", "ETH:1", "BTC:1", "ETH:1", "BTC:1", "SOL:1"] {
///     predictor.record_access(key);
/// }
///
/// let predictions = predictor.predict_next("BTC:1", 1);
/// assert_eq!(predictions[0].0, "ETH:1");
/// ```
#[derive(Debug)]
pub struct PrefetchPredictor {
    window: usize,
    history_max: usize,
    history_trim: usize,
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    history: VecDeque<String>,
    /// Symmetric co-access counts: `co_access[a][b] == co_access[b][a]`.
    co_access: HashMap<String, HashMap<String, u64>>,
}

impl Inner {
    /// Drop co-access counts involving keys no longer in the history.
    /// Returns the number of keys forgotten.
    fn forget_untracked(&mut self) -> usize {
        let retained: HashSet<&str> = self.history.iter().map(String::as_str).collect();
        let before = self.co_access.len();
        self.co_access.retain(|key, partners| {
            if !retained.contains(key.as_str()) {
                return false;
            }
            partners.retain(|partner, _| retained.contains(partner.as_str()));
            !partners.is_empty()
        });
        before - self.co_access.len()
    }
}

impl PrefetchPredictor {
    #[must_use]
    pub fn new(config: &PrefetchConfig) -> Self {
        Self {
            window: config.window.max(1),
            history_max: config.history_max.max(1),
            history_trim: config.history_trim.min(config.history_max),
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Record an access to `key`.
    ///
    /// Every distinct other key among the last `window` accesses has its
    /// pairing with `key` counted once.
    pub fn record_access(&self, key: &str) {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        let partners: Vec<String> = {
            let mut seen = HashSet::new();
            inner
                .history
                .iter()
                .rev()
                .take(self.window)
                .filter(|recent| recent.as_str() != key && seen.insert(recent.as_str()))
                .cloned()
                .collect()
        };

        for partner in partners {
            *inner
                .co_access
                .entry(key.to_string())
                .or_default()
                .entry(partner.clone())
                .or_insert(0) += 1;
            *inner
                .co_access
                .entry(partner)
                .or_default()
                .entry(key.to_string())
                .or_insert(0) += 1;
        }

        inner.history.push_back(key.to_string());
        if inner.history.len() > self.history_max {
            let excess = inner.history.len() - self.history_trim;
            inner.history.drain(..excess);
            let forgotten = inner.forget_untracked();
            debug!(
                dropped = excess,
                kept = inner.history.len(),
                forgotten,
                "trimmed access history"
            );
        }
    }

    /// Up to `top_k` keys most often accessed together with `key`, with their
    /// share of all of `key`'s co-accesses. Ties are ordered by key.
    #[must_use]
    pub fn predict_next(&self, key: &str, top_k: usize) -> Vec<(String, f64)> {
        let inner = self.inner.lock();
        let Some(partners) = inner.co_access.get(key) else {
            return Vec::new();
        };
        let total: u64 = partners.values().sum();
        if total == 0 {
            return Vec::new();
        }

        let mut ranked: Vec<(String, f64)> = partners
            .iter()
            .map(|(partner, &count)| (partner.clone(), count as f64 / total as f64))
            .collect();
        ranked.sort_by(|(ka, a), (kb, b)| b.total_cmp(a).then_with(|| ka.cmp(kb)));
        ranked.truncate(top_k);
        ranked
    }

    /// Raw co-access count of an unordered key pair.
    #[must_use]
    pub fn co_access_count(&self, a: &str, b: &str) -> u64 {
        self.inner
            .lock()
            .co_access
            .get(a)
            .and_then(|partners| partners.get(b))
            .copied()
            .unwrap_or(0)
    }

    #[must_use]
    pub fn stats(&self) -> PrefetchStats {
        let inner = self.inner.lock();
        PrefetchStats {
            history_len: inner.history.len(),
            tracked_keys: inner.co_access.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn predictor(window: usize, history_max: usize, history_trim: usize) -> PrefetchPredictor {
        PrefetchPredictor::new(&PrefetchConfig {
            window,
            history_max,
            history_trim,
            track_queries: true,
        })
    }

    #[test]
    fn counts_distinct_partners_in_window() {
        let p = predictor(3, 100, 50);
        for key in ["a", "b", "a", "c"] {
            p.record_access(key);
        }
        // "c" sees window [b, a, a] -> partners a, b once each.
        assert_eq!(p.co_access_count("c", "a"), 1);
        assert_eq!(p.co_access_count("c", "b"), 1);
        // "b" paired with the first "a", the second "a" paired with "b".
        assert_eq!(p.co_access_count("a", "b"), 2);
        assert_eq!(p.co_access_count("b", "a"), 2);
    }

    #[test]
    fn self_access_is_not_a_pair() {
        let p = predictor(5, 100, 50);
        p.record_access("a");
        p.record_access("a");
        assert_eq!(p.co_access_count("a", "a"), 0);
        assert!(p.predict_next("a", 3).is_empty());
    }

    #[test]
    fn window_limits_pairing_distance() {
        let p = predictor(1, 100, 50);
        for key in ["a", "b", "c"] {
            p.record_access(key);
        }
        assert_eq!(p.co_access_count("c", "b"), 1);
        assert_eq!(p.co_access_count("c", "a"), 0);
    }

    #[test]
    fn predictions_are_normalised_and_ranked() {
        let p = predictor(1, 100, 50);
        for key in ["x", "a", "x", "a", "x", "b"] {
            p.record_access(key);
        }
        // x-a: 4 pairings, x-b: 1.
        let predictions = p.predict_next("x", 5);
        assert_eq!(predictions.len(), 2);
        assert_eq!(predictions[0].0, "a");
        assert!((predictions[0].1 - 0.8).abs() < 1e-9);
        assert!((predictions[1].1 - 0.2).abs() < 1e-9);
        assert_eq!(p.predict_next("x", 1).len(), 1);
    }

    #[test]
    fn history_is_trimmed_past_max() {
        let p = predictor(2, 10, 4);
        for i in 0..11 {
            p.record_access(&format!("k{i}"));
        }
        assert_eq!(p.stats().history_len, 4);
        p.record_access("k11");
        assert_eq!(p.stats().history_len, 5);
    }

    #[test]
    fn unknown_key_predicts_nothing() {
        let p = predictor(2, 10, 4);
        assert!(p.predict_next("ghost", 3).is_empty());
    }

    #[test]
    fn trimming_forgets_pairs_of_trimmed_keys() {
        let p = predictor(10, 100, 50);
        for i in 0..20_000 {
            p.record_access(&format!("k{i}"));
        }
        let stats = p.stats();
        assert!(stats.history_len <= 100);
        assert!(stats.tracked_keys <= 100, "tracked {}", stats.tracked_keys);
        assert_eq!(p.co_access_count("k0", "k1"), 0);
        assert!(p.predict_next("k0", 3).is_empty());
        assert!(p.co_access_count("k19999", "k19998") > 0);
    }

    #[test]
    fn retained_pairs_keep_their_counts() {
        let p = predictor(1, 6, 3);
        for key in ["a", "b", "a", "b", "x", "y"] {
            p.record_access(key);
        }
        assert_eq!(p.co_access_count("a", "b"), 3);
        // Trims to [x, y, z]: a and b are forgotten, x-y survives.
        p.record_access("z");
        assert_eq!(p.stats().history_len, 3);
        assert_eq!(p.co_access_count("a", "b"), 0);
        assert_eq!(p.co_access_count("x", "y"), 1);
        assert_eq!(p.stats().tracked_keys, 3);
    }
}
