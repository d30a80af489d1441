mod support;

use std::collections::HashMap;

use trademem::cache::{BoundedCache, EvictionPolicyKind};
use support::assertions::assert_f64_near;

#[test]
fn capacity_is_never_exceeded() {
    for kind in [
        EvictionPolicyKind::Lru,
        EvictionPolicyKind::Lfu,
        EvictionPolicyKind::Weighted,
    ] {
        let cache = BoundedCache::new("bounded", 25, kind);
        for i in 0..80 {
            cache.put(format!("k{i}"), i, 0.0);
            assert!(cache.len() <= 25);
        }
        let stats = cache.stats();
        assert_eq!(stats.size, 25, "{kind:?}");
        assert_eq!(stats.evictions, 55, "{kind:?}");
    }
}

#[test]
fn hit_rate_after_one_hit_and_one_miss() {
    let cache = BoundedCache::new("stats", 8, EvictionPolicyKind::Lru);
    cache.put("present", "v".to_string(), 0.0);
    assert_eq!(cache.get("present").as_deref(), Some("v"));
    assert!(cache.get("absent").is_none());

    let stats = cache.stats();
    assert_eq!((stats.hits, stats.misses), (1, 1));
    assert_f64_near(stats.hit_rate, 0.5, 1e-12);
}

#[test]
fn lru_keeps_recently_read_entries() {
    let cache = BoundedCache::new("lru", 3, EvictionPolicyKind::Lru);
    for key in ["a", "b", "c"] {
        cache.put(key, 0, 0.0);
    }
    cache.get("a");
    let evicted = cache.put("d", 0, 0.0);
    assert_eq!(evicted, vec!["b".to_string()]);
    assert!(cache.contains("a"));
}

#[test]
fn lfu_keeps_frequently_read_entries() {
    let cache = BoundedCache::new("lfu", 2, EvictionPolicyKind::Lfu);
    cache.put("hot", 0, 0.0);
    cache.put("cold", 0, 0.0);
    for _ in 0..3 {
        cache.get("hot");
    }
    cache.get("cold");
    assert_eq!(cache.put("new", 0, 0.0), vec!["cold".to_string()]);
}

#[test]
fn weighted_evicts_lower_prefetch_hint() {
    let cache = BoundedCache::new("weighted", 2, EvictionPolicyKind::Weighted);
    cache.put("likely", 1, 0.9);
    cache.put("unlikely", 2, 0.1);

    assert_eq!(cache.put("third", 3, 0.5), vec!["unlikely".to_string()]);
    assert!(cache.contains("likely"));
}

#[test]
fn prefetch_hints_change_the_weighted_victim() {
    let cache = BoundedCache::new("weighted", 2, EvictionPolicyKind::Weighted);
    cache.put("a", 1, 0.9);
    cache.put("b", 2, 0.1);

    let hints = HashMap::from([
        ("a".to_string(), 0.0),
        ("b".to_string(), 1.0),
        ("ghost".to_string(), 1.0),
    ]);
    assert_eq!(cache.update_prefetch_hints(&hints), 2);
    assert_eq!(cache.put("c", 3, 0.5), vec!["a".to_string()]);
}

#[test]
fn overwrite_and_delete_keep_size_consistent() {
    let cache = BoundedCache::new("ops", 2, EvictionPolicyKind::Lru);
    cache.put("a", 1, 0.0);
    assert!(cache.put("a", 2, 0.0).is_empty());
    assert_eq!(cache.len(), 1);
    assert!(cache.delete("a"));
    assert!(!cache.delete("a"));
    assert!(cache.is_empty());
    assert_eq!(cache.stats().evictions, 0);
}
