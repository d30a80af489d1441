//! Market regime labels by symbol.

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use dashmap::DashMap;
use tracing::debug;

use super::key_log::KeyLog;
use super::{Expert, DECLARED_CONFIDENCE};
use crate::cache::BoundedCache;
use crate::config::ExpertConfig;
use crate::domain::{CacheStats, Query, QueryResult, RegimeSnapshot};

const KEYWORD_CONFIDENCE: f64 = 0.7;
const KEYWORDS: &[&str] = &[
    "regime",
    "trend",
    "volatil",
    "bull",
    "bear",
    "sideways",
    "pattern",
];

/// Label reported for symbols with no regime on record.
pub const UNKNOWN_REGIME: &str = "unknown";

/// Regime state: a non-evicting current label per symbol, backed by an
/// evictable history log keyed `"{symbol}:{timestamp}"`.
#[derive(Debug)]
pub struct MarketRegimeExpert {
    cache: BoundedCache<RegimeSnapshot>,
    current: DashMap<String, String>,
    by_symbol: KeyLog,
    default_limit: usize,
}

impl MarketRegimeExpert {
    pub const NAME: &'static str = "market_regime";

    #[must_use]
    pub fn new(config: &ExpertConfig) -> Self {
        Self {
            cache: BoundedCache::new(Self::NAME, config.max_size, config.policy),
            current: DashMap::new(),
            by_symbol: KeyLog::default(),
            default_limit: config.default_limit,
        }
    }

    /// Record the current regime for `symbol`, stamped now.
    pub fn update(&self, symbol: &str, label: &str) -> RegimeSnapshot {
        self.update_at(symbol, label, Utc::now().timestamp())
    }

    /// Record a regime observed at `timestamp` (unix seconds).
    pub fn update_at(&self, symbol: &str, label: &str, timestamp: i64) -> RegimeSnapshot {
        let snapshot = RegimeSnapshot {
            symbol: symbol.to_string(),
            label: label.to_string(),
            timestamp,
        };
        let key = snapshot.cache_key();
        let previous = self.current.insert(symbol.to_string(), label.to_string());
        self.cache.put(key.clone(), snapshot.clone(), 0.0);
        self.by_symbol.append(symbol, key);

        if previous.as_deref() != Some(label) {
            debug!(%symbol, %label, previous = ?previous, "regime changed");
        }
        snapshot
    }

    /// Current label for `symbol`. O(1), never evicted.
    #[must_use]
    pub fn current(&self, symbol: &str) -> Option<String> {
        self.current.get(symbol).map(|label| label.value().clone())
    }

    /// Every symbol's current label.
    #[must_use]
    pub fn all_current(&self) -> BTreeMap<String, String> {
        self.current
            .iter()
            .map(|item| (item.key().clone(), item.value().clone()))
            .collect()
    }

    /// Logged snapshots for `symbol` still in the cache, newest first.
    ///
    /// Every cached snapshot of the symbol is read and counted as a hit;
    /// evicted ones count as misses.
    #[must_use]
    pub fn history(&self, symbol: &str, limit: usize) -> Vec<RegimeSnapshot> {
        let keys = self.by_symbol.keys_newest_first(symbol);
        let mut entries = self.cache.get_many(keys.iter().map(String::as_str), usize::MAX);
        entries.sort_by_key(|(_, entry)| std::cmp::Reverse(entry.value.timestamp));
        entries
            .into_iter()
            .take(limit)
            .map(|(_, entry)| entry.value)
            .collect()
    }

    #[must_use]
    pub fn default_limit(&self) -> usize {
        self.default_limit
    }

    #[must_use]
    pub fn cache(&self) -> &BoundedCache<RegimeSnapshot> {
        &self.cache
    }
}

impl Expert for MarketRegimeExpert {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn score(&self, query: &Query) -> f64 {
        match query {
            Query::Regime { .. } => DECLARED_CONFIDENCE,
            q if q.mentions_any(KEYWORDS) => KEYWORD_CONFIDENCE,
            _ => 0.0,
        }
    }

    fn query(&self, query: &Query) -> Vec<QueryResult> {
        match query.symbol() {
            Some(symbol) => vec![QueryResult::Regime {
                symbol: symbol.to_string(),
                label: self
                    .current(symbol)
                    .unwrap_or_else(|| UNKNOWN_REGIME.to_string()),
            }],
            None => self
                .all_current()
                .into_iter()
                .map(|(symbol, label)| QueryResult::Regime { symbol, label })
                .collect(),
        }
    }

    fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn update_prefetch_hints(&self, hints: &HashMap<String, f64>) -> usize {
        self.cache.update_prefetch_hints(hints)
    }
}
