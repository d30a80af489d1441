//! Recent trades by symbol.

use std::collections::HashMap;

use tracing::trace;

use super::key_log::KeyLog;
use super::{Expert, DECLARED_CONFIDENCE};
use crate::cache::BoundedCache;
use crate::config::ExpertConfig;
use crate::domain::{CacheStats, Query, QueryResult, TradeRecord};

/// Confidence for free-form queries mentioning trades.
const KEYWORD_CONFIDENCE: f64 = 0.6;
const KEYWORDS: &[&str] = &["trade"];

/// Trade history keyed by `"{symbol}:{timestamp}"`.
#[derive(Debug)]
pub struct TradeHistoryExpert {
    cache: BoundedCache<TradeRecord>,
    by_symbol: KeyLog,
    default_limit: usize,
}

impl TradeHistoryExpert {
    pub const NAME: &'static str = "trade_history";

    #[must_use]
    pub fn new(config: &ExpertConfig) -> Self {
        Self {
            cache: BoundedCache::new(Self::NAME, config.max_size, config.policy),
            by_symbol: KeyLog::default(),
            default_limit: config.default_limit,
        }
    }

    /// Store a trade, returning its cache key.
    pub fn store(&self, record: TradeRecord) -> String {
        let key = record.cache_key();
        let symbol = record.symbol.clone();
        self.cache.put(key.clone(), record, 0.0);
        self.by_symbol.append(&symbol, key.clone());
        trace!(%key, "stored trade");
        key
    }

    /// Look up one trade by key, counting a cache hit or miss.
    pub fn get(&self, key: &str) -> Option<TradeRecord> {
        self.cache.get(key)
    }

    /// Up to `limit` trades, most recently touched first.
    ///
    /// With a symbol only that symbol's trades are considered; without one
    /// the whole cache is. Returned trades count as cache hits and are
    /// touched; logged keys already evicted count as misses.
    #[must_use]
    pub fn recent(&self, symbol: Option<&str>, limit: usize) -> Vec<(String, TradeRecord)> {
        let entries = match symbol {
            Some(symbol) => {
                let keys = self.by_symbol.keys_newest_first(symbol);
                self.cache.get_many(keys.iter().map(String::as_str), limit)
            }
            None => self.cache.get_recent(limit),
        };
        entries
            .into_iter()
            .map(|(key, entry)| (key, entry.value))
            .collect()
    }

    #[must_use]
    pub fn cache(&self) -> &BoundedCache<TradeRecord> {
        &self.cache
    }

    /// Keys ever logged, including evicted ones.
    #[must_use]
    pub fn index_len(&self) -> usize {
        self.by_symbol.len()
    }
}

impl Expert for TradeHistoryExpert {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn score(&self, query: &Query) -> f64 {
        match query {
            Query::Trade { .. } => DECLARED_CONFIDENCE,
            q if q.mentions_any(KEYWORDS) => KEYWORD_CONFIDENCE,
            _ => 0.0,
        }
    }

    fn query(&self, query: &Query) -> Vec<QueryResult> {
        let limit = query.limit().unwrap_or(self.default_limit);
        self.recent(query.symbol(), limit)
            .into_iter()
            .map(|(key, record)| QueryResult::Trade { key, record })
            .collect()
    }

    fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn update_prefetch_hints(&self, hints: &HashMap<String, f64>) -> usize {
        self.cache.update_prefetch_hints(hints)
    }
}
