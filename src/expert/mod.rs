//! Specialised cache owners queried through the router.
//!
//! Each expert owns one [`BoundedCache`](crate::cache::BoundedCache) plus
//! secondary key logs for filtered retrieval:
//!
//! - [`TradeHistoryExpert`] - trades by symbol
//! - [`MarketRegimeExpert`] - current regime label per symbol, plus history
//! - [`AgentDecisionExpert`] - decisions by agent
//!
//! Key logs are append-only and are not pruned when the cache evicts, so
//! lookups skip keys that are no longer cached.

mod agent_decision;
mod key_log;
mod market_regime;
mod trade_history;

pub use agent_decision::AgentDecisionExpert;
pub use market_regime::MarketRegimeExpert;
pub use trade_history::TradeHistoryExpert;

use std::collections::HashMap;

use crate::domain::{CacheStats, Query, QueryResult};

/// Confidence an expert reports for queries of its declared type.
pub const DECLARED_CONFIDENCE: f64 = 0.95;

/// A component that can answer some category of [`Query`].
pub trait Expert: Send + Sync {
    /// Unique identifier, used in router statistics and logs.
    fn name(&self) -> &'static str;

    /// Confidence in [0, 1] that this expert can answer `query`.
    ///
    /// Must be cheap and must not mutate the cache.
    fn score(&self, query: &Query) -> f64;

    /// Answer `query`. An empty result is not an error.
    fn query(&self, query: &Query) -> Vec<QueryResult>;

    /// Counters of the expert's cache.
    fn stats(&self) -> CacheStats;

    /// Push prefetch hints into the expert's cache, returning how many
    /// entries were updated.
    fn update_prefetch_hints(&self, hints: &HashMap<String, f64>) -> usize;
}
