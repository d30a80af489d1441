//! The shared memory facade.
//!
//! [`SharedMemory`] wires the three experts into a router, feeds query
//! results into the prefetch predictor and exposes ingestion, querying, wire
//! transfer and statistics behind one handle. Share it across threads with
//! an `Arc`.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::codec::{read_frames, PacketBuffer};
use crate::config::Config;
use crate::domain::{
    AgentDecision, MemoryStats, Query, QueryResult, RegimeSnapshot, SymbolTable, TradeRecord,
};
use crate::error::CodecError;
use crate::expert::{AgentDecisionExpert, Expert, MarketRegimeExpert, TradeHistoryExpert};
use crate::ingest::coerce_trade;
use crate::prefetch::PrefetchPredictor;
use crate::router::MoeRouter;

/// Process-wide trade memory.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use trademem::config::Config;
/// use trademem::memory::SharedMemory;
///
/// let memory = SharedMemory::new(&Config::default());
/// memory.ingest_trade(
///     json!({"symbol": "SOL", "side": "buy", "price": 150.0, "quantity": 2, "timestamp": 1700000000})
///         .as_object()
///         .unwrap(),
/// );
///
/// let results = memory.query(&json!({"type": "trade", "symbol": "SOL"}));
/// assert_eq!(results.len(), 1);
/// ```
pub struct SharedMemory {
    trades: Arc<TradeHistoryExpert>,
    regimes: Arc<MarketRegimeExpert>,
    decisions: Arc<AgentDecisionExpert>,
    router: MoeRouter,
    prefetch: PrefetchPredictor,
    symbols: SymbolTable,
    track_queries: bool,
    max_packets: usize,
}

impl SharedMemory {
    /// Build a memory whose wire symbols are the builtin table plus
    /// `symbols.extra`. An overflowing list, which validation rejects, falls
    /// back to the builtin table.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let symbols = config.symbols.table().unwrap_or_else(|error| {
            warn!(%error, "extra symbols ignored");
            SymbolTable::builtin().clone()
        });
        Self::with_symbols(config, symbols)
    }

    /// Build a memory whose wire helpers use `symbols`.
    #[must_use]
    pub fn with_symbols(config: &Config, symbols: SymbolTable) -> Self {
        let trades = Arc::new(TradeHistoryExpert::new(&config.experts.trade_history));
        let regimes = Arc::new(MarketRegimeExpert::new(&config.experts.market_regime));
        let decisions = Arc::new(AgentDecisionExpert::new(&config.experts.agent_decision));

        let mut router = MoeRouter::new(config.router);
        router.register(trades.clone());
        router.register(regimes.clone());
        router.register(decisions.clone());

        info!(
            experts = router.len(),
            top_k = config.router.top_k,
            min_confidence = config.router.min_confidence,
            symbols = symbols.len(),
            "shared memory initialized"
        );

        Self {
            trades,
            regimes,
            decisions,
            router,
            prefetch: PrefetchPredictor::new(&config.prefetch),
            symbols,
            track_queries: config.prefetch.track_queries,
            max_packets: config.wire.max_packets,
        }
    }

    /// Coerce a producer payload and store it. Never fails.
    pub fn ingest_trade(&self, fields: &Map<String, Value>) -> TradeRecord {
        let record = coerce_trade(fields);
        self.trades.store(record.clone());
        record
    }

    /// Store an already typed trade, returning its cache key.
    pub fn store_trade(&self, record: TradeRecord) -> String {
        self.trades.store(record)
    }

    pub fn update_regime(&self, symbol: &str, label: &str) -> RegimeSnapshot {
        self.regimes.update(symbol, label)
    }

    pub fn record_decision(&self, agent_id: &str, payload: Map<String, Value>) -> AgentDecision {
        self.decisions.record(agent_id, payload)
    }

    /// Answer a loosely typed request; see [`Query::from_request`].
    pub fn query(&self, request: &Value) -> Vec<QueryResult> {
        self.query_typed(&Query::from_request(request))
    }

    /// Answer `query` with the configured `top_k`.
    pub fn query_typed(&self, query: &Query) -> Vec<QueryResult> {
        self.query_top_k(query, self.router.default_top_k())
    }

    /// Answer `query` from at most `top_k` experts.
    pub fn query_top_k(&self, query: &Query, top_k: usize) -> Vec<QueryResult> {
        let results = self.router.query_top_k(query, top_k);
        if self.track_queries {
            for key in results.iter().filter_map(QueryResult::key) {
                self.prefetch.record_access(key);
            }
        }
        results
    }

    /// Feed one access into the prefetch predictor.
    pub fn record_access(&self, key: &str) {
        self.prefetch.record_access(key);
    }

    /// Predict the partners of `key` and push them into every expert's cache
    /// as prefetch hints. Returns the number of entries updated.
    pub fn apply_prefetch_hints(&self, key: &str, top_k: usize) -> usize {
        let hints: HashMap<String, f64> = self.prefetch.predict_next(key, top_k).into_iter().collect();
        if hints.is_empty() {
            return 0;
        }
        let updated = self
            .router
            .experts()
            .iter()
            .map(|expert| expert.update_prefetch_hints(&hints))
            .sum();
        debug!(%key, predicted = hints.len(), updated, "applied prefetch hints");
        updated
    }

    /// Encode `records` into back-to-back frames of at most
    /// `wire.max_packets` records each.
    ///
    /// # Errors
    ///
    /// Propagates [`CodecError::BufferFull`], which cannot occur while the
    /// buffer is drained at capacity.
    pub fn encode_batch(&self, records: &[TradeRecord]) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::new();
        let mut buffer = PacketBuffer::new(self.max_packets);
        for record in records {
            if buffer.is_full() {
                out.extend(buffer.to_wire_with(&self.symbols));
                buffer.drain();
            }
            buffer.push(record.clone())?;
        }
        if !buffer.is_empty() {
            out.extend(buffer.to_wire_with(&self.symbols));
        }
        Ok(out)
    }

    /// Decode back-to-back frames with this memory's symbol table.
    ///
    /// # Errors
    ///
    /// Fails on the first malformed frame.
    pub fn decode_wire(&self, bytes: &[u8]) -> Result<Vec<TradeRecord>, CodecError> {
        read_frames(bytes, &self.symbols)
    }

    #[must_use]
    pub fn trades(&self) -> &TradeHistoryExpert {
        &self.trades
    }

    #[must_use]
    pub fn regimes(&self) -> &MarketRegimeExpert {
        &self.regimes
    }

    #[must_use]
    pub fn decisions(&self) -> &AgentDecisionExpert {
        &self.decisions
    }

    #[must_use]
    pub fn router(&self) -> &MoeRouter {
        &self.router
    }

    #[must_use]
    pub fn prefetch(&self) -> &PrefetchPredictor {
        &self.prefetch
    }

    #[must_use]
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    #[must_use]
    pub fn stats(&self) -> MemoryStats {
        let per_expert: BTreeMap<_, _> = self
            .router
            .experts()
            .iter()
            .map(|expert| (expert.name().to_string(), expert.stats()))
            .collect();
        MemoryStats::new(per_expert, self.router.stats(), self.prefetch.stats())
    }
}

impl Default for SharedMemory {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl std::fmt::Debug for SharedMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedMemory")
            .field("router", &self.router)
            .field("track_queries", &self.track_queries)
            .field("max_packets", &self.max_packets)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Side, Venue};
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn small_config() -> Config {
        let mut config = Config::default();
        config.wire.max_packets = 2;
        config
    }

    #[test]
    fn ingest_then_query_by_symbol() {
        let memory = SharedMemory::default();
        memory.ingest_trade(&fields(json!({"symbol": "SOL", "timestamp": 10, "price": "151.5"})));
        memory.ingest_trade(&fields(json!({"symbol": "ETH", "timestamp": 11})));

        let results = memory.query(&json!({"type": "trade", "symbol": "SOL"}));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].key(), Some("SOL:10"));
    }

    #[test]
    fn query_results_feed_the_predictor() {
        let memory = SharedMemory::default();
        for ts in 0..3 {
            memory.ingest_trade(&fields(json!({"symbol": "BTC", "timestamp": ts})));
        }
        memory.query(&json!({"type": "trade", "symbol": "BTC"}));
        assert_eq!(memory.stats().prefetch.history_len, 3);
        assert!(memory.prefetch().co_access_count("BTC:0", "BTC:1") > 0);
    }

    #[test]
    fn tracking_can_be_disabled() {
        let mut config = Config::default();
        config.prefetch.track_queries = false;
        let memory = SharedMemory::new(&config);
        memory.ingest_trade(&fields(json!({"symbol": "BTC", "timestamp": 1})));
        memory.query(&json!({"type": "trade"}));
        assert_eq!(memory.stats().prefetch.history_len, 0);
    }

    #[test]
    fn prefetch_hints_reach_expert_caches() {
        let memory = SharedMemory::default();
        memory.ingest_trade(&fields(json!({"symbol": "BTC", "timestamp": 1})));
        memory.ingest_trade(&fields(json!({"symbol": "BTC", "timestamp": 2})));
        memory.record_access("BTC:1");
        memory.record_access("BTC:2");

        assert_eq!(memory.apply_prefetch_hints("BTC:1", 3), 1);
        let entry = memory.trades().cache().peek("BTC:2").unwrap();
        assert_eq!(entry.prefetch_hint(), 1.0);
        assert_eq!(memory.apply_prefetch_hints("never-seen", 3), 0);
    }

    #[test]
    fn encode_batch_splits_into_frames() {
        let memory = SharedMemory::new(&small_config());
        let records: Vec<_> = (0..5)
            .map(|ts| TradeRecord::new(ts, "ETH", Side::Sell, Venue::Kraken, 3000.0, 0.1, "x"))
            .collect();

        let wire = memory.encode_batch(&records).unwrap();
        // Frames of 2, 2 and 1 records.
        assert_eq!(wire.len(), 3 * 9 + 5 * 32);
        assert_eq!(memory.decode_wire(&wire).unwrap(), records);
        assert!(memory.encode_batch(&[]).unwrap().is_empty());
    }

    #[test]
    fn stats_cover_every_expert() {
        let memory = SharedMemory::default();
        memory.update_regime("BTC", "bull");
        memory.query(&json!({"type": "regime", "symbol": "BTC"}));

        let stats = memory.stats();
        assert_eq!(stats.per_expert.len(), 3);
        assert_eq!(stats.per_expert["market_regime"].size, 1);
        assert_eq!(stats.router.total_queries, 1);
        assert_eq!(stats.router.dispatch_counts["market_regime"], 1);
        assert_eq!(stats.record_size_bytes, 32);
    }

    #[test]
    fn configured_symbols_survive_the_wire() {
        let mut config = Config::default();
        config.symbols.extra = vec!["WIF".to_string()];
        let memory = SharedMemory::new(&config);
        let record = TradeRecord::new(5, "WIF", Side::Buy, Venue::Binance, 2.5, 100.0, "w");

        let wire = memory.encode_batch(std::slice::from_ref(&record)).unwrap();
        assert_eq!(memory.decode_wire(&wire).unwrap()[0].symbol, "WIF");

        let plain = SharedMemory::default();
        assert_ne!(plain.decode_wire(&wire).unwrap()[0].symbol, "WIF");
    }
}
