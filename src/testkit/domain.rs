//! Builders for domain primitives used across tests.
//!
//! Concise factories so tests focus on assertions rather than construction
//! boilerplate.

use serde_json::{json, Map, Value};

use crate::domain::{Side, TradeRecord, Venue};

/// A buy on Hyperliquid at `timestamp` with id `"{symbol}-{timestamp}"`.
pub fn trade(symbol: &str, timestamp: i64) -> TradeRecord {
    TradeRecord::new(
        timestamp,
        symbol,
        Side::Buy,
        Venue::Hyperliquid,
        100.0 + timestamp as f64,
        1.0,
        &format!("{symbol}-{timestamp}"),
    )
}

/// `n` consecutive trades of `symbol` starting at `start`.
pub fn trades(symbol: &str, start: i64, n: usize) -> Vec<TradeRecord> {
    (0..n as i64).map(|i| trade(symbol, start + i)).collect()
}

/// A producer payload as venue services emit it.
pub fn trade_fields(symbol: &str, timestamp: i64) -> Map<String, Value> {
    object(json!({
        "symbol": symbol,
        "timestamp": timestamp,
        "side": "buy",
        "venue": "hyperliquid",
        "price": 100.0,
        "quantity": 1.0,
        "id": format!("{symbol}-{timestamp}"),
    }))
}

/// A decision payload carrying `action`.
pub fn decision_payload(action: &str) -> Map<String, Value> {
    object(json!({ "action": action, "confidence": 0.8 }))
}

/// Unwrap a JSON object literal.
///
/// # Panics
///
/// Panics if `value` is not an object.
pub fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}
