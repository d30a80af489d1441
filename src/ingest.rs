//! Best-effort coercion of producer payloads.
//!
//! Venue services hand over loosely typed JSON maps. Ingestion never rejects
//! an event: every field falls back to a documented default instead.
//!
//! | field       | accepted                                        | fallback        |
//! |-------------|-------------------------------------------------|-----------------|
//! | `timestamp` | RFC 3339 / ISO-8601 string, epoch seconds       | now             |
//! | `side`      | BUY/SELL/LONG/SHORT, any case                   | BUY             |
//! | `venue`     | any [`Venue`] name, any case                    | first venue     |
//! | `symbol`    | string                                          | `"UNKNOWN"`     |
//! | `price`     | number or numeric string                        | 0.0             |
//! | `quantity`  | number or numeric string                        | 0.0             |
//! | `id`        | string or number                                | random UUID     |

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use tracing::trace;
use uuid::Uuid;

use crate::domain::{Side, TradeRecord, Venue};

/// Symbol used when a payload carries none.
pub const MISSING_SYMBOL: &str = "UNKNOWN";

/// Coerce a producer payload into a [`TradeRecord`].
pub fn coerce_trade(fields: &Map<String, Value>) -> TradeRecord {
    let timestamp = fields
        .get("timestamp")
        .and_then(parse_timestamp)
        .unwrap_or_else(|| Utc::now().timestamp());

    let side = fields
        .get("side")
        .and_then(Value::as_str)
        .and_then(Side::parse)
        .unwrap_or_default();

    let venue = fields
        .get("venue")
        .and_then(Value::as_str)
        .and_then(Venue::parse)
        .unwrap_or_default();

    let symbol = match fields.get("symbol") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => MISSING_SYMBOL.to_string(),
    };

    let price = fields.get("price").and_then(number_value).unwrap_or(0.0);
    let quantity = fields.get("quantity").and_then(number_value).unwrap_or(0.0);

    let id = match fields.get("id") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => {
            let generated = Uuid::new_v4().to_string();
            trace!(%generated, "trade payload without id");
            generated
        }
    };

    TradeRecord::new(timestamp, symbol, side, venue, price, quantity, &id)
}

/// Parse a timestamp value into unix seconds.
///
/// Strings may be RFC 3339, ISO-8601 without offset (read as UTC), or a
/// plain number. Fractional seconds are truncated.
pub fn parse_timestamp(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        Value::String(s) => parse_timestamp_str(s.trim()),
        _ => None,
    }
}

fn parse_timestamp_str(s: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc().timestamp());
        }
    }
    if let Ok(secs) = s.parse::<i64>() {
        return Some(secs);
    }
    s.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(|f| f as i64)
}

fn number_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
