//! Typed queries and their results.
//!
//! Consumers either build a [`Query`] directly or hand over the loosely typed
//! request map produced by the venue services; [`Query::from_request`] maps
//! the declared `type` onto a variant so experts never inspect raw strings.

use serde::Serialize;
use serde_json::Value;

use super::{AgentDecision, TradeRecord};

/// A query against the shared memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Recent trades, optionally for one symbol.
    Trade {
        symbol: Option<String>,
        limit: Option<usize>,
    },
    /// Current market regime for a symbol, or all of them.
    Regime { symbol: Option<String> },
    /// Recent agent decisions, optionally for one agent.
    Agent {
        agent_id: Option<String>,
        limit: Option<usize>,
    },
    /// A request whose declared type is not recognised.
    ///
    /// `text` is the lower-cased request; experts fall back to keyword
    /// matching against it.
    Freeform {
        text: String,
        symbol: Option<String>,
        agent_id: Option<String>,
        limit: Option<usize>,
    },
}

impl Query {
    #[must_use]
    pub fn trades(symbol: impl Into<String>, limit: usize) -> Self {
        Self::Trade {
            symbol: Some(symbol.into()),
            limit: Some(limit),
        }
    }

    #[must_use]
    pub fn regime(symbol: impl Into<String>) -> Self {
        Self::Regime {
            symbol: Some(symbol.into()),
        }
    }

    #[must_use]
    pub fn decisions(agent_id: impl Into<String>, limit: usize) -> Self {
        Self::Agent {
            agent_id: Some(agent_id.into()),
            limit: Some(limit),
        }
    }

    /// Map a request map such as `{"type": "trade", "symbol": "SOL", "limit": 10}`.
    ///
    /// Never fails: unknown or missing types become [`Query::Freeform`].
    #[must_use]
    pub fn from_request(request: &Value) -> Self {
        let symbol = string_field(request, "symbol");
        let agent_id = string_field(request, "agent_id");
        let limit = request.get("limit").and_then(limit_value);
        let kind = request
            .get("type")
            .and_then(Value::as_str)
            .map(|s| s.trim().to_ascii_lowercase())
            .unwrap_or_default();

        match kind.as_str() {
            "trade" | "trade_history" | "recent_trades" => Self::Trade { symbol, limit },
            "regime" | "market_regime" | "pattern" => Self::Regime { symbol },
            "agent" | "decision" | "reasoning" | "consensus" => Self::Agent { agent_id, limit },
            _ => Self::Freeform {
                text: request.to_string().to_lowercase(),
                symbol,
                agent_id,
                limit,
            },
        }
    }

    #[must_use]
    pub fn symbol(&self) -> Option<&str> {
        match self {
            Self::Trade { symbol, .. }
            | Self::Regime { symbol }
            | Self::Freeform { symbol, .. } => symbol.as_deref(),
            Self::Agent { .. } => None,
        }
    }

    #[must_use]
    pub fn agent_id(&self) -> Option<&str> {
        match self {
            Self::Agent { agent_id, .. } | Self::Freeform { agent_id, .. } => agent_id.as_deref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn limit(&self) -> Option<usize> {
        match self {
            Self::Trade { limit, .. } | Self::Agent { limit, .. } | Self::Freeform { limit, .. } => {
                *limit
            }
            Self::Regime { .. } => None,
        }
    }

    /// True when this is a free-form query mentioning any of `keywords`.
    #[must_use]
    pub fn mentions_any(&self, keywords: &[&str]) -> bool {
        match self {
            Self::Freeform { text, .. } => keywords.iter().any(|k| text.contains(k)),
            _ => false,
        }
    }
}

fn string_field(request: &Value, field: &str) -> Option<String> {
    match request.get(field)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn limit_value(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// One item returned by an expert.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryResult {
    Trade { key: String, record: TradeRecord },
    Regime { symbol: String, label: String },
    Decision { key: String, decision: AgentDecision },
}

impl QueryResult {
    /// Cache key the item was read from, used for access tracking.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Trade { key, .. } | Self::Decision { key, .. } => Some(key),
            Self::Regime { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn declared_trade_types_map_to_trade() {
        for kind in ["trade", "trade_history", "RECENT_TRADES"] {
            let query = Query::from_request(&json!({"type": kind, "symbol": "SOL", "limit": 5}));
            assert_eq!(query, Query::trades("SOL", 5));
        }
    }

    #[test]
    fn declared_regime_and_agent_types() {
        assert_eq!(
            Query::from_request(&json!({"type": "pattern", "symbol": "ETH"})),
            Query::regime("ETH")
        );
        assert_eq!(
            Query::from_request(&json!({"type": "consensus", "agent_id": "risk-1", "limit": "3"})),
            Query::decisions("risk-1", 3)
        );
    }

    #[test]
    fn unknown_type_becomes_freeform() {
        let query = Query::from_request(&json!({"type": "lookup", "note": "Show Trade flow"}));
        assert!(matches!(query, Query::Freeform { .. }));
        assert!(query.mentions_any(&["trade"]));
        assert!(!query.mentions_any(&["agent"]));
    }

    #[test]
    fn missing_fields_are_none() {
        let query = Query::from_request(&json!({"type": "trade", "limit": -1}));
        assert_eq!(
            query,
            Query::Trade {
                symbol: None,
                limit: None
            }
        );
    }

    #[test]
    fn typed_queries_never_match_keywords() {
        assert!(!Query::trades("SOL", 1).mentions_any(&["trade"]));
    }
}
