//! Agent decision and market regime records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A decision emitted by a signal or consensus agent.
///
/// The payload is kept as the producer sent it; this crate does not
/// validate its contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDecision {
    pub agent_id: String,
    /// Unix milliseconds.
    pub timestamp_ms: i64,
    pub payload: Map<String, Value>,
}

impl AgentDecision {
    #[must_use]
    pub fn new(agent_id: impl Into<String>, timestamp_ms: i64, payload: Map<String, Value>) -> Self {
        Self {
            agent_id: agent_id.into(),
            timestamp_ms,
            payload,
        }
    }

    /// Key under which the agent-decision expert stores this decision.
    #[must_use]
    pub fn cache_key(&self) -> String {
        format!("{}:{}", self.agent_id, self.timestamp_ms)
    }
}

/// A market regime label observed at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimeSnapshot {
    pub symbol: String,
    pub label: String,
    /// Unix seconds.
    pub timestamp: i64,
}

impl RegimeSnapshot {
    #[must_use]
    pub fn cache_key(&self) -> String {
        format!("{}:{}", self.symbol, self.timestamp)
    }
}
