//! Agent decisions by agent id.

use std::collections::HashMap;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::trace;

use super::key_log::KeyLog;
use super::{Expert, DECLARED_CONFIDENCE};
use crate::cache::BoundedCache;
use crate::config::ExpertConfig;
use crate::domain::{AgentDecision, CacheStats, Query, QueryResult};

const KEYWORD_CONFIDENCE: f64 = 0.6;
const KEYWORDS: &[&str] = &["agent"];

/// Agent decisions keyed by `"{agent_id}:{timestamp_ms}"`.
#[derive(Debug)]
pub struct AgentDecisionExpert {
    cache: BoundedCache<AgentDecision>,
    by_agent: KeyLog,
    default_limit: usize,
}

impl AgentDecisionExpert {
    pub const NAME: &'static str = "agent_decision";

    #[must_use]
    pub fn new(config: &ExpertConfig) -> Self {
        Self {
            cache: BoundedCache::new(Self::NAME, config.max_size, config.policy),
            by_agent: KeyLog::default(),
            default_limit: config.default_limit,
        }
    }

    /// Record a decision stamped now.
    ///
    /// Two decisions from one agent within the same millisecond share a key;
    /// the later one replaces the earlier.
    pub fn record(&self, agent_id: &str, payload: Map<String, Value>) -> AgentDecision {
        self.record_at(agent_id, Utc::now().timestamp_millis(), payload)
    }

    /// Record a decision made at `timestamp_ms`.
    pub fn record_at(
        &self,
        agent_id: &str,
        timestamp_ms: i64,
        payload: Map<String, Value>,
    ) -> AgentDecision {
        let decision = AgentDecision::new(agent_id, timestamp_ms, payload);
        let key = decision.cache_key();
        self.cache.put(key.clone(), decision.clone(), 0.0);
        self.by_agent.append(agent_id, key.clone());
        trace!(%key, "recorded decision");
        decision
    }

    /// Up to `limit` decisions, most recently touched first, for one agent or
    /// across all agents. Reads are counted like [`BoundedCache::get`].
    #[must_use]
    pub fn recent(&self, agent_id: Option<&str>, limit: usize) -> Vec<(String, AgentDecision)> {
        let entries = match agent_id {
            Some(agent_id) => {
                let keys = self.by_agent.keys_newest_first(agent_id);
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
    pub fn cache(&self) -> &BoundedCache<AgentDecision> {
        &self.cache
    }
}

impl Expert for AgentDecisionExpert {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn score(&self, query: &Query) -> f64 {
        match query {
            Query::Agent { .. } => DECLARED_CONFIDENCE,
            q if q.mentions_any(KEYWORDS) => KEYWORD_CONFIDENCE,
            _ => 0.0,
        }
    }

    fn query(&self, query: &Query) -> Vec<QueryResult> {
        let limit = query.limit().unwrap_or(self.default_limit);
        self.recent(query.agent_id(), limit)
            .into_iter()
            .map(|(key, decision)| QueryResult::Decision { key, decision })
            .collect()
    }

    fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn update_prefetch_hints(&self, hints: &HashMap<String, f64>) -> usize {
        self.cache.update_prefetch_hints(hints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::EvictionPolicyKind;
    use serde_json::json;

    fn expert() -> AgentDecisionExpert {
        AgentDecisionExpert::new(&ExpertConfig {
            max_size: 16,
            policy: EvictionPolicyKind::Weighted,
            default_limit: 20,
        })
    }

    fn payload(action: &str) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("action".into(), json!(action));
        map
    }

    #[test]
    fn scores_declared_and_keyword_queries() {
        let expert = expert();
        assert_eq!(expert.score(&Query::decisions("a", 1)), 0.95);
        let freeform = Query::from_request(&json!({"who": "which agent voted"}));
        assert_eq!(expert.score(&freeform), 0.6);
        assert_eq!(expert.score(&Query::trades("SOL", 1)), 0.0);
    }

    #[test]
    fn filters_by_agent() {
        let expert = expert();
        expert.record_at("momentum", 1, payload("buy"));
        expert.record_at("mean_revert", 2, payload("sell"));
        expert.record_at("momentum", 3, payload("hold"));

        let results = expert.query(&Query::decisions("momentum", 10));
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].key(), Some("momentum:3"));
    }

    #[test]
    fn global_query_spans_agents_and_respects_limit() {
        let expert = expert();
        for ts in 0..30 {
            expert.record_at(&format!("agent-{}", ts % 3), ts, payload("buy"));
        }
        let results = expert.query(&Query::Agent {
            agent_id: None,
            limit: None,
        });
        assert_eq!(results.len(), 16);
        assert_eq!(results[0].key(), Some("agent-2:29"));
    }

    #[test]
    fn same_millisecond_replaces_decision() {
        let expert = expert();
        expert.record_at("a", 5, payload("buy"));
        expert.record_at("a", 5, payload("sell"));
        let decisions = expert.recent(Some("a"), 10);
        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].1.payload["action"], "sell");
    }
}
