//! Mixture-of-experts query routing.
//!
//! The router scores every registered [`Expert`] against a query, keeps the
//! `top_k` best that clear a confidence threshold and concatenates their
//! answers. Scoring only reads expert metadata; each dispatch takes just the
//! chosen expert's own cache lock.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::config::RouterConfig;
use crate::domain::{Query, QueryResult, RouterStats};
use crate::expert::Expert;

/// An expert chosen for a query.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub expert: &'static str,
    pub score: f64,
}

/// Routes queries to experts by confidence.
pub struct MoeRouter {
    experts: Vec<Arc<dyn Expert>>,
    config: RouterConfig,
    total_queries: AtomicU64,
    dispatch_counts: Mutex<BTreeMap<String, u64>>,
}

impl MoeRouter {
    #[must_use]
    pub fn new(config: RouterConfig) -> Self {
        Self {
            experts: Vec::new(),
            config,
            total_queries: AtomicU64::new(0),
            dispatch_counts: Mutex::new(BTreeMap::new()),
        }
    }

    /// Register an expert. Experts with equal scores are preferred in
    /// registration order.
    pub fn register(&mut self, expert: Arc<dyn Expert>) {
        self.dispatch_counts
            .lock()
            .entry(expert.name().to_string())
            .or_insert(0);
        self.experts.push(expert);
    }

    #[must_use]
    pub fn experts(&self) -> &[Arc<dyn Expert>] {
        &self.experts
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.experts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.experts.is_empty()
    }

    #[must_use]
    pub fn default_top_k(&self) -> usize {
        self.config.top_k
    }

    /// Experts that would answer `query`, best first, without dispatching.
    #[must_use]
    pub fn route(&self, query: &Query, top_k: usize) -> Vec<Route> {
        self.ranked(query, top_k)
            .into_iter()
            .map(|(expert, score)| Route {
                expert: expert.name(),
                score,
            })
            .collect()
    }

    /// Dispatch `query` using the configured `top_k`.
    pub fn query(&self, query: &Query) -> Vec<QueryResult> {
        self.query_top_k(query, self.config.top_k)
    }

    /// Dispatch `query` to at most `top_k` experts scoring above the
    /// confidence threshold and concatenate their results.
    ///
    /// No qualifying expert yields an empty result, not an error.
    pub fn query_top_k(&self, query: &Query, top_k: usize) -> Vec<QueryResult> {
        self.total_queries.fetch_add(1, Ordering::Relaxed);
        let selected = self.ranked(query, top_k);
        if selected.is_empty() {
            debug!(?query, "no expert above confidence threshold");
            return Vec::new();
        }

        let mut results = Vec::new();
        for (expert, score) in selected {
            *self
                .dispatch_counts
                .lock()
                .entry(expert.name().to_string())
                .or_insert(0) += 1;
            let answer = expert.query(query);
            trace!(expert = expert.name(), score, results = answer.len(), "dispatched query");
            results.extend(answer);
        }
        results
    }

    #[must_use]
    pub fn stats(&self) -> RouterStats {
        RouterStats {
            total_queries: self.total_queries.load(Ordering::Relaxed),
            dispatch_counts: self.dispatch_counts.lock().clone(),
        }
    }

    fn ranked(&self, query: &Query, top_k: usize) -> Vec<(&Arc<dyn Expert>, f64)> {
        let mut scored: Vec<_> = self
            .experts
            .iter()
            .map(|expert| (expert, expert.score(query)))
            .collect();
        // Stable sort keeps registration order among equal scores.
        scored.sort_by(|(_, a), (_, b)| b.total_cmp(a));
        scored
            .into_iter()
            .take(top_k.max(1))
            .filter(|(_, score)| *score > self.config.min_confidence)
            .collect()
    }
}

impl std::fmt::Debug for MoeRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoeRouter")
            .field(
                "experts",
                &self.experts.iter().map(|e| e.name()).collect::<Vec<_>>(),
            )
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
