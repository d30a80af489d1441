//! Eviction victim selection.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::entry::EntryMetadata;

/// Age at which the weighted policy's recency component reaches zero.
pub const AGE_HORIZON_SECS: f64 = 3600.0;

/// Strategy choosing which entry a full cache gives up.
///
/// Implementations see every entry once per eviction and return the key of
/// exactly one victim, or `None` when there are no candidates.
pub trait EvictionPolicy: Send + Sync + fmt::Debug {
    /// Identifier used in configuration and logs.
    fn name(&self) -> &'static str;

    /// Pick a victim among `candidates`.
    fn select_victim<'a>(
        &self,
        candidates: &mut dyn Iterator<Item = (&'a str, &'a EntryMetadata)>,
        now: DateTime<Utc>,
    ) -> Option<&'a str>;
}

/// Evict the entry touched longest ago.
#[derive(Debug, Clone, Copy, Default)]
pub struct LruPolicy;

impl EvictionPolicy for LruPolicy {
    fn name(&self) -> &'static str {
        "lru"
    }

    fn select_victim<'a>(
        &self,
        candidates: &mut dyn Iterator<Item = (&'a str, &'a EntryMetadata)>,
        _now: DateTime<Utc>,
    ) -> Option<&'a str> {
        candidates
            .min_by_key(|(_, meta)| meta.recency())
            .map(|(key, _)| key)
    }
}

/// Evict the entry read the fewest times.
#[derive(Debug, Clone, Copy, Default)]
pub struct LfuPolicy;

impl EvictionPolicy for LfuPolicy {
    fn name(&self) -> &'static str {
        "lfu"
    }

    fn select_victim<'a>(
        &self,
        candidates: &mut dyn Iterator<Item = (&'a str, &'a EntryMetadata)>,
        _now: DateTime<Utc>,
    ) -> Option<&'a str> {
        candidates
            .min_by_key(|(_, meta)| meta.access_count)
            .map(|(key, _)| key)
    }
}

/// Evict the entry with the lowest blend of frequency, freshness and
/// prefetch hint:
///
/// ```text
/// 0.3 * min(access_count / 100, 1) + 0.4 * max(0, 1 - age / 3600s) + 0.3 * prefetch_hint
/// ```
///
/// Equal scores are broken by iteration order.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedPolicy;

impl WeightedPolicy {
    const FREQUENCY_WEIGHT: f64 = 0.3;
    const FRESHNESS_WEIGHT: f64 = 0.4;
    const HINT_WEIGHT: f64 = 0.3;
    const FREQUENCY_SATURATION: f64 = 100.0;

    /// Retention score of an entry; lower is evicted first.
    #[must_use]
    pub fn score(meta: &EntryMetadata, now: DateTime<Utc>) -> f64 {
        let frequency = (meta.access_count as f64 / Self::FREQUENCY_SATURATION).min(1.0);
        let freshness = (1.0 - meta.age_secs(now) / AGE_HORIZON_SECS).max(0.0);
        Self::FREQUENCY_WEIGHT * frequency
            + Self::FRESHNESS_WEIGHT * freshness
            + Self::HINT_WEIGHT * meta.prefetch_hint
    }
}

impl EvictionPolicy for WeightedPolicy {
    fn name(&self) -> &'static str {
        "weighted"
    }

    fn select_victim<'a>(
        &self,
        candidates: &mut dyn Iterator<Item = (&'a str, &'a EntryMetadata)>,
        now: DateTime<Utc>,
    ) -> Option<&'a str> {
        candidates
            .map(|(key, meta)| (key, Self::score(meta, now)))
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(key, _)| key)
    }
}

/// Configurable choice of eviction policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionPolicyKind {
    #[default]
    Lru,
    Lfu,
    Weighted,
}

impl EvictionPolicyKind {
    /// Instantiate the policy.
    #[must_use]
    pub fn build(self) -> Box<dyn EvictionPolicy> {
        match self {
            Self::Lru => Box::new(LruPolicy),
            Self::Lfu => Box::new(LfuPolicy),
            Self::Weighted => Box::new(WeightedPolicy),
        }
    }
}
