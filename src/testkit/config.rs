//! Canonical test configurations.
//!
//! Single source of truth for config structs used across tests.

use crate::cache::EvictionPolicyKind;
use crate::config::{Config, ExpertConfig, PrefetchConfig};

/// Expert settings with the given capacity and policy.
pub fn expert(max_size: usize, policy: EvictionPolicyKind) -> ExpertConfig {
    ExpertConfig::new(max_size, policy, 20)
}

/// Default config with the trade history cache capped at `max_size`.
pub fn with_trade_capacity(max_size: usize) -> Config {
    let mut config = Config::default();
    config.experts.trade_history = ExpertConfig::new(max_size, EvictionPolicyKind::Lru, 50);
    config
}

/// Prefetch settings with a short window and small history.
pub fn prefetch(window: usize) -> PrefetchConfig {
    PrefetchConfig {
        window,
        history_max: 100,
        history_trim: 50,
        track_queries: true,
    }
}
