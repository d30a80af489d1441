//! Configuration loading and validation.
//!
//! Every section is optional; missing values fall back to the defaults below.
//!
//! ```toml
//! [logging]
//! level = "info"
//! format = "pretty"          # or "json"
//!
//! [experts.trade_history]
//! max_size = 10000
//! policy = "lru"             # "lru" | "lfu" | "weighted"
//! default_limit = 50
//!
//! [router]
//! top_k = 1
//! min_confidence = 0.1
//!
//! [prefetch]
//! window = 10
//! history_max = 10000
//! history_trim = 5000
//! track_queries = true
//!
//! [wire]
//! max_packets = 1000
//!
//! [symbols]
//! extra = ["WIF", "JUP"]     # appended after the builtin table
//! ```
//!
//! # Example
//!
//! ```no_run
//! use trademem::config::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("trademem.toml")?;
//!     config.logging.init();
//!     Ok(())
//! }
//! ```

mod logging;

pub use logging::LoggingConfig;

use serde::Deserialize;
use std::path::Path;

use crate::cache::EvictionPolicyKind;
use crate::codec::DEFAULT_MAX_PACKETS;
use crate::domain::SymbolTable;
use crate::error::{ConfigError, Result};

/// Settings for one expert's cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ExpertConfig {
    /// Maximum cached entries. Must be at least 1.
    pub max_size: usize,
    #[serde(default)]
    pub policy: EvictionPolicyKind,
    /// Results returned when a query carries no limit.
    pub default_limit: usize,
}

impl ExpertConfig {
    #[must_use]
    pub const fn new(max_size: usize, policy: EvictionPolicyKind, default_limit: usize) -> Self {
        Self {
            max_size,
            policy,
            default_limit,
        }
    }

    fn validate(&self, field_prefix: &'static str) -> Result<()> {
        if self.max_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: field_prefix,
                reason: "max_size must be greater than 0".to_string(),
            }
            .into());
        }
        if self.default_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: field_prefix,
                reason: "default_limit must be greater than 0".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// Per-expert cache settings.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ExpertsConfig {
    #[serde(default = "default_trade_history")]
    pub trade_history: ExpertConfig,
    #[serde(default = "default_market_regime")]
    pub market_regime: ExpertConfig,
    #[serde(default = "default_agent_decision")]
    pub agent_decision: ExpertConfig,
}

fn default_trade_history() -> ExpertConfig {
    ExpertConfig::new(10_000, EvictionPolicyKind::Lru, 50)
}

fn default_market_regime() -> ExpertConfig {
    ExpertConfig::new(1_000, EvictionPolicyKind::Lru, 100)
}

fn default_agent_decision() -> ExpertConfig {
    ExpertConfig::new(5_000, EvictionPolicyKind::Weighted, 20)
}

impl Default for ExpertsConfig {
    fn default() -> Self {
        Self {
            trade_history: default_trade_history(),
            market_regime: default_market_regime(),
            agent_decision: default_agent_decision(),
        }
    }
}

/// Query routing settings.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RouterConfig {
    /// Experts consulted per query when the caller does not say.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Experts must score strictly above this to be dispatched.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
}

fn default_top_k() -> usize {
    1
}

fn default_min_confidence() -> f64 {
    0.1
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            min_confidence: default_min_confidence(),
        }
    }
}

/// Prefetch predictor settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PrefetchConfig {
    /// Trailing accesses a new access is paired with.
    #[serde(default = "default_window")]
    pub window: usize,
    /// History length that triggers a trim.
    #[serde(default = "default_history_max")]
    pub history_max: usize,
    /// History length kept after a trim.
    #[serde(default = "default_history_trim")]
    pub history_trim: usize,
    /// Record an access for every key a query returns.
    #[serde(default = "default_track_queries")]
    pub track_queries: bool,
}

fn default_window() -> usize {
    10
}

fn default_history_max() -> usize {
    10_000
}

fn default_history_trim() -> usize {
    5_000
}

fn default_track_queries() -> bool {
    true
}

impl Default for PrefetchConfig {
    fn default() -> Self {
        Self {
            window: default_window(),
            history_max: default_history_max(),
            history_trim: default_history_trim(),
            track_queries: default_track_queries(),
        }
    }
}

/// Wire framing settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct WireConfig {
    #[serde(default = "default_max_packets")]
    pub max_packets: usize,
}

fn default_max_packets() -> usize {
    DEFAULT_MAX_PACKETS
}

impl Default for WireConfig {
    fn default() -> Self {
        Self {
            max_packets: default_max_packets(),
        }
    }
}

/// Extra wire symbols.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SymbolsConfig {
    /// Registered in order after the builtin symbols.
    #[serde(default)]
    pub extra: Vec<String>,
}

impl SymbolsConfig {
    /// The builtin table extended with `extra`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::SymbolTableFull`](crate::error::CodecError::SymbolTableFull)
    /// if the symbols do not fit below the unknown-symbol sentinel.
    pub fn table(&self) -> Result<SymbolTable> {
        if self.extra.is_empty() {
            return Ok(SymbolTable::builtin().clone());
        }
        Ok(SymbolTable::with_symbols(&self.extra)?)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub experts: ExpertsConfig,
    #[serde(default)]
    pub router: RouterConfig,
    #[serde(default)]
    pub prefetch: PrefetchConfig,
    #[serde(default)]
    pub wire: WireConfig,
    #[serde(default)]
    pub symbols: SymbolsConfig,
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML is malformed or
    /// validation fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Check that all values are within acceptable ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        self.experts.trade_history.validate("experts.trade_history")?;
        self.experts.market_regime.validate("experts.market_regime")?;
        self.experts.agent_decision.validate("experts.agent_decision")?;

        if self.router.top_k == 0 {
            return Err(ConfigError::InvalidValue {
                field: "top_k",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if !(0.0..=1.0).contains(&self.router.min_confidence) {
            return Err(ConfigError::InvalidValue {
                field: "min_confidence",
                reason: "must be between 0 and 1".to_string(),
            }
            .into());
        }

        if self.prefetch.window == 0 {
            return Err(ConfigError::InvalidValue {
                field: "window",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.prefetch.history_trim >= self.prefetch.history_max {
            return Err(ConfigError::InvalidValue {
                field: "history_trim",
                reason: "must be less than history_max".to_string(),
            }
            .into());
        }

        if self.wire.max_packets == 0 || self.wire.max_packets > usize::from(u16::MAX) {
            return Err(ConfigError::InvalidValue {
                field: "max_packets",
                reason: "must be between 1 and 65535".to_string(),
            }
            .into());
        }

        if let Err(error) = self.symbols.table() {
            return Err(ConfigError::InvalidValue {
                field: "symbols.extra",
                reason: error.to_string(),
            }
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn empty_document_uses_defaults() {
        let config = Config::parse_toml("").unwrap();
        assert_eq!(config.experts.trade_history.max_size, 10_000);
        assert_eq!(config.experts.agent_decision.policy, EvictionPolicyKind::Weighted);
        assert_eq!(config.router.top_k, 1);
        assert_eq!(config.prefetch.window, 10);
        assert_eq!(config.wire.max_packets, 1000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn parses_expert_sections() {
        let config = Config::parse_toml(
            r#"
[experts.trade_history]
max_size = 100
policy = "lfu"
default_limit = 10
"#,
        )
        .unwrap();
        assert_eq!(
            config.experts.trade_history,
            ExpertConfig::new(100, EvictionPolicyKind::Lfu, 10)
        );
        assert_eq!(config.experts.market_regime.max_size, 1_000);
    }

    #[test]
    fn rejects_zero_max_size() {
        let result = Config::parse_toml(
            r#"
[experts.market_regime]
max_size = 0
default_limit = 5
"#,
        );
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidValue {
                field: "experts.market_regime",
                ..
            }))
        ));
    }

    #[test]
    fn rejects_unknown_policy() {
        let result = Config::parse_toml(
            r#"
[experts.trade_history]
max_size = 10
policy = "fifo"
default_limit = 5
"#,
        );
        assert!(matches!(result, Err(Error::Config(ConfigError::Parse(_)))));
    }

    #[test]
    fn rejects_trim_not_below_max() {
        let result = Config::parse_toml("[prefetch]\nhistory_max = 100\nhistory_trim = 100\n");
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidValue {
                field: "history_trim",
                ..
            }))
        ));
    }

    #[test]
    fn rejects_out_of_range_confidence_and_packets() {
        assert!(Config::parse_toml("[router]\nmin_confidence = 1.5\n").is_err());
        assert!(Config::parse_toml("[wire]\nmax_packets = 70000\n").is_err());
        assert!(Config::parse_toml("[router]\ntop_k = 0\n").is_err());
    }

    #[test]
    fn parses_extra_symbols() {
        let config = Config::parse_toml("[symbols]\nextra = [\"WIF\", \"JUP\"]\n").unwrap();
        assert_eq!(config.symbols.extra, vec!["WIF", "JUP"]);

        let table = config.symbols.table().unwrap();
        let builtin = SymbolTable::builtin();
        assert_eq!(table.len(), builtin.len() + 2);
        assert_eq!(table.name_of(table.index_of("WIF")), "WIF");
        assert!(Config::default().symbols.extra.is_empty());
    }

    #[test]
    fn rejects_symbol_table_overflow() {
        let mut config = Config::default();
        config.symbols.extra = (0..=usize::from(u16::MAX)).map(|i| format!("S{i}")).collect();
        assert!(matches!(
            config.validate(),
            Err(Error::Config(ConfigError::InvalidValue {
                field: "symbols.extra",
                ..
            }))
        ));
    }
}
