//! Trademem - shared in-process memory for trading agents.
//!
//! Producers push trades, market regime labels and agent decisions into one
//! [`SharedMemory`](memory::SharedMemory); consumers query it with typed or
//! loosely typed requests and get answers from whichever experts are most
//! confident.
//!
//! # Architecture
//!
//! - **[`codec`]** - 32-byte trade records and checksummed wire frames
//! - **[`cache`]** - Bounded caches with LRU, LFU and weighted eviction
//! - **[`expert`]** - Cache owners for trades, regimes and decisions
//! - **[`router`]** - Mixture-of-experts dispatch by confidence score
//! - **[`prefetch`]** - Co-access prediction feeding eviction hints
//!
//! # Modules
//!
//! - [`config`] - TOML configuration and logging setup
//! - [`domain`] - Records, queries, symbols and statistics snapshots
//! - [`error`] - Error types for the crate
//! - [`ingest`] - Best-effort coercion of producer payloads
//! - [`memory`] - The facade tying everything together
//! - [`cli`] - Handlers behind the `trademem` binary
//!
//! # Features
//!
//! - `testkit` - Expose [`testkit`] builders to integration tests
//!
//! # Example
//!
//! ```
//! use trademem::config::Config;
//! use trademem::domain::Query;
//! use trademem::memory::SharedMemory;
//!
//! let memory = SharedMemory::new(&Config::default());
//! memory.update_regime("BTC", "bull");
//!
//! let results = memory.query_typed(&Query::regime("BTC"));
//! assert_eq!(results.len(), 1);
//! ```

pub mod cache;
pub mod cli;
pub mod codec;
pub mod config;
pub mod domain;
pub mod error;
pub mod expert;
pub mod ingest;
pub mod memory;
pub mod prefetch;
pub mod router;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
