//! Venue-agnostic domain types.

mod decision;
mod query;
mod stats;
mod symbol;
mod trade;

pub use decision::{AgentDecision, RegimeSnapshot};
pub use query::{Query, QueryResult};
pub use stats::{CacheStats, MemoryStats, PrefetchStats, RouterStats};
pub use symbol::{SymbolTable, BUILTIN_SYMBOLS, UNKNOWN_SYMBOL_INDEX};
pub use trade::{hash_trade_id, Side, TradeRecord, Venue};
