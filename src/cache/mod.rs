//! Bounded key-value caches with pluggable eviction.
//!
//! [`BoundedCache`] never holds more than `max_size` entries: inserting a new
//! key at capacity first evicts one victim chosen by its [`EvictionPolicy`].
//! Victim selection scans every entry, so eviction is O(n) in cache size.

mod bounded;
mod entry;
mod policy;

pub use bounded::BoundedCache;
pub use entry::{CacheEntry, EntryMetadata};
pub use policy::{
    EvictionPolicy, EvictionPolicyKind, LfuPolicy, LruPolicy, WeightedPolicy, AGE_HORIZON_SECS,
};
