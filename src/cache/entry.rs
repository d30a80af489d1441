//! Cache entry metadata.

use chrono::{DateTime, Utc};

/// Bookkeeping an eviction policy scores an entry by.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntryMetadata {
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    pub access_count: u64,
    /// Predicted likelihood of near-future access, in [0, 1].
    pub prefetch_hint: f64,
    /// Cache-wide touch order, increasing with every touch. Unlike the wall
    /// clock it never ties or goes backwards.
    pub touch_seq: u64,
}

impl EntryMetadata {
    #[must_use]
    pub fn new(
        created_at: DateTime<Utc>,
        last_accessed: DateTime<Utc>,
        access_count: u64,
        prefetch_hint: f64,
        touch_seq: u64,
    ) -> Self {
        Self {
            created_at,
            last_accessed,
            access_count,
            prefetch_hint: clamp_hint(prefetch_hint),
            touch_seq,
        }
    }

    /// Seconds since the entry was inserted.
    #[must_use]
    pub fn age_secs(&self, now: DateTime<Utc>) -> f64 {
        (now - self.created_at).num_milliseconds().max(0) as f64 / 1000.0
    }

    /// Sort key for "most recently touched first" ordering.
    #[must_use]
    pub fn recency(&self) -> u64 {
        self.touch_seq
    }
}

/// A cached value and its metadata.
///
/// Only the owning [`BoundedCache`](super::BoundedCache) mutates entries;
/// callers receive clones.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    meta: EntryMetadata,
}

impl<V> CacheEntry<V> {
    pub(crate) fn new(value: V, prefetch_hint: f64, now: DateTime<Utc>, touch_seq: u64) -> Self {
        Self {
            value,
            meta: EntryMetadata::new(now, now, 0, prefetch_hint, touch_seq),
        }
    }

    #[must_use]
    pub fn metadata(&self) -> &EntryMetadata {
        &self.meta
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.meta.created_at
    }

    #[must_use]
    pub fn last_accessed(&self) -> DateTime<Utc> {
        self.meta.last_accessed
    }

    #[must_use]
    pub fn access_count(&self) -> u64 {
        self.meta.access_count
    }

    #[must_use]
    pub fn prefetch_hint(&self) -> f64 {
        self.meta.prefetch_hint
    }

    pub(crate) fn touch(&mut self, now: DateTime<Utc>, touch_seq: u64) {
        self.meta.last_accessed = now;
        self.meta.touch_seq = touch_seq;
    }

    pub(crate) fn record_access(&mut self, now: DateTime<Utc>, touch_seq: u64) {
        self.touch(now, touch_seq);
        self.meta.access_count += 1;
    }

    pub(crate) fn set_hint(&mut self, hint: f64) {
        self.meta.prefetch_hint = clamp_hint(hint);
    }
}

/// Clamp a hint into [0, 1]; NaN becomes 0.
pub(crate) fn clamp_hint(hint: f64) -> f64 {
    if hint.is_nan() {
        0.0
    } else {
        hint.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn hints_are_clamped() {
        let now = Utc::now();
        assert_eq!(CacheEntry::new((), 1.7, now, 0).prefetch_hint(), 1.0);
        assert_eq!(CacheEntry::new((), -0.2, now, 0).prefetch_hint(), 0.0);
        assert_eq!(CacheEntry::new((), f64::NAN, now, 0).prefetch_hint(), 0.0);
    }

    #[test]
    fn age_is_measured_from_creation() {
        let now = Utc::now();
        let meta = EntryMetadata::new(now - Duration::seconds(90), now, 3, 0.5, 0);
        assert_eq!(meta.age_secs(now), 90.0);
    }

    #[test]
    fn touch_updates_recency_only() {
        let now = Utc::now();
        let mut entry = CacheEntry::new(1u8, 0.0, now, 1);
        let later = now + Duration::seconds(5);
        entry.touch(later, 9);
        assert_eq!(entry.created_at(), now);
        assert_eq!(entry.last_accessed(), later);
        assert_eq!(entry.metadata().recency(), 9);
        assert_eq!(entry.access_count(), 0);

        entry.record_access(later, 10);
        assert_eq!(entry.access_count(), 1);
    }
}
