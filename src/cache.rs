//! Process-wide key/value cache with per-entry expiry.
//!
//! [`Cache`] stores type-erased values so one instance can hold single articles,
//! whole collections and analytics results side by side. [`CacheExt`] adds the typed
//! accessors everything else uses.

use std::{
    any::Any,
    fmt::Debug,
    sync::Arc,
    time::{Duration, Instant},
};

use moka::{Expiry, sync::Cache as MokaCache};
use tracing::trace;

pub type CacheValue = Arc<dyn Any + Send + Sync>;

pub const DEFAULT_CAPACITY: u64 = 10_000;

pub trait Cache: Send + Sync + Debug {
    fn get_value(&self, key: &str) -> Option<CacheValue>;

    /// Store `value` under `key`. A `ttl` of `None` applies the cache's default policy.
    fn set_value(&self, key: &str, value: CacheValue, ttl: Option<Duration>);
}

/// Typed access on top of [`Cache`]
pub trait CacheExt: Cache {
    /// Reading a key under another type than the one it was stored with is a miss.
    fn get<T: Any + Clone>(&self, key: &str) -> Option<T> {
        self.get_value(key)
            .and_then(|value| value.downcast_ref::<T>().cloned())
    }

    fn set<T: Any + Send + Sync>(&self, key: &str, value: T, ttl: Option<Duration>) {
        self.set_value(key, Arc::new(value), ttl);
    }
}

impl<C: Cache + ?Sized> CacheExt for C {}

/// Never holds anything, which turns every read-through into a plain read
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCache;

impl Cache for NullCache {
    fn get_value(&self, _key: &str) -> Option<CacheValue> {
        None
    }

    fn set_value(&self, _key: &str, _value: CacheValue, _ttl: Option<Duration>) {}
}

#[derive(Clone)]
struct Entry {
    value: CacheValue,
    ttl: Option<Duration>,
}

struct EntryExpiry;

impl Expiry<String, Entry> for EntryExpiry {
    fn expire_after_create(&self, _key: &String, entry: &Entry, _created_at: Instant) -> Option<Duration> {
        entry.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        entry.ttl
    }
}

/// In-memory cache backed by moka
///
/// Entries expire an absolute `ttl` after they were written. Entries written without a
/// ttl use `default_ttl`, and never expire when that is `None` too.
#[derive(Clone)]
pub struct MemoryCache {
    inner: MokaCache<String, Entry>,
    default_ttl: Option<Duration>,
}

impl MemoryCache {
    #[must_use]
    pub fn new(capacity: u64, default_ttl: Option<Duration>) -> Self {
        let inner = MokaCache::builder()
            .max_capacity(capacity)
            .expire_after(EntryExpiry)
            .build();
        Self { inner, default_ttl }
    }

    #[must_use]
    pub const fn default_ttl(&self) -> Option<Duration> {
        self.default_ttl
    }

    pub fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.entry_count()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, None)
    }
}

impl Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("entries", &self.inner.entry_count())
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

impl Cache for MemoryCache {
    fn get_value(&self, key: &str) -> Option<CacheValue> {
        let hit = self.inner.get(key).map(|entry| entry.value);
        trace!("cache {} for `{key}`", if hit.is_some() { "hit" } else { "miss" });
        hit
    }

    fn set_value(&self, key: &str, value: CacheValue, ttl: Option<Duration>) {
        let ttl = ttl.or(self.default_ttl);
        self.inner.insert(key.to_string(), Entry { value, ttl });
    }
}

#[cfg(test)]
mod tests {
    use std::thread::sleep;

    use super::*;

    #[test]
    fn null_cache_never_returns_anything() {
        let cache = NullCache;
        cache.set("key", 42_u32, None);
        assert_eq!(cache.get::<u32>("key"), None);
    }

    #[test]
    fn memory_cache_round_trips_typed_values() {
        let cache = MemoryCache::default();
        cache.set("numbers", vec![1_u32, 2, 3], None);

        assert_eq!(cache.get::<Vec<u32>>("numbers"), Some(vec![1, 2, 3]));
        assert_eq!(cache.get::<Vec<u32>>("missing"), None);
    }

    #[test]
    fn wrong_type_reads_as_miss() {
        let cache = MemoryCache::default();
        cache.set("key", "text".to_string(), None);
        assert_eq!(cache.get::<u32>("key"), None);
    }

    #[test]
    fn later_write_replaces_earlier_one() {
        let cache = MemoryCache::default();
        cache.set("key", 1_u8, None);
        cache.set("key", 2_u8, None);
        assert_eq!(cache.get::<u8>("key"), Some(2));
    }

    #[test]
    fn entries_expire_after_their_ttl() {
        let cache = MemoryCache::default();
        cache.set("short", 1_u8, Some(Duration::from_millis(50)));
        cache.set("long", 2_u8, Some(Duration::from_secs(3600)));
        assert_eq!(cache.get::<u8>("short"), Some(1));

        sleep(Duration::from_millis(150));

        assert_eq!(cache.get::<u8>("short"), None);
        assert_eq!(cache.get::<u8>("long"), Some(2));
    }

    #[test]
    fn default_ttl_applies_when_none_given() {
        let cache = MemoryCache::new(16, Some(Duration::from_millis(50)));
        cache.set("key", 1_u8, None);

        sleep(Duration::from_millis(150));

        assert_eq!(cache.get::<u8>("key"), None);
    }

    #[test]
    fn works_behind_a_trait_object() {
        let cache: Arc<dyn Cache> = Arc::new(MemoryCache::default());
        cache.set("key", 7_i64, None);
        assert_eq!(cache.get::<i64>("key"), Some(7));
        assert_eq!(cache.get::<i64>("other"), None);
    }
}
