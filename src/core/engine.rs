use crate::core::entry::Value;
use crate::core::error::{Error, Result};
use crate::core::key::Key;
use crate::metrics::MetricsSnapshot;
use std::any::{Any, type_name};
use std::sync::Arc;

/// A thread-safe, handler-driven cache engine.
///
/// Every operation runs under one exclusive lock, including lookups, because a
/// lookup reorders the recency structure. Handlers run inline inside that
/// critical section.
///
/// # Partial effects
/// Operations are not transactional. When a handler fails, the mutation that
/// preceded it (insertion, promotion) is kept and the error is still returned.
/// Evictions performed before [`Error::EvictionExhausted`] stay performed.
pub trait CacheEngine {
    /// Inserts a new entry or replaces the value of an existing one.
    ///
    /// For a new key the eviction predicate is consulted first, once per
    /// eviction, until it declines. Replacing an existing value keeps the
    /// entry's recency position. The on-insert handler runs in both cases.
    fn create_element<K, V>(&self, key: K, value: V) -> Result<()>
    where
        K: Into<Key>,
        V: Any + Send + Sync;

    /// Looks up `key`, promoting it to most-recently-used on a hit.
    ///
    /// A miss is `Ok(None)` and never an error.
    fn get_element(&self, key: &str) -> Result<Option<Value>>;

    /// Typed variant of [`get_element`](CacheEngine::get_element).
    ///
    /// The promotion and the on-access handler happen before the type check,
    /// so a mismatch still counts as an access.
    fn get_as<T>(&self, key: &str) -> Result<Option<Arc<T>>>
    where
        T: Any + Send + Sync,
    {
        let Some(value) = self.get_element(key)? else {
            return Ok(None);
        };

        value.downcast::<T>().map(Some).ok_or_else(|| Error::TypeMismatch {
            key: key.to_owned(),
            expected: type_name::<T>(),
        })
    }

    /// Removes `key`. Removing an unknown key succeeds and returns `false`.
    fn delete_element(&self, key: &str) -> Result<bool>;

    /// Number of live entries.
    fn len(&self) -> usize;

    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn metrics(&self) -> MetricsSnapshot;
}
