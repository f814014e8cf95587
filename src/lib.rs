//! An in-memory LRU cache whose eviction policy is written by the caller.
//!
//! The cache keeps entries in recency order and owns a caller-defined
//! metadata value. Four optional handlers (insert, delete, access and the
//! should-evict predicate) see that metadata and the affected entry, which is
//! enough to express limits such as "at most N entries" or "at most N bytes".
//!
//! ```
//! use hooked_lru::{CacheEngine, lru};
//!
//! struct Bytes {
//!     max: usize,
//!     used: usize,
//! }
//!
//! fn size(entry: &hooked_lru::Entry) -> usize {
//!     entry.downcast_ref::<Vec<u8>>().map_or(0, Vec::len)
//! }
//!
//! let cache = lru!(
//!     metadata: Bytes { max: 8, used: 0 },
//!     should_evict: |bytes, candidate| bytes.used + size(candidate) > bytes.max,
//!     on_insert: |bytes, entry| {
//!         bytes.used += size(entry);
//!         Ok(())
//!     },
//!     on_delete: |bytes, entry| {
//!         bytes.used -= size(entry);
//!         Ok(())
//!     },
//! );
//!
//! cache.create_element("a", vec![0_u8; 4]).unwrap();
//! cache.create_element("b", vec![0_u8; 4]).unwrap();
//! cache.create_element("c", vec![0_u8; 4]).unwrap();
//!
//! assert_eq!(cache.keys(), ["c", "b"]);
//! ```
pub use crate::config::CacheConfig;
pub use crate::core::engine::CacheEngine;
pub use crate::core::entry::{Entry, Value};
pub use crate::core::error::{Error, Result};
pub use crate::core::handler::{HandlerError, HandlerResult, Hook};
pub use crate::core::key::Key;
pub use crate::lru::LruCache;
pub use crate::metrics::{LatencyPercentile, MetricsConfig, MetricsSnapshot};
pub use macros::lru;

// Lets `lru!` expand to `::hooked_lru::...` inside this crate as well.
extern crate self as hooked_lru;

mod config;
mod index;
mod list;
mod lru;
mod metrics;

pub mod core;

#[cfg(test)]
mod tests {
    use crate::{CacheEngine, LatencyPercentile, lru};
    use std::time::Duration;

    struct Counter {
        max: usize,
        current: usize,
        accesses: usize,
    }

    #[test]
    fn test() {
        let cache = lru!(
            metadata: Counter { max: 2, current: 0, accesses: 0 },
            capacity: 16,
            metrics: { max_latency: Duration::from_secs(1), precision: 3 },
            should_evict: |counter, _| counter.current >= counter.max,
            on_insert: |counter, _| {
                counter.current += 1;
                Ok(())
            },
            on_delete: |counter, _| {
                counter.current -= 1;
                Ok(())
            },
            on_access: |counter, _| {
                counter.accesses += 1;
                Ok(())
            },
        );

        cache.create_element(1.to_string(), 1).unwrap();
        cache.create_element(2.to_string(), 2).unwrap();

        if let Some(value) = cache.get_element("1").unwrap() {
            assert_eq!(value.downcast_ref::<i32>(), Some(&1))
        }

        cache.create_element(3.to_string(), 3).unwrap();

        assert_eq!(cache.keys(), ["3", "1"]);
        assert_eq!(cache.with_metadata(|counter| counter.accesses), 1);

        let metrics = cache.metrics();
        assert_eq!(metrics.eviction_count(), 1);
        assert_eq!(metrics.operation_count(), 4);
        assert!(metrics.latency(LatencyPercentile::P50) > Duration::ZERO);
    }

    #[test]
    fn test_metadata_only() {
        let cache = lru!(metadata: ());

        cache.create_element("a", "value").unwrap();

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get_as::<&str>("a").unwrap().as_deref(), Some(&"value"));
    }
}
