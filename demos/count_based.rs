//! Evicts by number of entries.
//!
//! Run with `RUST_LOG=debug cargo run --example count_based` to watch the
//! evictions happen.
use hooked_lru::{CacheEngine, LruCache};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct ItemCount {
    max_items: usize,
    current_count: usize,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut cache = LruCache::new(ItemCount {
        max_items: 3,
        current_count: 0,
    });

    cache
        .should_evict(|meta, _| {
            info!(count = meta.current_count, "items currently stored");
            meta.current_count > meta.max_items
        })
        .on_insert(|meta, _| {
            meta.current_count += 1;
            Ok(())
        })
        .on_delete(|meta, _| {
            meta.current_count -= 1;
            Ok(())
        });

    let keys = ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"];
    for (value, key) in keys.into_iter().enumerate() {
        cache.create_element(key, value + 1)?;
    }

    info!(keys = ?cache.keys(), "final cache contents, most recent first");
    info!(evictions = cache.metrics().eviction_count(), "done");

    Ok(())
}
