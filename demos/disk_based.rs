//! Evicts by the total size of the files the cached values describe.
use hooked_lru::{CacheEngine, Entry, HandlerError, lru};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct DiskUsage {
    max_bytes: u64,
    current_bytes: u64,
}

#[derive(Debug)]
struct CachedFile {
    path: String,
    size_bytes: u64,
}

fn file_size(entry: &Entry) -> Result<u64, HandlerError> {
    entry
        .downcast_ref::<CachedFile>()
        .map(|file| file.size_bytes)
        .ok_or_else(|| format!("'{}' does not hold a cached file", entry.key()).into())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cache = lru!(
        metadata: DiskUsage { max_bytes: 30_000, current_bytes: 0 },
        should_evict: |usage, candidate| {
            let incoming = file_size(candidate).unwrap_or(0);
            info!(current = usage.current_bytes, incoming, "disk utilization");
            usage.current_bytes + incoming > usage.max_bytes
        },
        on_insert: |usage, entry| {
            usage.current_bytes += file_size(entry)?;
            Ok(())
        },
        on_delete: |usage, entry| {
            usage.current_bytes -= file_size(entry)?;
            Ok(())
        },
    );

    let sizes = [10_000, 20_000, 5_000, 300, 8_000, 1_500];
    for (index, size_bytes) in sizes.into_iter().enumerate() {
        let file = CachedFile {
            path: "/tmp/sample".to_string(),
            size_bytes,
        };
        cache.create_element(format!("my-cdn.com/path/to/picture/{index}"), file)?;
    }

    for key in cache.keys() {
        if let Some(file) = cache.get_as::<CachedFile>(&key)? {
            info!(
                key = key.as_str(),
                path = file.path.as_str(),
                size = file.size_bytes,
                "cached"
            );
        }
    }

    let used = cache.with_metadata(|usage| usage.current_bytes);
    info!(used, "final disk utilization");

    Ok(())
}
