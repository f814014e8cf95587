use crate::metrics::MetricsConfig;

/// Construction-time settings for an [`LruCache`](crate::LruCache).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheConfig {
    /// Number of entries to pre-allocate room for.
    ///
    /// This is only a sizing hint. The cache never evicts because of it; the
    /// should-evict handler is the sole eviction policy.
    pub capacity: usize,
    pub metrics: MetricsConfig,
}

impl CacheConfig {
    #[inline]
    pub fn new(capacity: usize, metrics: MetricsConfig) -> Self {
        Self { capacity, metrics }
    }

    #[inline]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    #[inline]
    pub fn with_metrics(mut self, metrics: MetricsConfig) -> Self {
        self.metrics = metrics;
        self
    }
}
