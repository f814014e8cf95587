//! # Cache Metrics
//!
//! Operational counters and a latency histogram for [`LruCache`](crate::LruCache).
//!
//! Every cache operation already holds the engine's exclusive lock, so the
//! collector lives inside the guarded state and uses plain integers instead of
//! atomics. Snapshots are taken under the same lock and are therefore exact.
use hdrhistogram::Histogram;
use std::time::Duration;

/// Default upper bound of the latency histogram.
pub const DEFAULT_MAX_LATENCY: Duration = Duration::from_secs(10);

/// Default number of significant figures kept by the latency histogram.
pub const DEFAULT_PRECISION: u8 = 2;

/// Highest precision supported by `hdrhistogram`.
const MAX_PRECISION: u8 = 5;

/// Configuration parameters for the latency histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsConfig {
    /// Highest latency, in microseconds, tracked without saturation.
    max_latency_micros: u64,
    /// Significant decimal figures kept per sample.
    precision: u8,
}

impl MetricsConfig {
    /// Creates a new configuration.
    ///
    /// # Parameters
    /// - `max_latency`: samples above this bound are clamped to it (at least 2µs).
    /// - `precision`: significant figures, clamped to `0..=5`.
    #[inline]
    pub fn new(max_latency: Duration, precision: u8) -> Self {
        let max_latency_micros = u64::try_from(max_latency.as_micros()).unwrap_or(u64::MAX);

        Self {
            max_latency_micros: max_latency_micros.max(2),
            precision: precision.min(MAX_PRECISION),
        }
    }

    #[inline]
    pub fn max_latency(&self) -> Duration {
        Duration::from_micros(self.max_latency_micros)
    }

    #[inline]
    pub fn precision(&self) -> u8 {
        self.precision
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LATENCY, DEFAULT_PRECISION)
    }
}

/// The telemetry sink owned by a cache's guarded state.
#[derive(Debug)]
pub(crate) struct Metrics {
    hits: u64,
    misses: u64,
    inserts: u64,
    updates: u64,
    deletes: u64,
    evictions: u64,
    handler_failures: u64,
    latency: Histogram<u64>,
}

impl Metrics {
    pub(crate) fn new(config: MetricsConfig) -> Self {
        let latency =
            Histogram::new_with_bounds(1, config.max_latency_micros, config.precision)
                .expect("bounds are validated by MetricsConfig");

        Self {
            hits: 0,
            misses: 0,
            inserts: 0,
            updates: 0,
            deletes: 0,
            evictions: 0,
            handler_failures: 0,
            latency,
        }
    }

    #[inline]
    pub(crate) fn record_hit(&mut self) {
        self.hits += 1;
    }

    #[inline]
    pub(crate) fn record_miss(&mut self) {
        self.misses += 1;
    }

    #[inline]
    pub(crate) fn record_insert(&mut self) {
        self.inserts += 1;
    }

    #[inline]
    pub(crate) fn record_update(&mut self) {
        self.updates += 1;
    }

    /// Counts an explicit delete. Evictions are tracked separately.
    #[inline]
    pub(crate) fn record_delete(&mut self) {
        self.deletes += 1;
    }

    #[inline]
    pub(crate) fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    #[inline]
    pub(crate) fn record_handler_failure(&mut self) {
        self.handler_failures += 1;
    }

    /// Records one operation's latency, clamped to the configured bound.
    #[inline]
    pub(crate) fn record_latency(&mut self, latency: Duration) {
        let micros = u64::try_from(latency.as_micros()).unwrap_or(u64::MAX);
        self.latency.saturating_record(micros.max(1));
    }

    pub(crate) fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            hit_count: self.hits,
            miss_count: self.misses,
            insert_count: self.inserts,
            update_count: self.updates,
            delete_count: self.deletes,
            eviction_count: self.evictions,
            handler_failure_count: self.handler_failures,
            latency_histogram: self.latency.clone(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Metrics::new(MetricsConfig::default())
    }
}

/// Common latency percentiles used for performance analysis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LatencyPercentile {
    /// The 50th percentile, or the median value.
    P50,
    /// The 90th percentile.
    P90,
    /// The 99th percentile.
    P99,
    /// The 99.9th percentile.
    P999,
}

impl LatencyPercentile {
    fn as_quantile(&self) -> f64 {
        match self {
            Self::P50 => 0.50,
            Self::P90 => 0.90,
            Self::P99 => 0.99,
            Self::P999 => 0.999,
        }
    }
}

/// A read-only, point-in-time copy of a cache's metrics.
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    hit_count: u64,
    miss_count: u64,
    insert_count: u64,
    update_count: u64,
    delete_count: u64,
    eviction_count: u64,
    handler_failure_count: u64,
    latency_histogram: Histogram<u64>,
}

impl MetricsSnapshot {
    #[inline]
    pub fn hit_count(&self) -> u64 {
        self.hit_count
    }

    #[inline]
    pub fn miss_count(&self) -> u64 {
        self.miss_count
    }

    /// Number of new keys committed.
    #[inline]
    pub fn insert_count(&self) -> u64 {
        self.insert_count
    }

    /// Number of in-place value replacements.
    #[inline]
    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    /// Number of explicit deletes that removed an entry.
    #[inline]
    pub fn delete_count(&self) -> u64 {
        self.delete_count
    }

    #[inline]
    pub fn eviction_count(&self) -> u64 {
        self.eviction_count
    }

    #[inline]
    pub fn handler_failure_count(&self) -> u64 {
        self.handler_failure_count
    }

    /// Calculates the hit rate ($hits / (hits + misses)$).
    ///
    /// Returns `0.0` if no lookups were recorded.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hit_count + self.miss_count;
        if total == 0 {
            0.0
        } else {
            self.hit_count as f64 / total as f64
        }
    }

    /// Calculates the miss rate ($misses / (hits + misses)$).
    ///
    /// Returns `0.0` if no lookups were recorded.
    pub fn miss_rate(&self) -> f64 {
        let total = self.hit_count + self.miss_count;
        if total == 0 {
            0.0
        } else {
            self.miss_count as f64 / total as f64
        }
    }

    /// Latency at the given percentile, `Duration::ZERO` before any operation.
    pub fn latency(&self, percentile: LatencyPercentile) -> Duration {
        if self.latency_histogram.is_empty() {
            return Duration::ZERO;
        }

        let micros = self
            .latency_histogram
            .value_at_quantile(percentile.as_quantile());

        Duration::from_micros(micros)
    }

    /// Number of operations whose latency was sampled.
    #[inline]
    pub fn operation_count(&self) -> u64 {
        self.latency_histogram.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_clamping() {
        let config = MetricsConfig::new(Duration::ZERO, 9);

        assert_eq!(config.max_latency(), Duration::from_micros(2));
        assert_eq!(config.precision(), 5);

        // The clamped bounds must always build a histogram.
        let _ = Metrics::new(config);
    }

    #[test]
    fn test_hit_and_miss_rates() {
        let mut metrics = Metrics::default();

        for _ in 0..3 {
            metrics.record_hit();
        }
        metrics.record_miss();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.hit_count(), 3);
        assert_eq!(snapshot.miss_count(), 1);
        assert!((snapshot.hit_rate() - 0.75).abs() < f64::EPSILON);
        assert!((snapshot.miss_rate() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_snapshot_safety() {
        let snapshot = Metrics::default().snapshot();

        assert_eq!(snapshot.hit_rate(), 0.0);
        assert_eq!(snapshot.miss_rate(), 0.0);
        assert_eq!(snapshot.operation_count(), 0);
        assert_eq!(snapshot.latency(LatencyPercentile::P99), Duration::ZERO);
    }

    #[test]
    fn test_mutation_counters() {
        let mut metrics = Metrics::default();

        metrics.record_insert();
        metrics.record_insert();
        metrics.record_update();
        metrics.record_delete();
        metrics.record_eviction();
        metrics.record_handler_failure();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.insert_count(), 2);
        assert_eq!(snapshot.update_count(), 1);
        assert_eq!(snapshot.delete_count(), 1);
        assert_eq!(snapshot.eviction_count(), 1);
        assert_eq!(snapshot.handler_failure_count(), 1);
    }

    #[test]
    fn test_latency_distribution() {
        let mut metrics = Metrics::default();

        for micros in 1..=100 {
            metrics.record_latency(Duration::from_micros(micros));
        }

        let snapshot = metrics.snapshot();
        let p50 = snapshot.latency(LatencyPercentile::P50).as_micros();
        let p99 = snapshot.latency(LatencyPercentile::P99).as_micros();

        assert_eq!(snapshot.operation_count(), 100);
        assert!((49..=51).contains(&p50), "p50 was {p50}");
        assert!((98..=100).contains(&p99), "p99 was {p99}");
    }

    #[test]
    fn test_latency_saturates_at_bound() {
        let mut metrics = Metrics::new(MetricsConfig::new(Duration::from_millis(1), 2));

        metrics.record_latency(Duration::from_secs(5));

        let snapshot = metrics.snapshot();
        let max = snapshot.latency(LatencyPercentile::P999);
        assert!(max <= Duration::from_micros(1_100), "max was {max:?}");
    }

    #[test]
    fn test_snapshot_independence() {
        let mut metrics = Metrics::default();
        metrics.record_hit();

        let snapshot = metrics.snapshot();
        metrics.record_hit();

        assert_eq!(snapshot.hit_count(), 1);
        assert_eq!(metrics.snapshot().hit_count(), 2);
    }
}
