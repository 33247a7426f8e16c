//! Metrics hooks for cuckoo filter operations
//!
//! Provides instrumentation points for monitoring insert pressure (kicks,
//! rejected inserts), lookup hit rates and shard growth.
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//! use cuckoo_filter::{CuckooConfig, CuckooFilter, Metrics};
//!
//! let metrics = Arc::new(Metrics::new());
//! let mut filter = CuckooFilter::seeded(&CuckooConfig::default(), 7)
//!     .unwrap()
//!     .with_metrics(metrics.clone());
//!
//! filter.insert(b"key");
//! filter.lookup(b"key");
//!
//! let snapshot = metrics.snapshot();
//! assert_eq!(snapshot.inserts, 1);
//! assert_eq!(snapshot.lookups_positive, 1);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Metrics collector for cuckoo filter operations
///
/// Thread-safe counters, so one collector can be shared by many filters.
#[derive(Debug, Default)]
pub struct Metrics {
    /// Successful inserts
    pub inserts: AtomicU64,
    /// Inserts rejected after exhausting the kick budget
    pub insert_failures: AtomicU64,
    /// Total displacements performed, successful or not
    pub kicks: AtomicU64,
    /// Total lookups performed
    pub lookups: AtomicU64,
    /// Lookups that returned true (possibly false positives)
    pub lookups_positive: AtomicU64,
    /// Successful removals
    pub removals: AtomicU64,
    /// Removals that found nothing
    pub removals_missed: AtomicU64,
    /// Shards appended by dynamic growth
    pub shards_created: AtomicU64,
    /// Cumulative insert time in nanoseconds
    pub insert_time_ns: AtomicU64,
    /// Cumulative lookup time in nanoseconds
    pub lookup_time_ns: AtomicU64,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an insert attempt
    ///
    /// # Arguments
    /// * `kicks` - Displacements performed by this insert
    /// * `inserted` - Whether the fingerprint was stored
    /// * `duration` - Time taken
    pub fn record_insert(&self, kicks: usize, inserted: bool, duration: Duration) {
        if inserted {
            self.inserts.fetch_add(1, Ordering::Relaxed);
        } else {
            self.insert_failures.fetch_add(1, Ordering::Relaxed);
        }
        self.kicks.fetch_add(kicks as u64, Ordering::Relaxed);
        self.insert_time_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    /// Record lookup operation
    pub fn record_lookup(&self, duration: Duration, found: bool) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        self.lookup_time_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
        if found {
            self.lookups_positive.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record removal operation
    pub fn record_remove(&self, removed: bool) {
        if removed {
            self.removals.fetch_add(1, Ordering::Relaxed);
        } else {
            self.removals_missed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a shard appended by dynamic growth
    pub fn record_shard_created(&self, _num_buckets: usize, _bucket_size: usize) {
        self.shards_created.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            inserts: self.inserts.load(Ordering::Relaxed),
            insert_failures: self.insert_failures.load(Ordering::Relaxed),
            kicks: self.kicks.load(Ordering::Relaxed),
            lookups: self.lookups.load(Ordering::Relaxed),
            lookups_positive: self.lookups_positive.load(Ordering::Relaxed),
            removals: self.removals.load(Ordering::Relaxed),
            removals_missed: self.removals_missed.load(Ordering::Relaxed),
            shards_created: self.shards_created.load(Ordering::Relaxed),
            avg_insert_ns: self.avg_insert_time_ns(),
            avg_lookup_ns: self.avg_lookup_time_ns(),
        }
    }

    /// Average insert time in nanoseconds, over successful and failed inserts
    pub fn avg_insert_time_ns(&self) -> u64 {
        let total = self.insert_time_ns.load(Ordering::Relaxed);
        let count = self.inserts.load(Ordering::Relaxed)
            + self.insert_failures.load(Ordering::Relaxed);
        if count > 0 {
            total / count
        } else {
            0
        }
    }

    /// Average lookup time in nanoseconds
    pub fn avg_lookup_time_ns(&self) -> u64 {
        let total = self.lookup_time_ns.load(Ordering::Relaxed);
        let count = self.lookups.load(Ordering::Relaxed);
        if count > 0 {
            total / count
        } else {
            0
        }
    }

    /// Ratio of positive lookups to total lookups.
    ///
    /// Includes true positives as well as false positives.
    pub fn observed_positive_rate(&self) -> f64 {
        let total = self.lookups.load(Ordering::Relaxed);
        let positive = self.lookups_positive.load(Ordering::Relaxed);
        if total > 0 {
            positive as f64 / total as f64
        } else {
            0.0
        }
    }

    /// Reset all counters
    pub fn reset(&self) {
        self.inserts.store(0, Ordering::Relaxed);
        self.insert_failures.store(0, Ordering::Relaxed);
        self.kicks.store(0, Ordering::Relaxed);
        self.lookups.store(0, Ordering::Relaxed);
        self.lookups_positive.store(0, Ordering::Relaxed);
        self.removals.store(0, Ordering::Relaxed);
        self.removals_missed.store(0, Ordering::Relaxed);
        self.shards_created.store(0, Ordering::Relaxed);
        self.insert_time_ns.store(0, Ordering::Relaxed);
        self.lookup_time_ns.store(0, Ordering::Relaxed);
    }
}

/// Point-in-time metrics snapshot
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MetricsSnapshot {
    pub inserts: u64,
    pub insert_failures: u64,
    pub kicks: u64,
    pub lookups: u64,
    pub lookups_positive: u64,
    pub removals: u64,
    pub removals_missed: u64,
    pub shards_created: u64,
    pub avg_insert_ns: u64,
    pub avg_lookup_ns: u64,
}

/// Trait for custom metrics recording implementations
///
/// Implement this trait to integrate with external metrics systems
/// like Prometheus, StatsD, or OpenTelemetry.
pub trait MetricsRecorder: Send + Sync {
    /// Whether operations should be timed for this recorder.
    ///
    /// When `false`, filters skip reading the clock and report
    /// `Duration::ZERO`.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Record an insert attempt and the kicks it performed
    fn record_insert(&self, kicks: usize, inserted: bool, duration: Duration);

    /// Record lookup operation
    fn record_lookup(&self, duration: Duration, found: bool);

    /// Record removal operation
    fn record_remove(&self, removed: bool);

    /// Record shard creation
    fn record_shard_created(&self, num_buckets: usize, bucket_size: usize);
}

/// No-op metrics recorder for when metrics are disabled
#[derive(Debug, Default)]
pub struct NoOpMetrics;

impl MetricsRecorder for NoOpMetrics {
    fn is_enabled(&self) -> bool {
        false
    }

    fn record_insert(&self, _: usize, _: bool, _: Duration) {}
    fn record_lookup(&self, _: Duration, _: bool) {}
    fn record_remove(&self, _: bool) {}
    fn record_shard_created(&self, _: usize, _: usize) {}
}

impl MetricsRecorder for Metrics {
    fn record_insert(&self, kicks: usize, inserted: bool, duration: Duration) {
        Metrics::record_insert(self, kicks, inserted, duration);
    }

    fn record_lookup(&self, duration: Duration, found: bool) {
        Metrics::record_lookup(self, duration, found);
    }

    fn record_remove(&self, removed: bool) {
        Metrics::record_remove(self, removed);
    }

    fn record_shard_created(&self, num_buckets: usize, bucket_size: usize) {
        Metrics::record_shard_created(self, num_buckets, bucket_size);
    }
}
