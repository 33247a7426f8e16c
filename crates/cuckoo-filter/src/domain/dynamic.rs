//! # Dynamic Cuckoo Filter
//!
//! Growable sequence of [`CuckooFilter`] shards sharing bucket size and
//! fingerprint width.
//!
//! ## Growth
//!
//! When every shard rejects a key, a new shard is appended with
//! `expansion` times the newest shard's bucket count. Existing shards are
//! never resized or rehashed, so growth costs one allocation and no moves.
//!
//! ## Shard order
//!
//! Inserts and removals try the newest shard first and fall back to older
//! ones. Lookups probe every shard, since the shard holding a key is not
//! tracked.

use std::fmt;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::{info, warn};

use crate::error::ConfigError;
use crate::metrics::{MetricsRecorder, NoOpMetrics};

use super::config::CuckooConfig;
use super::cuckoo::CuckooFilter;

/// Cuckoo filter that grows by appending shards.
#[derive(Clone)]
pub struct DynamicCuckooFilter<R = StdRng> {
    shards: Vec<CuckooFilter<R>>,
    config: CuckooConfig,
    rng: R,
    metrics: Arc<dyn MetricsRecorder>,
}

impl DynamicCuckooFilter<StdRng> {
    /// Create a filter with one shard of `init_buckets` buckets.
    pub fn new(
        init_buckets: usize,
        bucket_size: usize,
        fingerprint_bits: u8,
    ) -> Result<Self, ConfigError> {
        Self::from_config(&CuckooConfig::new(
            init_buckets,
            bucket_size,
            fingerprint_bits,
        )?)
    }

    /// Create a filter seeded from OS entropy.
    pub fn from_config(config: &CuckooConfig) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create a filter whose kick sequences, in every shard, are fixed by
    /// `seed`.
    pub fn seeded(config: &CuckooConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: RngCore + SeedableRng> DynamicCuckooFilter<R> {
    /// Create a filter whose shards derive their random sources from `rng`.
    pub fn with_rng(config: &CuckooConfig, mut rng: R) -> Result<Self, ConfigError> {
        let first = CuckooFilter::with_rng(config, R::seed_from_u64(rng.next_u64()))?;
        Ok(Self {
            shards: vec![first],
            config: config.clone(),
            rng,
            metrics: Arc::new(NoOpMetrics),
        })
    }

    /// Report operations of every current and future shard to `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsRecorder>) -> Self {
        self.shards = self
            .shards
            .into_iter()
            .map(|shard| shard.with_metrics(Arc::clone(&metrics)))
            .collect();
        self.metrics = metrics;
        self
    }

    /// Insert a key, growing the filter if no shard has room.
    ///
    /// Returns `false` only if a freshly appended shard also rejects the
    /// key; the filter does not keep expanding for a single insert.
    pub fn insert<K: AsRef<[u8]> + ?Sized>(&mut self, key: &K) -> bool {
        if self.shards.iter_mut().rev().any(|shard| shard.insert(key)) {
            return true;
        }

        self.expand();
        if let Some(newest) = self.shards.last_mut() {
            if newest.insert(key) {
                return true;
            }
        }

        warn!(
            shard_count = self.shards.len(),
            "Newly appended shard rejected key"
        );
        false
    }

    /// Check if a key might be in any shard.
    pub fn lookup<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> bool {
        self.shards.iter().any(|shard| shard.lookup(key))
    }

    /// Remove one copy of a key from the newest shard holding it.
    pub fn remove<K: AsRef<[u8]> + ?Sized>(&mut self, key: &K) -> bool {
        self.shards.iter_mut().rev().any(|shard| shard.remove(key))
    }

    /// Append an empty shard.
    ///
    /// Its bucket count is the newest shard's times `expansion`, kept at the
    /// newest shard's size if that would overflow.
    pub fn expand(&mut self) {
        let newest = self
            .shards
            .last()
            .map_or(self.config.num_buckets, CuckooFilter::num_buckets);
        let num_buckets = newest
            .checked_mul(self.config.expansion)
            .and_then(usize::checked_next_power_of_two)
            .unwrap_or(newest);

        let rng = R::seed_from_u64(self.rng.next_u64());
        let shard = CuckooFilter::from_validated(&self.config, num_buckets, rng)
            .with_metrics(Arc::clone(&self.metrics));

        info!(
            shard = self.shards.len(),
            num_buckets,
            bucket_size = self.config.bucket_size,
            "Appended cuckoo filter shard"
        );
        self.metrics
            .record_shard_created(num_buckets, self.config.bucket_size);
        self.shards.push(shard);
    }

    /// Occupied slots across all shards.
    pub fn total_size(&self) -> usize {
        self.shards.iter().map(CuckooFilter::size).sum()
    }

    /// Check if no shard holds anything.
    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(CuckooFilter::is_empty)
    }

    /// Slots across all shards.
    pub fn capacity(&self) -> usize {
        self.shards.iter().map(CuckooFilter::capacity).sum()
    }

    /// Fraction of all slots occupied.
    pub fn load_factor(&self) -> f64 {
        self.total_size() as f64 / self.capacity() as f64
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Shards in creation order.
    pub fn shards(&self) -> &[CuckooFilter<R>] {
        &self.shards
    }

    pub fn config(&self) -> &CuckooConfig {
        &self.config
    }
}

impl<R> fmt::Debug for DynamicCuckooFilter<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicCuckooFilter")
            .field("config", &self.config)
            .field("shards", &self.shards)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Metrics;

    /// Fill a (4, 2, 8) shard without any kicks, in this order.
    const FILL_KEYS: [&str; 8] = [
        "key-0", "key-1", "key-2", "key-3", "key-4", "key-5", "key-8", "key-9",
    ];

    fn small_config(expansion: usize) -> CuckooConfig {
        CuckooConfig::new(4, 2, 8).unwrap().with_expansion(expansion)
    }

    fn shard_sizes<R>(filter: &DynamicCuckooFilter<R>) -> Vec<usize>
    where
        R: RngCore + SeedableRng,
    {
        filter.shards().iter().map(CuckooFilter::size).collect()
    }

    #[test]
    fn test_new_starts_with_one_shard() {
        let filter = DynamicCuckooFilter::new(16, 4, 16).unwrap();
        assert_eq!(filter.shard_count(), 1);
        assert_eq!(filter.total_size(), 0);
        assert!(filter.is_empty());
        assert_eq!(filter.capacity(), 64);
    }

    #[test]
    fn test_new_rejects_invalid_parameters() {
        assert_eq!(
            DynamicCuckooFilter::new(0, 4, 16).unwrap_err(),
            ConfigError::ZeroBucketCount
        );
        assert_eq!(
            DynamicCuckooFilter::new(4, 0, 16).unwrap_err(),
            ConfigError::ZeroBucketSize
        );
        let bad = CuckooConfig::default().with_expansion(0);
        assert_eq!(
            DynamicCuckooFilter::from_config(&bad).unwrap_err(),
            ConfigError::InvalidExpansion { factor: 0 }
        );
    }

    #[test]
    fn test_insert_lookup_remove() {
        let mut filter = DynamicCuckooFilter::new(64, 4, 16).unwrap();

        assert!(filter.insert("alpha"));
        assert!(filter.lookup("alpha"));
        assert!(!filter.lookup("beta"));

        assert!(filter.remove("alpha"));
        assert!(!filter.lookup("alpha"));
        assert!(!filter.remove("alpha"));
    }

    #[test]
    fn test_saturated_shard_grows_on_insert() {
        let mut filter = DynamicCuckooFilter::seeded(&small_config(2), 11).unwrap();

        for key in FILL_KEYS {
            assert!(filter.insert(key));
        }
        assert_eq!(filter.shard_count(), 1);
        assert_eq!(filter.total_size(), 8);

        // The first shard is full, so this appends a shard
        assert!(filter.insert("key-6"));
        assert_eq!(filter.shard_count(), 2);
        assert_eq!(filter.shards()[1].num_buckets(), 8);
        assert_eq!(shard_sizes(&filter), vec![8, 1]);
        assert_eq!(filter.total_size(), 9);

        for key in FILL_KEYS.iter().chain(&["key-6"]) {
            assert!(filter.lookup(key));
        }
    }

    #[test]
    fn test_explicit_expand_then_insert() {
        let mut filter = DynamicCuckooFilter::seeded(&small_config(1), 4).unwrap();
        for key in FILL_KEYS {
            filter.insert(key);
        }

        // key-6 cannot fit in the original shard
        let mut probe = filter.shards()[0].clone();
        assert!(!probe.insert("key-6"));

        filter.expand();
        assert_eq!(filter.shard_count(), 2);
        assert!(filter.insert("key-6"));
        assert_eq!(filter.shard_count(), 2);
        assert_eq!(shard_sizes(&filter), vec![8, 1]);
        assert_eq!(filter.total_size(), 9);
    }

    #[test]
    fn test_geometric_expansion() {
        let mut filter = DynamicCuckooFilter::seeded(&small_config(2), 0).unwrap();
        filter.expand();
        filter.expand();
        filter.expand();

        let sizes: Vec<usize> = filter
            .shards()
            .iter()
            .map(CuckooFilter::num_buckets)
            .collect();
        assert_eq!(sizes, vec![4, 8, 16, 32]);
        assert_eq!(filter.capacity(), (4 + 8 + 16 + 32) * 2);
    }

    #[test]
    fn test_expansion_factor_one_keeps_size() {
        let mut filter = DynamicCuckooFilter::seeded(&small_config(1), 0).unwrap();
        filter.expand();
        filter.expand();

        assert!(filter
            .shards()
            .iter()
            .all(|shard| shard.num_buckets() == 4));
    }

    #[test]
    fn test_expand_preserves_existing_entries() {
        let mut filter = DynamicCuckooFilter::seeded(&small_config(2), 21).unwrap();
        for key in FILL_KEYS {
            filter.insert(key);
        }
        let before = filter.shards()[0].buckets().to_vec();

        filter.expand();

        assert_eq!(filter.shards()[0].buckets(), before.as_slice());
        for key in FILL_KEYS {
            assert!(filter.lookup(key));
        }
    }

    #[test]
    fn test_remove_prefers_newest_shard() {
        let mut filter = DynamicCuckooFilter::seeded(&small_config(2), 9).unwrap();

        assert!(filter.insert("x"));
        filter.expand();
        assert!(filter.insert("x"));
        assert_eq!(shard_sizes(&filter), vec![1, 1]);

        assert!(filter.remove("x"));
        assert_eq!(shard_sizes(&filter), vec![1, 0]);
        assert!(filter.lookup("x"));

        assert!(filter.remove("x"));
        assert_eq!(shard_sizes(&filter), vec![0, 0]);
        assert!(!filter.lookup("x"));
    }

    #[test]
    fn test_lookup_probes_older_shards() {
        let mut filter = DynamicCuckooFilter::seeded(&small_config(2), 9).unwrap();
        assert!(filter.insert("old"));
        filter.expand();
        filter.expand();

        assert!(filter.lookup("old"));
        assert!(filter.remove("old"));
        assert!(filter.is_empty());
    }

    #[test]
    fn test_many_inserts_never_fail() {
        let mut filter = DynamicCuckooFilter::seeded(&small_config(2), 31).unwrap();

        for i in 0..2000u32 {
            assert!(filter.insert(&i.to_le_bytes()));
        }

        assert_eq!(filter.total_size(), 2000);
        assert!(filter.shard_count() > 1);
        assert!(filter.load_factor() <= 1.0);
        for i in 0..2000u32 {
            assert!(filter.lookup(&i.to_le_bytes()));
        }
    }

    #[test]
    fn test_seeded_filters_replay_identically() {
        let mut a = DynamicCuckooFilter::seeded(&small_config(2), 123).unwrap();
        let mut b = DynamicCuckooFilter::seeded(&small_config(2), 123).unwrap();

        for i in 0..500u32 {
            let key = i.to_be_bytes();
            assert_eq!(a.insert(&key), b.insert(&key));
        }

        assert_eq!(a.shard_count(), b.shard_count());
        for (left, right) in a.shards().iter().zip(b.shards()) {
            assert_eq!(left.buckets(), right.buckets());
        }
    }

    #[test]
    fn test_metrics_shared_with_new_shards() {
        let metrics = Arc::new(Metrics::new());
        let mut filter = DynamicCuckooFilter::seeded(&small_config(2), 17)
            .unwrap()
            .with_metrics(metrics.clone());

        for key in FILL_KEYS {
            filter.insert(key);
        }
        filter.insert("key-6");

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.shards_created, 1);
        assert_eq!(snapshot.inserts, 9);
        assert_eq!(snapshot.insert_failures, 1);
    }
}
