//! # Cuckoo Filter
//!
//! Fixed-size table of buckets supporting insert, lookup and deletion.
//!
//! ## Addressing
//!
//! Every key has two candidate buckets:
//!
//! ```text
//! i1 = murmur3(key) mod N
//! i2 = i1 ^ murmur3(fingerprint) mod N
//! ```
//!
//! Because `N` is a power of two, `i1` can be recovered from `i2` and the
//! fingerprint alone. That is what lets the kick loop move a stored
//! fingerprint to its other bucket without knowing the key it came from.
//!
//! ## Invariants
//!
//! - Every stored fingerprint sits in one of its own two candidate buckets.
//! - No false negatives: a key whose insert returned `true` stays visible to
//!   `lookup` until it is removed, including across inserts that fail.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::metrics::{MetricsRecorder, NoOpMetrics};

use super::bucket::Bucket;
use super::config::CuckooConfig;
use super::hash_functions::{alternate_bucket, fingerprint, primary_bucket, Fingerprint};

/// Cuckoo filter for probabilistic membership testing with deletion.
///
/// `R` is the random source used to pick eviction victims. Seed it to make
/// kick sequences reproducible.
#[derive(Clone)]
pub struct CuckooFilter<R = StdRng> {
    buckets: Vec<Bucket>,
    num_buckets: usize,
    bucket_size: usize,
    fingerprint_bits: u8,
    max_kicks: usize,
    count: usize,
    rng: R,
    metrics: Arc<dyn MetricsRecorder>,
}

impl CuckooFilter<StdRng> {
    /// Create a filter with the default kick budget.
    ///
    /// `num_buckets` is rounded up to a power of two.
    pub fn new(
        num_buckets: usize,
        bucket_size: usize,
        fingerprint_bits: u8,
    ) -> Result<Self, ConfigError> {
        Self::from_config(&CuckooConfig::new(
            num_buckets,
            bucket_size,
            fingerprint_bits,
        )?)
    }

    /// Create a filter seeded from OS entropy.
    pub fn from_config(config: &CuckooConfig) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create a filter whose kick sequence is fixed by `seed`.
    pub fn seeded(config: &CuckooConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: RngCore> CuckooFilter<R> {
    /// Create a filter drawing eviction choices from `rng`.
    pub fn with_rng(config: &CuckooConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let num_buckets = config.table_buckets()?;
        if num_buckets != config.num_buckets {
            debug!(
                requested = config.num_buckets,
                allocated = num_buckets,
                "Rounded bucket count up to a power of two"
            );
        }

        Ok(Self::from_validated(config, num_buckets, rng))
    }

    /// Build from a config that already passed validation, with
    /// `num_buckets` already a power of two.
    pub(crate) fn from_validated(config: &CuckooConfig, num_buckets: usize, rng: R) -> Self {
        debug_assert!(num_buckets.is_power_of_two());
        Self {
            buckets: vec![Bucket::new(config.bucket_size); num_buckets],
            num_buckets,
            bucket_size: config.bucket_size,
            fingerprint_bits: config.fingerprint_bits,
            max_kicks: config.max_kicks,
            count: 0,
            rng,
            metrics: Arc::new(NoOpMetrics),
        }
    }

    /// Report operations to `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsRecorder>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Insert a key.
    ///
    /// Returns `true` if stored, `false` if the kick budget ran out. A
    /// rejected insert leaves the table exactly as it was. Duplicates are not
    /// detected: inserting a key twice stores two fingerprints.
    pub fn insert<K: AsRef<[u8]> + ?Sized>(&mut self, key: &K) -> bool {
        let start = self.start_timer();
        let key = key.as_ref();
        let (fp, i1, i2) = self.indices(key);

        let (inserted, kicks) = if self.buckets[i1].insert(fp) || self.buckets[i2].insert(fp) {
            (true, 0)
        } else {
            self.relocate(fp, i1)
        };

        if inserted {
            self.count += 1;
        } else {
            debug!(
                key_len = key.len(),
                primary = i1,
                alternate = i2,
                kicks,
                load_factor = self.load_factor(),
                "Cuckoo insert exhausted kick budget"
            );
        }

        self.metrics
            .record_insert(kicks, inserted, elapsed_since(start));
        inserted
    }

    /// Displace fingerprints until `fp` finds a home.
    ///
    /// Returns whether it succeeded and how many kicks it took. On failure
    /// every displacement is undone in reverse order.
    fn relocate(&mut self, fp: Fingerprint, start: usize) -> (bool, usize) {
        let mut path: Vec<(usize, usize)> = Vec::new();
        let mut pending = fp;
        let mut index = start;

        for kick in 1..=self.max_kicks {
            let Some((slot, evicted)) = self.buckets[index].swap_random(pending, &mut self.rng)
            else {
                break;
            };
            path.push((index, slot));

            pending = evicted;
            index = alternate_bucket(index, pending, self.num_buckets);
            trace!(kick, bucket = index, "Displaced fingerprint");

            if self.buckets[index].insert(pending) {
                return (true, kick);
            }
        }

        let kicks = path.len();
        for (bucket, slot) in path.into_iter().rev() {
            pending = self.buckets[bucket].replace(slot, pending);
        }
        debug_assert_eq!(pending, fp);

        (false, kicks)
    }

    /// Check if a key might be in the filter.
    pub fn lookup<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> bool {
        let start = self.start_timer();
        let (fp, i1, i2) = self.indices(key.as_ref());
        let found = self.buckets[i1].contains(fp) || self.buckets[i2].contains(fp);
        self.metrics.record_lookup(elapsed_since(start), found);
        found
    }

    /// Remove one copy of a key's fingerprint.
    ///
    /// Returns `false` if neither candidate bucket holds it. A key sharing
    /// the fingerprint and buckets of another is indistinguishable from it,
    /// so only remove keys that were inserted.
    pub fn remove<K: AsRef<[u8]> + ?Sized>(&mut self, key: &K) -> bool {
        let (fp, i1, i2) = self.indices(key.as_ref());
        let removed = self.buckets[i1].remove(fp) || self.buckets[i2].remove(fp);
        if removed {
            self.count = self.count.saturating_sub(1);
        }
        self.metrics.record_remove(removed);
        removed
    }

    /// Stored copies of a key's fingerprint across its candidate buckets.
    ///
    /// May overcount when other keys share the fingerprint.
    pub fn count<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> usize {
        let (fp, i1, i2) = self.indices(key.as_ref());
        if i1 == i2 {
            self.buckets[i1].count(fp)
        } else {
            self.buckets[i1].count(fp) + self.buckets[i2].count(fp)
        }
    }

    /// Number of occupied slots.
    pub fn size(&self) -> usize {
        self.count
    }

    /// Check if filter is empty.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        self.num_buckets * self.bucket_size
    }

    /// Fraction of slots occupied.
    pub fn load_factor(&self) -> f64 {
        self.count as f64 / self.capacity() as f64
    }

    /// Number of buckets (always a power of two).
    pub fn num_buckets(&self) -> usize {
        self.num_buckets
    }

    pub fn bucket_size(&self) -> usize {
        self.bucket_size
    }

    pub fn fingerprint_bits(&self) -> u8 {
        self.fingerprint_bits
    }

    pub fn max_kicks(&self) -> usize {
        self.max_kicks
    }

    /// Read-only view of the bucket table.
    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    /// Read the clock only when the recorder wants timings.
    fn start_timer(&self) -> Option<Instant> {
        self.metrics.is_enabled().then(Instant::now)
    }

    /// Calculate fingerprint and two bucket indices.
    fn indices(&self, key: &[u8]) -> (Fingerprint, usize, usize) {
        let fp = fingerprint(key, self.fingerprint_bits);
        let i1 = primary_bucket(key, self.num_buckets);
        let i2 = alternate_bucket(i1, fp, self.num_buckets);
        (fp, i1, i2)
    }
}

fn elapsed_since(start: Option<Instant>) -> Duration {
    start.map_or(Duration::ZERO, |start| start.elapsed())
}

impl<R> fmt::Debug for CuckooFilter<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CuckooFilter")
            .field("num_buckets", &self.num_buckets)
            .field("bucket_size", &self.bucket_size)
            .field("fingerprint_bits", &self.fingerprint_bits)
            .field("max_kicks", &self.max_kicks)
            .field("count", &self.count)
            .finish_non_exhaustive()
    }
}
