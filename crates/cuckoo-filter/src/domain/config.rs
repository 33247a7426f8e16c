//! Cuckoo filter configuration and validation
//!
//! # Example
//!
//! ```
//! use cuckoo_filter::domain::CuckooConfigBuilder;
//!
//! let config = CuckooConfigBuilder::new()
//!     .capacity(10_000)
//!     .target_fpr(0.001)
//!     .expansion(2)
//!     .build()
//!     .expect("valid config");
//! assert!(config.num_buckets.is_power_of_two());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

use super::hash_functions::MAX_FINGERPRINT_BITS;
use super::parameters::{
    buckets_for_capacity, fingerprint_bits_for_fpr, validate_fpr, TARGET_LOAD_FACTOR,
};

/// Default number of buckets.
pub const DEFAULT_BUCKET_COUNT: usize = 1024;

/// Default entries per bucket.
pub const DEFAULT_BUCKET_SIZE: usize = 4;

/// Default fingerprint size in bits.
pub const DEFAULT_FINGERPRINT_BITS: u8 = 16;

/// Maximum number of kicks before giving up.
pub const DEFAULT_MAX_KICKS: usize = 500;

/// Default growth multiplier for new shards.
pub const DEFAULT_EXPANSION: usize = 2;

/// Cuckoo filter configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CuckooConfig {
    /// Bucket count of a standalone filter, or of the first shard of a
    /// dynamic filter. Rounded up to a power of two on construction.
    pub num_buckets: usize,
    /// Slots per bucket
    pub bucket_size: usize,
    /// Fingerprint width in bits (1 to 32)
    pub fingerprint_bits: u8,
    /// Displacement budget of a single insert
    pub max_kicks: usize,
    /// Bucket-count multiplier applied to the newest shard when a dynamic
    /// filter grows (1 = same size)
    pub expansion: usize,
}

impl Default for CuckooConfig {
    fn default() -> Self {
        Self {
            num_buckets: DEFAULT_BUCKET_COUNT,
            bucket_size: DEFAULT_BUCKET_SIZE,
            fingerprint_bits: DEFAULT_FINGERPRINT_BITS,
            max_kicks: DEFAULT_MAX_KICKS,
            expansion: DEFAULT_EXPANSION,
        }
    }
}

impl CuckooConfig {
    /// Create a validated configuration with default kick budget and expansion
    pub fn new(
        num_buckets: usize,
        bucket_size: usize,
        fingerprint_bits: u8,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            num_buckets,
            bucket_size,
            fingerprint_bits,
            ..Default::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate all parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_buckets == 0 {
            return Err(ConfigError::ZeroBucketCount);
        }

        if self.bucket_size == 0 {
            return Err(ConfigError::ZeroBucketSize);
        }

        if self.fingerprint_bits == 0 || self.fingerprint_bits > MAX_FINGERPRINT_BITS {
            return Err(ConfigError::InvalidFingerprintBits {
                bits: self.fingerprint_bits,
            });
        }

        if self.max_kicks == 0 {
            return Err(ConfigError::ZeroMaxKicks);
        }

        if self.expansion == 0 {
            return Err(ConfigError::InvalidExpansion {
                factor: self.expansion,
            });
        }

        self.table_buckets().map(|_| ())
    }

    /// Bucket count actually allocated: `num_buckets` rounded up to a power
    /// of two.
    pub fn table_buckets(&self) -> Result<usize, ConfigError> {
        if self.num_buckets == 0 {
            return Err(ConfigError::ZeroBucketCount);
        }
        self.num_buckets
            .checked_next_power_of_two()
            .ok_or(ConfigError::BucketCountOverflow {
                requested: self.num_buckets,
            })
    }

    /// Builder-style method to set the kick budget
    pub fn with_max_kicks(mut self, max_kicks: usize) -> Self {
        self.max_kicks = max_kicks;
        self
    }

    /// Builder-style method to set the expansion factor
    pub fn with_expansion(mut self, expansion: usize) -> Self {
        self.expansion = expansion;
        self
    }

    /// Builder-style method to set the bucket count
    pub fn with_num_buckets(mut self, num_buckets: usize) -> Self {
        self.num_buckets = num_buckets;
        self
    }
}

/// Builder for CuckooConfig with validation
///
/// Explicit `num_buckets` / `fingerprint_bits` take precedence over values
/// derived from `capacity` / `target_fpr`.
#[derive(Default)]
pub struct CuckooConfigBuilder {
    num_buckets: Option<usize>,
    bucket_size: Option<usize>,
    fingerprint_bits: Option<u8>,
    max_kicks: Option<usize>,
    expansion: Option<usize>,
    capacity: Option<usize>,
    target_fpr: Option<f64>,
}

impl CuckooConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bucket count explicitly
    pub fn num_buckets(mut self, num_buckets: usize) -> Self {
        self.num_buckets = Some(num_buckets);
        self
    }

    /// Set slots per bucket
    pub fn bucket_size(mut self, bucket_size: usize) -> Self {
        self.bucket_size = Some(bucket_size);
        self
    }

    /// Set fingerprint width explicitly
    pub fn fingerprint_bits(mut self, bits: u8) -> Self {
        self.fingerprint_bits = Some(bits);
        self
    }

    /// Set the kick budget
    pub fn max_kicks(mut self, max_kicks: usize) -> Self {
        self.max_kicks = Some(max_kicks);
        self
    }

    /// Set the shard growth multiplier
    pub fn expansion(mut self, expansion: usize) -> Self {
        self.expansion = Some(expansion);
        self
    }

    /// Size the table for this many keys
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Size fingerprints for this false positive rate
    pub fn target_fpr(mut self, fpr: f64) -> Self {
        self.target_fpr = Some(fpr);
        self
    }

    /// Build the CuckooConfig, validating all parameters
    pub fn build(self) -> Result<CuckooConfig, ConfigError> {
        let defaults = CuckooConfig::default();
        let bucket_size = self.bucket_size.unwrap_or(defaults.bucket_size);

        let num_buckets = match (self.num_buckets, self.capacity) {
            (Some(n), _) => n,
            (None, Some(capacity)) => {
                buckets_for_capacity(capacity, bucket_size, TARGET_LOAD_FACTOR)?
            }
            (None, None) => defaults.num_buckets,
        };

        let fingerprint_bits = match (self.fingerprint_bits, self.target_fpr) {
            (Some(bits), _) => bits,
            (None, Some(fpr)) => {
                validate_fpr(fpr)?;
                fingerprint_bits_for_fpr(bucket_size, fpr)
            }
            (None, None) => defaults.fingerprint_bits,
        };

        let config = CuckooConfig {
            num_buckets,
            bucket_size,
            fingerprint_bits,
            max_kicks: self.max_kicks.unwrap_or(defaults.max_kicks),
            expansion: self.expansion.unwrap_or(defaults.expansion),
        };

        config.validate()?;
        Ok(config)
    }
}
