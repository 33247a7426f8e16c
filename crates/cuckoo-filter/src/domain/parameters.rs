//! Cuckoo filter sizing
//!
//! Formulas (C = bucket size, B = fingerprint bits):
//! - FPR <= 1 - (1 - 2^-B)^(2C)        -- 2C fingerprints compared per lookup
//! - B   = ceil(log2(2C / fpr))        -- narrowest width meeting a target FPR
//! - N   = next_pow2(ceil(n / (C * load)))

use crate::error::ConfigError;

use super::hash_functions::MAX_FINGERPRINT_BITS;

/// Bucket size used when deriving parameters from a capacity.
pub const DEFAULT_BUCKET_SIZE: usize = 4;

/// Load factor a filter sized by [`calculate_optimal_parameters`] is expected
/// to reach before inserts start failing.
pub const TARGET_LOAD_FACTOR: f64 = 0.95;

/// Derived cuckoo filter parameters
#[derive(Clone, Debug, PartialEq)]
pub struct CuckooFilterParams {
    /// Number of buckets (power of two)
    pub num_buckets: usize,
    /// Slots per bucket
    pub bucket_size: usize,
    /// Fingerprint width in bits
    pub fingerprint_bits: u8,
    /// Upper bound on the false positive rate with these parameters
    pub expected_fpr: f64,
}

/// Upper bound on the false positive rate of a lookup.
///
/// A lookup compares against at most `2 * bucket_size` stored fingerprints,
/// each matching by chance with probability `2^-bits`.
pub fn expected_fpr(bucket_size: usize, fingerprint_bits: u8) -> f64 {
    let miss = 1.0 - 2f64.powi(-(fingerprint_bits as i32));
    1.0 - miss.powi((2 * bucket_size) as i32)
}

/// Narrowest fingerprint width whose bound stays at or below `target_fpr`.
pub fn fingerprint_bits_for_fpr(bucket_size: usize, target_fpr: f64) -> u8 {
    let bits = ((2 * bucket_size) as f64 / target_fpr).log2().ceil();
    bits.clamp(1.0, MAX_FINGERPRINT_BITS as f64) as u8
}

/// Smallest power-of-two bucket count holding `capacity` keys at `max_load`.
pub fn buckets_for_capacity(
    capacity: usize,
    bucket_size: usize,
    max_load: f64,
) -> Result<usize, ConfigError> {
    if bucket_size == 0 {
        return Err(ConfigError::ZeroBucketSize);
    }
    let slots = (capacity as f64 / max_load).ceil() as usize;
    let buckets = slots.div_ceil(bucket_size).max(1);
    buckets
        .checked_next_power_of_two()
        .ok_or(ConfigError::BucketCountOverflow { requested: buckets })
}

/// Calculate parameters for `capacity` keys at a target false positive rate.
pub fn calculate_optimal_parameters(
    capacity: usize,
    target_fpr: f64,
) -> Result<CuckooFilterParams, ConfigError> {
    validate_fpr(target_fpr)?;

    let bucket_size = DEFAULT_BUCKET_SIZE;
    let num_buckets = buckets_for_capacity(capacity, bucket_size, TARGET_LOAD_FACTOR)?;
    let fingerprint_bits = fingerprint_bits_for_fpr(bucket_size, target_fpr);

    Ok(CuckooFilterParams {
        num_buckets,
        bucket_size,
        fingerprint_bits,
        expected_fpr: expected_fpr(bucket_size, fingerprint_bits),
    })
}

pub(crate) fn validate_fpr(fpr: f64) -> Result<(), ConfigError> {
    if fpr > 0.0 && fpr < 1.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidFalsePositiveRate { fpr })
    }
}
