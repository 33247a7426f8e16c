//! Error types for the cuckoo filter

use thiserror::Error;

/// Invalid construction parameters.
///
/// Runtime operations never fail with an error: a rejected insert or a
/// missing key is reported as `false`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Bucket count must be greater than 0")]
    ZeroBucketCount,

    #[error("Bucket size must be greater than 0")]
    ZeroBucketSize,

    #[error("Invalid fingerprint width: {bits} bits (must be between 1 and 32)")]
    InvalidFingerprintBits { bits: u8 },

    #[error("Maximum kick count must be greater than 0")]
    ZeroMaxKicks,

    #[error("Invalid expansion factor: {factor} (must be at least 1)")]
    InvalidExpansion { factor: usize },

    #[error("Bucket count {requested} cannot be rounded up to a power of two")]
    BucketCountOverflow { requested: usize },

    #[error("Invalid false positive rate: {fpr} (must be between 0 and 1, exclusive)")]
    InvalidFalsePositiveRate { fpr: f64 },
}
