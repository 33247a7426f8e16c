//! Domain Layer - Pure filter logic
//!
//! This layer contains:
//! - Hash functions (MurmurHash3 x86_32, fingerprints, bucket addressing)
//! - Fixed-capacity fingerprint buckets
//! - Single-table cuckoo filter with bounded displacement
//! - Dynamic cuckoo filter growing by shards
//! - Configuration and parameter derivation
//!
//! RULES:
//! - No I/O operations
//! - No async code
//! - Randomness only through an injected generator

pub mod bucket;
pub mod config;
pub mod cuckoo;
pub mod dynamic;
pub mod hash_functions;
pub mod parameters;

pub use bucket::{Bucket, EMPTY_SLOT};
pub use config::{CuckooConfig, CuckooConfigBuilder};
pub use cuckoo::CuckooFilter;
pub use dynamic::DynamicCuckooFilter;
pub use hash_functions::{
    alternate_bucket, digest, digest_u64, fingerprint, primary_bucket, Fingerprint,
};
pub use parameters::{calculate_optimal_parameters, expected_fpr, CuckooFilterParams};
