//! # Cuckoo Filter
//!
//! Approximate set membership with deletion: a cuckoo filter stores a small
//! fingerprint of each key in one of two candidate buckets, and relocates
//! ("kicks") existing fingerprints to their other bucket to make room.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): Pure logic, no I/O
//!   - `hash_functions`: MurmurHash3 x86_32, fingerprints, bucket addressing
//!   - `Bucket`: Fixed-capacity fingerprint slots
//!   - `CuckooFilter`: One table with bounded displacement
//!   - `DynamicCuckooFilter`: Grows by appending shards
//!   - `CuckooConfig` / `CuckooConfigBuilder`: Validated configuration
//!
//! - **Metrics** (`metrics`): Counters for kicks, rejected inserts and
//!   lookup hit rate, behind the `MetricsRecorder` trait
//!
//! ## Invariants
//!
//! - **No false negatives**: a key whose insert returned `true` is found by
//!   `lookup` until it is removed
//! - **Two homes**: every stored fingerprint sits in one of its own two
//!   candidate buckets, however often it has been displaced
//! - **Bounded inserts**: an insert performs at most `max_kicks`
//!   displacements, and a rejected insert leaves the table unchanged
//!
//! ## Concurrency
//!
//! Filters are plain owned values with `&mut self` mutators. Wrap one in a
//! lock to share it between threads.
//!
//! ## Usage Example
//!
//! ```
//! use cuckoo_filter::{CuckooConfig, DynamicCuckooFilter};
//!
//! let config = CuckooConfig::new(1024, 4, 16)?;
//! let mut filter = DynamicCuckooFilter::seeded(&config, 42)?;
//!
//! assert!(filter.insert(b"ATCGATCGATCG"));
//! assert!(filter.lookup(b"ATCGATCGATCG"));
//!
//! assert!(filter.remove(b"ATCGATCGATCG"));
//! assert!(!filter.lookup(b"ATCGATCGATCG"));
//! # Ok::<(), cuckoo_filter::ConfigError>(())
//! ```

pub mod domain;
pub mod error;
pub mod metrics;

// Re-exports for convenience
pub use domain::{
    Bucket, CuckooConfig, CuckooConfigBuilder, CuckooFilter, DynamicCuckooFilter, Fingerprint,
};
pub use error::ConfigError;
pub use metrics::{Metrics, MetricsRecorder, MetricsSnapshot, NoOpMetrics};
