//! Hash functions for the cuckoo filter
//!
//! Every function here is pure: the same input always yields the same
//! digest, fingerprint or bucket index, in any process.
//!
//! Three seeds keep the three derived quantities statistically independent:
//!
//! | Quantity | Input | Seed |
//! |----------|-------|------|
//! | Primary bucket | key bytes | `0x00000000` |
//! | Fingerprint | key bytes | `0xdeadbeef` |
//! | Alternate offset | fingerprint (4 LE bytes) | `0xcafebabe` |

use std::io::Cursor;

/// Fingerprint stored in a bucket slot. `0` marks an empty slot.
///
/// Slots are always 32 bits wide, whatever the configured fingerprint width,
/// so an 8-bit filter uses four times the memory of a byte-packed table.
pub type Fingerprint = u32;

/// Seed for the primary bucket hash.
pub const BUCKET_SEED: u32 = 0;

/// Seed for fingerprint derivation.
pub const FINGERPRINT_SEED: u32 = 0xdead_beef;

/// Seed for hashing a fingerprint into an alternate-bucket offset.
pub const ALTERNATE_SEED: u32 = 0xcafe_babe;

/// Widest supported fingerprint.
pub const MAX_FINGERPRINT_BITS: u8 = 32;

/// MurmurHash3 x86_32 over `data` with an explicit `seed`.
///
/// Blocks are decoded as little-endian words, so the result is the same on
/// every platform and matches the published reference vectors.
pub fn digest(data: &[u8], seed: u32) -> u32 {
    // Reading from a byte slice cannot fail
    murmur3::murmur3_32(&mut Cursor::new(data), seed).unwrap_or(0)
}

/// Digest of a `u64` value's little-endian bytes with the bucket seed.
pub fn digest_u64(value: u64) -> u32 {
    digest(&value.to_le_bytes(), BUCKET_SEED)
}

/// Derive a fingerprint in `[1, 2^bits - 1]` from `key`.
///
/// A masked value of `0` is replaced by `1`, so the empty-slot sentinel is
/// never produced. Widths above 32 are treated as 32.
pub fn fingerprint(key: &[u8], bits: u8) -> Fingerprint {
    let bits = bits.min(MAX_FINGERPRINT_BITS);
    let mask = ((1u64 << bits) - 1) as u32;
    match digest(key, FINGERPRINT_SEED) & mask {
        0 => 1,
        fp => fp,
    }
}

/// Primary bucket index of `key`.
///
/// # Panics
///
/// Panics if `num_buckets` is zero.
#[inline]
pub fn primary_bucket(key: &[u8], num_buckets: usize) -> usize {
    digest(key, BUCKET_SEED) as usize % num_buckets
}

/// Alternate bucket index for a fingerprint currently associated with
/// `bucket`: `(bucket ^ hash(fp)) mod num_buckets`.
///
/// When `num_buckets` is a power of two and `bucket < num_buckets`, applying
/// this twice with the same fingerprint returns the original bucket. Other
/// moduli break that symmetry, which is why filters round their bucket
/// count up to a power of two.
///
/// # Panics
///
/// Panics if `num_buckets` is zero.
#[inline]
pub fn alternate_bucket(bucket: usize, fp: Fingerprint, num_buckets: usize) -> usize {
    let offset = digest(&fp.to_le_bytes(), ALTERNATE_SEED) as usize;
    (bucket ^ offset) % num_buckets
}
