//! Hash functions for the spent-output filter
//!
//! One MurmurHash3 x64_128 digest per item, split into two 64-bit halves and
//! expanded into `k` bit positions by double hashing.

use std::io::Cursor;

/// Split 128-bit digest of an item
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HashPair {
    /// Lower 64 bits
    pub h1: u64,
    /// Upper 64 bits
    pub h2: u64,
}

/// Hash an item once with MurmurHash3 x64_128 and split the digest
pub fn digest(item: &[u8]) -> HashPair {
    let mut cursor = Cursor::new(item);
    // Reading from an in-memory cursor cannot fail
    let hash = murmur3::murmur3_x64_128(&mut cursor, 0).unwrap_or(0);
    HashPair {
        h1: hash as u64,
        h2: (hash >> 64) as u64,
    }
}

/// Compute the `k` bit positions for an item in a filter of `m` bits
///
/// `index_i = (h1 + h2 * i) mod m` for `i` in `1..=k`, in wrapping 64-bit
/// arithmetic.
pub fn compute_hash_positions(item: &[u8], k: usize, m: usize) -> impl Iterator<Item = usize> {
    let HashPair { h1, h2 } = digest(item);
    let m = m as u64;

    (1..=k as u64).map(move |i| {
        let hash = h1.wrapping_add(h2.wrapping_mul(i));
        (hash % m) as usize
    })
}
