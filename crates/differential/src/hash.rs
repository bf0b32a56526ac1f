//! Shingle hashing: BLAKE2b with a 4-byte digest, read big-endian.

use blake2::digest::consts::U4;
use blake2::{Blake2b, Digest};

type Blake2b32 = Blake2b<U4>;

/// Hash one shingle to a 32-bit value. Stable across processes and platforms.
#[inline]
pub fn hash_shingle(bytes: &[u8]) -> u32 {
    let digest = Blake2b32::digest(bytes);
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
}

/// Hash every shingle, preserving order.
pub fn hash_shingles<S: AsRef<str>>(shingles: &[S]) -> Vec<u32> {
    shingles
        .iter()
        .map(|s| hash_shingle(s.as_ref().as_bytes()))
        .collect()
}
