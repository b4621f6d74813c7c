//! 32-bit hashing of segment content.
//!
//! Derived seeds have to be identical across processes and machines, so the
//! hash used here must never pick up per-process state. `std`'s
//! `DefaultHasher` is randomly keyed and is not usable for that.

/// A deterministic 32-bit hash of a byte string under a salt.
///
/// Implementations must return the same value for the same input on every
/// run. The default is [`Murmur2`].
pub trait SeedHash: Send + Sync {
    /// Hash `data`, mixing in `salt`.
    fn hash(&self, data: &[u8], salt: i32) -> i32;
}

/// 32-bit MurmurHash2.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Murmur2;

impl SeedHash for Murmur2 {
    fn hash(&self, data: &[u8], salt: i32) -> i32 {
        murmur2(data, salt)
    }
}

const M: u32 = 0x5bd1_e995;
const R: u32 = 24;

/// MurmurHash2 over little-endian 4-byte blocks.
pub fn murmur2(data: &[u8], salt: i32) -> i32 {
    // Only the low 32 bits of the length take part, as in the classic variant.
    let mut h = (salt as u32) ^ (data.len() as u32);

    let mut blocks = data.chunks_exact(4);
    for block in &mut blocks {
        let mut k = u32::from_le_bytes([block[0], block[1], block[2], block[3]]);
        k = k.wrapping_mul(M);
        k ^= k >> R;
        k = k.wrapping_mul(M);

        h = h.wrapping_mul(M);
        h ^= k;
    }

    let tail = blocks.remainder();
    if !tail.is_empty() {
        let mut last = [0u8; 4];
        last[..tail.len()].copy_from_slice(tail);
        h ^= u32::from_le_bytes(last);
        h = h.wrapping_mul(M);
    }

    h ^= h >> 13;
    h = h.wrapping_mul(M);
    h ^= h >> 15;

    h as i32
}
