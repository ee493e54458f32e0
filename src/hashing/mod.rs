//! BLAKE3 digests for query keys.
//!
//! The cache itself keys on the structural `(model, prompt)` pair; digests exist so logs can
//! correlate requests without ever printing a prompt.

use blake3::Hasher;

/// Hashes a `(model, prompt)` pair into a 32-byte digest.
///
/// Each component is length-prefixed, so `("ab", "c")` and `("a", "bc")` never collide by
/// concatenation.
#[inline]
pub fn hash_query(model: &str, prompt: &str) -> [u8; 32] {
    let mut hasher = Hasher::new();
    hasher.update(&(model.len() as u64).to_le_bytes());
    hasher.update(model.as_bytes());
    hasher.update(&(prompt.len() as u64).to_le_bytes());
    hasher.update(prompt.as_bytes());
    *hasher.finalize().as_bytes()
}

/// Reads the first 8 bytes of a digest as a little-endian `u64`.
///
/// 64 bits is plenty for log correlation; it is not used for lookups or any security check.
#[inline]
pub fn digest_to_u64(digest: &[u8; 32]) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}
