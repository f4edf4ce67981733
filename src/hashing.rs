//! Stable 64-bit hashing for cache keys and per-document seeds
//!
//! `std`'s hashers are randomly keyed per process; seeds and cache keys here must be identical
//! across runs.

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// FNV-1a over raw bytes
pub fn fnv1a64(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, &byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Seed for one document's RNG: global seed mixed with the document identifier
pub fn document_seed(global_seed: u64, document_id: &str) -> u64 {
    global_seed ^ fnv1a64(document_id.as_bytes())
}
