//! Keccak hashing and the proof-of-work target check
//!
//! The fast hash is Keccak-256 with pre-standard padding, the hash behind every
//! object identifier in the protocol. The slow proof-of-work hash is
//! pluggable through [`LongHash`].

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::fmt;

/// Size of a hash in bytes
pub const HASH_SIZE: usize = 32;

/// 32-byte hash output
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hash(pub [u8; HASH_SIZE]);

impl Hash {
    /// Create a zero hash (used for the genesis previous hash)
    pub const fn zero() -> Self {
        Hash([0u8; HASH_SIZE])
    }

    pub fn from_bytes(bytes: [u8; HASH_SIZE]) -> Self {
        Hash(bytes)
    }

    /// Create hash from hex string
    pub fn from_hex(hex: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(hex)?;
        if bytes.len() != HASH_SIZE {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; HASH_SIZE];
        arr.copy_from_slice(&bytes);
        Ok(Hash(arr))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self.to_hex())
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Default for Hash {
    fn default() -> Self {
        Self::zero()
    }
}

/// Keccak-256 of arbitrary bytes
pub fn fast_hash(data: &[u8]) -> Hash {
    let digest = Keccak256::digest(data);
    let mut out = [0u8; HASH_SIZE];
    out.copy_from_slice(&digest);
    Hash(out)
}

/// Hash two hashes together (merkle tree node)
pub fn hash_pair(left: &Hash, right: &Hash) -> Hash {
    let mut data = [0u8; HASH_SIZE * 2];
    data[..HASH_SIZE].copy_from_slice(&left.0);
    data[HASH_SIZE..].copy_from_slice(&right.0);
    fast_hash(&data)
}

/// The memory-hard hash a block's proof of work is measured with.
///
/// Implementations must be deterministic and safe to call from many
/// threads at once.
pub trait LongHash: Send + Sync {
    fn long_hash(&self, blob: &[u8]) -> Hash;
}

/// BLAKE3 proof-of-work hash, used by development networks and tests
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake3LongHash;

impl LongHash for Blake3LongHash {
    fn long_hash(&self, blob: &[u8]) -> Hash {
        Hash(*blake3::hash(blob).as_bytes())
    }
}

/// Check a proof-of-work hash against a difficulty.
///
/// The hash is read as a little-endian 256-bit integer; it meets the
/// target when `hash * difficulty` still fits in 256 bits.
pub fn check_hash(hash: &Hash, difficulty: u64) -> bool {
    let value = U256::from_little_endian(&hash.0);
    let (_, overflow) = value.overflowing_mul(U256::from(difficulty));
    !overflow
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak_empty_vector() {
        // Keccak-256 (not SHA3-256) of the empty string
        assert_eq!(
            fast_hash(b"").to_hex(),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_hash_different_inputs() {
        assert_ne!(fast_hash(b"hello"), fast_hash(b"world"));
    }

    #[test]
    fn test_hex_roundtrip() {
        let hash = fast_hash(b"test");
        let recovered = Hash::from_hex(&hash.to_hex()).unwrap();
        assert_eq!(hash, recovered);
    }

    #[test]
    fn test_hash_pair_order_matters() {
        let left = fast_hash(b"left");
        let right = fast_hash(b"right");
        assert_eq!(hash_pair(&left, &right), hash_pair(&left, &right));
        assert_ne!(hash_pair(&left, &right), hash_pair(&right, &left));
    }

    #[test]
    fn test_check_hash_difficulty_one_always_passes() {
        assert!(check_hash(&Hash([0xFF; 32]), 1));
        assert!(check_hash(&Hash::zero(), u64::MAX));
    }

    #[test]
    fn test_check_hash_boundary() {
        // 2^255 * 2 = 2^256 overflows; 2^255 - 1 fits
        let mut high_bit = [0u8; 32];
        high_bit[31] = 0x80;
        assert!(!check_hash(&Hash(high_bit), 2));

        let mut below = [0xFF; 32];
        below[31] = 0x7F;
        assert!(check_hash(&Hash(below), 2));
        assert!(!check_hash(&Hash(below), 3));
    }

    #[test]
    fn test_blake3_long_hash_deterministic() {
        let hasher = Blake3LongHash;
        assert_eq!(hasher.long_hash(b"block"), hasher.long_hash(b"block"));
        assert_ne!(hasher.long_hash(b"block"), fast_hash(b"block"));
    }
}
