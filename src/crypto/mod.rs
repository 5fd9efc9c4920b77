//! Cryptography module - Keccak hashing, tree hashes, one-time keys

mod hash;
mod keys;
mod merkle;

pub use hash::*;
pub use keys::*;
pub use merkle::*;
