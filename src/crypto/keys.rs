//! Ed25519 one-time key arithmetic
//!
//! Stealth-address primitives: key pair generation, the shared key
//! derivation between a transaction key and a view key, and one-time
//! output key derivation.

use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::scalar::Scalar;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::fast_hash;
use crate::serialization::write_varint;

/// Key errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("Invalid public key {0}")]
    InvalidPublicKey(PublicKey),
    #[error("Invalid key derivation")]
    InvalidDerivation,
}

/// 32-byte compressed Edwards point
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PublicKey(pub [u8; 32]);

impl PublicKey {
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    fn decompress(&self) -> Option<EdwardsPoint> {
        CompressedEdwardsY(self.0).decompress()
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// 32-byte reduced scalar
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SecretKey(pub [u8; 32]);

impl SecretKey {
    fn scalar(&self) -> Scalar {
        Scalar::from_bytes_mod_order(self.0)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey([REDACTED])")
    }
}

/// Shared secret point between a transaction key and a view key
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct KeyDerivation(pub [u8; 32]);

impl fmt::Debug for KeyDerivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyDerivation({})", hex::encode(self.0))
    }
}

/// Key pair
#[derive(Debug, Clone, Copy)]
pub struct KeyPair {
    pub public_key: PublicKey,
    pub secret_key: SecretKey,
}

/// 64-byte ring signature element
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature(#[serde(with = "sig_serde")] pub [u8; 64]);

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", hex::encode(self.0))
    }
}

mod sig_serde {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8; 64], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bytes(bytes)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; 64], D::Error>
    where
        D: Deserializer<'de>,
    {
        let bytes: Vec<u8> = Deserialize::deserialize(deserializer)?;
        if bytes.len() != 64 {
            return Err(serde::de::Error::custom("Invalid signature length"));
        }
        let mut arr = [0u8; 64];
        arr.copy_from_slice(&bytes);
        Ok(arr)
    }
}

/// Generate a fresh random key pair
pub fn generate_key_pair() -> KeyPair {
    let mut wide = [0u8; 64];
    OsRng.fill_bytes(&mut wide);
    let secret = Scalar::from_bytes_mod_order_wide(&wide);
    key_pair_from_scalar(secret)
}

/// Rebuild a key pair from secret key bytes
pub fn key_pair_from_secret(secret_key: &SecretKey) -> KeyPair {
    key_pair_from_scalar(secret_key.scalar())
}

fn key_pair_from_scalar(secret: Scalar) -> KeyPair {
    let public = EdwardsPoint::mul_base(&secret);
    KeyPair {
        public_key: PublicKey(public.compress().to_bytes()),
        secret_key: SecretKey(secret.to_bytes()),
    }
}

/// Check that a public key decodes to a curve point
pub fn check_key(key: &PublicKey) -> bool {
    key.decompress().is_some()
}

/// Compute `8 * secret * public`
pub fn generate_key_derivation(
    public_key: &PublicKey,
    secret_key: &SecretKey,
) -> Result<KeyDerivation, KeyError> {
    let point = public_key
        .decompress()
        .ok_or(KeyError::InvalidPublicKey(*public_key))?;
    let shared = (secret_key.scalar() * point).mul_by_cofactor();
    Ok(KeyDerivation(shared.compress().to_bytes()))
}

/// Hash a derivation and output index to a scalar
fn derivation_to_scalar(derivation: &KeyDerivation, output_index: u64) -> Scalar {
    let mut buf = Vec::with_capacity(32 + 10);
    buf.extend_from_slice(&derivation.0);
    write_varint(&mut buf, output_index);
    Scalar::from_bytes_mod_order(fast_hash(&buf).0)
}

/// Derive the one-time public key `Hs(derivation || index) * G + base`
pub fn derive_public_key(
    derivation: &KeyDerivation,
    output_index: u64,
    base: &PublicKey,
) -> Result<PublicKey, KeyError> {
    let base_point = base.decompress().ok_or(KeyError::InvalidPublicKey(*base))?;
    let scalar = derivation_to_scalar(derivation, output_index);
    let derived = EdwardsPoint::mul_base(&scalar) + base_point;
    Ok(PublicKey(derived.compress().to_bytes()))
}

/// Derive the one-time secret key `Hs(derivation || index) + base`
pub fn derive_secret_key(
    derivation: &KeyDerivation,
    output_index: u64,
    base: &SecretKey,
) -> SecretKey {
    let scalar = derivation_to_scalar(derivation, output_index) + base.scalar();
    SecretKey(scalar.to_bytes())
}
