//! Public addresses
//!
//! Text form: block Base58 of `varint(prefix) || spend key || view key`
//! followed by the first four bytes of its Keccak hash.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::base58::{self, Base58Error};
use crate::crypto::{check_key, fast_hash, PublicKey};
use crate::currency::Currency;
use crate::serialization::{write_varint, BinaryReader, SerializationError};

const CHECKSUM_SIZE: usize = 4;

/// Address errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("Invalid base58: {0}")]
    Base58(#[from] Base58Error),
    #[error("Address data too short")]
    TooShort,
    #[error("Address checksum mismatch")]
    ChecksumMismatch,
    #[error("Malformed address: {0}")]
    Malformed(#[from] SerializationError),
    #[error("Address contains invalid key {0}")]
    InvalidKey(PublicKey),
    #[error("Wrong address prefix {found}, expected {expected}")]
    WrongPrefix { found: u64, expected: u64 },
}

/// Spend and view public keys of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AccountPublicAddress {
    pub spend_public_key: PublicKey,
    pub view_public_key: PublicKey,
}

/// Encode an address under a network prefix
pub fn encode_address(prefix: u64, address: &AccountPublicAddress) -> String {
    let mut data = Vec::with_capacity(10 + 64 + CHECKSUM_SIZE);
    write_varint(&mut data, prefix);
    data.extend_from_slice(&address.spend_public_key.0);
    data.extend_from_slice(&address.view_public_key.0);

    let checksum = fast_hash(&data);
    data.extend_from_slice(&checksum.0[..CHECKSUM_SIZE]);
    base58::encode(&data)
}

/// Decode an address and the prefix it was encoded under
pub fn decode_address(text: &str) -> Result<(u64, AccountPublicAddress), AddressError> {
    let data = base58::decode(text)?;
    if data.len() < CHECKSUM_SIZE {
        return Err(AddressError::TooShort);
    }

    let (body, checksum) = data.split_at(data.len() - CHECKSUM_SIZE);
    if fast_hash(body).0[..CHECKSUM_SIZE] != *checksum {
        return Err(AddressError::ChecksumMismatch);
    }

    let mut reader = BinaryReader::new(body);
    let prefix = reader.read_varint()?;
    let address = AccountPublicAddress {
        spend_public_key: reader.read_public_key()?,
        view_public_key: reader.read_public_key()?,
    };
    reader.finish()?;

    for key in [address.spend_public_key, address.view_public_key] {
        if !check_key(&key) {
            return Err(AddressError::InvalidKey(key));
        }
    }

    Ok((prefix, address))
}

impl Currency {
    pub fn account_address_as_string(&self, address: &AccountPublicAddress) -> String {
        encode_address(self.params().public_address_base58_prefix, address)
    }

    /// Parse an address, requiring this currency's prefix
    pub fn parse_account_address_string(
        &self,
        text: &str,
    ) -> Result<AccountPublicAddress, AddressError> {
        let (prefix, address) = decode_address(text)?;

        let expected = self.params().public_address_base58_prefix;
        if prefix != expected {
            debug!(prefix, expected, "Wrong address prefix");
            return Err(AddressError::WrongPrefix {
                found: prefix,
                expected,
            });
        }
        Ok(address)
    }
}
