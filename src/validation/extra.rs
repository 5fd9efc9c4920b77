//! Transaction extra field
//!
//! A byte string of tagged records: padding, the transaction public key,
//! an arbitrary nonce, and the merge-mining tag that binds an auxiliary
//! chain's block into a parent chain's coinbase.

use thiserror::Error;

use crate::crypto::{Hash, PublicKey};
use crate::serialization::{write_varint, BinaryReader, SerializationError};

const TAG_PADDING: u8 = 0x00;
const TAG_PUBKEY: u8 = 0x01;
const TAG_NONCE: u8 = 0x02;
const TAG_MERGE_MINING: u8 = 0x03;

/// Maximum number of padding bytes
pub const MAX_PADDING_SIZE: usize = 255;

/// Maximum length of an extra nonce
pub const MAX_NONCE_SIZE: usize = 255;

/// Extra field errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtraError {
    #[error("Extra nonce of {0} bytes exceeds {MAX_NONCE_SIZE}")]
    NonceTooLarge(usize),
    #[error("Padding of {0} bytes is invalid")]
    InvalidPadding(usize),
    #[error("Malformed extra: {0}")]
    Malformed(#[from] SerializationError),
}

/// Root of the auxiliary-chain merkle tree committed in a parent coinbase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeMiningTag {
    pub depth: u64,
    pub merkle_root: Hash,
}

/// One parsed extra record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtraField {
    Padding(usize),
    PublicKey(PublicKey),
    Nonce(Vec<u8>),
    MergeMiningTag(MergeMiningTag),
}

/// Parse every known record in an extra field
pub fn parse_extra(extra: &[u8]) -> Result<Vec<ExtraField>, ExtraError> {
    let mut reader = BinaryReader::new(extra);
    let mut fields = Vec::new();

    while !reader.is_empty() {
        match reader.read_u8()? {
            TAG_PADDING => {
                let rest = reader.read_bytes(reader.remaining())?;
                let size = rest.len() + 1;
                if size > MAX_PADDING_SIZE || rest.iter().any(|b| *b != 0) {
                    return Err(ExtraError::InvalidPadding(size));
                }
                fields.push(ExtraField::Padding(size));
            }
            TAG_PUBKEY => fields.push(ExtraField::PublicKey(reader.read_public_key()?)),
            TAG_NONCE => {
                let size = reader.read_u8()? as usize;
                fields.push(ExtraField::Nonce(reader.read_bytes(size)?.to_vec()));
            }
            TAG_MERGE_MINING => {
                let size = reader.read_varint_as::<usize>("merge mining tag size")?;
                let mut inner = BinaryReader::new(reader.read_bytes(size)?);
                let depth = inner.read_varint()?;
                let merkle_root = inner.read_hash()?;
                inner.finish()?;
                fields.push(ExtraField::MergeMiningTag(MergeMiningTag { depth, merkle_root }));
            }
            // Unrecognized tag bytes carry no length; skip them one at a time
            _ => {}
        }
    }

    Ok(fields)
}

/// First transaction public key in the extra, if any
pub fn transaction_public_key(extra: &[u8]) -> Option<PublicKey> {
    parse_extra(extra).ok()?.into_iter().find_map(|field| match field {
        ExtraField::PublicKey(key) => Some(key),
        _ => None,
    })
}

/// Merge-mining tag in the extra; a malformed extra has none
pub fn merge_mining_tag(extra: &[u8]) -> Option<MergeMiningTag> {
    parse_extra(extra).ok()?.into_iter().find_map(|field| match field {
        ExtraField::MergeMiningTag(tag) => Some(tag),
        _ => None,
    })
}

pub fn add_transaction_public_key(extra: &mut Vec<u8>, key: &PublicKey) {
    extra.push(TAG_PUBKEY);
    extra.extend_from_slice(&key.0);
}

pub fn add_extra_nonce(extra: &mut Vec<u8>, nonce: &[u8]) -> Result<(), ExtraError> {
    if nonce.len() > MAX_NONCE_SIZE {
        return Err(ExtraError::NonceTooLarge(nonce.len()));
    }
    extra.push(TAG_NONCE);
    extra.push(nonce.len() as u8);
    extra.extend_from_slice(nonce);
    Ok(())
}

pub fn add_merge_mining_tag(extra: &mut Vec<u8>, tag: &MergeMiningTag) {
    let mut body = Vec::with_capacity(10 + 32);
    write_varint(&mut body, tag.depth);
    body.extend_from_slice(&tag.merkle_root.0);

    extra.push(TAG_MERGE_MINING);
    write_varint(extra, body.len() as u64);
    extra.extend_from_slice(&body);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::fast_hash;

    #[test]
    fn test_parse_all_records() {
        let key = PublicKey([5u8; 32]);
        let tag = MergeMiningTag { depth: 2, merkle_root: fast_hash(b"root") };

        let mut extra = Vec::new();
        add_transaction_public_key(&mut extra, &key);
        add_extra_nonce(&mut extra, b"pool-42").unwrap();
        add_merge_mining_tag(&mut extra, &tag);
        extra.extend_from_slice(&[0, 0, 0]);

        let fields = parse_extra(&extra).unwrap();
        assert_eq!(
            fields,
            vec![
                ExtraField::PublicKey(key),
                ExtraField::Nonce(b"pool-42".to_vec()),
                ExtraField::MergeMiningTag(tag),
                ExtraField::Padding(3),
            ]
        );
        assert_eq!(transaction_public_key(&extra), Some(key));
        assert_eq!(merge_mining_tag(&extra), Some(tag));
    }

    #[test]
    fn test_missing_tag() {
        let mut extra = Vec::new();
        add_transaction_public_key(&mut extra, &PublicKey([1u8; 32]));
        assert_eq!(merge_mining_tag(&extra), None);
    }

    #[test]
    fn test_nonce_too_large() {
        let mut extra = Vec::new();
        assert_eq!(
            add_extra_nonce(&mut extra, &[0u8; 256]),
            Err(ExtraError::NonceTooLarge(256))
        );
        assert!(extra.is_empty());
        assert!(add_extra_nonce(&mut extra, &[0u8; 255]).is_ok());
    }

    #[test]
    fn test_nonzero_padding_rejected() {
        assert_eq!(parse_extra(&[0, 0, 1]), Err(ExtraError::InvalidPadding(3)));
    }

    #[test]
    fn test_unknown_tags_skipped() {
        assert_eq!(parse_extra(&[0x7F]), Ok(Vec::new()));

        let tag = MergeMiningTag { depth: 1, merkle_root: fast_hash(b"aux") };
        let mut extra = vec![0x04];
        add_merge_mining_tag(&mut extra, &tag);
        extra.push(0x7F);
        assert_eq!(merge_mining_tag(&extra), Some(tag));
    }

    #[test]
    fn test_truncated_key_rejected() {
        assert!(parse_extra(&[TAG_PUBKEY, 1, 2, 3]).is_err());
    }
}
