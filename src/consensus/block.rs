//! Block templates and their hashing blobs
//!
//! Version 1 blocks carry their own timestamp and nonce. From version 2 a
//! block is merge mined: its proof of work is done on a parent block whose
//! coinbase commits to this block's header hash, and the timestamp and
//! nonce move into the parent block serialization.

use serde::{Deserialize, Serialize};

use crate::crypto::{fast_hash, tree_hash, tree_hash_from_branch, Hash, LongHash};
use crate::serialization::write_varint;
use crate::validation::Transaction;

/// Parent-chain block a merge-mined block is proven through
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentBlock {
    pub major_version: u8,
    pub minor_version: u8,
    pub previous_block_hash: Hash,
    pub transaction_count: u16,
    /// Merkle branch from the parent coinbase to the parent's transaction root
    pub base_transaction_branch: Vec<Hash>,
    pub base_transaction: Transaction,
    /// Merkle branch from this block's header hash to the merge-mining root
    pub blockchain_branch: Vec<Hash>,
}

/// Block as assembled by a miner
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockTemplate {
    pub major_version: u8,
    pub minor_version: u8,
    pub timestamp: u64,
    pub previous_block_hash: Hash,
    pub nonce: u32,
    /// Only meaningful from version 2
    pub parent_block: ParentBlock,
    pub base_transaction: Transaction,
    pub transaction_hashes: Vec<Hash>,
}

impl BlockTemplate {
    fn write_header(&self, bytes: &mut Vec<u8>) {
        write_varint(bytes, self.major_version as u64);
        write_varint(bytes, self.minor_version as u64);
        if self.major_version == 1 {
            write_varint(bytes, self.timestamp);
            bytes.extend_from_slice(&self.previous_block_hash.0);
            bytes.extend_from_slice(&self.nonce.to_le_bytes());
        } else {
            bytes.extend_from_slice(&self.previous_block_hash.0);
        }
    }

    /// Root of the tree over the coinbase hash and the transaction hashes
    pub fn transactions_merkle_root(&self) -> Hash {
        let mut hashes = Vec::with_capacity(self.transaction_hashes.len() + 1);
        hashes.push(self.base_transaction.hash());
        hashes.extend_from_slice(&self.transaction_hashes);
        tree_hash(&hashes)
    }

    /// Header, transaction root and transaction count
    pub fn hashing_blob(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        self.write_header(&mut bytes);
        bytes.extend_from_slice(&self.transactions_merkle_root().0);
        write_varint(&mut bytes, self.transaction_hashes.len() as u64 + 1);
        bytes
    }

    /// Parent block serialization in hashing form.
    ///
    /// The parent coinbase is folded to its merkle root. Unless
    /// `header_only`, the coinbase branch, the coinbase and the blockchain
    /// branch follow; branch lengths are implied by the transaction count
    /// and the merge-mining depth, so no count is written.
    pub fn parent_hashing_blob(&self, header_only: bool) -> Vec<u8> {
        let parent = &self.parent_block;
        let mut bytes = Vec::new();
        write_varint(&mut bytes, parent.major_version as u64);
        write_varint(&mut bytes, parent.minor_version as u64);
        write_varint(&mut bytes, self.timestamp);
        bytes.extend_from_slice(&parent.previous_block_hash.0);
        bytes.extend_from_slice(&self.nonce.to_le_bytes());

        let root = tree_hash_from_branch(
            &parent.base_transaction_branch,
            &parent.base_transaction.hash(),
            None,
        );
        bytes.extend_from_slice(&root.0);
        write_varint(&mut bytes, parent.transaction_count as u64);

        if !header_only {
            for hash in &parent.base_transaction_branch {
                bytes.extend_from_slice(&hash.0);
            }
            bytes.extend_from_slice(&parent.base_transaction.to_bytes());
            for hash in &parent.blockchain_branch {
                bytes.extend_from_slice(&hash.0);
            }
        }
        bytes
    }

    /// Blob the slow hash runs over
    pub fn long_hash_blob(&self) -> Vec<u8> {
        if self.major_version == 1 {
            self.hashing_blob()
        } else {
            self.parent_hashing_blob(true)
        }
    }
}

/// Keccak of a length-prefixed blob, the identifier of a serialized object
fn blob_hash(blob: &[u8]) -> Hash {
    let mut bytes = Vec::with_capacity(blob.len() + 10);
    write_varint(&mut bytes, blob.len() as u64);
    bytes.extend_from_slice(blob);
    fast_hash(&bytes)
}

/// Block with its identifiers computed once
#[derive(Debug, Clone)]
pub struct CachedBlock {
    block: BlockTemplate,
    hash: Hash,
    auxiliary_header_hash: Hash,
}

impl CachedBlock {
    pub fn new(block: BlockTemplate) -> Self {
        let hashing_blob = block.hashing_blob();
        let auxiliary_header_hash = blob_hash(&hashing_blob);

        let hash = if block.major_version == 1 {
            auxiliary_header_hash
        } else {
            let mut blob = hashing_blob;
            blob.extend_from_slice(&block.parent_hashing_blob(false));
            blob_hash(&blob)
        };

        Self {
            block,
            hash,
            auxiliary_header_hash,
        }
    }

    pub fn block(&self) -> &BlockTemplate {
        &self.block
    }

    pub fn into_block(self) -> BlockTemplate {
        self.block
    }

    pub fn block_hash(&self) -> Hash {
        self.hash
    }

    /// Hash a parent chain commits to when merge mining this block
    pub fn auxiliary_block_header_hash(&self) -> Hash {
        self.auxiliary_header_hash
    }

    /// Proof-of-work hash of the block
    pub fn long_hash(&self, hasher: &dyn LongHash) -> Hash {
        hasher.long_hash(&self.block.long_hash_blob())
    }
}
