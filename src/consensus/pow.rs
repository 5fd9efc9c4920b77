//! Proof-of-work validation
//!
//! Version 1 blocks are checked directly against their own long hash.
//! Every later version is merge mined: the long hash of the parent block
//! header must meet the difficulty, and the parent coinbase must carry a
//! merge-mining tag whose merkle root commits to this block.

use thiserror::Error;
use tracing::{error, warn};

use super::CachedBlock;
use crate::crypto::{check_hash, tree_hash_from_branch, LongHash, MAX_BRANCH_DEPTH};
use crate::currency::Currency;
use crate::validation::extra::merge_mining_tag;

/// Proof-of-work failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PowError {
    #[error("Block major version {found} cannot use {scheme} proof of work")]
    VersionMismatch { scheme: PowScheme, found: u8 },
    #[error("Long hash does not meet difficulty {0}")]
    InsufficientWork(u64),
    #[error("Parent coinbase has no merge mining tag")]
    MissingMergeMiningTag,
    #[error("Blockchain branch of {len} hashes exceeds {max}")]
    BranchTooLong { len: usize, max: usize },
    #[error("Auxiliary blocks merkle root does not match the merge mining tag")]
    AuxiliaryRootMismatch,
}

/// How a block proves its work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowScheme {
    /// The block's own header is hashed
    Plain,
    /// Work is done on a parent block committing to this one
    MergeMined,
}

impl PowScheme {
    /// Version 1 is plain, every other version falls through to merge mining
    pub fn for_version(major_version: u8) -> Self {
        match major_version {
            1 => PowScheme::Plain,
            _ => PowScheme::MergeMined,
        }
    }
}

impl std::fmt::Display for PowScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PowScheme::Plain => write!(f, "plain"),
            PowScheme::MergeMined => write!(f, "merge-mined"),
        }
    }
}

impl Currency {
    pub fn check_proof_of_work_v1(
        &self,
        hasher: &dyn LongHash,
        block: &CachedBlock,
        difficulty: u64,
    ) -> Result<(), PowError> {
        let major_version = block.block().major_version;
        if major_version != 1 {
            return Err(PowError::VersionMismatch {
                scheme: PowScheme::Plain,
                found: major_version,
            });
        }

        if !check_hash(&block.long_hash(hasher), difficulty) {
            return Err(PowError::InsufficientWork(difficulty));
        }
        Ok(())
    }

    pub fn check_proof_of_work_v2(
        &self,
        hasher: &dyn LongHash,
        block: &CachedBlock,
        difficulty: u64,
    ) -> Result<(), PowError> {
        let major_version = block.block().major_version;
        if major_version < 2 {
            return Err(PowError::VersionMismatch {
                scheme: PowScheme::MergeMined,
                found: major_version,
            });
        }

        if !check_hash(&block.long_hash(hasher), difficulty) {
            return Err(PowError::InsufficientWork(difficulty));
        }

        let parent = &block.block().parent_block;
        let tag = merge_mining_tag(&parent.base_transaction.extra).ok_or_else(|| {
            error!("merge mining tag wasn't found in extra of the parent block miner transaction");
            PowError::MissingMergeMiningTag
        })?;

        if parent.blockchain_branch.len() > MAX_BRANCH_DEPTH {
            return Err(PowError::BranchTooLong {
                len: parent.blockchain_branch.len(),
                max: MAX_BRANCH_DEPTH,
            });
        }

        let genesis_hash = self.genesis_block_hash();
        let aux_root = tree_hash_from_branch(
            &parent.blockchain_branch,
            &block.auxiliary_block_header_hash(),
            Some(&genesis_hash),
        );

        if aux_root != tag.merkle_root {
            warn!(
                block = %block.block_hash(),
                expected = %tag.merkle_root,
                actual = %aux_root,
                "Aux block hash wasn't found in merkle tree"
            );
            return Err(PowError::AuxiliaryRootMismatch);
        }
        Ok(())
    }

    /// Check a block's proof of work with the scheme its version selects
    pub fn check_proof_of_work(
        &self,
        hasher: &dyn LongHash,
        block: &CachedBlock,
        difficulty: u64,
    ) -> Result<(), PowError> {
        match PowScheme::for_version(block.block().major_version) {
            PowScheme::Plain => self.check_proof_of_work_v1(hasher, block, difficulty),
            PowScheme::MergeMined => self.check_proof_of_work_v2(hasher, block, difficulty),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::{BlockTemplate, ParentBlock};
    use crate::crypto::{fast_hash, tree_branch, Blake3LongHash, Hash};
    use crate::currency::CurrencyBuilder;
    use crate::validation::extra::{add_merge_mining_tag, MergeMiningTag};
    use crate::validation::{Transaction, TransactionInput};

    fn currency() -> Currency {
        CurrencyBuilder::new().currency().unwrap()
    }

    fn coinbase(extra: Vec<u8>) -> Transaction {
        Transaction {
            version: 1,
            inputs: vec![TransactionInput::Base { block_index: 5 }],
            extra,
            ..Default::default()
        }
    }

    /// Merge-mined block whose parent tag commits to it at leaf 0 of a
    /// two-chain tree
    fn merge_mined_block(currency: &Currency, major_version: u8) -> CachedBlock {
        let mut block = BlockTemplate {
            major_version,
            timestamp: 1_700_000_000,
            nonce: 9,
            base_transaction: coinbase(Vec::new()),
            parent_block: ParentBlock {
                major_version: 1,
                transaction_count: 1,
                ..Default::default()
            },
            ..Default::default()
        };

        // The blockchain branch does not enter the aux header hash
        let aux_hash = CachedBlock::new(block.clone()).auxiliary_block_header_hash();
        let other_chain = fast_hash(b"other chain");
        let leaves = [aux_hash, other_chain];
        let branch = tree_branch(&leaves);
        let root = tree_hash_from_branch(&branch, &aux_hash, Some(&currency.genesis_block_hash()));

        let mut extra = Vec::new();
        add_merge_mining_tag(&mut extra, &MergeMiningTag { depth: 1, merkle_root: root });
        block.parent_block.base_transaction = coinbase(extra);
        block.parent_block.blockchain_branch = branch;
        CachedBlock::new(block)
    }

    #[test]
    fn test_scheme_dispatch() {
        assert_eq!(PowScheme::for_version(1), PowScheme::Plain);
        for version in [0u8, 2, 3, 6, 7, 255] {
            assert_eq!(PowScheme::for_version(version), PowScheme::MergeMined);
        }
    }

    #[test]
    fn test_v1_difficulty_one_passes() {
        let currency = currency();
        let block = CachedBlock::new(BlockTemplate {
            major_version: 1,
            base_transaction: coinbase(Vec::new()),
            ..Default::default()
        });
        assert_eq!(currency.check_proof_of_work(&Blake3LongHash, &block, 1), Ok(()));
        assert_eq!(
            currency.check_proof_of_work_v2(&Blake3LongHash, &block, 1),
            Err(PowError::VersionMismatch { scheme: PowScheme::MergeMined, found: 1 })
        );
    }

    #[test]
    fn test_v1_max_difficulty_fails() {
        let currency = currency();
        let block = CachedBlock::new(BlockTemplate {
            major_version: 1,
            base_transaction: coinbase(Vec::new()),
            ..Default::default()
        });
        assert_eq!(
            currency.check_proof_of_work(&Blake3LongHash, &block, u64::MAX),
            Err(PowError::InsufficientWork(u64::MAX))
        );
    }

    #[test]
    fn test_merge_mined_block_passes() {
        let currency = currency();
        for version in 2..=6 {
            let block = merge_mined_block(&currency, version);
            assert_eq!(currency.check_proof_of_work(&Blake3LongHash, &block, 1), Ok(()));
        }
    }

    #[test]
    fn test_missing_tag() {
        let currency = currency();
        let mut block = merge_mined_block(&currency, 2).into_block();
        block.parent_block.base_transaction.extra.clear();
        assert_eq!(
            currency.check_proof_of_work(&Blake3LongHash, &CachedBlock::new(block), 1),
            Err(PowError::MissingMergeMiningTag)
        );
    }

    #[test]
    fn test_wrong_root_rejected() {
        let currency = currency();
        let mut block = merge_mined_block(&currency, 3).into_block();
        block.parent_block.blockchain_branch[0] = Hash::zero();
        assert_eq!(
            currency.check_proof_of_work(&Blake3LongHash, &CachedBlock::new(block), 1),
            Err(PowError::AuxiliaryRootMismatch)
        );
    }

    #[test]
    fn test_branch_too_long() {
        let currency = currency();
        let mut block = merge_mined_block(&currency, 2).into_block();
        block.parent_block.blockchain_branch = vec![Hash::zero(); MAX_BRANCH_DEPTH + 1];
        assert_eq!(
            currency.check_proof_of_work(&Blake3LongHash, &CachedBlock::new(block), 1),
            Err(PowError::BranchTooLong { len: MAX_BRANCH_DEPTH + 1, max: MAX_BRANCH_DEPTH })
        );
    }

    #[test]
    fn test_zero_version_takes_merge_mined_path() {
        let currency = currency();
        let block = CachedBlock::new(BlockTemplate {
            major_version: 0,
            base_transaction: coinbase(Vec::new()),
            ..Default::default()
        });
        assert_eq!(
            currency.check_proof_of_work(&Blake3LongHash, &block, 1),
            Err(PowError::VersionMismatch { scheme: PowScheme::MergeMined, found: 0 })
        );
    }
}
