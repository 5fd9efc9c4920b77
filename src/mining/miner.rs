//! Coinbase transaction assembly
//!
//! Builds the miner transaction that pays a block's reward to an account
//! through one-time output keys.

use thiserror::Error;
use tracing::{error, info};

use crate::constants::CURRENT_TRANSACTION_VERSION;
use crate::consensus::{decompose_amount, RewardError};
use crate::crypto::{derive_public_key, generate_key_derivation, generate_key_pair, KeyError};
use crate::currency::Currency;
use crate::validation::extra::{add_extra_nonce, add_transaction_public_key, ExtraError};
use crate::validation::{Transaction, TransactionInput, TransactionOutput};
use crate::wallet::AccountPublicAddress;

/// Miner transaction errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MinerTxError {
    #[error("Block reward rejected: {0}")]
    Reward(#[from] RewardError),
    #[error(transparent)]
    Extra(#[from] ExtraError),
    #[error("Maximum output count must be non-zero")]
    ZeroMaxOuts,
    #[error("Key derivation failed: {0}")]
    Derivation(#[from] KeyError),
    #[error("Output amounts sum to {outputs}, reward is {reward}")]
    AmountMismatch { outputs: u64, reward: u64 },
}

/// Inputs to [`Currency::construct_miner_tx`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinerTxParams {
    pub major_version: u8,
    pub height: u32,
    pub median_size: u64,
    pub already_generated_coins: u64,
    pub current_block_size: u64,
    pub fee: u64,
    /// Account receiving the reward
    pub address: AccountPublicAddress,
    /// Free-form bytes for pools, embedded in the extra when non-empty
    pub extra_nonce: Vec<u8>,
    pub max_outs: usize,
}

impl MinerTxParams {
    /// Empty block at `height`: no fees, no size, single output
    pub fn new(major_version: u8, height: u32, address: AccountPublicAddress) -> Self {
        Self {
            major_version,
            height,
            median_size: 0,
            already_generated_coins: 0,
            current_block_size: 0,
            fee: 0,
            address,
            extra_nonce: Vec::new(),
            max_outs: 1,
        }
    }
}

impl Currency {
    /// Build the coinbase transaction of a block.
    ///
    /// The reward is split into pretty amounts, then the smallest chunks are
    /// merged until at most `max_outs` remain. Each chunk is paid to a fresh
    /// one-time key derived from a new transaction key.
    pub fn construct_miner_tx(&self, params: &MinerTxParams) -> Result<Transaction, MinerTxError> {
        let tx_key = generate_key_pair();

        let mut extra = Vec::new();
        add_transaction_public_key(&mut extra, &tx_key.public_key);
        if !params.extra_nonce.is_empty() {
            add_extra_nonce(&mut extra, &params.extra_nonce)?;
        }

        let reward = self
            .block_reward(
                params.major_version,
                params.median_size,
                params.current_block_size,
                params.already_generated_coins,
                params.fee,
                params.height as u64,
            )
            .map_err(|e| {
                info!(height = params.height, "Block is too big: {}", e);
                e
            })?
            .reward;

        let mut amounts = decompose_amount(reward, self.default_dust_threshold(params.height));

        if params.max_outs == 0 {
            error!("max_outs must be non-zero");
            return Err(MinerTxError::ZeroMaxOuts);
        }
        while amounts.len() > params.max_outs {
            let smallest = amounts.remove(0);
            amounts[0] += smallest;
        }

        let view_key = &params.address.view_public_key;
        let spend_key = &params.address.spend_public_key;
        let derivation = generate_key_derivation(view_key, &tx_key.secret_key).map_err(|e| {
            error!(view_key = %view_key, "while creating outs: failed to generate key derivation");
            e
        })?;

        let mut outputs = Vec::with_capacity(amounts.len());
        let mut total = 0u64;
        for (index, amount) in amounts.into_iter().enumerate() {
            let key = derive_public_key(&derivation, index as u64, spend_key).map_err(|e| {
                error!(index, spend_key = %spend_key, "while creating outs: failed to derive public key");
                e
            })?;
            total = total.saturating_add(amount);
            outputs.push(TransactionOutput { amount, key });
        }

        if total != reward {
            error!(total, reward, "Failed to construct miner tx, output sum differs from reward");
            return Err(MinerTxError::AmountMismatch {
                outputs: total,
                reward,
            });
        }

        let unlock_window = self.mined_money_unlock_window(params.height);

        Ok(Transaction {
            version: CURRENT_TRANSACTION_VERSION,
            unlock_time: params.height as u64 + unlock_window as u64,
            inputs: vec![TransactionInput::Base {
                block_index: params.height,
            }],
            outputs,
            extra,
            signatures: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{derive_secret_key, key_pair_from_secret, PublicKey};
    use crate::currency::CurrencyBuilder;
    use crate::validation::extra::{parse_extra, transaction_public_key, ExtraField};

    struct Account {
        address: AccountPublicAddress,
        view: crate::crypto::KeyPair,
        spend: crate::crypto::KeyPair,
    }

    fn account() -> Account {
        let view = generate_key_pair();
        let spend = generate_key_pair();
        Account {
            address: AccountPublicAddress {
                spend_public_key: spend.public_key,
                view_public_key: view.public_key,
            },
            view,
            spend,
        }
    }

    fn currency() -> Currency {
        CurrencyBuilder::new().currency().unwrap()
    }

    #[test]
    fn test_single_output_coinbase() {
        let currency = currency();
        let account = account();
        let tx = currency
            .construct_miner_tx(&MinerTxParams::new(1, 0, account.address))
            .unwrap();

        assert!(tx.is_coinbase());
        assert_eq!(tx.version, CURRENT_TRANSACTION_VERSION);
        assert_eq!(tx.unlock_time, 10);
        assert_eq!(tx.output_amounts(), vec![2_980_232]);
    }

    #[test]
    fn test_outputs_belong_to_receiver() {
        let currency = currency();
        let account = account();
        let params = MinerTxParams {
            max_outs: 10,
            ..MinerTxParams::new(3, 5, account.address)
        };
        let tx = currency.construct_miner_tx(&params).unwrap();

        let tx_public_key = transaction_public_key(&tx.extra).unwrap();
        let derivation = generate_key_derivation(&tx_public_key, &account.view.secret_key).unwrap();
        for (index, output) in tx.outputs.iter().enumerate() {
            let secret = derive_secret_key(&derivation, index as u64, &account.spend.secret_key);
            assert_eq!(key_pair_from_secret(&secret).public_key, output.key);
        }
    }

    #[test]
    fn test_max_outs_merges_smallest_chunks() {
        let currency = currency();
        let account = account();
        // 2_980_232 -> [2, 30, 200, 80_000, 900_000, 2_000_000]
        let params = MinerTxParams {
            max_outs: 4,
            ..MinerTxParams::new(1, 0, account.address)
        };
        let tx = currency.construct_miner_tx(&params).unwrap();
        assert_eq!(tx.output_amounts(), vec![232, 80_000, 900_000, 2_000_000]);

        let params = MinerTxParams {
            max_outs: 100,
            ..MinerTxParams::new(1, 0, account.address)
        };
        let tx = currency.construct_miner_tx(&params).unwrap();
        assert_eq!(
            tx.output_amounts(),
            vec![2, 30, 200, 80_000, 900_000, 2_000_000]
        );
    }

    #[test]
    fn test_zero_max_outs_rejected() {
        let params = MinerTxParams {
            max_outs: 0,
            ..MinerTxParams::new(1, 0, account().address)
        };
        assert_eq!(currency().construct_miner_tx(&params), Err(MinerTxError::ZeroMaxOuts));
    }

    #[test]
    fn test_oversized_block_rejected() {
        let params = MinerTxParams {
            current_block_size: 20_001,
            ..MinerTxParams::new(1, 0, account().address)
        };
        assert!(matches!(
            currency().construct_miner_tx(&params),
            Err(MinerTxError::Reward(RewardError::BlockTooBig { .. }))
        ));
    }

    #[test]
    fn test_extra_nonce_embedded() {
        let params = MinerTxParams {
            extra_nonce: b"pool".to_vec(),
            ..MinerTxParams::new(1, 0, account().address)
        };
        let tx = currency().construct_miner_tx(&params).unwrap();
        let fields = parse_extra(&tx.extra).unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1], ExtraField::Nonce(b"pool".to_vec()));

        let params = MinerTxParams {
            extra_nonce: vec![0u8; 256],
            ..params
        };
        assert_eq!(
            currency().construct_miner_tx(&params),
            Err(MinerTxError::Extra(ExtraError::NonceTooLarge(256)))
        );
    }

    #[test]
    fn test_invalid_view_key_rejected() {
        let mut bad = [0u8; 32];
        bad[0] = 2;
        let mut address = account().address;
        address.view_public_key = PublicKey(bad);
        assert_eq!(
            currency().construct_miner_tx(&MinerTxParams::new(1, 0, address)),
            Err(MinerTxError::Derivation(KeyError::InvalidPublicKey(PublicKey(bad))))
        );
    }

    #[test]
    fn test_unlock_window_switches() {
        let currency = currency();
        let params = MinerTxParams::new(4, 500_000, account().address);
        let tx = currency.construct_miner_tx(&params).unwrap();
        assert_eq!(tx.unlock_time, 500_040);
        assert_eq!(tx.inputs, vec![TransactionInput::Base { block_index: 500_000 }]);
    }
}
