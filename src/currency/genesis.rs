//! Genesis block construction

use super::{ConfigError, Currency, CurrencyParameters};
use crate::constants::{BLOCK_MINOR_VERSION_0, GENESIS_NONCE, GENESIS_TIMESTAMP};
use crate::consensus::{BlockTemplate, MajorVersion};
use crate::crypto::{Hash, PublicKey};
use crate::mining::{MinerTxError, MinerTxParams};
use crate::validation::Transaction;
use crate::wallet::AccountPublicAddress;

/// Genesis block template around the configured coinbase blob
pub fn genesis_block_template(params: &CurrencyParameters) -> Result<BlockTemplate, ConfigError> {
    let blob = hex::decode(&params.genesis_coinbase_tx_hex)?;
    let base_transaction = Transaction::from_bytes(&blob)?;

    Ok(BlockTemplate {
        major_version: MajorVersion::V1.as_u8(),
        minor_version: BLOCK_MINOR_VERSION_0,
        timestamp: GENESIS_TIMESTAMP,
        previous_block_hash: Hash::zero(),
        nonce: GENESIS_NONCE,
        base_transaction,
        ..Default::default()
    })
}

impl Currency {
    /// Fresh height-0 coinbase paying the whole first reward to null keys.
    ///
    /// Its hex serialization is what `genesis_coinbase_tx_hex` holds for a
    /// new network.
    pub fn generate_genesis_transaction(&self) -> Result<Transaction, MinerTxError> {
        let null_address = AccountPublicAddress {
            spend_public_key: PublicKey::default(),
            view_public_key: PublicKey::default(),
        };
        self.construct_miner_tx(&MinerTxParams::new(MajorVersion::V1.as_u8(), 0, null_address))
    }
}
