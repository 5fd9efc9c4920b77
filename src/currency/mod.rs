//! Currency - immutable network parameters plus the genesis block
//!
//! Consensus rules are methods on [`Currency`] spread over the modules that
//! own them: rewards and proof of work under [`crate::consensus`], coinbase
//! assembly under [`crate::mining`], addresses under [`crate::wallet`].

mod amount;
mod builder;
mod genesis;

pub use amount::*;
pub use builder::*;
pub use genesis::*;

use tracing::info;

use crate::consensus::{BlockTemplate, CachedBlock};
use crate::crypto::Hash;

/// A fully configured currency
#[derive(Debug, Clone)]
pub struct Currency {
    params: CurrencyParameters,
    genesis: CachedBlock,
}

impl Currency {
    /// Validate the parameters and build the genesis block.
    ///
    /// Fails if the parameters are inconsistent or the genesis coinbase
    /// blob does not parse.
    pub fn new(params: CurrencyParameters) -> Result<Self, ConfigError> {
        params.validate()?;
        let genesis = CachedBlock::new(genesis_block_template(&params)?);

        info!(
            hash = %genesis.block_hash(),
            prefix = params.public_address_base58_prefix,
            "Currency initialized"
        );

        Ok(Self { params, genesis })
    }

    pub fn params(&self) -> &CurrencyParameters {
        &self.params
    }

    /// Atomic units in one whole coin
    pub fn coin(&self) -> u64 {
        self.params.coin()
    }

    pub fn genesis_block(&self) -> &BlockTemplate {
        self.genesis.block()
    }

    pub fn genesis_block_hash(&self) -> Hash {
        self.genesis.block_hash()
    }
}
