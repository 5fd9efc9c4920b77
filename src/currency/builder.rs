//! Currency parameters and their validating builder
//!
//! `CurrencyParameters` is a plain record seeded from [`crate::constants`].
//! `CurrencyBuilder` overrides fields fluently; setters with preconditions
//! fail on the spot and `finalize` re-checks the whole record, so an invalid
//! parameter set never reaches a [`Currency`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Currency;
use crate::constants::*;
use crate::serialization::SerializationError;

/// Unrecoverable configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Difficulty window must be at least 2, got {0}")]
    InvalidDifficultyWindow(usize),
    #[error("Difficulty cut {cut} leaves fewer than 2 samples of window {window}")]
    InvalidDifficultyCut { window: usize, cut: usize },
    #[error("Upgrade voting threshold must be in 1..=100, got {0}")]
    InvalidUpgradeVotingThreshold(u32),
    #[error("Upgrade window must be positive")]
    InvalidUpgradeWindow,
    #[error("{0} decimal places cannot be represented in 64 bits")]
    InvalidDecimalPlaces(u8),
    #[error("Emission speed factor must be in 1..=64, got {0}")]
    InvalidEmissionSpeedFactor(u32),
    #[error("Block size growth denominator is zero")]
    ZeroGrowthDenominator,
    #[error("Block size limit overflows before height {0}")]
    BlockSizeGrowthOverflow(u32),
    #[error("Upgrade height of v{version} ({height}) is below the previous version's")]
    UpgradeHeightsNotMonotonic { version: u8, height: u32 },
    #[error("Genesis coinbase is not valid hex: {0}")]
    GenesisHex(#[from] hex::FromHexError),
    #[error("Failed to parse genesis coinbase: {0}")]
    GenesisTransaction(#[from] SerializationError),
    #[error("Invalid currency configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Immutable network constants of a currency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyParameters {
    pub max_block_number: u32,
    pub max_block_blob_size: u64,
    pub max_tx_size: u64,
    pub public_address_base58_prefix: u64,
    pub timestamp_check_window: u32,

    pub money_supply: u64,
    pub emission_speed_factor: u32,
    pub emission_speed_factor_v2: u32,
    pub emission_speed_factor_v2_height: u64,

    pub reward_blocks_window: u32,
    pub block_granted_full_reward_zone_v1: u64,
    pub block_granted_full_reward_zone_v2: u64,
    /// Full reward zone of v3 and later blocks
    pub block_granted_full_reward_zone: u64,
    pub miner_tx_blob_reserved_size: u64,

    pub number_of_decimal_places: u8,
    pub minimum_fee: u64,
    pub default_dust_threshold: u64,
    pub default_dust_threshold_v2: u64,
    pub dust_threshold_v2_height: u32,
    pub default_fusion_dust_threshold_v2: u64,
    pub fusion_dust_threshold_v2_height: u32,

    pub difficulty_target: u64,
    pub difficulty_window: usize,
    pub difficulty_cut: usize,
    pub difficulty_lag: usize,

    pub max_block_size_initial: u64,
    pub max_block_size_growth_speed_numerator: u64,
    pub max_block_size_growth_speed_denominator: u64,

    pub locked_tx_allowed_delta_seconds: u64,
    pub locked_tx_allowed_delta_blocks: u64,
    pub mempool_tx_live_time: u64,
    pub mempool_tx_from_alt_block_live_time: u64,
    pub number_of_periods_to_forget_tx_deleted_from_pool: u64,

    pub fusion_tx_max_size: u64,
    pub fusion_tx_min_input_count: usize,
    pub fusion_tx_min_in_out_count_ratio: usize,
    pub fusion_fee: u64,
    pub fusion_fee_height: u32,

    pub mined_money_unlock_window: u32,
    pub mined_money_unlock_window_v2: u32,
    pub mined_money_unlock_window_v2_height: u32,

    pub upgrade_height_v2: u32,
    pub upgrade_height_v3: u32,
    pub upgrade_height_v4: u32,
    pub upgrade_height_v5: u32,
    pub upgrade_height_v6: u32,
    pub upgrade_voting_threshold: u32,
    pub upgrade_voting_window: u32,
    pub upgrade_window: u32,

    pub genesis_coinbase_tx_hex: String,
}

impl Default for CurrencyParameters {
    fn default() -> Self {
        Self {
            max_block_number: MAX_BLOCK_NUMBER,
            max_block_blob_size: MAX_BLOCK_BLOB_SIZE,
            max_tx_size: MAX_TX_SIZE,
            public_address_base58_prefix: PUBLIC_ADDRESS_BASE58_PREFIX,
            timestamp_check_window: BLOCKCHAIN_TIMESTAMP_CHECK_WINDOW,
            money_supply: MONEY_SUPPLY,
            emission_speed_factor: EMISSION_SPEED_FACTOR,
            emission_speed_factor_v2: EMISSION_SPEED_FACTOR_V2,
            emission_speed_factor_v2_height: EMISSION_SPEED_FACTOR_V2_HEIGHT,
            reward_blocks_window: REWARD_BLOCKS_WINDOW,
            block_granted_full_reward_zone_v1: BLOCK_GRANTED_FULL_REWARD_ZONE_V1,
            block_granted_full_reward_zone_v2: BLOCK_GRANTED_FULL_REWARD_ZONE_V2,
            block_granted_full_reward_zone: BLOCK_GRANTED_FULL_REWARD_ZONE,
            miner_tx_blob_reserved_size: COINBASE_BLOB_RESERVED_SIZE,
            number_of_decimal_places: DISPLAY_DECIMAL_POINT,
            minimum_fee: MINIMUM_FEE,
            default_dust_threshold: DEFAULT_DUST_THRESHOLD,
            default_dust_threshold_v2: DEFAULT_DUST_THRESHOLD_V2,
            dust_threshold_v2_height: DUST_THRESHOLD_V2_HEIGHT,
            default_fusion_dust_threshold_v2: DEFAULT_FUSION_DUST_THRESHOLD_V2,
            fusion_dust_threshold_v2_height: FUSION_DUST_THRESHOLD_HEIGHT_V2,
            difficulty_target: DIFFICULTY_TARGET,
            difficulty_window: DIFFICULTY_WINDOW,
            difficulty_cut: DIFFICULTY_CUT,
            difficulty_lag: DIFFICULTY_LAG,
            max_block_size_initial: MAX_BLOCK_SIZE_INITIAL,
            max_block_size_growth_speed_numerator: MAX_BLOCK_SIZE_GROWTH_SPEED_NUMERATOR,
            max_block_size_growth_speed_denominator: MAX_BLOCK_SIZE_GROWTH_SPEED_DENOMINATOR,
            locked_tx_allowed_delta_seconds: LOCKED_TX_ALLOWED_DELTA_SECONDS,
            locked_tx_allowed_delta_blocks: LOCKED_TX_ALLOWED_DELTA_BLOCKS,
            mempool_tx_live_time: MEMPOOL_TX_LIVETIME,
            mempool_tx_from_alt_block_live_time: MEMPOOL_TX_FROM_ALT_BLOCK_LIVETIME,
            number_of_periods_to_forget_tx_deleted_from_pool:
                NUMBER_OF_PERIODS_TO_FORGET_TX_DELETED_FROM_POOL,
            fusion_tx_max_size: FUSION_TX_MAX_SIZE,
            fusion_tx_min_input_count: FUSION_TX_MIN_INPUT_COUNT,
            fusion_tx_min_in_out_count_ratio: FUSION_TX_MIN_IN_OUT_COUNT_RATIO,
            fusion_fee: FUSION_FEE_V1,
            fusion_fee_height: FUSION_FEE_V1_HEIGHT,
            mined_money_unlock_window: MINED_MONEY_UNLOCK_WINDOW,
            mined_money_unlock_window_v2: MINED_MONEY_UNLOCK_WINDOW_V2,
            mined_money_unlock_window_v2_height: MINED_MONEY_UNLOCK_WINDOW_V2_HEIGHT,
            upgrade_height_v2: UPGRADE_HEIGHT_V2,
            upgrade_height_v3: UPGRADE_HEIGHT_V3,
            upgrade_height_v4: UPGRADE_HEIGHT_V4,
            upgrade_height_v5: UPGRADE_HEIGHT_V5,
            upgrade_height_v6: UPGRADE_HEIGHT_V6,
            upgrade_voting_threshold: UPGRADE_VOTING_THRESHOLD,
            upgrade_voting_window: UPGRADE_VOTING_WINDOW,
            upgrade_window: UPGRADE_WINDOW,
            genesis_coinbase_tx_hex: GENESIS_COINBASE_TX_HEX.to_string(),
        }
    }
}

fn check_difficulty_window(val: usize) -> Result<(), ConfigError> {
    if val < 2 {
        return Err(ConfigError::InvalidDifficultyWindow(val));
    }
    Ok(())
}

fn check_upgrade_voting_threshold(val: u32) -> Result<(), ConfigError> {
    if val == 0 || val > 100 {
        return Err(ConfigError::InvalidUpgradeVotingThreshold(val));
    }
    Ok(())
}

fn check_upgrade_window(val: u32) -> Result<(), ConfigError> {
    if val == 0 {
        return Err(ConfigError::InvalidUpgradeWindow);
    }
    Ok(())
}

impl CurrencyParameters {
    /// Atomic units in one whole coin
    pub fn coin(&self) -> u64 {
        10u64.pow(self.number_of_decimal_places as u32)
    }

    /// Check every cross-field invariant
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_difficulty_window(self.difficulty_window)?;
        if self.difficulty_cut.saturating_mul(2) > self.difficulty_window - 2 {
            return Err(ConfigError::InvalidDifficultyCut {
                window: self.difficulty_window,
                cut: self.difficulty_cut,
            });
        }
        check_upgrade_voting_threshold(self.upgrade_voting_threshold)?;
        check_upgrade_window(self.upgrade_window)?;

        if self.number_of_decimal_places > 19 {
            return Err(ConfigError::InvalidDecimalPlaces(self.number_of_decimal_places));
        }

        for factor in [self.emission_speed_factor, self.emission_speed_factor_v2] {
            if factor == 0 || factor > 64 {
                return Err(ConfigError::InvalidEmissionSpeedFactor(factor));
            }
        }

        if self.max_block_size_growth_speed_denominator == 0 {
            return Err(ConfigError::ZeroGrowthDenominator);
        }
        let growth = self.max_block_number as u128
            * self.max_block_size_growth_speed_numerator as u128
            / self.max_block_size_growth_speed_denominator as u128;
        if growth + self.max_block_size_initial as u128 > u64::MAX as u128 {
            return Err(ConfigError::BlockSizeGrowthOverflow(self.max_block_number));
        }

        let heights = [
            self.upgrade_height_v2,
            self.upgrade_height_v3,
            self.upgrade_height_v4,
            self.upgrade_height_v5,
            self.upgrade_height_v6,
        ];
        for (i, pair) in heights.windows(2).enumerate() {
            if pair[1] < pair[0] {
                return Err(ConfigError::UpgradeHeightsNotMonotonic {
                    version: i as u8 + 3,
                    height: pair[1],
                });
            }
        }

        Ok(())
    }
}

macro_rules! setters {
    ($($name:ident: $ty:ty),* $(,)?) => {
        $(
            pub fn $name(mut self, val: $ty) -> Self {
                self.params.$name = val;
                self
            }
        )*
    };
}

/// Fluent builder for [`CurrencyParameters`]
#[derive(Debug, Clone, Default)]
pub struct CurrencyBuilder {
    params: CurrencyParameters,
}

impl CurrencyBuilder {
    /// Start from the network defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a JSON document; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            params: serde_json::from_str(json)?,
        })
    }

    setters! {
        max_block_number: u32,
        max_block_blob_size: u64,
        max_tx_size: u64,
        public_address_base58_prefix: u64,
        timestamp_check_window: u32,
        money_supply: u64,
        emission_speed_factor: u32,
        emission_speed_factor_v2: u32,
        emission_speed_factor_v2_height: u64,
        reward_blocks_window: u32,
        block_granted_full_reward_zone_v1: u64,
        block_granted_full_reward_zone_v2: u64,
        block_granted_full_reward_zone: u64,
        miner_tx_blob_reserved_size: u64,
        number_of_decimal_places: u8,
        minimum_fee: u64,
        default_dust_threshold: u64,
        default_dust_threshold_v2: u64,
        dust_threshold_v2_height: u32,
        default_fusion_dust_threshold_v2: u64,
        fusion_dust_threshold_v2_height: u32,
        difficulty_target: u64,
        difficulty_cut: usize,
        difficulty_lag: usize,
        max_block_size_initial: u64,
        max_block_size_growth_speed_numerator: u64,
        max_block_size_growth_speed_denominator: u64,
        locked_tx_allowed_delta_seconds: u64,
        locked_tx_allowed_delta_blocks: u64,
        mempool_tx_live_time: u64,
        mempool_tx_from_alt_block_live_time: u64,
        number_of_periods_to_forget_tx_deleted_from_pool: u64,
        fusion_tx_max_size: u64,
        fusion_tx_min_input_count: usize,
        fusion_tx_min_in_out_count_ratio: usize,
        fusion_fee: u64,
        fusion_fee_height: u32,
        mined_money_unlock_window: u32,
        mined_money_unlock_window_v2: u32,
        mined_money_unlock_window_v2_height: u32,
        upgrade_height_v2: u32,
        upgrade_height_v3: u32,
        upgrade_height_v4: u32,
        upgrade_height_v5: u32,
        upgrade_height_v6: u32,
        upgrade_voting_window: u32,
        genesis_coinbase_tx_hex: String,
    }

    pub fn difficulty_window(mut self, val: usize) -> Result<Self, ConfigError> {
        check_difficulty_window(val)?;
        self.params.difficulty_window = val;
        Ok(self)
    }

    pub fn upgrade_voting_threshold(mut self, val: u32) -> Result<Self, ConfigError> {
        check_upgrade_voting_threshold(val)?;
        self.params.upgrade_voting_threshold = val;
        Ok(self)
    }

    pub fn upgrade_window(mut self, val: u32) -> Result<Self, ConfigError> {
        check_upgrade_window(val)?;
        self.params.upgrade_window = val;
        Ok(self)
    }

    /// Validate and hand out the finished parameter set
    pub fn finalize(self) -> Result<CurrencyParameters, ConfigError> {
        self.params.validate()?;
        Ok(self.params)
    }

    /// Finalize and materialize the genesis block in one step
    pub fn currency(self) -> Result<Currency, ConfigError> {
        Currency::new(self.finalize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let params = CurrencyBuilder::new().finalize().unwrap();
        assert_eq!(params, CurrencyParameters::default());
        assert_eq!(params.coin(), 100);
    }

    #[test]
    fn test_difficulty_window_precondition() {
        assert!(matches!(
            CurrencyBuilder::new().difficulty_window(1),
            Err(ConfigError::InvalidDifficultyWindow(1))
        ));
        assert!(CurrencyBuilder::new().difficulty_window(2).is_ok());
    }

    #[test]
    fn test_voting_threshold_precondition() {
        assert!(CurrencyBuilder::new().upgrade_voting_threshold(0).is_err());
        assert!(CurrencyBuilder::new().upgrade_voting_threshold(101).is_err());
        assert!(CurrencyBuilder::new().upgrade_voting_threshold(1).is_ok());
        assert!(CurrencyBuilder::new().upgrade_voting_threshold(100).is_ok());
    }

    #[test]
    fn test_upgrade_window_precondition() {
        assert!(matches!(
            CurrencyBuilder::new().upgrade_window(0),
            Err(ConfigError::InvalidUpgradeWindow)
        ));
        assert!(CurrencyBuilder::new().upgrade_window(1).is_ok());
    }

    #[test]
    fn test_small_window_needs_small_cut() {
        let builder = CurrencyBuilder::new().difficulty_window(10).unwrap();
        assert!(matches!(
            builder.clone().finalize(),
            Err(ConfigError::InvalidDifficultyCut { window: 10, cut: 60 })
        ));
        assert!(builder.difficulty_cut(4).finalize().is_ok());
    }

    #[test]
    fn test_json_bypassing_setters_is_still_checked() {
        let builder = CurrencyBuilder::from_json(r#"{ "upgrade_window": 0 }"#).unwrap();
        assert!(matches!(builder.finalize(), Err(ConfigError::InvalidUpgradeWindow)));
    }

    #[test]
    fn test_json_overrides_keep_defaults() {
        let params = CurrencyBuilder::from_json(r#"{ "money_supply": 1000000, "number_of_decimal_places": 8 }"#)
            .unwrap()
            .finalize()
            .unwrap();
        assert_eq!(params.money_supply, 1_000_000);
        assert_eq!(params.coin(), 100_000_000);
        assert_eq!(params.fusion_tx_min_input_count, FUSION_TX_MIN_INPUT_COUNT);
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(matches!(
            CurrencyBuilder::from_json("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_upgrade_heights_must_be_monotonic() {
        let result = CurrencyBuilder::new()
            .upgrade_height_v4(10)
            .upgrade_height_v5(5)
            .finalize();
        assert!(matches!(
            result,
            Err(ConfigError::UpgradeHeightsNotMonotonic { version: 5, height: 5 })
        ));
    }

    #[test]
    fn test_growth_overflow_rejected() {
        let result = CurrencyBuilder::new()
            .max_block_size_growth_speed_numerator(u64::MAX)
            .max_block_size_growth_speed_denominator(1)
            .finalize();
        assert!(matches!(result, Err(ConfigError::BlockSizeGrowthOverflow(_))));

        let result = CurrencyBuilder::new()
            .max_block_size_growth_speed_denominator(0)
            .finalize();
        assert!(matches!(result, Err(ConfigError::ZeroGrowthDenominator)));
    }

    #[test]
    fn test_decimal_places_and_emission_limits() {
        assert!(CurrencyBuilder::new().number_of_decimal_places(20).finalize().is_err());
        assert!(CurrencyBuilder::new().number_of_decimal_places(19).finalize().is_ok());
        assert!(CurrencyBuilder::new().emission_speed_factor(0).finalize().is_err());
        assert!(CurrencyBuilder::new().emission_speed_factor_v2(65).finalize().is_err());
    }
}
