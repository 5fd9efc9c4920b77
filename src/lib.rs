//! NIMBO Core Library
//!
//! Consensus and monetary-policy rules of a CryptoNote-style chain: block
//! reward emission, block size limits, genesis construction, coinbase
//! assembly, fusion classification, proof-of-work checks and the amount and
//! address text formats.
//!
//! Every rule here is a pure function of an immutable [`currency::Currency`]
//! plus call arguments.

pub mod consensus;
pub mod crypto;
pub mod currency;
pub mod mining;
pub mod serialization;
pub mod validation;
pub mod wallet;

/// Network defaults - the values a freshly built currency starts from
pub mod constants {
    /// Highest block index the chain will accept
    pub const MAX_BLOCK_NUMBER: u32 = 500_000_000;

    /// Maximum serialized block blob size
    pub const MAX_BLOCK_BLOB_SIZE: u64 = 500_000_000;

    /// Maximum serialized transaction size
    pub const MAX_TX_SIZE: u64 = 1_000_000_000;

    /// Varint prefix embedded in every public address
    pub const PUBLIC_ADDRESS_BASE58_PREFIX: u64 = 3_914_525;

    /// Coinbase outputs stay locked for this many blocks
    pub const MINED_MONEY_UNLOCK_WINDOW: u32 = 10;

    /// Replacement unlock window once `MINED_MONEY_UNLOCK_WINDOW_V2_HEIGHT` is reached
    pub const MINED_MONEY_UNLOCK_WINDOW_V2: u32 = 40;
    pub const MINED_MONEY_UNLOCK_WINDOW_V2_HEIGHT: u32 = 500_000;

    /// Target block time in seconds
    pub const DIFFICULTY_TARGET: u64 = 30;

    pub const EXPECTED_NUMBER_OF_BLOCKS_PER_DAY: u32 = (24 * 60 * 60 / DIFFICULTY_TARGET) as u32;

    pub const BLOCKCHAIN_TIMESTAMP_CHECK_WINDOW: u32 = 60;

    /// Total emission ceiling in atomic units
    pub const MONEY_SUPPLY: u64 = 100_000_000_000_000;

    /// Base reward = (MONEY_SUPPLY - generated) >> factor
    pub const EMISSION_SPEED_FACTOR: u32 = 25;
    pub const EMISSION_SPEED_FACTOR_V2: u32 = 26;
    pub const EMISSION_SPEED_FACTOR_V2_HEIGHT: u64 = 1_000_000;

    pub const REWARD_BLOCKS_WINDOW: u32 = 100;

    /// Full reward zones, keyed by block major version (v1, v2, v3+)
    pub const BLOCK_GRANTED_FULL_REWARD_ZONE_V1: u64 = 10_000;
    pub const BLOCK_GRANTED_FULL_REWARD_ZONE_V2: u64 = 20_000;
    pub const BLOCK_GRANTED_FULL_REWARD_ZONE: u64 = 100_000;

    pub const COINBASE_BLOB_RESERVED_SIZE: u64 = 600;

    /// Number of decimal places shown in amount strings
    pub const DISPLAY_DECIMAL_POINT: u8 = 2;

    pub const MINIMUM_FEE: u64 = 10;

    pub const DEFAULT_DUST_THRESHOLD: u64 = 10;
    pub const DEFAULT_DUST_THRESHOLD_V2: u64 = 0;
    pub const DUST_THRESHOLD_V2_HEIGHT: u32 = 300_000;

    pub const DEFAULT_FUSION_DUST_THRESHOLD_V2: u64 = 0;
    pub const FUSION_DUST_THRESHOLD_HEIGHT_V2: u32 = 350_000;

    pub const DIFFICULTY_WINDOW: usize = EXPECTED_NUMBER_OF_BLOCKS_PER_DAY as usize;
    pub const DIFFICULTY_CUT: usize = 60;
    pub const DIFFICULTY_LAG: usize = 15;

    pub const MAX_BLOCK_SIZE_INITIAL: u64 = 100_000;
    pub const MAX_BLOCK_SIZE_GROWTH_SPEED_NUMERATOR: u64 = 100 * 1024;
    pub const MAX_BLOCK_SIZE_GROWTH_SPEED_DENOMINATOR: u64 = 365 * 24 * 60 * 60 / DIFFICULTY_TARGET;

    pub const LOCKED_TX_ALLOWED_DELTA_BLOCKS: u64 = 1;
    pub const LOCKED_TX_ALLOWED_DELTA_SECONDS: u64 = DIFFICULTY_TARGET * LOCKED_TX_ALLOWED_DELTA_BLOCKS;

    pub const MEMPOOL_TX_LIVETIME: u64 = 60 * 60 * 24;
    pub const MEMPOOL_TX_FROM_ALT_BLOCK_LIVETIME: u64 = 60 * 60 * 24 * 7;
    pub const NUMBER_OF_PERIODS_TO_FORGET_TX_DELETED_FROM_POOL: u64 = 7;

    pub const FUSION_TX_MAX_SIZE: u64 = BLOCK_GRANTED_FULL_REWARD_ZONE_V2 * 30 / 100;
    pub const FUSION_TX_MIN_INPUT_COUNT: usize = 12;
    pub const FUSION_TX_MIN_IN_OUT_COUNT_RATIO: usize = 4;

    /// Flat fee burned by fusion transactions from `FUSION_FEE_V1_HEIGHT`
    pub const FUSION_FEE_V1: u64 = 10;
    pub const FUSION_FEE_V1_HEIGHT: u32 = 400_000;

    pub const UPGRADE_HEIGHT_V2: u32 = 1;
    pub const UPGRADE_HEIGHT_V3: u32 = 2;
    pub const UPGRADE_HEIGHT_V4: u32 = 100_000;
    pub const UPGRADE_HEIGHT_V5: u32 = 450_000;
    pub const UPGRADE_HEIGHT_V6: u32 = 900_000;

    /// Percent of blocks in the voting window that must signal an upgrade
    pub const UPGRADE_VOTING_THRESHOLD: u32 = 90;
    pub const UPGRADE_VOTING_WINDOW: u32 = EXPECTED_NUMBER_OF_BLOCKS_PER_DAY;
    pub const UPGRADE_WINDOW: u32 = EXPECTED_NUMBER_OF_BLOCKS_PER_DAY;

    pub const CURRENT_TRANSACTION_VERSION: u8 = 1;

    pub const BLOCK_MINOR_VERSION_0: u8 = 0;

    /// Coinbase of block 0, binary serialized and hex encoded
    pub const GENESIS_COINBASE_TX_HEX: &str = "010a01ff000188f3b501029b2e4c0281c0b02e7c53291a94d1d0cbff8883f8024f5142ee494ffbbd088071210142694232c5b04151d9e4c27d31ec7a68ea568b19488cfcb422659a07a0e44dd5";

    pub const GENESIS_NONCE: u32 = 70;
    pub const GENESIS_TIMESTAMP: u64 = 0;
}
