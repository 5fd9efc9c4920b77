//! Block reward emission and block size limits
//!
//! The base reward is a fixed fraction of the coins still to be emitted:
//!
//! `base = (money_supply - already_generated) >> emission_speed_factor`
//!
//! A block larger than the effective median of recent block sizes gets a
//! quadratic penalty on its base reward (and, from v2, on its fees too); a
//! block over twice the median is invalid.

use primitive_types::U256;
use thiserror::Error;
use tracing::trace;

use super::{MajorVersion, UnknownMajorVersion};
use crate::currency::Currency;

/// Block reward errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RewardError {
    #[error("Block cumulative size {size} is over twice the effective median {median}")]
    BlockTooBig { size: u64, median: u64 },
    #[error("Reward overflows: base {base} plus fee {fee}")]
    Overflow { base: u64, fee: u64 },
    #[error(transparent)]
    UnknownVersion(#[from] UnknownMajorVersion),
}

/// Outcome of a reward computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockReward {
    /// Base reward plus fees, both after penalty
    pub reward: u64,
    /// Net change of the circulating supply: penalized base reward minus
    /// the fees burned by the penalty
    pub emission_change: i64,
}

/// Apply the oversize penalty to an amount.
///
/// Unchanged while `current_block_size <= median_size`; otherwise scaled by
/// `cur * (2m - cur) / m^2`, reaching zero at twice the median. Intermediate
/// products are computed in 256 bits.
pub fn penalized_amount(amount: u64, median_size: u64, current_block_size: u64) -> u64 {
    if amount == 0 || current_block_size <= median_size {
        return amount;
    }
    if current_block_size >= median_size.saturating_mul(2) {
        return 0;
    }

    let median = U256::from(median_size);
    let current = U256::from(current_block_size);
    let multiplicand = current * (median * 2 - current);
    let penalized: U256 = U256::from(amount) * multiplicand / median / median;

    // cur * (2m - cur) <= m^2, so the result never exceeds `amount`
    penalized.low_u64()
}

impl Currency {
    /// Reward of a block and its effect on the emitted supply.
    ///
    /// `median_size` is raised to the version's full reward zone before the
    /// penalty is applied.
    pub fn block_reward(
        &self,
        major_version: u8,
        median_size: u64,
        current_block_size: u64,
        already_generated_coins: u64,
        fee: u64,
        height: u64,
    ) -> Result<BlockReward, RewardError> {
        let version = MajorVersion::try_from(major_version)?;

        let factor = self.emission_speed_factor(height);
        let base_reward = self
            .params()
            .money_supply
            .saturating_sub(already_generated_coins)
            .checked_shr(factor)
            .unwrap_or(0);

        let median = median_size.max(self.block_granted_full_reward_zone(version));
        if current_block_size > median.saturating_mul(2) {
            trace!(
                size = current_block_size,
                median,
                "Block cumulative size is too big"
            );
            return Err(RewardError::BlockTooBig {
                size: current_block_size,
                median,
            });
        }

        let penalized_base = penalized_amount(base_reward, median, current_block_size);
        let penalized_fee = if version >= MajorVersion::V2 {
            penalized_amount(fee, median, current_block_size)
        } else {
            fee
        };

        let reward = penalized_base
            .checked_add(penalized_fee)
            .ok_or(RewardError::Overflow {
                base: penalized_base,
                fee: penalized_fee,
            })?;
        let burned_fee = fee - penalized_fee;
        let emission_change = (penalized_base as i64).wrapping_sub(burned_fee as i64);

        Ok(BlockReward {
            reward,
            emission_change,
        })
    }

    /// Largest cumulative block size allowed at `height`.
    ///
    /// Grows linearly from `max_block_size_initial`. Panics if `height` is
    /// beyond `max_block_number`, the range over which the parameters were
    /// checked not to overflow.
    pub fn max_block_cumulative_size(&self, height: u64) -> u64 {
        let params = self.params();
        assert!(
            height <= params.max_block_number as u64,
            "height {height} is beyond the maximum block number {}",
            params.max_block_number
        );

        let growth = height as u128 * params.max_block_size_growth_speed_numerator as u128
            / params.max_block_size_growth_speed_denominator as u128;
        (params.max_block_size_initial as u128 + growth) as u64
    }
}
