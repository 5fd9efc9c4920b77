//! Fusion transactions
//!
//! A fusion transaction consolidates many small inputs into few canonical
//! outputs. It is recognised by shape alone: small, input-heavy, and paying
//! exactly the canonical decomposition of its inputs less the fusion fee.

use thiserror::Error;

use super::amounts::{decompose_amount, pretty_amount_index};
use crate::currency::Currency;
use crate::validation::Transaction;

/// Reasons a transaction is not a fusion transaction
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FusionError {
    #[error("Size {size} exceeds the fusion limit {max}")]
    TooLarge { size: u64, max: u64 },
    #[error("{count} inputs, at least {min} required")]
    TooFewInputs { count: usize, min: usize },
    #[error("{inputs} inputs for {outputs} outputs is below the ratio {ratio}")]
    InOutRatio {
        inputs: usize,
        outputs: usize,
        ratio: usize,
    },
    #[error("Input amount {amount} is below the dust threshold {threshold}")]
    DustInput { amount: u64, threshold: u64 },
    #[error("Input amounts overflow")]
    InputOverflow,
    #[error("Inputs {total} do not cover the fusion fee {fee}")]
    InsufficientForFee { total: u64, fee: u64 },
    #[error("Outputs are not the canonical decomposition of the inputs")]
    NonCanonicalOutputs,
}

impl Currency {
    /// Fusion fee in force at `height`
    pub fn fusion_fee(&self, height: u32) -> u64 {
        let params = self.params();
        if height >= params.fusion_fee_height {
            params.fusion_fee
        } else {
            0
        }
    }

    /// Classify by amounts and size; outputs must be in ascending order
    pub fn check_fusion_amounts(
        &self,
        input_amounts: &[u64],
        output_amounts: &[u64],
        size: u64,
        height: u32,
    ) -> Result<(), FusionError> {
        let params = self.params();

        if size > params.fusion_tx_max_size {
            return Err(FusionError::TooLarge {
                size,
                max: params.fusion_tx_max_size,
            });
        }

        if input_amounts.len() < params.fusion_tx_min_input_count {
            return Err(FusionError::TooFewInputs {
                count: input_amounts.len(),
                min: params.fusion_tx_min_input_count,
            });
        }

        let ratio = params.fusion_tx_min_in_out_count_ratio;
        if input_amounts.len() < output_amounts.len().saturating_mul(ratio) {
            return Err(FusionError::InOutRatio {
                inputs: input_amounts.len(),
                outputs: output_amounts.len(),
                ratio,
            });
        }

        let threshold = self.default_fusion_dust_threshold(height);
        let mut input_total = 0u64;
        for &amount in input_amounts {
            if amount < threshold {
                return Err(FusionError::DustInput { amount, threshold });
            }
            input_total = input_total
                .checked_add(amount)
                .ok_or(FusionError::InputOverflow)?;
        }

        let fee = self.fusion_fee(height);
        let payable = input_total
            .checked_sub(fee)
            .ok_or(FusionError::InsufficientForFee {
                total: input_total,
                fee,
            })?;

        let mut expected = decompose_amount(payable, threshold);
        expected.sort_unstable();

        if expected != output_amounts {
            return Err(FusionError::NonCanonicalOutputs);
        }
        Ok(())
    }

    pub fn is_fusion_amounts(
        &self,
        input_amounts: &[u64],
        output_amounts: &[u64],
        size: u64,
        height: u32,
    ) -> bool {
        self.check_fusion_amounts(input_amounts, output_amounts, size, height)
            .is_ok()
    }

    /// Classify a transaction; base inputs count as zero-amount inputs
    pub fn check_fusion_transaction(
        &self,
        transaction: &Transaction,
        height: u32,
    ) -> Result<(), FusionError> {
        self.check_fusion_amounts(
            &transaction.input_amounts(),
            &transaction.output_amounts(),
            transaction.binary_size(),
            height,
        )
    }

    pub fn is_fusion_transaction(&self, transaction: &Transaction, height: u32) -> bool {
        self.check_fusion_transaction(transaction, height).is_ok()
    }

    /// Power-of-ten class of an amount usable as a fusion input.
    ///
    /// `None` unless the amount is below `threshold`, not dust at `height`,
    /// and a pretty amount.
    pub fn is_amount_applicable_in_fusion_transaction_input(
        &self,
        amount: u64,
        threshold: u64,
        height: u32,
    ) -> Option<u8> {
        if amount >= threshold || amount < self.default_fusion_dust_threshold(height) {
            return None;
        }
        pretty_amount_index(amount).map(|index| (index / 9) as u8)
    }
}
