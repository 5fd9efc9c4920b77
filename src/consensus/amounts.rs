//! Canonical denominations
//!
//! Outputs are kept to "pretty" amounts, a single nonzero digit followed by
//! zeros, so that outputs of equal amount can be mixed together.

use crate::currency::Currency;

/// Number of pretty amounts representable in 64 bits
pub const PRETTY_AMOUNT_COUNT: usize = 19 * 9 + 1;

/// Every `d * 10^p` for `d` in 1..=9 and `p` in 0..=18, then `10^19`, ascending
pub const PRETTY_AMOUNTS: [u64; PRETTY_AMOUNT_COUNT] = pretty_amounts();

const fn pretty_amounts() -> [u64; PRETTY_AMOUNT_COUNT] {
    let mut table = [0u64; PRETTY_AMOUNT_COUNT];
    let mut power = 1u64;
    let mut i = 0;
    while i < PRETTY_AMOUNT_COUNT - 1 {
        let mut digit = 1;
        while digit <= 9 {
            table[i] = digit * power;
            i += 1;
            digit += 1;
        }
        power *= 10;
    }
    table[PRETTY_AMOUNT_COUNT - 1] = power;
    table
}

/// Position of `amount` in [`PRETTY_AMOUNTS`]
pub fn pretty_amount_index(amount: u64) -> Option<usize> {
    PRETTY_AMOUNTS.binary_search(&amount).ok()
}

/// Split an amount into its decimal digit chunks.
///
/// Walking from the least significant digit, chunks are accumulated into a
/// dust bucket while the bucket stays within `dust_threshold`; the first
/// chunk that would push it over flushes the bucket to `dust_handler`. All
/// later chunks go to `chunk_handler`, in ascending order. Zero digits are
/// skipped once the dust bucket has been flushed.
pub fn decompose_amount_into_digits<C, D>(
    mut amount: u64,
    dust_threshold: u64,
    mut chunk_handler: C,
    mut dust_handler: D,
) where
    C: FnMut(u64),
    D: FnMut(u64),
{
    if amount == 0 {
        return;
    }

    let mut is_dust_handled = false;
    let mut dust = 0u64;
    let mut order = 1u64;

    while amount != 0 {
        let chunk = (amount % 10) * order;
        amount /= 10;
        order = order.wrapping_mul(10);

        let fits_in_dust = dust
            .checked_add(chunk)
            .map_or(false, |total| total <= dust_threshold);

        if fits_in_dust {
            dust += chunk;
        } else {
            if !is_dust_handled && dust != 0 {
                dust_handler(dust);
                is_dust_handled = true;
            }
            if chunk != 0 {
                chunk_handler(chunk);
            }
        }
    }

    if !is_dust_handled && dust != 0 {
        dust_handler(dust);
    }
}

/// Dust and digit chunks of an amount in ascending order
pub fn decompose_amount(amount: u64, dust_threshold: u64) -> Vec<u64> {
    let mut dust = Vec::new();
    let mut chunks = Vec::new();
    decompose_amount_into_digits(
        amount,
        dust_threshold,
        |chunk| chunks.push(chunk),
        |value| dust.push(value),
    );
    dust.extend(chunks);
    dust
}

impl Currency {
    /// Dust threshold applied when splitting amounts at `height`
    pub fn default_dust_threshold(&self, height: u32) -> u64 {
        let params = self.params();
        if height >= params.dust_threshold_v2_height {
            params.default_dust_threshold_v2
        } else {
            params.default_dust_threshold
        }
    }

    /// Dust threshold for fusion inputs at `height`
    pub fn default_fusion_dust_threshold(&self, height: u32) -> u64 {
        let params = self.params();
        if height >= params.fusion_dust_threshold_v2_height {
            params.default_fusion_dust_threshold_v2
        } else {
            params.default_dust_threshold
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pretty_amount_table() {
        assert_eq!(PRETTY_AMOUNTS[0], 1);
        assert_eq!(PRETTY_AMOUNTS[8], 9);
        assert_eq!(PRETTY_AMOUNTS[9], 10);
        assert_eq!(PRETTY_AMOUNTS[17], 90);
        assert_eq!(PRETTY_AMOUNTS[170], 9_000_000_000_000_000_000);
        assert_eq!(PRETTY_AMOUNTS[171], 10_000_000_000_000_000_000);
        assert!(PRETTY_AMOUNTS.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_pretty_amount_index() {
        assert_eq!(pretty_amount_index(1), Some(0));
        assert_eq!(pretty_amount_index(400), Some(21));
        assert_eq!(pretty_amount_index(11), None);
        assert_eq!(pretty_amount_index(0), None);
    }

    #[test]
    fn test_decompose_without_dust() {
        assert_eq!(decompose_amount(1_234, 0), vec![4, 30, 200, 1_000]);
        assert_eq!(decompose_amount(1_000_001, 0), vec![1, 1_000_000]);
        assert!(decompose_amount(0, 10).is_empty());
    }

    #[test]
    fn test_decompose_with_dust() {
        // 2 fits the dust bucket, 30 would overflow it
        assert_eq!(
            decompose_amount(2_980_232, 10),
            vec![2, 30, 200, 80_000, 900_000, 2_000_000]
        );
        // 9 + 0 stays within 10, then 100 flushes
        assert_eq!(decompose_amount(109, 10), vec![9, 100]);
        // Everything below the threshold is a single dust chunk
        assert_eq!(decompose_amount(57, 100), vec![57]);
    }

    #[test]
    fn test_decompose_sums_to_amount() {
        for amount in [1u64, 19, 2_980_232, 123_456_789, u64::MAX] {
            let parts = decompose_amount(amount, 10);
            assert_eq!(parts.iter().sum::<u64>(), amount);
        }
    }

    #[test]
    fn test_decompose_max_amount() {
        let parts = decompose_amount(u64::MAX, 0);
        // Two of the twenty digits are zero
        assert_eq!(parts.len(), 18);
        assert_eq!(*parts.last().unwrap(), 10_000_000_000_000_000_000);
    }
}
