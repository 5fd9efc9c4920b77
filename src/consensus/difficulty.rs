//! Difficulty retargeting
//!
//! Windowed average: over the last `window` blocks, drop the `cut` earliest
//! and latest timestamps, then divide the work done in the remaining span
//! by the time it took.

use tracing::trace;

use crate::currency::Currency;

/// Next block difficulty from a window of samples.
///
/// `timestamps` and `cumulative_difficulties` are oldest first; only the
/// first `window` samples are used. Returns 1 with fewer than two samples
/// and 0 when the result does not fit in 64 bits.
pub fn next_difficulty(
    timestamps: &[u64],
    cumulative_difficulties: &[u64],
    window: usize,
    cut: usize,
    target_seconds: u64,
) -> u64 {
    let length = timestamps
        .len()
        .min(cumulative_difficulties.len())
        .min(window);
    if length <= 1 {
        return 1;
    }

    let mut sorted = timestamps[..length].to_vec();
    sorted.sort_unstable();

    let kept = window.saturating_sub(cut.saturating_mul(2)).max(2);
    let (cut_begin, cut_end) = if length <= kept {
        (0, length)
    } else {
        let begin = (length - kept + 1) / 2;
        (begin, begin + kept)
    };

    let time_span = (sorted[cut_end - 1] - sorted[cut_begin]).max(1);
    let total_work = cumulative_difficulties[cut_end - 1]
        .saturating_sub(cumulative_difficulties[cut_begin]);

    // The rounded-up quotient must fit in 64 bits before the division
    u64::try_from(total_work as u128 * target_seconds as u128)
        .ok()
        .and_then(|work| work.checked_add(time_span - 1))
        .map_or(0, |work| work / time_span)
}

impl Currency {
    /// Samples a caller must supply: the window plus the lag
    pub fn difficulty_blocks_count(&self) -> usize {
        self.params().difficulty_window + self.params().difficulty_lag
    }

    /// Difficulty required of the block after the given samples
    pub fn next_difficulty(
        &self,
        major_version: u8,
        block_index: u32,
        timestamps: &[u64],
        cumulative_difficulties: &[u64],
    ) -> u64 {
        let params = self.params();
        let difficulty = next_difficulty(
            timestamps,
            cumulative_difficulties,
            params.difficulty_window,
            params.difficulty_cut,
            params.difficulty_target,
        );
        trace!(major_version, block_index, difficulty, "Next difficulty");
        difficulty
    }
}
