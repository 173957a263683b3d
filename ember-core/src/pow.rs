use anyhow::{anyhow, Result};
use log::debug;

use crate::blake256::Hash;
use crate::chain::ChainEntry;
use crate::compact::{decode_compact, encode_compact};
use crate::params::ConsensusParams;
use crate::U256;

/// Difficulty encoding required of the block following `tip`.
///
/// Errors indicate a corrupt chain index (an expected ancestor missing),
/// never an invalid block; block rejection is `check_proof_of_work`'s job.
pub fn next_work_required<E: ChainEntry>(
    tip: &E,
    candidate_time: i64,
    params: &ConsensusParams,
) -> Result<u32> {
    let pow_limit_bits = params.pow_limit_bits();
    let interval = params.difficulty_adjustment_interval();

    // Difficulty only changes once per adjustment interval.
    if (tip.height() + 1) % interval != 0 {
        if params.pow_allow_min_difficulty_blocks {
            // Testnet rule: if the candidate's timestamp is more than twice
            // the target spacing past the tip, a minimum-difficulty block
            // may be mined.
            if candidate_time > tip.block_time() + params.pow_target_spacing * 2 {
                return Ok(pow_limit_bits);
            }
            // Otherwise reuse the last difficulty that was not itself a
            // minimum-difficulty exception.
            let mut entry = tip;
            while let Some(prev) = entry.prev() {
                if entry.height() % interval == 0 || entry.bits() != pow_limit_bits {
                    break;
                }
                entry = prev;
            }
            return Ok(entry.bits());
        }
        return Ok(tip.bits());
    }

    // One interval's worth of blocks back, counting the tip itself.
    let first_height = tip
        .height()
        .checked_sub(interval - 1)
        .ok_or_else(|| anyhow!("Retarget boundary at height {} reaches below genesis", tip.height() + 1))?;
    let first = tip.ancestor(first_height).ok_or_else(|| {
        anyhow!(
            "Chain index is missing the ancestor at height {} below tip {}",
            first_height,
            tip.height()
        )
    })?;

    debug!("Retargeting for height {}", tip.height() + 1);
    debug!(
        "Tip: height {}, bits 0x{:08x}, time {}",
        tip.height(),
        tip.bits(),
        tip.block_time()
    );
    debug!(
        "Window start: height {}, time {}",
        first.height(),
        first.block_time()
    );

    Ok(calculate_next_work_required(tip, first.block_time(), params))
}

/// Retarget calculation at an interval boundary.
pub fn calculate_next_work_required<E: ChainEntry>(
    tip: &E,
    first_block_time: i64,
    params: &ConsensusParams,
) -> u32 {
    if params.pow_no_retargeting {
        return tip.bits();
    }

    let mut actual_timespan = tip.block_time() - first_block_time;
    let target_timespan = params.pow_target_timespan;

    // Difficulty may rise at most 15% per window, tightening to 3% from the
    // clamp-switch height onward; it may fall at most 50%. The 3% limit
    // only engages when the window ran faster than a quarter timespan, so
    // past the switch height a window between a quarter and the 15% bound
    // passes through unclamped.
    let min_timespan = target_timespan * 100 / 115;
    let min_timespan_tight = target_timespan * 100 / 103;
    let max_timespan = target_timespan * 2;

    if actual_timespan < target_timespan / 4 && tip.height() >= params.tight_clamp_height {
        actual_timespan = min_timespan_tight;
    } else if actual_timespan < min_timespan && tip.height() < params.tight_clamp_height {
        actual_timespan = min_timespan;
    }
    if actual_timespan > max_timespan {
        actual_timespan = max_timespan;
    }

    debug!("Actual timespan clamped to {} seconds", actual_timespan);

    let old_target = decode_compact(tip.bits()).target;
    let (scaled, _) = old_target.overflowing_mul(U256::from(actual_timespan as u64));
    let mut new_target = scaled / U256::from(target_timespan as u64);
    if new_target > params.pow_limit {
        new_target = params.pow_limit;
    }

    encode_compact(new_target)
}

/// Checks a header hash against its claimed difficulty encoding.
pub fn check_proof_of_work(hash: &Hash, bits: u32, params: &ConsensusParams) -> bool {
    let decoded = decode_compact(bits);

    if decoded.negative
        || decoded.overflow
        || decoded.target.is_zero()
        || decoded.target > params.pow_limit
    {
        return false;
    }

    hash.matches_target(decoded.target)
}
