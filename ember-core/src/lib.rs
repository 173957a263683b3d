pub mod blake256;
pub mod block;
pub mod chain;
pub mod compact;
pub mod params;
pub mod pow;
pub mod utils;

use serde::{Deserialize, Serialize};
use uint::construct_uint;

construct_uint! {
   #[derive(Serialize, Deserialize)]
   pub struct U256(4);
}

pub const POW_TARGET_SPACING: i64 = 180; // 3 minutes in seconds
pub const POW_TARGET_TIMESPAN: i64 = 3600; // 1 hour, i.e. one 20-block retarget window
pub const TIGHT_CLAMP_HEIGHT: u64 = 3500; // height at which the too-fast clamp drops from 15% to 3%

// Easiest allowed target: 2^236 - 1 (top 20 bits zero). Compact form 0x1e0fffff.
pub const MAX_TARGET: U256 = U256([
    0xFFFF_FFFF_FFFF_FFFF, // word0
    0xFFFF_FFFF_FFFF_FFFF, // word1
    0xFFFF_FFFF_FFFF_FFFF, // word2
    0x0000_0FFF_FFFF_FFFF, // word3
]);
