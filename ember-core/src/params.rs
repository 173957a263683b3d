use std::io::{Error as IoError, ErrorKind as IoErrorKind, Read, Result as IoResult, Write};

use serde::{Deserialize, Serialize};

use crate::compact::encode_compact;
use crate::utils::Saveable;
use crate::{U256, MAX_TARGET, POW_TARGET_SPACING, POW_TARGET_TIMESPAN, TIGHT_CLAMP_HEIGHT};

/// Consensus parameters for one network. Immutable once constructed.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ConsensusParams {
    pub pow_limit: U256,
    pub pow_target_spacing: i64,
    pub pow_target_timespan: i64,
    pub pow_allow_min_difficulty_blocks: bool,
    pub pow_no_retargeting: bool,
    pub tight_clamp_height: u64,
}

impl ConsensusParams {
    pub fn mainnet() -> Self {
        ConsensusParams {
            pow_limit: MAX_TARGET,
            pow_target_spacing: POW_TARGET_SPACING,
            pow_target_timespan: POW_TARGET_TIMESPAN,
            pow_allow_min_difficulty_blocks: false,
            pow_no_retargeting: false,
            tight_clamp_height: TIGHT_CLAMP_HEIGHT,
        }
    }

    pub fn testnet() -> Self {
        ConsensusParams {
            pow_allow_min_difficulty_blocks: true,
            ..Self::mainnet()
        }
    }

    pub fn regtest() -> Self {
        ConsensusParams {
            pow_no_retargeting: true,
            ..Self::mainnet()
        }
    }

    pub fn difficulty_adjustment_interval(&self) -> u64 {
        (self.pow_target_timespan / self.pow_target_spacing) as u64
    }

    /// Compact encoding of the easiest allowed target.
    pub fn pow_limit_bits(&self) -> u32 {
        encode_compact(self.pow_limit)
    }
}

impl Saveable for ConsensusParams {
    fn load<I: Read>(reader: I) -> IoResult<Self> {
        serde_json::from_reader(reader).map_err(|e| {
            IoError::new(
                IoErrorKind::InvalidData,
                format!("Failed to deserialize ConsensusParams: {}", e),
            )
        })
    }

    fn save<O: Write>(&self, writer: O) -> IoResult<()> {
        serde_json::to_writer_pretty(writer, self).map_err(|e| {
            IoError::new(
                IoErrorKind::InvalidData,
                format!("Failed to serialize ConsensusParams: {}", e),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_and_limit_bits() {
        let params = ConsensusParams::mainnet();
        assert_eq!(params.difficulty_adjustment_interval(), 20);
        assert_eq!(params.pow_limit_bits(), 0x1e0fffff);
    }

    #[test]
    fn test_network_presets() {
        assert!(!ConsensusParams::mainnet().pow_allow_min_difficulty_blocks);
        assert!(ConsensusParams::testnet().pow_allow_min_difficulty_blocks);
        assert!(ConsensusParams::regtest().pow_no_retargeting);
    }

    #[test]
    fn test_save_load_round_trip() {
        let params = ConsensusParams::testnet();
        let mut buffer = Vec::new();
        params.save(&mut buffer).unwrap();
        let loaded = ConsensusParams::load(buffer.as_slice()).unwrap();
        assert_eq!(loaded, params);
    }
}
