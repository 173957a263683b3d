use std::convert::TryFrom;

use ember_core::{
    blake256::{blake256, Hash},
    block::BlockHeader,
    chain::MemoryEntry,
    compact::{decode_compact, encode_compact},
    params::ConsensusParams,
    pow::{check_proof_of_work, next_work_required},
};

#[test]
fn header_hash_matches_reference_vector() {
    let header = BlockHeader::default();
    let digest = blake256(&header.to_bytes());
    assert_eq!(
        hex::encode(digest),
        "dbc57aa7fce8453c067d7ca2d01d7eda82e6088dce44c75e50a184bc3fa43c01"
    );
    assert_eq!(header.hash(), Hash::from_digest(digest));
}

#[test]
fn zero_header_fails_mainnet_pow() {
    // Deterministic: the all-zero header's hash sits far above the easiest
    // mainnet target.
    let params = ConsensusParams::mainnet();
    let header = BlockHeader::default();
    assert!(!check_proof_of_work(
        &header.hash(),
        params.pow_limit_bits(),
        &params
    ));
}

#[test]
fn constructed_hash_at_limit_passes() {
    let params = ConsensusParams::mainnet();
    let bits = params.pow_limit_bits();
    let target = decode_compact(bits).target;

    let winning = Hash::from_digest(target.to_little_endian());
    assert!(check_proof_of_work(&winning, bits, &params));

    // The same digest against a four-times-harder target fails.
    let harder = encode_compact(target >> 2);
    assert!(!check_proof_of_work(&winning, harder, &params));
}

#[test]
fn difficulty_pipeline_over_chain_history() {
    let params = ConsensusParams::mainnet();
    let bits = 0x1d00ffff;

    // A full retarget window mined on schedule barely moves the encoding.
    let mut tip = MemoryEntry::new(0, 1_700_000_000, bits);
    for i in 1..20i64 {
        tip = tip.extend(1_700_000_000 + i * 180, bits);
    }
    let next = next_work_required(&tip, 1_700_000_000 + 3600, &params).unwrap();
    assert_eq!(next, 0x1d00f332);

    // The new encoding decodes into range for validation.
    let decoded = decode_compact(next);
    assert!(!decoded.negative && !decoded.overflow);
    assert!(!decoded.target.is_zero());
    assert!(decoded.target <= params.pow_limit);
}

#[test]
fn hash_display_round_trips_through_hex() {
    let hash = Hash::from_digest(blake256(b"ember"));
    let hex_string = hash.to_string();
    assert_eq!(hex_string.len(), 64);
    assert_eq!(Hash::try_from(hex_string.as_str()).unwrap(), hash);
}
