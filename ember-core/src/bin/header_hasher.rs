use std::{env, process::exit};

use ember_core::{
    blake256::{blake256, Hash},
    block::HEADER_SIZE,
    compact::decode_compact,
    params::ConsensusParams,
    pow::check_proof_of_work,
};

fn main() {
    let hex_header = if let Some(arg) = env::args().nth(1) {
        arg
    } else {
        eprintln!("Usage: header_hasher <80-byte-header-hex>");
        exit(1);
    };

    let bytes = hex::decode(hex_header.trim()).expect("Failed to decode header hex");
    if bytes.len() != HEADER_SIZE {
        eprintln!(
            "Expected {} header bytes, found {}",
            HEADER_SIZE,
            bytes.len()
        );
        exit(1);
    }

    let digest = blake256(&bytes);
    let hash = Hash::from_digest(digest);

    let bits = u32::from_le_bytes([bytes[72], bytes[73], bytes[74], bytes[75]]);
    let params = ConsensusParams::mainnet();
    let target = decode_compact(bits).target;

    println!("digest: {}", hex::encode(digest));
    println!("hash:   {}", hash);
    println!("bits:   0x{:08x} (target {:064x})", bits, target);
    println!(
        "pow:    {}",
        if check_proof_of_work(&hash, bits, &params) {
            "valid"
        } else {
            "invalid"
        }
    );
}
