use std::io::{Error as IoError, ErrorKind as IoErrorKind, Read, Result as IoResult, Write};

use serde::{Deserialize, Serialize};

use crate::blake256::{Blake256, Hash};
use crate::utils::Saveable;

pub const HEADER_SIZE: usize = 80;

/// The 80-byte block header. The proof-of-work hash covers exactly these
/// six fields in serialization order; transactions are committed to only
/// through the merkle root.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlockHeader {
    pub version: i32,
    pub prev_block: Hash,
    pub merkle_root: Hash,
    pub time: u32,
    pub bits: u32,
    pub nonce: u32,
}

impl BlockHeader {
    pub fn new(
        version: i32,
        prev_block: Hash,
        merkle_root: Hash,
        time: u32,
        bits: u32,
        nonce: u32,
    ) -> Self {
        BlockHeader {
            version,
            prev_block,
            merkle_root,
            time,
            bits,
            nonce,
        }
    }

    // version(4) | prev(32) | merkle(32) | time(4) | bits(4) | nonce(4),
    // every field little-endian.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.version.to_le_bytes());
        bytes[4..36].copy_from_slice(&self.prev_block.to_le_bytes());
        bytes[36..68].copy_from_slice(&self.merkle_root.to_le_bytes());
        bytes[68..72].copy_from_slice(&self.time.to_le_bytes());
        bytes[72..76].copy_from_slice(&self.bits.to_le_bytes());
        bytes[76..80].copy_from_slice(&self.nonce.to_le_bytes());
        bytes
    }

    pub fn hash(&self) -> Hash {
        let mut engine = Blake256::new();
        engine.write(&self.to_bytes());
        Hash::from_digest(engine.finalize())
    }

    pub fn block_time(&self) -> i64 {
        i64::from(self.time)
    }
}

impl Saveable for BlockHeader {
    fn load<I: Read>(reader: I) -> IoResult<Self> {
        serde_json::from_reader(reader).map_err(|e| {
            IoError::new(
                IoErrorKind::InvalidData,
                format!("Failed to deserialize BlockHeader: {}", e),
            )
        })
    }

    fn save<O: Write>(&self, writer: O) -> IoResult<()> {
        serde_json::to_writer_pretty(writer, self).map_err(|e| {
            IoError::new(
                IoErrorKind::InvalidData,
                format!("Failed to serialize BlockHeader: {}", e),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::TryFrom;

    #[test]
    fn test_header_byte_layout() {
        let header = BlockHeader::new(
            2,
            Hash::try_from("00000000000000000000000000000000000000000000000000000000000000aa")
                .unwrap(),
            Hash::try_from("00000000000000000000000000000000000000000000000000000000000000bb")
                .unwrap(),
            0x01020304,
            0x1d00ffff,
            0xdeadbeef,
        );
        let bytes = header.to_bytes();

        assert_eq!(&bytes[0..4], &[2, 0, 0, 0]);
        // Hash fields serialize least-significant byte first.
        assert_eq!(bytes[4], 0xaa);
        assert_eq!(&bytes[5..36], &[0u8; 31]);
        assert_eq!(bytes[36], 0xbb);
        assert_eq!(&bytes[37..68], &[0u8; 31]);
        assert_eq!(&bytes[68..72], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(&bytes[72..76], &[0xff, 0xff, 0x00, 0x1d]);
        assert_eq!(&bytes[76..80], &[0xef, 0xbe, 0xad, 0xde]);
    }

    #[test]
    fn test_all_zero_header_hash() {
        let header = BlockHeader::default();
        assert_eq!(header.to_bytes(), [0u8; HEADER_SIZE]);
        assert_eq!(
            header.hash().to_string(),
            "013ca43fbc84a1505ec744ce8d08e682da7e1dd0a27c7d063c45e8fca77ac5db"
        );
    }

    #[test]
    fn test_nonce_changes_hash() {
        let header = BlockHeader::default();
        let mut bumped = header;
        bumped.nonce += 1;
        assert_ne!(header.hash(), bumped.hash());
    }
}
