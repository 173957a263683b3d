use crate::U256;
use anyhow::Result;
use hex;
use std::{convert::TryFrom, fmt};

// Chaining-value initialization constants, shared with the working array.
const IV: [u32; 8] = [
    0x6a09_e667, 0xbb67_ae85, 0x3c6e_f372, 0xa54f_f53a,
    0x510e_527f, 0x9b05_688c, 0x1f83_d9ab, 0x5be0_cd19,
];

// Per-round message/constant permutation schedule.
const SIGMA: [[usize; 16]; 14] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
    [14, 10, 4, 8, 9, 15, 13, 6, 1, 12, 0, 2, 11, 7, 5, 3],
    [11, 8, 12, 0, 5, 2, 15, 13, 10, 14, 3, 6, 7, 1, 9, 4],
    [7, 9, 3, 1, 13, 12, 11, 14, 2, 6, 5, 10, 4, 0, 15, 8],
    [9, 0, 5, 7, 2, 4, 10, 15, 14, 1, 11, 12, 6, 8, 3, 13],
    [2, 12, 6, 10, 0, 11, 8, 3, 4, 13, 7, 5, 15, 14, 1, 9],
    [12, 5, 1, 15, 14, 13, 4, 10, 0, 7, 6, 3, 9, 2, 8, 11],
    [13, 11, 7, 14, 12, 1, 3, 9, 5, 0, 15, 4, 8, 6, 2, 10],
    [6, 15, 14, 9, 11, 3, 0, 8, 12, 2, 13, 7, 1, 4, 10, 5],
    [10, 2, 8, 4, 7, 6, 1, 5, 15, 11, 9, 14, 3, 12, 13, 0],
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
    [14, 10, 4, 8, 9, 15, 13, 6, 1, 12, 0, 2, 11, 7, 5, 3],
    [11, 8, 12, 0, 5, 2, 15, 13, 10, 14, 3, 6, 7, 1, 9, 4],
    [7, 9, 3, 1, 13, 12, 11, 14, 2, 6, 5, 10, 4, 0, 15, 8],
];

// Round constants mixed into the message words.
const CST: [u32; 16] = [
    0x243f_6a88, 0x85a3_08d3, 0x1319_8a2e, 0x0370_7344,
    0xa409_3822, 0x299f_31d0, 0x082e_fa98, 0xec4e_6c89,
    0x4528_21e6, 0x38d0_1377, 0xbe54_66cf, 0x34e9_0c6c,
    0xc0ac_29b7, 0xc97c_50dd, 0x3f84_d5b5, 0xb547_0917,
];

/// Streaming Blake-256 with 14 rounds, as used for Ember block headers.
///
/// Message words are loaded little-endian and the padding markers are
/// 0x01/0x81; both differ from textbook Blake-256 and are consensus-fixed.
pub struct Blake256 {
    h: [u32; 8],
    t: [u32; 2],
    buf: [u8; 64],
    buflen: usize,
    nullt: bool,
}

impl Blake256 {
    pub fn new() -> Self {
        Blake256 {
            h: IV,
            t: [0, 0],
            buf: [0u8; 64],
            buflen: 0,
            nullt: false,
        }
    }

    pub fn reset(&mut self) -> &mut Self {
        self.h = IV;
        self.t = [0, 0];
        self.buflen = 0;
        self.nullt = false;
        self
    }

    #[inline]
    fn g(v: &mut [u32; 16], m: &[u32; 16], r: usize, a: usize, b: usize, c: usize, d: usize, i: usize) {
        v[a] = v[a]
            .wrapping_add(m[SIGMA[r][i]] ^ CST[SIGMA[r][i + 1]])
            .wrapping_add(v[b]);
        v[d] = (v[d] ^ v[a]).rotate_right(16);
        v[c] = v[c].wrapping_add(v[d]);
        v[b] = (v[b] ^ v[c]).rotate_right(12);
        v[a] = v[a]
            .wrapping_add(m[SIGMA[r][i + 1]] ^ CST[SIGMA[r][i]])
            .wrapping_add(v[b]);
        v[d] = (v[d] ^ v[a]).rotate_right(8);
        v[c] = v[c].wrapping_add(v[d]);
        v[b] = (v[b] ^ v[c]).rotate_right(7);
    }

    fn compress(&mut self, block: &[u8]) {
        let mut m = [0u32; 16];
        for (word, bytes) in m.iter_mut().zip(block.chunks_exact(4)) {
            *word = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        }

        let mut v = [0u32; 16];
        v[..8].copy_from_slice(&self.h);
        v[8..].copy_from_slice(&IV);
        v[12] ^= self.t[0];
        v[13] ^= self.t[1];
        if self.nullt {
            v[14] = !v[14];
        }

        for r in 0..14 {
            Self::g(&mut v, &m, r, 0, 4, 8, 12, 0);
            Self::g(&mut v, &m, r, 1, 5, 9, 13, 2);
            Self::g(&mut v, &m, r, 2, 6, 10, 14, 4);
            Self::g(&mut v, &m, r, 3, 7, 11, 15, 6);
            Self::g(&mut v, &m, r, 3, 4, 9, 14, 14);
            Self::g(&mut v, &m, r, 2, 7, 8, 13, 12);
            Self::g(&mut v, &m, r, 0, 5, 10, 15, 8);
            Self::g(&mut v, &m, r, 1, 6, 11, 12, 10);
        }

        for i in 0..8 {
            self.h[i] ^= v[i] ^ v[i + 8];
        }
    }

    // Counts 512 bits per compressed block, carrying into the high word.
    fn advance_counter(&mut self) {
        self.t[0] = self.t[0].wrapping_add(512);
        if self.t[0] == 0 {
            self.t[1] = self.t[1].wrapping_add(1);
        }
    }

    pub fn write(&mut self, mut data: &[u8]) -> &mut Self {
        let left = self.buflen;
        let fill = 64 - left;

        if left > 0 && data.len() >= fill {
            self.buf[left..].copy_from_slice(&data[..fill]);
            self.advance_counter();
            let block = self.buf;
            self.compress(&block);
            data = &data[fill..];
            self.buflen = 0;
        }

        while data.len() >= 64 {
            self.advance_counter();
            self.compress(&data[..64]);
            data = &data[64..];
        }

        if !data.is_empty() {
            let left = self.buflen;
            self.buf[left..left + data.len()].copy_from_slice(data);
            self.buflen = left + data.len();
        }

        self
    }

    /// Pads, compresses the tail and emits the 32-byte digest. The engine is
    /// left mid-finalization; call `reset` before reusing it.
    pub fn finalize(&mut self) -> [u8; 32] {
        // Snapshot the true message bit length before padding touches the
        // counter; padding bytes must not count toward it.
        let lo = self.t[0].wrapping_add((self.buflen as u32) << 3);
        let mut hi = self.t[1];
        if lo < (self.buflen as u32) << 3 {
            hi = hi.wrapping_add(1);
        }
        let mut msglen = [0u8; 8];
        msglen[..4].copy_from_slice(&hi.to_be_bytes());
        msglen[4..].copy_from_slice(&lo.to_be_bytes());

        if self.buflen == 55 {
            // Stop bit and length marker fit in one byte.
            self.t[0] = self.t[0].wrapping_sub(8);
            self.write(&[0x81]);
        } else {
            if self.buflen < 55 {
                if self.buflen == 0 {
                    self.nullt = true;
                }
                self.t[0] = self.t[0].wrapping_sub(440 - ((self.buflen as u32) << 3));
                self.write(&[0x01]);
                while self.buflen < 55 {
                    self.write(&[0x00]);
                }
            } else {
                // Tail does not fit: force a compression mid-padding.
                self.t[0] = self.t[0].wrapping_sub(512 - ((self.buflen as u32) << 3));
                self.write(&[0x01]);
                while self.buflen > 0 {
                    self.write(&[0x00]);
                }
                self.t[0] = self.t[0].wrapping_sub(440);
                self.nullt = true;
            }
            self.write(&[0x00]);
            while self.buflen < 54 {
                self.write(&[0x00]);
            }
        }

        self.t[0] = self.t[0].wrapping_sub(64);
        self.write(&msglen);

        let mut digest = [0u8; 32];
        for (bytes, word) in digest.chunks_exact_mut(4).zip(self.h.iter()) {
            bytes.copy_from_slice(&word.to_be_bytes());
        }
        digest
    }
}

impl Default for Blake256 {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot digest of `data`.
pub fn blake256(data: &[u8]) -> [u8; 32] {
    let mut engine = Blake256::new();
    engine.write(data);
    engine.finalize()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Hash(crate::U256);

impl serde::Serialize for Hash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let s = self.to_string();
        serializer.serialize_str(&s)
    }
}

impl<'de> serde::Deserialize<'de> for Hash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Hash::try_from(s.as_str()).map_err(|e| {
            serde::de::Error::custom(format!("Failed to deserialize Hash from hex string: {}", e))
        })
    }
}

impl Hash {
    // Digests compare against targets as little-endian integers, the
    // network convention, even though the engine emits big-endian words.
    pub fn from_digest(digest: [u8; 32]) -> Self {
        Hash(U256::from_little_endian(&digest))
    }

    pub fn matches_target(&self, target: U256) -> bool {
        self.0 <= target
    }

    pub fn zero() -> Self {
        Hash(U256::zero())
    }

    pub fn as_bytes(&self) -> [u8; 32] {
        self.0.to_big_endian()
    }

    pub fn to_le_bytes(&self) -> [u8; 32] {
        self.0.to_little_endian()
    }
}

impl From<Hash> for String {
    fn from(hash: Hash) -> Self {
        hex::encode(hash.as_bytes())
    }
}

impl TryFrom<&str> for Hash {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let bytes = hex::decode(s).map_err(|e| e.to_string())?;

        if bytes.len() != 32 {
            return Err(format!(
                "Invalid hex string length: expected 64 chars (32 bytes), found {} bytes",
                bytes.len()
            ));
        }

        let mut array = [0u8; 32];
        array.copy_from_slice(&bytes);

        let u256 = U256::from_big_endian(&array);
        Ok(Hash(u256))
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", hex::encode(self.as_bytes()))
    }
}
