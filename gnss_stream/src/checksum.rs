//! Integrity primitives shared by the decoders: the UBX-family Fletcher-8
//! pair, the NMEA XOR byte and RTCM3's CRC-24Q.

use crc::{Crc, CRC_24_LTE_A};

use crate::error::FrameError;

/// [Fletcher-8 checksum](https://en.wikipedia.org/wiki/Fletcher%27s_checksum) calculator supporting both streaming and single-shot validation
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FletcherChecksum {
    ck_a: u8,
    ck_b: u8,
}

impl FletcherChecksum {
    pub const fn new() -> Self {
        Self { ck_a: 0, ck_b: 0 }
    }

    /// Single-shot computation over `bytes`
    pub const fn compute(bytes: &[u8]) -> (u8, u8) {
        let mut calc = Self::new();
        calc.update(bytes);
        calc.result()
    }

    /// Update checksum with new bytes
    pub const fn update(&mut self, bytes: &[u8]) {
        let mut i = 0;
        while i < bytes.len() {
            self.update_byte(bytes[i]);
            i += 1;
        }
    }

    /// Update checksum with a single byte
    pub const fn update_byte(&mut self, byte: u8) {
        self.ck_a = self.ck_a.wrapping_add(byte);
        self.ck_b = self.ck_b.wrapping_add(self.ck_a);
    }

    /// Get the current checksum result
    pub const fn result(self) -> (u8, u8) {
        (self.ck_a, self.ck_b)
    }

    /// Validate against the two checksum bytes found in a frame
    pub const fn validate_result(
        self,
        received_ck_a: u8,
        received_ck_b: u8,
    ) -> Result<(), FrameError> {
        if self.ck_a == received_ck_a && self.ck_b == received_ck_b {
            Ok(())
        } else {
            Err(FrameError::InvalidChecksum {
                expect: u16::from_le_bytes([received_ck_a, received_ck_b]),
                got: u16::from_le_bytes([self.ck_a, self.ck_b]),
            })
        }
    }
}

/// XOR of every byte, as used between the `$`/`!` and `*` of an NMEA sentence
pub fn nmea_checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |sum, b| sum ^ b)
}

// CRC-24Q: poly 0x1864CFB, init 0, MSB first, no reflection, no final xor.
// The catalog lists the same parameters under the LTE-A name.
const CRC24Q: Crc<u32> = Crc::<u32>::new(&CRC_24_LTE_A);

/// CRC-24Q over `bytes`, result in the low 24 bits
pub fn crc24q(bytes: &[u8]) -> u32 {
    CRC24Q.checksum(bytes)
}
