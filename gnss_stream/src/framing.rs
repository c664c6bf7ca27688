//! Two-sync-byte, length-prefixed frame extraction shared by the UBX-family
//! decoders.
//!
//! Every decoder built on top of this module follows the same incremental
//! discipline: it is handed the caller's whole receive buffer, and always
//! reports how many bytes the caller must drop from the front of it, whether
//! or not a frame was produced. Re-calling with the remaining bytes (plus any
//! newly received ones) continues the scan.

mod class_id;
mod stats;

pub use class_id::{ClassIdDecoder, ClassIdFrame, Dialect};
pub use stats::MessageStats;

use crate::{
    checksum::FletcherChecksum,
    constants::{
        ALLYSTAR_SYNC_CHAR_1, ALLYSTAR_SYNC_CHAR_2, CHECKSUM_LEN, GOLDFISH_HEADER_LEN,
        GOLDFISH_LENGTH_OFFSET, GOLDFISH_SYNC_CHAR_1, GOLDFISH_SYNC_CHAR_2, MAX_FRAME_PAYLOAD_LEN,
        SYNC_SIZE, UBX_HEADER_LEN, UBX_LENGTH_OFFSET, UBX_SYNC_CHAR_1, UBX_SYNC_CHAR_2,
    },
    error::FrameError,
};

/// How the payload length is stored in the header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthField {
    /// 16 bit little-endian integer at `offset`
    U16Le { offset: usize },
    /// 12 bit length packed big-endian across two bytes at `offset`: all 8
    /// bits of the first byte, then the high nibble of the second. The low
    /// nibble of the second byte is a length check code.
    Packed12 { offset: usize },
}

impl LengthField {
    fn read(&self, header: &[u8]) -> usize {
        match *self {
            LengthField::U16Le { offset } => {
                u16::from_le_bytes([header[offset], header[offset + 1]]).into()
            },
            LengthField::Packed12 { offset } => {
                (usize::from(header[offset]) << 4) | usize::from(header[offset + 1] >> 4)
            },
        }
    }
}

/// Integrity check carried by the two trailing bytes of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumKind {
    /// `ck_a`/`ck_b` over every byte after the sync marker up to the end of
    /// the payload
    Fletcher8,
    /// Trailer bytes are present but not verified. No reference values are
    /// known for the protocols using this, so frames are accepted on
    /// structure alone.
    None,
}

/// Parameters of one member of the frame family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramingConfig {
    pub name: &'static str,
    pub sync: [u8; 2],
    /// Bytes before the payload, sync marker included
    pub header_len: usize,
    pub length: LengthField,
    pub checksum: ChecksumKind,
    /// Larger declared lengths are treated as a false sync match
    pub max_payload_len: usize,
}

impl FramingConfig {
    /// `[0xb5 0x62][class][id][len u16 LE][payload][ck_a][ck_b]`
    pub const UBX: FramingConfig = FramingConfig {
        name: "UBX",
        sync: [UBX_SYNC_CHAR_1, UBX_SYNC_CHAR_2],
        header_len: UBX_HEADER_LEN,
        length: LengthField::U16Le {
            offset: UBX_LENGTH_OFFSET,
        },
        checksum: ChecksumKind::Fletcher8,
        max_payload_len: MAX_FRAME_PAYLOAD_LEN,
    };

    /// UBX layout with `0xf1 0xd9` sync bytes
    pub const ALLYSTAR: FramingConfig = FramingConfig {
        name: "ALLYSTAR",
        sync: [ALLYSTAR_SYNC_CHAR_1, ALLYSTAR_SYNC_CHAR_2],
        ..FramingConfig::UBX
    };

    /// `[0xbc 0xb2][len:12 | lencrc:4][body][check:2]`, trailer not verified
    pub const GOLDFISH: FramingConfig = FramingConfig {
        name: "GOLDFISH",
        sync: [GOLDFISH_SYNC_CHAR_1, GOLDFISH_SYNC_CHAR_2],
        header_len: GOLDFISH_HEADER_LEN,
        length: LengthField::Packed12 {
            offset: GOLDFISH_LENGTH_OFFSET,
        },
        checksum: ChecksumKind::None,
        max_payload_len: MAX_FRAME_PAYLOAD_LEN,
    };

    /// Total frame length for a declared payload length
    pub const fn frame_len(&self, payload_len: usize) -> usize {
        self.header_len + payload_len + CHECKSUM_LEN
    }

    /// Position of the first plausible frame start.
    ///
    /// A complete sync marker whose header is fully buffered only counts if
    /// its declared length is sane. A sync marker cut short by the end of
    /// the buffer (trailing first sync byte, or header not yet complete)
    /// counts as a candidate so that it is kept for the next call.
    pub fn find_sync(&self, buf: &[u8]) -> Option<usize> {
        (0..buf.len()).find(|&i| {
            if buf[i] != self.sync[0] {
                return false;
            }
            if i + 1 == buf.len() {
                return true;
            }
            if buf[i + 1] != self.sync[1] {
                return false;
            }
            if i + self.header_len > buf.len() {
                return true;
            }
            self.length.read(&buf[i..]) <= self.max_payload_len
        })
    }

    /// Run the framing steps over the front of `buf`
    pub fn scan<'a>(&self, buf: &'a [u8]) -> Scan<'a> {
        let Some(pos) = self.find_sync(buf) else {
            return Scan::Noise;
        };
        if pos > 0 {
            return Scan::Skip(pos);
        }
        if buf.len() < self.header_len {
            return Scan::Truncated;
        }

        let payload_len = self.length.read(buf);
        let frame_len = self.frame_len(payload_len);
        if buf.len() < frame_len {
            return Scan::Truncated;
        }

        let bytes = &buf[..frame_len];
        let trailer_at = self.header_len + payload_len;
        if self.checksum == ChecksumKind::Fletcher8 {
            let mut calc = FletcherChecksum::new();
            calc.update(&bytes[SYNC_SIZE..trailer_at]);
            if let Err(error) = calc.validate_result(bytes[trailer_at], bytes[trailer_at + 1]) {
                return Scan::Corrupt {
                    len: frame_len,
                    error,
                };
            }
        }

        Scan::Frame(RawFrame {
            bytes,
            header_len: self.header_len,
            payload_len,
        })
    }
}

/// Result of one framing attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scan<'a> {
    /// No sync marker at all, the whole buffer is noise
    Noise,
    /// Sync marker found after this many leading garbage bytes
    Skip(usize),
    /// Frame starts at offset 0 but is not fully buffered yet
    Truncated,
    /// Length-delimited frame whose integrity check failed
    Corrupt { len: usize, error: FrameError },
    Frame(RawFrame<'a>),
}

/// A complete frame, still borrowed from the caller's buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFrame<'a> {
    bytes: &'a [u8],
    header_len: usize,
    payload_len: usize,
}

impl<'a> RawFrame<'a> {
    /// Whole frame including sync marker and trailer
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn header(&self) -> &'a [u8] {
        &self.bytes[..self.header_len]
    }

    pub fn payload(&self) -> &'a [u8] {
        &self.bytes[self.header_len..self.header_len + self.payload_len]
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// What happened to the bytes consumed by one decode call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameStatus {
    /// A frame passed its integrity check and its payload was accepted
    Valid,
    /// No sync marker, buffer discarded
    Noise,
    /// Leading bytes before the next plausible frame start were discarded
    DesyncSkip,
    /// Not enough bytes buffered, nothing consumed
    Truncated,
    /// A delimited frame was dropped
    Rejected(FrameError),
}

/// Outcome of one decode call: a status plus the number of bytes the caller
/// must discard from the front of its buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub status: FrameStatus,
    pub consumed: usize,
}

impl Decoded {
    pub(crate) fn new(status: FrameStatus, consumed: usize) -> Self {
        Self { status, consumed }
    }

    pub(crate) fn truncated() -> Self {
        Self::new(FrameStatus::Truncated, 0)
    }

    pub fn is_valid(&self) -> bool {
        self.status == FrameStatus::Valid
    }
}

/// Common interface of the binary decoders
pub trait FrameDecoder {
    /// Decode at most one frame from the front of `buf`
    fn decode(&mut self, buf: &[u8]) -> Decoded;

    /// Frames accepted since construction or the last reset
    fn total_count(&self) -> u32;

    fn reset_statistics(&mut self);

    /// Repeatedly decode `buf` and drain the consumed bytes, until a call
    /// needs more data. Returns the number of valid frames.
    fn drain(&mut self, buf: &mut Vec<u8>) -> usize {
        let mut valid = 0;
        loop {
            let decoded = self.decode(buf);
            if decoded.is_valid() {
                valid += 1;
            }
            if decoded.consumed == 0 {
                break;
            }
            buf.drain(..decoded.consumed);
            if buf.is_empty() {
                break;
            }
        }
        valid
    }
}
