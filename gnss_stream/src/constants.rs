pub const UBX_SYNC_CHAR_1: u8 = 0xb5;
pub const UBX_SYNC_CHAR_2: u8 = 0x62;
pub const ALLYSTAR_SYNC_CHAR_1: u8 = 0xf1;
pub const ALLYSTAR_SYNC_CHAR_2: u8 = 0xd9;
pub const GOLDFISH_SYNC_CHAR_1: u8 = 0xbc;
pub const GOLDFISH_SYNC_CHAR_2: u8 = 0xb2;

pub(crate) const SYNC_SIZE: usize = 2;
pub(crate) const CHECKSUM_LEN: usize = 2;

// sync (2) + class (1) + id (1) + length (2)
pub(crate) const UBX_HEADER_LEN: usize = 6;
pub(crate) const UBX_CLASS_OFFSET: usize = 2; // After SYNC_CHAR_1, SYNC_CHAR_2
pub(crate) const UBX_MSG_ID_OFFSET: usize = 3; // After CLASS
pub(crate) const UBX_LENGTH_OFFSET: usize = 4; // After MSG_ID

// sync (2) + 12 bit length and 4 bit length crc (2)
pub(crate) const GOLDFISH_HEADER_LEN: usize = 4;
pub(crate) const GOLDFISH_LENGTH_OFFSET: usize = 2;

/// Largest payload length accepted while scanning for a sync marker.
pub const MAX_FRAME_PAYLOAD_LEN: usize = 4096;

pub const NMEA_SYNC_CHAR: u8 = b'$';
pub const NMEA_ENCAPSULATION_CHAR: u8 = b'!';
pub const NMEA_CHECKSUM_SEPARATOR: char = '*';
pub const NMEA_END_CHAR_1: u8 = 0x0d; // '\r' (<CR>)
pub const NMEA_END_CHAR_2: u8 = 0x0a; // '\n' (<LF>)

/// Receive buffer cap of a line reframer, oldest bytes are evicted beyond it.
pub const NMEA_MAX_RX_BUFFER: usize = 64 * 1024;
pub(crate) const NMEA_MAX_NOISE_LEN: usize = 256;
pub(crate) const NMEA_MIN_SENTENCE_LEN: usize = 6;

pub const RTCM_SYNC_CHAR: u8 = 0xd3;
pub(crate) const RTCM_HEADER_SIZE: usize = 3; // sync char (1) + length field (2)
pub(crate) const RTCM_CRC_LEN: usize = 3;
pub(crate) const RTCM_LENGTH_MASK: u16 = 0x03ff; // 10 bits for length (6 bits reserved)
pub const RTCM_MAX_MSG_LEN: usize = 1023;
