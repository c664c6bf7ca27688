//! RTCM 10403 version 3 correction data.
//!
//! `[0xd3][6 reserved bits | 10 bit length][payload][crc24q, 3 bytes BE]`.
//! Station coordinates (1005/1006) and text (1029) are decoded, every other
//! message type with a matching CRC is classified by name and category only.

mod messages;

pub use messages::{
    StationCoordinates, TextMessage, STATION_HEIGHT_MIN_LEN, STATION_MIN_LEN, TEXT_HEADER_LEN,
};

use tracing::{debug, trace, warn};

use crate::{
    bits::getbitu,
    checksum::crc24q,
    constants::{RTCM_CRC_LEN, RTCM_HEADER_SIZE, RTCM_LENGTH_MASK, RTCM_MAX_MSG_LEN, RTCM_SYNC_CHAR},
    error::FrameError,
    framing::{Decoded, FrameDecoder, FrameStatus, MessageStats},
};

// type (12) + station id (12) need the first 3 bytes, the type alone 2
const MIN_PAYLOAD_LEN: usize = 2;

/// Decoded RTCM3 payloads
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Rtcm3Message {
    StationCoordinates(StationCoordinates),
    Text(TextMessage),
}

/// Descriptor of the last length-delimited frame the decoder saw
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Rtcm3Frame {
    pub message_type: u16,
    pub station_id: u16,
    /// Declared payload length
    pub length: u16,
    /// CRC matched and the payload was accepted
    pub valid: bool,
    pub name: String,
    pub category: &'static str,
    pub message: Option<Rtcm3Message>,
}

/// Human readable message type, `Unknown (n)` for unlisted types
pub fn message_type_name(message_type: u16) -> String {
    let name = match message_type {
        1001 => "GPS L1 RTK",
        1002 => "GPS L1 RTK Extended",
        1003 => "GPS L1/L2 RTK",
        1004 => "GPS L1/L2 RTK Extended",
        1005 => "Station Coordinates (XYZ)",
        1006 => "Station Coordinates + Height",
        1007 => "Antenna Descriptor",
        1008 => "Antenna Descriptor + Serial",
        1009 => "GLONASS L1 RTK",
        1010 => "GLONASS L1 RTK Extended",
        1011 => "GLONASS L1/L2 RTK",
        1012 => "GLONASS L1/L2 RTK Extended",
        1019 => "GPS Ephemeris",
        1020 => "GLONASS Ephemeris",
        1029 => "Text Message",
        1045 => "Galileo Ephemeris (F/NAV)",
        1046 => "Galileo Ephemeris (I/NAV)",
        1074 => "GPS MSM4",
        1075 => "GPS MSM5",
        1076 => "GPS MSM6",
        1077 => "GPS MSM7",
        1084 => "GLONASS MSM4",
        1085 => "GLONASS MSM5",
        1086 => "GLONASS MSM6",
        1087 => "GLONASS MSM7",
        1094 => "Galileo MSM4",
        1095 => "Galileo MSM5",
        1096 => "Galileo MSM6",
        1097 => "Galileo MSM7",
        1124 => "BeiDou MSM4",
        1125 => "BeiDou MSM5",
        1126 => "BeiDou MSM6",
        1127 => "BeiDou MSM7",
        _ => return format!("Unknown ({})", message_type),
    };
    name.to_string()
}

pub fn message_type_category(message_type: u16) -> &'static str {
    match message_type {
        1001..=1004 => "GPS Observations",
        1005..=1008 => "Station Info",
        1009..=1012 => "GLONASS Observations",
        1019 | 1020 => "Ephemeris",
        1045 | 1046 => "Galileo Ephemeris",
        1029 => "Text",
        1074..=1077 => "GPS MSM",
        1084..=1087 => "GLONASS MSM",
        1094..=1097 => "Galileo MSM",
        1124..=1127 => "BeiDou MSM",
        _ => "Other",
    }
}

fn declared_len(header: &[u8]) -> usize {
    usize::from(u16::from_be_bytes([header[1], header[2]]) & RTCM_LENGTH_MASK)
}

/// Position of the first plausible frame start. A preamble whose header is
/// cut by the end of the buffer is kept as a candidate.
fn find_sync(buf: &[u8]) -> Option<usize> {
    (0..buf.len()).find(|&i| {
        buf[i] == RTCM_SYNC_CHAR
            && (i + RTCM_HEADER_SIZE > buf.len() || declared_len(&buf[i..]) <= RTCM_MAX_MSG_LEN)
    })
}

#[derive(Debug, Default)]
pub struct Rtcm3Decoder {
    stats: MessageStats<u16>,
    last_frame: Option<Rtcm3Frame>,
}

impl Rtcm3Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode at most one frame from the front of `buf`.
    ///
    /// The returned `consumed` count must be drained from the caller's
    /// buffer whatever the status, then the call repeated.
    pub fn decode(&mut self, buf: &[u8]) -> Decoded {
        let Some(pos) = find_sync(buf) else {
            return Decoded::new(FrameStatus::Noise, buf.len());
        };
        if pos > 0 {
            trace!(len = pos, "RTCM3 skipping to next preamble");
            return Decoded::new(FrameStatus::DesyncSkip, pos);
        }
        if buf.len() < RTCM_HEADER_SIZE {
            return Decoded::truncated();
        }

        let len = declared_len(buf);
        let frame_len = RTCM_HEADER_SIZE + len + RTCM_CRC_LEN;
        if buf.len() < frame_len {
            return Decoded::truncated();
        }

        let frame = &buf[..frame_len];
        let crc_at = frame_len - RTCM_CRC_LEN;
        let expect = u32::from_be_bytes([0, frame[crc_at], frame[crc_at + 1], frame[crc_at + 2]]);
        let got = crc24q(&frame[..crc_at]);
        if expect != got {
            let error = FrameError::InvalidCrc { expect, got };
            warn!("RTCM3: {}", error);
            self.last_frame = None;
            return Decoded::new(FrameStatus::Rejected(error), frame_len);
        }

        let payload = &frame[RTCM_HEADER_SIZE..crc_at];
        match Self::parse_payload(payload) {
            Ok(decoded) => {
                self.stats.record(decoded.message_type);
                self.last_frame = Some(decoded);
                Decoded::new(FrameStatus::Valid, frame_len)
            },
            Err(error) => {
                warn!("RTCM3: {}", error);
                self.last_frame = None;
                Decoded::new(FrameStatus::Rejected(error), frame_len)
            },
        }
    }

    fn parse_payload(payload: &[u8]) -> Result<Rtcm3Frame, FrameError> {
        if payload.len() < MIN_PAYLOAD_LEN {
            return Err(FrameError::InvalidPacketLen {
                packet: "RTCM3",
                expect: MIN_PAYLOAD_LEN,
                got: payload.len(),
            });
        }

        let message_type = getbitu(payload, 0, 12) as u16;
        // a 2 byte payload only has 4 bits of station id
        let station_id = if payload.len() >= 3 {
            getbitu(payload, 12, 12) as u16
        } else {
            0
        };
        let category = message_type_category(message_type);

        let message = match message_type {
            1005 => Some(Rtcm3Message::StationCoordinates(StationCoordinates::parse(
                payload, false,
            )?)),
            1006 => Some(Rtcm3Message::StationCoordinates(StationCoordinates::parse(
                payload, true,
            )?)),
            1029 => Some(Rtcm3Message::Text(TextMessage::parse(payload)?)),
            _ => {
                debug!(message_type, station_id, category, "RTCM3 message not decoded");
                None
            },
        };

        Ok(Rtcm3Frame {
            message_type,
            station_id,
            length: payload.len() as u16,
            valid: true,
            name: message_type_name(message_type),
            category,
            message,
        })
    }

    /// Last accepted frame, cleared when a frame is rejected
    pub fn last_frame(&self) -> Option<&Rtcm3Frame> {
        self.last_frame.as_ref()
    }

    pub fn message_count(&self, message_type: u16) -> u32 {
        self.stats.count(message_type)
    }

    pub fn total_count(&self) -> u32 {
        self.stats.total()
    }

    pub fn reset_statistics(&mut self) {
        self.stats.reset();
    }

    pub fn stats(&self) -> &MessageStats<u16> {
        &self.stats
    }
}

impl FrameDecoder for Rtcm3Decoder {
    fn decode(&mut self, buf: &[u8]) -> Decoded {
        Rtcm3Decoder::decode(self, buf)
    }

    fn total_count(&self) -> u32 {
        Rtcm3Decoder::total_count(self)
    }

    fn reset_statistics(&mut self) {
        Rtcm3Decoder::reset_statistics(self)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// MSB-first bit packer mirroring `getbitu`
    #[derive(Default)]
    struct BitWriter {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl BitWriter {
        fn put(&mut self, value: u64, len: usize) {
            for i in (0..len).rev() {
                if self.pos % 8 == 0 {
                    self.bytes.push(0);
                }
                if (value >> i) & 1 == 1 {
                    let last = self.bytes.len() - 1;
                    self.bytes[last] |= 0x80 >> (self.pos % 8);
                }
                self.pos += 1;
            }
        }

        fn put_signed(&mut self, value: i64, len: usize) {
            self.put(value as u64 & ((1u64 << len) - 1), len);
        }
    }

    fn frame(payload: &[u8]) -> Vec<u8> {
        let mut bytes = vec![0xd3, (payload.len() >> 8) as u8, payload.len() as u8];
        bytes.extend_from_slice(payload);
        let crc = crc24q(&bytes);
        bytes.extend_from_slice(&crc.to_be_bytes()[1..]);
        bytes
    }

    fn station_payload(message_type: u64, height: Option<u64>) -> Vec<u8> {
        let mut w = BitWriter::default();
        w.put(message_type, 12);
        w.put(2003, 12);
        w.put(0, 6);
        w.put(0b1101, 4);
        w.put_signed(12_345_678_912, 38);
        w.put(0, 2);
        w.put_signed(-4_567_890_123, 38);
        w.put(0, 2);
        w.put_signed(45_678_901_234, 38);
        if let Some(height) = height {
            w.put(height, 16);
        }
        w.bytes
    }

    #[test]
    fn names_and_categories() {
        assert_eq!(message_type_name(1005), "Station Coordinates (XYZ)");
        assert_eq!(message_type_name(1077), "GPS MSM7");
        assert_eq!(message_type_name(1230), "Unknown (1230)");
        assert_eq!(message_type_category(1012), "GLONASS Observations");
        assert_eq!(message_type_category(1046), "Galileo Ephemeris");
        assert_eq!(message_type_category(1127), "BeiDou MSM");
        assert_eq!(message_type_category(1230), "Other");
    }

    #[test]
    fn decode_1005() {
        let payload = station_payload(1005, None);
        assert_eq!(payload.len(), STATION_MIN_LEN);
        let bytes = frame(&payload);

        let mut decoder = Rtcm3Decoder::new();
        let decoded = decoder.decode(&bytes);
        assert_eq!(decoded.status, FrameStatus::Valid);
        assert_eq!(decoded.consumed, bytes.len());

        let last = decoder.last_frame().unwrap();
        assert_eq!(last.message_type, 1005);
        assert_eq!(last.station_id, 2003);
        assert_eq!(last.category, "Station Info");
        match &last.message {
            Some(Rtcm3Message::StationCoordinates(station)) => {
                assert_eq!(station.station_id, 2003);
                assert!(station.gps && station.glonass && !station.galileo);
                assert!(station.reference_station);
                assert!((station.ecef_x - 1_234_567.8912).abs() < 1e-6);
                assert!((station.ecef_y - -456_789.0123).abs() < 1e-6);
                assert!((station.ecef_z - 4_567_890.1234).abs() < 1e-6);
                assert_eq!(station.antenna_height, None);
            },
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(decoder.message_count(1005), 1);
    }

    #[test]
    fn decode_1006_height() {
        let bytes = frame(&station_payload(1006, Some(15_000)));
        let mut decoder = Rtcm3Decoder::new();
        assert!(decoder.decode(&bytes).is_valid());
        match &decoder.last_frame().unwrap().message {
            Some(Rtcm3Message::StationCoordinates(station)) => {
                assert!((station.antenna_height.unwrap() - 1.5).abs() < 1e-9);
            },
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn short_station_rejected() {
        let bytes = frame(&station_payload(1006, None));
        let mut decoder = Rtcm3Decoder::new();
        let decoded = decoder.decode(&bytes);
        assert_eq!(decoded.consumed, bytes.len());
        assert!(matches!(
            decoded.status,
            FrameStatus::Rejected(FrameError::InvalidPacketLen { .. })
        ));
        assert_eq!(decoder.total_count(), 0);
    }

    #[test]
    fn decode_1029_text() {
        let mut w = BitWriter::default();
        w.put(1029, 12);
        w.put(42, 12);
        w.put(60_000, 16);
        w.put(43_200, 17);
        w.put(5, 7);
        w.put(5, 8);
        for b in b"hello" {
            w.put(u64::from(*b), 8);
        }
        let bytes = frame(&w.bytes);

        let mut decoder = Rtcm3Decoder::new();
        assert!(decoder.decode(&bytes).is_valid());
        assert_eq!(
            decoder.last_frame().unwrap().message,
            Some(Rtcm3Message::Text(TextMessage {
                station_id: 42,
                mjd: 60_000,
                seconds_of_day: 43_200,
                char_count: 5,
                text: "hello".into(),
            }))
        );
    }

    #[test]
    fn text_longer_than_payload_rejected() {
        let mut w = BitWriter::default();
        w.put(1029, 12);
        w.put(42, 12);
        w.put(0, 40);
        w.put(20, 8);
        w.put(u64::from(b'x'), 8);
        let bytes = frame(&w.bytes);
        let mut decoder = Rtcm3Decoder::new();
        assert!(!decoder.decode(&bytes).is_valid());
    }

    #[test]
    fn observation_classified_only() {
        let mut w = BitWriter::default();
        w.put(1077, 12);
        w.put(7, 12);
        w.put(0, 64);
        let bytes = frame(&w.bytes);

        let mut decoder = Rtcm3Decoder::new();
        assert!(decoder.decode(&bytes).is_valid());
        let last = decoder.last_frame().unwrap();
        assert_eq!(last.name, "GPS MSM7");
        assert_eq!(last.category, "GPS MSM");
        assert_eq!(last.message, None);
        assert_eq!(decoder.message_count(1077), 1);
    }

    #[test]
    fn crc_mismatch_consumes_frame() {
        let mut bytes = frame(&station_payload(1005, None));
        bytes[10] ^= 0x40;
        let mut decoder = Rtcm3Decoder::new();
        let decoded = decoder.decode(&bytes);
        assert_eq!(decoded.consumed, bytes.len());
        assert!(matches!(
            decoded.status,
            FrameStatus::Rejected(FrameError::InvalidCrc { .. })
        ));
        assert_eq!(decoder.total_count(), 0);
        assert!(decoder.last_frame().is_none());
    }

    #[test]
    fn incremental_and_resync() {
        let bytes = frame(&station_payload(1005, None));
        let mut decoder = Rtcm3Decoder::new();

        assert_eq!(decoder.decode(&bytes[..2]), Decoded::truncated());
        assert_eq!(decoder.decode(&bytes[..bytes.len() - 1]), Decoded::truncated());

        let mut buf = vec![0x01, 0x02, 0x03];
        buf.extend_from_slice(&bytes);
        assert_eq!(
            decoder.decode(&buf),
            Decoded::new(FrameStatus::DesyncSkip, 3)
        );
        assert!(decoder.decode(&buf[3..]).is_valid());

        assert_eq!(
            decoder.decode(&[0x00, 0x11]),
            Decoded::new(FrameStatus::Noise, 2)
        );
    }

    #[test]
    fn payload_too_short() {
        let bytes = frame(&[0x3e]);
        let mut decoder = Rtcm3Decoder::new();
        let decoded = decoder.decode(&bytes);
        assert_eq!(decoded.consumed, 7);
        assert!(!decoded.is_valid());
    }
}
