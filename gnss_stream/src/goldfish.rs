//! Goldfish binary protocol.
//!
//! `[0xbc 0xb2][len:12 | lencrc:4][msg id u16 BE][payload][check:2]`, where
//! `len` covers the message id and payload. Neither the length check nibble
//! nor the trailing check bytes are verified: frames are accepted on
//! structure alone.

use tracing::{debug, trace, warn};

use crate::{
    error::FrameError,
    framing::{Decoded, FrameDecoder, FrameStatus, FramingConfig, MessageStats, Scan},
};

pub const MSG_ACK: u16 = 0x0500;
pub const MSG_NAK: u16 = 0x0501;

const MSG_ID_LEN: usize = 2;

/// Descriptor of the last frame decoded
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GoldfishFrame {
    pub msg_id: u16,
    /// Declared body length, message id included
    pub length: u16,
    pub valid: bool,
    pub name: String,
    /// Body without the message id
    pub payload: Vec<u8>,
}

/// `GOLDFISH-ACK`, `GOLDFISH-NAK` or `0xNNNN`
pub fn message_name(msg_id: u16) -> String {
    match msg_id {
        MSG_ACK => "GOLDFISH-ACK".to_string(),
        MSG_NAK => "GOLDFISH-NAK".to_string(),
        _ => format!("0x{:04X}", msg_id),
    }
}

#[derive(Debug, Default)]
pub struct GoldfishDecoder {
    stats: MessageStats<u16>,
    last_frame: Option<GoldfishFrame>,
}

impl GoldfishDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode at most one frame from the front of `buf`
    pub fn decode(&mut self, buf: &[u8]) -> Decoded {
        let framing = FramingConfig::GOLDFISH;
        let frame = match framing.scan(buf) {
            Scan::Noise => return Decoded::new(FrameStatus::Noise, buf.len()),
            Scan::Skip(len) => {
                trace!(protocol = framing.name, len, "skipping to next sync");
                return Decoded::new(FrameStatus::DesyncSkip, len);
            },
            Scan::Truncated => return Decoded::truncated(),
            Scan::Corrupt { len, error } => {
                warn!(protocol = framing.name, "{}", error);
                self.last_frame = None;
                return Decoded::new(FrameStatus::Rejected(error), len);
            },
            Scan::Frame(frame) => frame,
        };

        let body = frame.payload();
        if body.len() < MSG_ID_LEN {
            let error = FrameError::InvalidPacketLen {
                packet: framing.name,
                expect: MSG_ID_LEN,
                got: body.len(),
            };
            warn!(protocol = framing.name, "{}", error);
            self.last_frame = None;
            return Decoded::new(FrameStatus::Rejected(error), frame.len());
        }

        let msg_id = u16::from_be_bytes([body[0], body[1]]);
        let name = message_name(msg_id);
        debug!(protocol = framing.name, %name, len = body.len(), "acknowledged");
        self.stats.record(msg_id);
        self.last_frame = Some(GoldfishFrame {
            msg_id,
            length: body.len() as u16,
            valid: true,
            name,
            payload: body[MSG_ID_LEN..].to_vec(),
        });
        Decoded::new(FrameStatus::Valid, frame.len())
    }

    /// Last accepted frame, cleared when a frame is rejected
    pub fn last_frame(&self) -> Option<&GoldfishFrame> {
        self.last_frame.as_ref()
    }

    pub fn message_count(&self, msg_id: u16) -> u32 {
        self.stats.count(msg_id)
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

impl FrameDecoder for GoldfishDecoder {
    fn decode(&mut self, buf: &[u8]) -> Decoded {
        GoldfishDecoder::decode(self, buf)
    }

    fn total_count(&self) -> u32 {
        GoldfishDecoder::total_count(self)
    }

    fn reset_statistics(&mut self) {
        GoldfishDecoder::reset_statistics(self)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    // ACK for message 0x0620: body of 4 bytes
    static ACK: [u8; 10] = [0xbc, 0xb2, 0x00, 0x40, 0x05, 0x00, 0x06, 0x20, 0x00, 0x00];

    #[test]
    fn names() {
        assert_eq!(message_name(0x0500), "GOLDFISH-ACK");
        assert_eq!(message_name(0x0501), "GOLDFISH-NAK");
        assert_eq!(message_name(0x0a2b), "0x0A2B");
    }

    #[test]
    fn decode_ack() {
        let mut decoder = GoldfishDecoder::new();
        let decoded = decoder.decode(&ACK);
        assert_eq!(decoded.status, FrameStatus::Valid);
        assert_eq!(decoded.consumed, 10);

        let last = decoder.last_frame().unwrap();
        assert_eq!(last.msg_id, MSG_ACK);
        assert_eq!(last.length, 4);
        assert_eq!(last.name, "GOLDFISH-ACK");
        assert_eq!(last.payload, vec![0x06, 0x20]);
        assert_eq!(decoder.message_count(MSG_ACK), 1);
    }

    #[test]
    fn trailer_is_not_checked() {
        let mut frame = ACK;
        frame[8] = 0x12;
        frame[9] = 0x34;
        // length check nibble is ignored too
        frame[3] = 0x4f;
        let mut decoder = GoldfishDecoder::new();
        assert!(decoder.decode(&frame).is_valid());
    }

    #[test]
    fn split_frame_waits() {
        let mut decoder = GoldfishDecoder::new();
        let decoded = decoder.decode(&ACK[..3]);
        assert_eq!(decoded, Decoded::truncated());
        let decoded = decoder.decode(&ACK[..9]);
        assert_eq!(decoded.consumed, 0);
        assert!(decoder.decode(&ACK).is_valid());
    }

    #[test]
    fn body_without_msg_id_rejected() {
        let frame = [0xbc, 0xb2, 0x00, 0x10, 0x05, 0x00, 0x00];
        let mut decoder = GoldfishDecoder::new();
        let decoded = decoder.decode(&frame);
        assert_eq!(decoded.consumed, 7);
        assert!(!decoded.is_valid());
        assert_eq!(decoder.total_count(), 0);
    }

    #[test]
    fn rejected_frame_clears_last_frame() {
        let mut decoder = GoldfishDecoder::new();
        assert!(decoder.decode(&ACK).is_valid());
        assert!(decoder.last_frame().is_some());

        let short = [0xbc, 0xb2, 0x00, 0x10, 0x05, 0x00, 0x00];
        assert!(matches!(
            decoder.decode(&short).status,
            FrameStatus::Rejected(FrameError::InvalidPacketLen { .. })
        ));
        assert_eq!(decoder.last_frame(), None);
        assert_eq!(decoder.total_count(), 1);
    }
}
