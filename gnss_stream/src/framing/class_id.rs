use core::marker::PhantomData;
use std::fmt;

use tracing::{debug, trace, warn};

use super::{Decoded, FrameDecoder, FrameStatus, FramingConfig, MessageStats, RawFrame, Scan};
use crate::{
    constants::{UBX_CLASS_OFFSET, UBX_MSG_ID_OFFSET},
    error::FrameError,
};

/// One protocol of the class/id framed family: its framing parameters, its
/// naming tables and the payloads it knows how to decode
pub trait Dialect {
    type Message: fmt::Debug + Clone + PartialEq;

    const FRAMING: FramingConfig;

    fn class_name(class: u8) -> String;

    fn message_name(class: u8, id: u8) -> String;

    /// `Ok(None)` acknowledges a class/id that has no payload decoder.
    /// An error rejects the frame even though its checksum matched.
    fn decode_payload(class: u8, id: u8, payload: &[u8])
        -> Result<Option<Self::Message>, FrameError>;
}

/// Descriptor of the last length-delimited frame a decoder saw
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ClassIdFrame<M> {
    pub class: u8,
    pub id: u8,
    /// Declared payload length
    pub length: u16,
    /// Checksum matched and the payload was accepted
    pub valid: bool,
    pub class_name: String,
    pub message_name: String,
    /// Raw payload, empty for rejected frames
    pub payload: Vec<u8>,
    /// Decoded payload, if the class/id has a decoder
    pub message: Option<M>,
}

/// Incremental decoder for one [`Dialect`]
pub struct ClassIdDecoder<D: Dialect> {
    stats: MessageStats<u16>,
    last_frame: Option<ClassIdFrame<D::Message>>,
    _dialect: PhantomData<D>,
}

impl<D: Dialect> Default for ClassIdDecoder<D> {
    fn default() -> Self {
        Self {
            stats: MessageStats::default(),
            last_frame: None,
            _dialect: PhantomData,
        }
    }
}

impl<D: Dialect> fmt::Debug for ClassIdDecoder<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassIdDecoder")
            .field("protocol", &D::FRAMING.name)
            .field("stats", &self.stats)
            .field("last_frame", &self.last_frame)
            .finish()
    }
}

fn stats_key(class: u8, id: u8) -> u16 {
    (u16::from(class) << 8) | u16::from(id)
}

impl<D: Dialect> ClassIdDecoder<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode at most one frame from the front of `buf`.
    ///
    /// The returned `consumed` count must be drained from the caller's
    /// buffer whatever the status, then the call repeated.
    pub fn decode(&mut self, buf: &[u8]) -> Decoded {
        let framing = D::FRAMING;
        match framing.scan(buf) {
            Scan::Noise => {
                if !buf.is_empty() {
                    trace!(protocol = framing.name, len = buf.len(), "no sync, dropping buffer");
                }
                Decoded::new(FrameStatus::Noise, buf.len())
            },
            Scan::Skip(len) => {
                trace!(protocol = framing.name, len, "skipping to next sync");
                Decoded::new(FrameStatus::DesyncSkip, len)
            },
            Scan::Truncated => Decoded::truncated(),
            Scan::Corrupt { len, error } => {
                let name = D::message_name(buf[UBX_CLASS_OFFSET], buf[UBX_MSG_ID_OFFSET]);
                warn!(protocol = framing.name, %name, "{}", error);
                self.last_frame = Some(Self::descriptor(buf, len, false, Vec::new(), None));
                Decoded::new(FrameStatus::Rejected(error), len)
            },
            Scan::Frame(frame) => self.accept(frame),
        }
    }

    fn accept(&mut self, frame: RawFrame<'_>) -> Decoded {
        let bytes = frame.bytes();
        let (class, id) = (bytes[UBX_CLASS_OFFSET], bytes[UBX_MSG_ID_OFFSET]);
        let payload = frame.payload();
        let name = D::message_name(class, id);

        match D::decode_payload(class, id, payload) {
            Ok(message) => {
                match &message {
                    Some(message) => {
                        debug!(protocol = D::FRAMING.name, %name, ?message, "decoded")
                    },
                    None => debug!(
                        protocol = D::FRAMING.name,
                        %name,
                        len = payload.len(),
                        "acknowledged"
                    ),
                }
                self.stats.record(stats_key(class, id));
                self.last_frame = Some(Self::descriptor(
                    bytes,
                    frame.len(),
                    true,
                    payload.to_vec(),
                    message,
                ));
                Decoded::new(FrameStatus::Valid, frame.len())
            },
            Err(error) => {
                warn!(protocol = D::FRAMING.name, %name, "{}", error);
                self.last_frame = Some(Self::descriptor(bytes, frame.len(), false, Vec::new(), None));
                Decoded::new(FrameStatus::Rejected(error), frame.len())
            },
        }
    }

    fn descriptor(
        bytes: &[u8],
        frame_len: usize,
        valid: bool,
        payload: Vec<u8>,
        message: Option<D::Message>,
    ) -> ClassIdFrame<D::Message> {
        let (class, id) = (bytes[UBX_CLASS_OFFSET], bytes[UBX_MSG_ID_OFFSET]);
        ClassIdFrame {
            class,
            id,
            length: (frame_len - D::FRAMING.frame_len(0)) as u16,
            valid,
            class_name: D::class_name(class),
            message_name: D::message_name(class, id),
            payload,
            message,
        }
    }

    pub fn last_frame(&self) -> Option<&ClassIdFrame<D::Message>> {
        self.last_frame.as_ref()
    }

    pub fn message_count(&self, class: u8, id: u8) -> u32 {
        self.stats.count(stats_key(class, id))
    }

    pub fn total_count(&self) -> u32 {
        self.stats.total()
    }

    pub fn reset_statistics(&mut self) {
        self.stats.reset();
    }

    /// Counters keyed by `(class << 8) | id`
    pub fn stats(&self) -> &MessageStats<u16> {
        &self.stats
    }
}

impl<D: Dialect> FrameDecoder for ClassIdDecoder<D> {
    fn decode(&mut self, buf: &[u8]) -> Decoded {
        ClassIdDecoder::decode(self, buf)
    }

    fn total_count(&self) -> u32 {
        ClassIdDecoder::total_count(self)
    }

    fn reset_statistics(&mut self) {
        ClassIdDecoder::reset_statistics(self)
    }
}
