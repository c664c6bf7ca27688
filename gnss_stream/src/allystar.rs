//! Allystar binary protocol: UBX frame layout behind `0xf1 0xd9` sync bytes.
//!
//! No payload is decoded. Frames are validated, named by raw class/id and
//! counted.

use crate::{
    error::FrameError,
    framing::{ClassIdDecoder, ClassIdFrame, Dialect, FramingConfig},
};

/// Allystar has no decoded payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum AllystarMessage {}

#[derive(Debug, Clone, Copy)]
pub enum Allystar {}

pub type AllystarDecoder = ClassIdDecoder<Allystar>;
pub type AllystarFrame = ClassIdFrame<AllystarMessage>;

impl Dialect for Allystar {
    type Message = AllystarMessage;

    const FRAMING: FramingConfig = FramingConfig::ALLYSTAR;

    fn class_name(class: u8) -> String {
        format!("0x{:02x}", class)
    }

    fn message_name(class: u8, id: u8) -> String {
        format!("0x{:02x}-0x{:02x}", class, id)
    }

    fn decode_payload(_: u8, _: u8, _: &[u8]) -> Result<Option<AllystarMessage>, FrameError> {
        Ok(None)
    }
}
