//! u-blox UBX protocol: `0xb5 0x62` framed, Fletcher-8 protected.
//!
//! Only NAV-PVT and MON-VER payloads are decoded. Every other class/id with a
//! matching checksum is acknowledged and counted.

mod mon_ver;
mod nav_pvt;

pub use mon_ver::{MonVer, MON_VER_MIN_LEN};
pub use nav_pvt::{GnssFixType, NavPvt, NavPvtValidFlags, NAV_PVT_MIN_LEN};

use crate::{
    error::FrameError,
    framing::{ClassIdDecoder, ClassIdFrame, Dialect, FramingConfig},
};

pub const CLASS_NAV: u8 = 0x01;
pub const CLASS_RXM: u8 = 0x02;
pub const CLASS_INF: u8 = 0x04;
pub const CLASS_ACK: u8 = 0x05;
pub const CLASS_CFG: u8 = 0x06;
pub const CLASS_UPD: u8 = 0x09;
pub const CLASS_MON: u8 = 0x0a;
pub const CLASS_AID: u8 = 0x0b;
pub const CLASS_TIM: u8 = 0x0d;
pub const CLASS_ESF: u8 = 0x10;
pub const CLASS_MGA: u8 = 0x13;
pub const CLASS_LOG: u8 = 0x21;
pub const CLASS_SEC: u8 = 0x27;
pub const CLASS_HNR: u8 = 0x28;

pub const NAV_PVT: u8 = 0x07;
pub const MON_VER: u8 = 0x04;

/// Decoded UBX payloads
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum UbxMessage {
    NavPvt(NavPvt),
    MonVer(MonVer),
}

/// The u-blox dialect of the class/id frame family
#[derive(Debug, Clone, Copy)]
pub enum Ublox {}

pub type UbxDecoder = ClassIdDecoder<Ublox>;
pub type UbxFrame = ClassIdFrame<UbxMessage>;

fn known_class_name(class: u8) -> Option<&'static str> {
    Some(match class {
        CLASS_NAV => "NAV",
        CLASS_RXM => "RXM",
        CLASS_INF => "INF",
        CLASS_ACK => "ACK",
        CLASS_CFG => "CFG",
        CLASS_UPD => "UPD",
        CLASS_MON => "MON",
        CLASS_AID => "AID",
        CLASS_TIM => "TIM",
        CLASS_ESF => "ESF",
        CLASS_MGA => "MGA",
        CLASS_LOG => "LOG",
        CLASS_SEC => "SEC",
        CLASS_HNR => "HNR",
        _ => return None,
    })
}

fn known_message_name(class: u8, id: u8) -> Option<&'static str> {
    Some(match (class, id) {
        (CLASS_NAV, 0x01) => "POSECEF",
        (CLASS_NAV, 0x02) => "POSLLH",
        (CLASS_NAV, 0x03) => "STATUS",
        (CLASS_NAV, 0x04) => "DOP",
        (CLASS_NAV, 0x06) => "SOL",
        (CLASS_NAV, NAV_PVT) => "PVT",
        (CLASS_NAV, 0x11) => "VELECEF",
        (CLASS_NAV, 0x12) => "VELNED",
        (CLASS_NAV, 0x20) => "TIMEGPS",
        (CLASS_NAV, 0x21) => "TIMEUTC",
        (CLASS_NAV, 0x22) => "CLOCK",
        (CLASS_NAV, 0x30) => "SVINFO",
        (CLASS_NAV, 0x35) => "SAT",
        (CLASS_NAV, 0x61) => "EOE",
        (CLASS_RXM, 0x10) => "RAW",
        (CLASS_RXM, 0x11) => "SFRB",
        (CLASS_RXM, 0x13) => "SFRBX",
        (CLASS_RXM, 0x15) => "RAWX",
        (CLASS_ACK, 0x00) => "NAK",
        (CLASS_ACK, 0x01) => "ACK",
        (CLASS_CFG, 0x00) => "PRT",
        (CLASS_CFG, 0x01) => "MSG",
        (CLASS_CFG, 0x08) => "RATE",
        (CLASS_CFG, 0x24) => "NAV5",
        (CLASS_MON, MON_VER) => "VER",
        (CLASS_MON, 0x09) => "HW",
        (CLASS_MON, 0x0b) => "HW2",
        _ => return None,
    })
}

impl Dialect for Ublox {
    type Message = UbxMessage;

    const FRAMING: FramingConfig = FramingConfig::UBX;

    /// `NAV`, `MON`, ... or `0xNN`
    fn class_name(class: u8) -> String {
        match known_class_name(class) {
            Some(name) => name.to_string(),
            None => format!("0x{:02x}", class),
        }
    }

    /// `NAV-PVT`, `MON-VER`, ... or `CLASS-0xNN`
    fn message_name(class: u8, id: u8) -> String {
        let class_name = Self::class_name(class);
        match known_message_name(class, id) {
            Some(name) => format!("{}-{}", class_name, name),
            None => format!("{}-0x{:02x}", class_name, id),
        }
    }

    fn decode_payload(
        class: u8,
        id: u8,
        payload: &[u8],
    ) -> Result<Option<UbxMessage>, FrameError> {
        match (class, id) {
            (CLASS_NAV, NAV_PVT) => NavPvt::parse(payload).map(|m| Some(UbxMessage::NavPvt(m))),
            (CLASS_MON, MON_VER) => MonVer::parse(payload).map(|m| Some(UbxMessage::MonVer(m))),
            _ => Ok(None),
        }
    }
}
