//! # gnss_stream
//!
//! Resynchronising decoders for the byte streams GNSS receivers and
//! correction services produce: NMEA-0183 text, the u-blox UBX binary
//! protocol together with its Allystar and Goldfish relatives, and RTCM3.
//!
//! Every decoder is fed from an arbitrary chunked stream. Noise is skipped,
//! a frame split across reads is completed on the next call, and a corrupt
//! frame never stalls the stream.
//!
//! Binary frames
//! =============
//!
//! The binary decoders look at the front of a caller owned buffer and report
//! how many bytes to discard. [`FrameDecoder::drain`] runs that loop:
//! ```
//! use gnss_stream::{FrameDecoder, UbxDecoder};
//!
//! let mut decoder = UbxDecoder::default();
//! // noise, then UBX-ACK-ACK for CFG-PRT
//! let mut buf = vec![0x00, 0xff, 0xb5, 0x62, 0x05, 0x01, 0x02, 0x00, 0x06, 0x00, 0x0e, 0x37];
//! assert_eq!(decoder.drain(&mut buf), 1);
//! assert!(buf.is_empty());
//! assert_eq!(decoder.last_frame().unwrap().message_name, "ACK-ACK");
//! ```
//!
//! NMEA sentences
//! ==============
//!
//! [`nmea::NmeaParser`] decodes complete sentences into an epoch, and
//! [`nmea::SourceMux`] cuts raw chunks from any number of independent
//! sources into sentences first:
//! ```
//! use gnss_stream::nmea::SourceMux;
//!
//! let mut mux = SourceMux::default();
//! let results = mux.push("ttyACM0", b"$GPGSV,1,1,01,05,40,120,45*4B\r\n");
//! assert_eq!(results.len(), 1);
//! ```

#![cfg_attr(docrs, feature(doc_cfg))]

#[cfg(feature = "serde")]
extern crate serde;

pub mod allystar;
pub mod bits;
pub mod checksum;
pub mod constants;
pub mod error;
pub mod framing;
pub mod goldfish;
pub mod nmea;
pub mod rtcm3;
pub mod ubx;

pub use crate::{
    allystar::{AllystarDecoder, AllystarFrame},
    error::{FrameError, NmeaError},
    framing::{Decoded, FrameDecoder, FrameStatus, FramingConfig, MessageStats},
    goldfish::{GoldfishDecoder, GoldfishFrame},
    nmea::{EpochBuilder, EpochSnapshot, NmeaParser, ParseOutcome},
    rtcm3::{Rtcm3Decoder, Rtcm3Frame, Rtcm3Message},
    ubx::{UbxDecoder, UbxFrame, UbxMessage},
};
