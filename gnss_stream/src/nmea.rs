//! NMEA-0183 sentence parsing and epoch aggregation.
//!
//! [`NmeaParser`] decodes one sentence at a time into a caller owned
//! [`EpochBuilder`]. GSV sentences add satellites, GSA sentences mark them
//! used, GGA sentences fill in fix data, and RMC closes the epoch and hands
//! back an [`EpochSnapshot`]. A stream without RMC never produces a snapshot.
//!
//! ```
//! use gnss_stream::nmea::{EpochBuilder, NmeaParser, ParseOutcome};
//!
//! let parser = NmeaParser::new();
//! let mut epoch = EpochBuilder::new();
//! let outcome = parser.parse(
//!     &mut epoch,
//!     "$GPRMC,203522.00,A,5109.0262308,N,11401.8407342,W,0.004,133.4,130522,0.0,E,D*2B",
//!     false,
//! );
//! assert!(matches!(outcome, Ok(ParseOutcome::EpochClosed(_))));
//! ```

mod epoch;
mod reframer;
mod report;
mod sentences;
pub mod signal;

pub use epoch::{Constellation, EpochBuilder, EpochSnapshot, Position, Satellite};
pub use reframer::{LineReframer, LineResult, ReframerConfig, SourceMux};
pub use report::{encode_sentence, gga_report};
pub use sentences::to_degrees;

use std::collections::HashMap;

use tracing::trace;

use crate::{
    checksum::nmea_checksum,
    constants::{NMEA_CHECKSUM_SEPARATOR, NMEA_ENCAPSULATION_CHAR, NMEA_SYNC_CHAR},
    error::NmeaError,
};
use sentences::{Handler, DEFAULT_SIGNAL};

/// What a successfully parsed sentence did
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ParseOutcome {
    /// The epoch under construction was updated
    Updated,
    /// Proprietary (`$P...`) sentence, recognized but not decoded
    Proprietary,
    /// The sentence closed the epoch
    EpochClosed(EpochSnapshot),
}

/// Sentence tag to handler table
#[derive(Debug, Clone)]
pub struct NmeaParser {
    handlers: HashMap<&'static str, Handler>,
}

impl Default for NmeaParser {
    fn default() -> Self {
        Self::new()
    }
}

impl NmeaParser {
    pub fn new() -> Self {
        let gsv = |system, signal| Handler::Gsv { system, signal };
        let gsa = |system| Handler::Gsa { system };
        let handlers = HashMap::from([
            ("$GPGGA", Handler::Gga),
            ("$GNGGA", Handler::Gga),
            ("$GLGGA", Handler::Gga),
            ("$GAGGA", Handler::Gga),
            ("$GBGGA", Handler::Gga),
            ("$BDGGA", Handler::Gga),
            ("$GQGGA", Handler::Gga),
            ("$QZGGA", Handler::Gga),
            ("$GIGGA", Handler::Gga),
            ("$INGGA", Handler::Gga),
            ("$GPRMC", Handler::Rmc),
            ("$GNRMC", Handler::Rmc),
            ("$GLRMC", Handler::Rmc),
            ("$GARMC", Handler::Rmc),
            ("$GBRMC", Handler::Rmc),
            ("$BDRMC", Handler::Rmc),
            ("$GQRMC", Handler::Rmc),
            ("$QZRMC", Handler::Rmc),
            ("$GIRMC", Handler::Rmc),
            ("$INRMC", Handler::Rmc),
            ("$GPGSV", gsv(1, DEFAULT_SIGNAL)),
            ("$GLGSV", gsv(2, DEFAULT_SIGNAL)),
            ("$GAGSV", gsv(3, '7')),
            ("$BDGSV", gsv(4, DEFAULT_SIGNAL)),
            ("$GBGSV", gsv(4, DEFAULT_SIGNAL)),
            ("$QZGSV", gsv(5, DEFAULT_SIGNAL)),
            ("$GQGSV", gsv(5, DEFAULT_SIGNAL)),
            ("$NCGSV", gsv(6, '5')),
            ("$GIGSV", gsv(6, '5')),
            ("$GPGSA", gsa(1)),
            ("$GLGSA", gsa(2)),
            ("$GAGSA", gsa(3)),
            ("$BDGSA", gsa(4)),
            ("$GBGSA", gsa(4)),
            ("$QZGSA", gsa(5)),
            ("$GQGSA", gsa(5)),
            ("$NCGSA", gsa(6)),
            ("$GIGSA", gsa(6)),
            ("$GNGSA", Handler::MixedGsa),
        ]);
        Self { handlers }
    }

    /// Tags with a registered handler
    pub fn supported_tags(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.keys().copied()
    }

    /// Parse one sentence, `$` or `!` through the checksum digits, without
    /// CR/LF.
    ///
    /// The checksum is still required to be present when `ignore_checksum`
    /// is set, only its value is not compared.
    pub fn parse(
        &self,
        epoch: &mut EpochBuilder,
        sentence: &str,
        ignore_checksum: bool,
    ) -> Result<ParseOutcome, NmeaError> {
        let body = split_checksum(sentence, ignore_checksum)?;

        if body.as_bytes()[1] == b'P' {
            trace!(sentence, "proprietary sentence");
            return Ok(ParseOutcome::Proprietary);
        }

        let mut fields = body.split(',');
        let tag = fields.next().unwrap_or_default();
        let fields: Vec<&str> = fields.collect();
        if fields.len() < 2 {
            return Err(NmeaError::TooFewFields {
                sentence: "NMEA",
                min: 2,
                got: fields.len(),
            });
        }
        let Some(&handler) = self.handlers.get(tag) else {
            return Err(NmeaError::Unsupported(tag.to_string()));
        };

        match handler.apply(epoch, &fields)? {
            Some(snapshot) => Ok(ParseOutcome::EpochClosed(snapshot)),
            None => Ok(ParseOutcome::Updated),
        }
    }
}

/// Validate the framing and checksum of `sentence`, returning the part
/// before `*`
fn split_checksum(sentence: &str, ignore_checksum: bool) -> Result<&str, NmeaError> {
    let mut parts = sentence.split(NMEA_CHECKSUM_SEPARATOR);
    let (Some(body), Some(hex), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(NmeaError::InvalidFormat);
    };

    let bytes = sentence.as_bytes();
    let start_ok = matches!(bytes.first(), Some(&NMEA_SYNC_CHAR) | Some(&NMEA_ENCAPSULATION_CHAR));
    if !start_ok || hex.len() != 2 || body.len() < 2 {
        return Err(NmeaError::InvalidFormat);
    }
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(NmeaError::InvalidFormat);
    }
    let expect = u8::from_str_radix(hex, 16).map_err(|_| NmeaError::InvalidFormat)?;

    let got = nmea_checksum(&body.as_bytes()[1..]);
    if !ignore_checksum && got != expect {
        return Err(NmeaError::ChecksumError { expect, got });
    }
    Ok(body)
}
