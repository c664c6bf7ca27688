use std::fmt;

/// Error returned while parsing one NMEA sentence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NmeaError {
    /// Not exactly one `*` separator, or not starting with `$`/`!`
    InvalidFormat,
    ChecksumError {
        expect: u8,
        got: u8,
    },
    TooFewFields {
        sentence: &'static str,
        min: usize,
        got: usize,
    },
    /// No handler registered for this tag. Not a failure of the stream,
    /// the sentence is simply not tracked.
    Unsupported(String),
}

impl NmeaError {
    /// Short human readable description of the error kind
    pub fn description(&self) -> &'static str {
        match self {
            NmeaError::InvalidFormat => "Invalid NMEA format",
            NmeaError::ChecksumError { .. } => "Checksum error",
            NmeaError::TooFewFields { .. } => "Too few fields",
            NmeaError::Unsupported(_) => "Unsupported NMEA sentence",
        }
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, NmeaError::Unsupported(_))
    }
}

impl fmt::Display for NmeaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NmeaError::InvalidFormat => f.write_str(self.description()),
            NmeaError::ChecksumError { expect, got } => write!(
                f,
                "{}, expect {:02X}, got {:02X}",
                self.description(),
                expect,
                got
            ),
            NmeaError::TooFewFields { sentence, min, got } => write!(
                f,
                "{} in {}, expect at least {}, got {}",
                self.description(),
                sentence,
                min,
                got
            ),
            NmeaError::Unsupported(tag) => write!(f, "{}: {}", self.description(), tag),
        }
    }
}

impl std::error::Error for NmeaError {}

/// Reason a length-delimited binary frame was dropped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    InvalidChecksum {
        expect: u16,
        got: u16,
    },
    InvalidCrc {
        expect: u32,
        got: u32,
    },
    InvalidPacketLen {
        packet: &'static str,
        expect: usize,
        got: usize,
    },
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::InvalidChecksum { expect, got } => write!(
                f,
                "Not valid packet's checksum, expect {:x}, got {:x}",
                expect, got
            ),
            FrameError::InvalidCrc { expect, got } => write!(
                f,
                "Not valid frame's CRC-24Q, expect {:06x}, got {:06x}",
                expect, got
            ),
            FrameError::InvalidPacketLen {
                packet,
                expect,
                got,
            } => write!(
                f,
                "Invalid packet({}) length, expect at least {}, got {}",
                packet, expect, got
            ),
        }
    }
}

impl std::error::Error for FrameError {}
