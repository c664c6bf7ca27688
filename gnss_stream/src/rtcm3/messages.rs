use tracing::debug;

use crate::{
    bits::{fits, getbits, getbitu},
    error::FrameError,
};

// type (12) + station id (12)
const COMMON_HEADER_BITS: usize = 24;

/// Payload bytes needed for the 1005 layout (152 bits)
pub const STATION_MIN_LEN: usize = 19;
/// Payload bytes needed for 1006, which appends a 16 bit antenna height
pub const STATION_HEIGHT_MIN_LEN: usize = 21;
/// Payload bytes before the text of a 1029 message (72 bits)
pub const TEXT_HEADER_LEN: usize = 9;

const ECEF_RESOLUTION: f64 = 0.0001;

/// Stationary reference station antenna reference point, messages 1005/1006
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StationCoordinates {
    pub station_id: u16,
    /// ITRF realization year
    pub itrf_year: u8,
    pub gps: bool,
    pub glonass: bool,
    pub galileo: bool,
    /// Physical reference station rather than a computed one
    pub reference_station: bool,
    /// ECEF coordinates in meters
    pub ecef_x: f64,
    pub ecef_y: f64,
    pub ecef_z: f64,
    /// Antenna height in meters, 1006 only
    pub antenna_height: Option<f64>,
}

/// Unicode text string, message 1029
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TextMessage {
    pub station_id: u16,
    /// Modified Julian Day
    pub mjd: u16,
    pub seconds_of_day: u32,
    /// Declared number of UTF-8 characters
    pub char_count: u8,
    pub text: String,
}

fn too_short(packet: &'static str, expect: usize, got: usize) -> FrameError {
    FrameError::InvalidPacketLen {
        packet,
        expect,
        got,
    }
}

impl StationCoordinates {
    pub fn parse(payload: &[u8], with_height: bool) -> Result<Self, FrameError> {
        let packet = if with_height { "RTCM3-1006" } else { "RTCM3-1005" };
        if payload.len() < STATION_MIN_LEN {
            return Err(too_short(packet, STATION_MIN_LEN, payload.len()));
        }

        let mut pos = 12;
        let station_id = getbitu(payload, pos, 12) as u16;
        pos += 12;
        let itrf_year = getbitu(payload, pos, 6) as u8;
        pos += 6;
        let gps = getbitu(payload, pos, 1) == 1;
        let glonass = getbitu(payload, pos + 1, 1) == 1;
        let galileo = getbitu(payload, pos + 2, 1) == 1;
        let reference_station = getbitu(payload, pos + 3, 1) == 1;
        pos += 4;
        let ecef_x = getbits(payload, pos, 38) as f64 * ECEF_RESOLUTION;
        // single receiver oscillator and reserved bit
        pos += 38 + 2;
        let ecef_y = getbits(payload, pos, 38) as f64 * ECEF_RESOLUTION;
        // quarter cycle indicator
        pos += 38 + 2;
        let ecef_z = getbits(payload, pos, 38) as f64 * ECEF_RESOLUTION;
        pos += 38;

        let antenna_height = if with_height && fits(payload, pos, 16) {
            Some(getbitu(payload, pos, 16) as f64 * ECEF_RESOLUTION)
        } else if with_height {
            return Err(too_short(packet, STATION_HEIGHT_MIN_LEN, payload.len()));
        } else {
            None
        };

        debug!(
            station_id,
            ecef_x, ecef_y, ecef_z, "reference station coordinates"
        );
        Ok(Self {
            station_id,
            itrf_year,
            gps,
            glonass,
            galileo,
            reference_station,
            ecef_x,
            ecef_y,
            ecef_z,
            antenna_height,
        })
    }
}

impl TextMessage {
    pub fn parse(payload: &[u8]) -> Result<Self, FrameError> {
        if payload.len() < TEXT_HEADER_LEN {
            return Err(too_short("RTCM3-1029", TEXT_HEADER_LEN, payload.len()));
        }

        let station_id = getbitu(payload, 12, 12) as u16;
        let mjd = getbitu(payload, COMMON_HEADER_BITS, 16) as u16;
        let seconds_of_day = getbitu(payload, 40, 17) as u32;
        let char_count = getbitu(payload, 57, 7) as u8;
        let byte_count = getbitu(payload, 64, 8) as usize;

        let text = payload
            .get(TEXT_HEADER_LEN..TEXT_HEADER_LEN + byte_count)
            .ok_or_else(|| {
                too_short("RTCM3-1029", TEXT_HEADER_LEN + byte_count, payload.len())
            })?;
        let text = String::from_utf8_lossy(text).into_owned();

        debug!(station_id, %text, "text message");
        Ok(Self {
            station_id,
            mjd,
            seconds_of_day,
            char_count,
            text,
        })
    }
}
