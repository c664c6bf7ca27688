use bitflags::bitflags;
use chrono::{DateTime, NaiveDate, Utc};

use crate::error::FrameError;

/// Shortest payload holding every field decoded below
pub const NAV_PVT_MIN_LEN: usize = 92;

bitflags! {
    /// Validity flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct NavPvtValidFlags: u8 {
        /// 1 = valid UTC Date
        const VALID_DATE = 0x01;
        /// 1 = valid UTC time of day
        const VALID_TIME = 0x02;
        /// 1 = UTC time of day has been fully resolved (no seconds uncertainty).
        const FULLY_RESOLVED = 0x04;
        /// 1 = valid magnetic declination
        const VALID_MAG = 0x08;
    }
}

/// GNSS fix type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum GnssFixType {
    NoFix,
    DeadReckoningOnly,
    Fix2D,
    Fix3D,
    GPSPlusDeadReckoning,
    TimeOnlyFix,
    Unknown(u8),
}

impl From<u8> for GnssFixType {
    fn from(value: u8) -> Self {
        match value {
            0 => GnssFixType::NoFix,
            1 => GnssFixType::DeadReckoningOnly,
            2 => GnssFixType::Fix2D,
            3 => GnssFixType::Fix3D,
            4 => GnssFixType::GPSPlusDeadReckoning,
            5 => GnssFixType::TimeOnlyFix,
            other => GnssFixType::Unknown(other),
        }
    }
}

/// Navigation Position Velocity Time Solution, the fields tracked from it
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NavPvt {
    /// GPS Millisecond Time of Week
    pub itow: u32,
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub min: u8,
    pub sec: u8,
    #[cfg_attr(feature = "serde", serde(serialize_with = "serialize_valid"))]
    pub valid: NavPvtValidFlags,
    pub fix_type: GnssFixType,
    pub num_satellites: u8,
    /// Longitude in 1e-7 degrees
    pub lon: i32,
    /// Latitude in 1e-7 degrees
    pub lat: i32,
    /// Height above ellipsoid in mm
    pub height_meters_mm: i32,
    /// Height above mean sea level in mm
    pub height_msl_mm: i32,
    /// Horizontal accuracy estimate in mm
    pub horiz_accuracy_mm: u32,
    /// Vertical accuracy estimate in mm
    pub vert_accuracy_mm: u32,
}

#[cfg(feature = "serde")]
fn serialize_valid<S: serde::Serializer>(
    valid: &NavPvtValidFlags,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(valid.bits())
}

fn u16_at(payload: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([payload[at], payload[at + 1]])
}

fn u32_at(payload: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([
        payload[at],
        payload[at + 1],
        payload[at + 2],
        payload[at + 3],
    ])
}

fn i32_at(payload: &[u8], at: usize) -> i32 {
    u32_at(payload, at) as i32
}

impl NavPvt {
    pub fn parse(payload: &[u8]) -> Result<Self, FrameError> {
        if payload.len() < NAV_PVT_MIN_LEN {
            return Err(FrameError::InvalidPacketLen {
                packet: "NAV-PVT",
                expect: NAV_PVT_MIN_LEN,
                got: payload.len(),
            });
        }
        Ok(Self {
            itow: u32_at(payload, 0),
            year: u16_at(payload, 4),
            month: payload[6],
            day: payload[7],
            hour: payload[8],
            min: payload[9],
            sec: payload[10],
            valid: NavPvtValidFlags::from_bits_truncate(payload[11]),
            fix_type: GnssFixType::from(payload[20]),
            num_satellites: payload[23],
            lon: i32_at(payload, 24),
            lat: i32_at(payload, 28),
            height_meters_mm: i32_at(payload, 32),
            height_msl_mm: i32_at(payload, 36),
            horiz_accuracy_mm: u32_at(payload, 40),
            vert_accuracy_mm: u32_at(payload, 44),
        })
    }

    /// Longitude in degrees
    pub fn lon_degrees(&self) -> f64 {
        f64::from(self.lon) * 1e-7
    }

    /// Latitude in degrees
    pub fn lat_degrees(&self) -> f64 {
        f64::from(self.lat) * 1e-7
    }

    pub fn height_msl(&self) -> f64 {
        f64::from(self.height_msl_mm) * 1e-3
    }

    /// UTC date and time, `None` unless the receiver flags both as valid
    /// and they form a real calendar date
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        if !self
            .valid
            .contains(NavPvtValidFlags::VALID_DATE | NavPvtValidFlags::VALID_TIME)
        {
            return None;
        }
        let naive = NaiveDate::from_ymd_opt(self.year.into(), self.month.into(), self.day.into())?
            .and_hms_opt(self.hour.into(), self.min.into(), self.sec.into())?;
        Some(naive.and_utc())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn payload() -> [u8; 92] {
        let mut p = [0u8; 92];
        p[0..4].copy_from_slice(&123_456_000u32.to_le_bytes());
        p[4..6].copy_from_slice(&2024u16.to_le_bytes());
        p[6] = 3;
        p[7] = 15;
        p[8] = 12;
        p[9] = 34;
        p[10] = 56;
        p[11] = 0x07;
        p[20] = 3;
        p[23] = 17;
        p[24..28].copy_from_slice(&(-1_223_456_789i32).to_le_bytes());
        p[28..32].copy_from_slice(&374_567_890i32.to_le_bytes());
        p[32..36].copy_from_slice(&45_000i32.to_le_bytes());
        p[36..40].copy_from_slice(&12_500i32.to_le_bytes());
        p[40..44].copy_from_slice(&850u32.to_le_bytes());
        p[44..48].copy_from_slice(&1_200u32.to_le_bytes());
        p
    }

    #[test]
    fn parse_fields() {
        let pvt = NavPvt::parse(&payload()).unwrap();
        assert_eq!(pvt.itow, 123_456_000);
        assert_eq!(pvt.year, 2024);
        assert_eq!(pvt.fix_type, GnssFixType::Fix3D);
        assert_eq!(pvt.num_satellites, 17);
        assert_eq!(pvt.lon, -1_223_456_789);
        assert_eq!(pvt.lat, 374_567_890);
        assert!((pvt.lon_degrees() - -122.3456789).abs() < 1e-9);
        assert!((pvt.lat_degrees() - 37.456789).abs() < 1e-9);
        assert!((pvt.height_msl() - 12.5).abs() < 1e-9);
        assert_eq!(pvt.horiz_accuracy_mm, 850);
        assert_eq!(pvt.vert_accuracy_mm, 1_200);
        assert!(pvt.valid.contains(NavPvtValidFlags::FULLY_RESOLVED));
        assert!(!pvt.valid.contains(NavPvtValidFlags::VALID_MAG));
    }

    #[test]
    fn datetime_needs_valid_flags() {
        let pvt = NavPvt::parse(&payload()).unwrap();
        let dt = pvt.datetime().unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 3, 15));
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (12, 34, 56));

        let mut p = payload();
        p[11] = 0x01;
        assert_eq!(NavPvt::parse(&p).unwrap().datetime(), None);

        // flagged valid but not a calendar date
        let mut p = payload();
        p[6] = 13;
        assert_eq!(NavPvt::parse(&p).unwrap().datetime(), None);
    }

    #[test]
    fn short_payload_rejected() {
        assert_eq!(
            NavPvt::parse(&payload()[..91]),
            Err(FrameError::InvalidPacketLen {
                packet: "NAV-PVT",
                expect: 92,
                got: 91
            })
        );
    }

    #[test]
    fn unknown_fix_type() {
        assert_eq!(GnssFixType::from(9), GnssFixType::Unknown(9));
    }
}
