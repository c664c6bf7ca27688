use chrono::{DateTime, Utc};

use super::signal;

/// GNSS constellation, as numbered by the NMEA 4.11 system id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Constellation {
    Gps,
    Glonass,
    Galileo,
    BeiDou,
    Qzss,
    NavIC,
    Unknown(u8),
}

impl Constellation {
    pub const fn from_id(id: u8) -> Self {
        match id {
            1 => Constellation::Gps,
            2 => Constellation::Glonass,
            3 => Constellation::Galileo,
            4 => Constellation::BeiDou,
            5 => Constellation::Qzss,
            6 => Constellation::NavIC,
            other => Constellation::Unknown(other),
        }
    }

    pub const fn id(self) -> u8 {
        match self {
            Constellation::Gps => 1,
            Constellation::Glonass => 2,
            Constellation::Galileo => 3,
            Constellation::BeiDou => 4,
            Constellation::Qzss => 5,
            Constellation::NavIC => 6,
            Constellation::Unknown(id) => id,
        }
    }

    /// Single letter code: `G`, `R`, `E`, `B`, `J`, `I`, or `U` if unknown
    pub const fn letter(self) -> char {
        match self {
            Constellation::Gps => 'G',
            Constellation::Glonass => 'R',
            Constellation::Galileo => 'E',
            Constellation::BeiDou => 'B',
            Constellation::Qzss => 'J',
            Constellation::NavIC => 'I',
            Constellation::Unknown(_) => 'U',
        }
    }

    /// Constellation owning a PRN in the mixed (`GN`) numbering, GPS if the
    /// PRN falls outside every known range. This is an approximation: receivers
    /// do not agree on a single mixed numbering scheme.
    pub const fn from_mixed_prn(prn: i32) -> Self {
        match prn {
            33..=64 => Constellation::Glonass,
            65..=96 => Constellation::Galileo,
            97..=128 => Constellation::BeiDou,
            129..=160 => Constellation::Qzss,
            161..=192 => Constellation::NavIC,
            _ => Constellation::Gps,
        }
    }
}

/// Position, velocity and time state of one epoch
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Position {
    /// UTC timestamp in milliseconds since the Unix epoch, 0 if unknown
    pub utc_ms: i64,
    /// `A` valid, `V` void
    pub status: Option<char>,
    /// Decimal degrees, negative south
    pub latitude: f64,
    /// Decimal degrees, negative west
    pub longitude: f64,
    /// Mean sea level altitude in meters
    pub altitude: f64,
    /// Geoid separation in meters
    pub undulation: f64,
    /// Speed over ground in km/h
    pub speed: f64,
    /// Course over ground in degrees true
    pub course: f64,
    /// Magnetic variation in degrees, negative west
    pub magnetic: f64,
    pub quality: i32,
    pub mode: Option<char>,
    /// HDOP as reported by GGA
    pub dop: f64,
    pub hdop: f64,
    pub vdop: f64,
    pub pdop: f64,
    /// Age of differential corrections in seconds
    pub age: i32,
    pub satellites: i32,
    /// Differential reference station id
    pub station: String,
}

impl Position {
    pub fn utc(&self) -> Option<DateTime<Utc>> {
        if self.utc_ms == 0 {
            return None;
        }
        DateTime::from_timestamp_millis(self.utc_ms)
    }

    pub fn is_valid(&self) -> bool {
        self.status == Some('A')
    }
}

/// One satellite in view
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Satellite {
    pub prn: i32,
    /// Degrees
    pub elevation: i32,
    /// Degrees true
    pub azimuth: i32,
    /// dB-Hz
    pub snr: i32,
    /// NMEA system id
    pub system: u8,
    /// NMEA signal id character
    pub signal: char,
    pub used: bool,
}

impl Satellite {
    pub fn constellation(&self) -> Constellation {
        Constellation::from_id(self.system)
    }

    /// Frequency band such as `L1` or `L5`
    pub fn band(&self) -> Option<&'static str> {
        signal::band(self.system, self.signal)
    }

    /// Signal name such as `GPSL1CA`
    pub fn signal_name(&self) -> Option<&'static str> {
        signal::name(self.system, self.signal)
    }
}

/// A completed epoch: the position and every satellite reported since the
/// previous one
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EpochSnapshot {
    pub position: Position,
    pub satellites: Vec<Satellite>,
}

/// Accumulates sentences of the current epoch.
///
/// Owned by the caller and handed to [`NmeaParser::parse`](super::NmeaParser::parse)
/// for every sentence of one stream. The position sentence that closes an
/// epoch moves the accumulated state into an [`EpochSnapshot`] and leaves the
/// builder empty for the next epoch.
#[derive(Debug, Clone, Default)]
pub struct EpochBuilder {
    position: Position,
    satellites: Vec<Satellite>,
    have_rmc: bool,
}

impl EpochBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn satellites(&self) -> &[Satellite] {
        &self.satellites
    }

    /// Whether an RMC sentence was seen on this stream. From then on GGA no
    /// longer supplies latitude and longitude.
    pub fn have_rmc(&self) -> bool {
        self.have_rmc
    }

    pub(crate) fn position_mut(&mut self) -> &mut Position {
        &mut self.position
    }

    pub(crate) fn satellites_mut(&mut self) -> &mut Vec<Satellite> {
        &mut self.satellites
    }

    pub(crate) fn mark_rmc(&mut self) {
        self.have_rmc = true;
    }

    /// Move the accumulated position and satellites out, leaving defaults
    pub fn take_snapshot(&mut self) -> EpochSnapshot {
        EpochSnapshot {
            position: std::mem::take(&mut self.position),
            satellites: std::mem::take(&mut self.satellites),
        }
    }

    /// Forget everything, including whether RMC was seen
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn constellation_ids() {
        for id in 0..10 {
            assert_eq!(Constellation::from_id(id).id(), id);
        }
        assert_eq!(Constellation::from_id(3).letter(), 'E');
        assert_eq!(Constellation::from_id(0).letter(), 'U');
        assert_eq!(Constellation::from_id(7).letter(), 'U');
    }

    #[test]
    fn mixed_prn_ranges() {
        assert_eq!(Constellation::from_mixed_prn(1), Constellation::Gps);
        assert_eq!(Constellation::from_mixed_prn(32), Constellation::Gps);
        assert_eq!(Constellation::from_mixed_prn(33), Constellation::Glonass);
        assert_eq!(Constellation::from_mixed_prn(96), Constellation::Galileo);
        assert_eq!(Constellation::from_mixed_prn(100), Constellation::BeiDou);
        assert_eq!(Constellation::from_mixed_prn(150), Constellation::Qzss);
        assert_eq!(Constellation::from_mixed_prn(192), Constellation::NavIC);
        assert_eq!(Constellation::from_mixed_prn(250), Constellation::Gps);
    }

    #[test]
    fn snapshot_resets_epoch_but_not_rmc_flag() {
        let mut epoch = EpochBuilder::new();
        epoch.position_mut().quality = 4;
        epoch.satellites_mut().push(Satellite {
            prn: 5,
            elevation: 40,
            azimuth: 120,
            snr: 42,
            system: 1,
            signal: '1',
            used: false,
        });
        epoch.mark_rmc();

        let snapshot = epoch.take_snapshot();
        assert_eq!(snapshot.position.quality, 4);
        assert_eq!(snapshot.satellites.len(), 1);
        assert_eq!(epoch.position(), &Position::default());
        assert!(epoch.satellites().is_empty());
        assert!(epoch.have_rmc());

        epoch.reset();
        assert!(!epoch.have_rmc());
    }

    #[test]
    fn position_time() {
        let mut position = Position::default();
        assert_eq!(position.utc(), None);
        position.utc_ms = 1_652_474_122_000;
        assert_eq!(
            position.utc().unwrap().to_rfc3339(),
            "2022-05-13T20:35:22+00:00"
        );
    }
}
