//! Per-sentence field decoding. Every handler receives the fields that follow
//! the sentence tag.

use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, trace};

use super::epoch::{Constellation, EpochBuilder, EpochSnapshot, Satellite};
use crate::error::NmeaError;

pub(crate) const RMC_MIN_FIELDS: usize = 9;
pub(crate) const GGA_MIN_FIELDS: usize = 6;
pub(crate) const GSA_MIN_FIELDS: usize = 17;

const KNOTS_TO_KMH: f64 = 1.852;

/// Signal id assumed when a GSV or GSA sentence does not carry one
pub(crate) const DEFAULT_SIGNAL: char = '1';

/// Sentence decoder selected by the dispatch table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Handler {
    Rmc,
    Gga,
    /// Satellites in view of one constellation
    Gsv { system: u8, signal: char },
    /// Active satellites of one constellation
    Gsa { system: u8 },
    /// Active satellites of a mixed constellation sentence
    MixedGsa,
}

impl Handler {
    pub(crate) fn apply(
        self,
        epoch: &mut EpochBuilder,
        data: &[&str],
    ) -> Result<Option<EpochSnapshot>, NmeaError> {
        match self {
            Handler::Rmc => rmc(epoch, data).map(Some),
            Handler::Gga => gga(epoch, data).map(|()| None),
            Handler::Gsv { system, signal } => {
                gsv(epoch, data, system, signal);
                Ok(None)
            },
            Handler::Gsa { system } => gsa(epoch, data, system).map(|()| None),
            Handler::MixedGsa => mixed_gsa(epoch, data).map(|()| None),
        }
    }
}

fn field<'a>(data: &[&'a str], i: usize) -> &'a str {
    data.get(i).copied().unwrap_or("")
}

fn int(s: &str) -> i32 {
    s.trim().parse().unwrap_or(0)
}

fn float(s: &str) -> f64 {
    s.trim().parse().unwrap_or(0.0)
}

fn too_few(sentence: &'static str, min: usize, got: usize) -> NmeaError {
    NmeaError::TooFewFields { sentence, min, got }
}

/// `ddmm.mmmm` / `dddmm.mmmm` plus hemisphere to signed decimal degrees.
/// Values of five characters or fewer are treated as zero.
pub fn to_degrees(nmea: &str, hemisphere: &str) -> f64 {
    let mut decimal = 0.0;
    if nmea.len() > 5 {
        let value = float(nmea);
        let degrees = (value / 100.0).trunc();
        decimal = degrees + (value - degrees * 100.0) / 60.0;
    }
    if hemisphere == "W" || hemisphere == "S" {
        -decimal
    } else {
        decimal
    }
}

/// `ddmmyy` and `hhmmss[.sss]` to milliseconds since the Unix epoch, years
/// taken in the 2000s
fn utc_millis(date: &str, time: &str) -> Option<i64> {
    let date = date.as_bytes();
    if date.len() != 6 || time.len() < 6 || !time.is_char_boundary(6) {
        return None;
    }
    let two = |b: &[u8]| -> Option<u32> { core::str::from_utf8(b).ok()?.parse().ok() };
    let day = two(&date[0..2])?;
    let month = two(&date[2..4])?;
    let year = 2000 + two(&date[4..6])? as i32;

    let (hms, fraction) = time.split_at(6);
    let hms = hms.as_bytes();
    let millis = match fraction.strip_prefix('.') {
        Some(digits) if digits.bytes().all(|b| b.is_ascii_digit()) => {
            let digits = &digits[..digits.len().min(3)];
            match digits.parse::<u32>() {
                Ok(value) => value * 10u32.pow(3 - digits.len() as u32),
                Err(_) => 0,
            }
        },
        None if fraction.is_empty() => 0,
        _ => return None,
    };

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time =
        NaiveTime::from_hms_milli_opt(two(&hms[0..2])?, two(&hms[2..4])?, two(&hms[4..6])?, millis)?;
    Some(date.and_time(time).and_utc().timestamp_millis())
}

/// Recommended minimum data. Closes the epoch.
///
/// `time,status,lat,N/S,lon,E/W,speed_kn,course,date,magvar,E/W,mode[,navstatus]`
pub(crate) fn rmc(epoch: &mut EpochBuilder, data: &[&str]) -> Result<EpochSnapshot, NmeaError> {
    if data.len() < RMC_MIN_FIELDS {
        return Err(too_few("RMC", RMC_MIN_FIELDS, data.len()));
    }
    epoch.mark_rmc();
    let position = epoch.position_mut();

    if !data[0].is_empty() && !data[8].is_empty() {
        match utc_millis(data[8], data[0]) {
            Some(utc) => position.utc_ms = utc,
            None => debug!(date = data[8], time = data[0], "RMC: invalid date/time"),
        }
    }
    if let Some(status) = data[1].chars().next() {
        position.status = Some(status);
    }
    if !data[2].is_empty() && !data[4].is_empty() {
        position.latitude = to_degrees(data[2], data[3]);
        position.longitude = to_degrees(data[4], data[5]);
    }
    if !data[6].is_empty() {
        position.speed = float(data[6]) * KNOTS_TO_KMH;
    }
    if !data[7].is_empty() {
        position.course = float(data[7]);
    }
    let magnetic = field(data, 9);
    if !magnetic.is_empty() {
        let variation = float(magnetic);
        position.magnetic = if field(data, 10) == "W" {
            -variation
        } else {
            variation
        };
    }
    position.mode = Some(field(data, 11).chars().next().unwrap_or('N'));

    let snapshot = epoch.take_snapshot();
    trace!(
        satellites = snapshot.satellites.len(),
        utc_ms = snapshot.position.utc_ms,
        "epoch closed"
    );
    Ok(snapshot)
}

/// Fix data.
///
/// `time,lat,N/S,lon,E/W,quality,sats,hdop,alt,M,undulation,M,age,station`
pub(crate) fn gga(epoch: &mut EpochBuilder, data: &[&str]) -> Result<(), NmeaError> {
    if data.len() < GGA_MIN_FIELDS {
        return Err(too_few("GGA", GGA_MIN_FIELDS, data.len()));
    }
    let have_rmc = epoch.have_rmc();
    let position = epoch.position_mut();

    if !have_rmc && !data[1].is_empty() && !data[3].is_empty() {
        position.latitude = to_degrees(data[1], data[2]);
        position.longitude = to_degrees(data[3], data[4]);
    }
    if !data[5].is_empty() {
        position.quality = int(data[5]);
    }
    let satellites = field(data, 6);
    if !satellites.is_empty() {
        position.satellites = int(satellites);
    }
    let hdop = field(data, 7);
    if !hdop.is_empty() {
        position.dop = float(hdop);
    }
    let altitude = field(data, 8);
    if !altitude.is_empty() {
        position.altitude = float(altitude);
    }
    let undulation = field(data, 10);
    if !undulation.is_empty() {
        position.undulation = float(undulation);
    }
    let age = field(data, 12);
    if !age.is_empty() {
        position.age = int(age);
    }
    let station = field(data, 13);
    if !station.is_empty() {
        position.station = station.to_string();
    }
    Ok(())
}

/// Satellites in view.
///
/// `total,index,in_view,{prn,elevation,azimuth,snr}*[,signal]`. An even
/// field count means the trailing signal id is present.
pub(crate) fn gsv(epoch: &mut EpochBuilder, data: &[&str], system: u8, default_signal: char) {
    let size = data.len();
    let has_signal = size % 2 == 0;
    let signal = if has_signal {
        data.last()
            .and_then(|s| s.chars().next())
            .unwrap_or(default_signal)
    } else {
        default_signal
    };
    let end = if has_signal {
        size.saturating_sub(2)
    } else {
        size.saturating_sub(1)
    };

    let satellites = epoch.satellites_mut();
    for i in (3..end).step_by(4) {
        let (prn, snr) = (field(data, i), field(data, i + 3));
        if prn.is_empty() || snr.is_empty() {
            continue;
        }
        satellites.push(Satellite {
            prn: int(prn),
            elevation: int(field(data, i + 1)),
            azimuth: int(field(data, i + 2)),
            snr: int(snr),
            system,
            signal,
            used: false,
        });
    }
}

/// PRNs of the active satellites, fields 2 to 13
fn active_prns<'a>(data: &'a [&'a str]) -> impl Iterator<Item = i32> + 'a {
    data.iter()
        .take(14)
        .skip(2)
        .filter(|prn| !prn.is_empty() && **prn != "0")
        .map(|prn| int(prn))
        .filter(|prn| *prn > 0)
}

/// DOP and active satellites.
///
/// `mode,fix,{prn}x12,pdop,hdop,vdop[,system[,signal]]`. A system id is
/// only taken from an even field count above 17, and then also requires the
/// signal to match when marking satellites used.
pub(crate) fn gsa(epoch: &mut EpochBuilder, data: &[&str], default_system: u8) -> Result<(), NmeaError> {
    let size = data.len();
    if size < GSA_MIN_FIELDS {
        return Err(too_few("GSA", GSA_MIN_FIELDS, size));
    }

    let mut system = default_system;
    let mut signal = DEFAULT_SIGNAL;
    let has_system_id = size % 2 == 0;
    if has_system_id && size > 17 {
        match data[17].trim().parse::<u8>() {
            Ok(id) => system = id,
            Err(_) => debug!(system = data[17], "GSA: invalid system id"),
        }
        if let Some(s) = field(data, 18).chars().next() {
            signal = s;
        }
    }

    let fix_type = int(data[1]);
    trace!(fix_type, system, "GSA");

    let satellites = epoch.satellites_mut();
    for prn in active_prns(data) {
        let found = satellites.iter_mut().find(|sat| {
            sat.prn == prn && sat.system == system && (!has_system_id || sat.signal == signal)
        });
        if let Some(sat) = found {
            sat.used = true;
        }
    }

    let position = epoch.position_mut();
    if !data[14].is_empty() {
        position.pdop = float(data[14]);
    }
    if !data[15].is_empty() {
        position.hdop = float(data[15]);
    }
    if !data[16].is_empty() {
        position.vdop = float(data[16]);
    }
    Ok(())
}

/// Mixed constellation GSA. Without a system id field the constellation is
/// guessed from the first active PRN.
pub(crate) fn mixed_gsa(epoch: &mut EpochBuilder, data: &[&str]) -> Result<(), NmeaError> {
    if data.len() > GSA_MIN_FIELDS && data.len() % 2 == 0 {
        // 0 never matches, the system id field takes over
        return gsa(epoch, data, 0);
    }
    let system = active_prns(data)
        .next()
        .map_or(Constellation::Gps, Constellation::from_mixed_prn);
    gsa(epoch, data, system.id())
}

#[cfg(test)]
mod test {
    use super::*;

    fn fields(s: &str) -> Vec<&str> {
        s.split(',').collect()
    }

    #[test]
    fn degrees() {
        assert!((to_degrees("5109.0262308", "N") - 51.150_437_18).abs() < 1e-8);
        assert!((to_degrees("11401.8407342", "W") - -114.030_678_903).abs() < 1e-8);
        assert!((to_degrees("0030.0000", "S") - -0.5).abs() < 1e-12);
        assert_eq!(to_degrees("12.5", "N"), 0.0);
        assert_eq!(to_degrees("", "E"), 0.0);
    }

    #[test]
    fn utc_parsing() {
        assert_eq!(utc_millis("130522", "203522.00"), Some(1_652_474_122_000));
        assert_eq!(utc_millis("130522", "203522.5"), Some(1_652_474_122_500));
        assert_eq!(utc_millis("130522", "203522"), Some(1_652_474_122_000));
        assert_eq!(utc_millis("310222", "203522.00"), None);
        assert_eq!(utc_millis("1305", "203522.00"), None);
        assert_eq!(utc_millis("130522", "20352x.00"), None);
    }

    #[test]
    fn rmc_closes_epoch() {
        let mut epoch = EpochBuilder::new();
        epoch.position_mut().quality = 5;
        let data =
            fields("203522.00,A,5109.0262308,N,11401.8407342,W,0.004,133.4,130522,0.5,W,D");
        let snapshot = rmc(&mut epoch, &data).unwrap();

        let position = &snapshot.position;
        assert_eq!(position.utc_ms, 1_652_474_122_000);
        assert!(position.is_valid());
        assert!((position.latitude - 51.150_437_18).abs() < 1e-8);
        assert!(position.longitude < -114.0);
        assert!((position.speed - 0.004 * 1.852).abs() < 1e-12);
        assert!((position.course - 133.4).abs() < 1e-12);
        assert!((position.magnetic - -0.5).abs() < 1e-12);
        assert_eq!(position.mode, Some('D'));
        assert_eq!(position.quality, 5);

        assert_eq!(epoch.position().quality, 0);
        assert!(epoch.have_rmc());
    }

    #[test]
    fn rmc_defaults_mode() {
        let mut epoch = EpochBuilder::new();
        let snapshot = rmc(&mut epoch, &fields(",V,,,,,,,")).unwrap();
        assert_eq!(snapshot.position.mode, Some('N'));
        assert_eq!(snapshot.position.status, Some('V'));
        assert_eq!(snapshot.position.utc_ms, 0);
    }

    #[test]
    fn rmc_too_few_fields() {
        let mut epoch = EpochBuilder::new();
        assert_eq!(
            rmc(&mut epoch, &fields("203522.00,A,5109.0262308,N")),
            Err(NmeaError::TooFewFields {
                sentence: "RMC",
                min: 9,
                got: 4
            })
        );
        assert!(!epoch.have_rmc());
    }

    #[test]
    fn gga_fields() {
        let mut epoch = EpochBuilder::new();
        let data =
            fields("202530.00,5109.0262,N,11401.8407,W,5,40,0.5,1097.36,M,-17.00,M,18,TSTR");
        gga(&mut epoch, &data).unwrap();

        let position = epoch.position();
        assert!((position.latitude - 51.150_436_67).abs() < 1e-8);
        assert_eq!(position.quality, 5);
        assert_eq!(position.satellites, 40);
        assert!((position.dop - 0.5).abs() < 1e-12);
        assert!((position.altitude - 1097.36).abs() < 1e-9);
        assert!((position.undulation - -17.0).abs() < 1e-12);
        assert_eq!(position.age, 18);
        assert_eq!(position.station, "TSTR");
    }

    #[test]
    fn gga_position_ignored_after_rmc() {
        let mut epoch = EpochBuilder::new();
        epoch.mark_rmc();
        gga(
            &mut epoch,
            &fields("202530.00,5109.0262,N,11401.8407,W,1,08,0.9,10.0,M,0.0,M,,"),
        )
        .unwrap();
        assert_eq!(epoch.position().latitude, 0.0);
        assert_eq!(epoch.position().quality, 1);
    }

    #[test]
    fn gsv_groups() {
        let mut epoch = EpochBuilder::new();
        // odd count: default signal
        gsv(
            &mut epoch,
            &fields("3,1,11,02,28,259,33,04,12,212,27,05,34,305,,09,,,"),
            1,
            '1',
        );
        let sats = epoch.satellites();
        assert_eq!(sats.len(), 2);
        assert_eq!(
            sats[0],
            Satellite {
                prn: 2,
                elevation: 28,
                azimuth: 259,
                snr: 33,
                system: 1,
                signal: '1',
                used: false,
            }
        );
        assert_eq!(sats[1].prn, 4);

        // even count: trailing signal id
        gsv(&mut epoch, &fields("1,1,02,07,50,120,45,30,10,045,38,8"), 3, '7');
        let sats = epoch.satellites();
        assert_eq!(sats.len(), 4);
        assert_eq!(sats[2].signal, '8');
        assert_eq!(sats[3].system, 3);
    }

    #[test]
    fn gsv_short_sentence() {
        let mut epoch = EpochBuilder::new();
        gsv(&mut epoch, &fields("1,1,01,05"), 1, '1');
        gsv(&mut epoch, &fields("1"), 1, '1');
        gsv(&mut epoch, &[], 1, '1');
        assert!(epoch.satellites().is_empty());
    }

    fn sat(prn: i32, system: u8, signal: char) -> Satellite {
        Satellite {
            prn,
            elevation: 0,
            azimuth: 0,
            snr: 30,
            system,
            signal,
            used: false,
        }
    }

    #[test]
    fn gsa_without_system_id() {
        let mut epoch = EpochBuilder::new();
        epoch.satellites_mut().extend([sat(4, 1, '1'), sat(4, 1, '8'), sat(5, 1, '8'), sat(9, 2, '1')]);
        gsa(&mut epoch, &fields("A,3,04,05,09,,,,,,,,,,1.6,0.9,1.3"), 1).unwrap();

        let used: Vec<bool> = epoch.satellites().iter().map(|s| s.used).collect();
        // only the first match of a PRN is marked
        assert_eq!(used, vec![true, false, true, false]);
        let position = epoch.position();
        assert!((position.pdop - 1.6).abs() < 1e-12);
        assert!((position.hdop - 0.9).abs() < 1e-12);
        assert!((position.vdop - 1.3).abs() < 1e-12);
    }

    #[test]
    fn gsa_with_system_id_matches_signal() {
        let mut epoch = EpochBuilder::new();
        epoch.satellites_mut().extend([sat(4, 3, '7'), sat(4, 3, '1'), sat(5, 3, '7')]);
        // 18 fields, system id 3, signal defaults to '1'
        gsa(&mut epoch, &fields("A,3,04,05,,,,,,,,,,,1.6,0.9,1.3,3"), 1).unwrap();
        let used: Vec<bool> = epoch.satellites().iter().map(|s| s.used).collect();
        assert_eq!(used, vec![false, true, false]);
    }

    #[test]
    fn gsa_too_few_fields() {
        let mut epoch = EpochBuilder::new();
        assert!(matches!(
            gsa(&mut epoch, &fields("A,3,04,05"), 1),
            Err(NmeaError::TooFewFields { sentence: "GSA", .. })
        ));
    }

    #[test]
    fn mixed_gsa_guesses_system_from_prn() {
        let mut epoch = EpochBuilder::new();
        epoch.satellites_mut().extend([sat(70, 3, '7'), sat(70, 1, '1')]);
        mixed_gsa(&mut epoch, &fields("A,3,,70,,,,,,,,,,,1.6,0.9,1.3")).unwrap();
        assert!(epoch.satellites()[0].used);
        assert!(!epoch.satellites()[1].used);
    }

    #[test]
    fn mixed_gsa_uses_system_id() {
        let mut epoch = EpochBuilder::new();
        epoch.satellites_mut().extend([sat(12, 4, '1'), sat(12, 1, '1')]);
        mixed_gsa(&mut epoch, &fields("A,3,12,,,,,,,,,,,,1.6,0.9,1.3,4")).unwrap();
        assert!(epoch.satellites()[0].used);
        assert!(!epoch.satellites()[1].used);
    }
}
