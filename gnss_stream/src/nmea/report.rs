use chrono::{DateTime, Utc};

use crate::checksum::nmea_checksum;

/// Wrap a sentence body (talker, type and fields, without `$` and `*`) with
/// its delimiter, upper-case checksum and CRLF
pub fn encode_sentence(body: &str) -> String {
    format!("${}*{:02X}\r\n", body, nmea_checksum(body.as_bytes()))
}

/// Decimal degrees to NMEA `(d)ddmm.mmmmm`, sign dropped
fn to_nmea(degrees: f64) -> f64 {
    let abs = degrees.abs();
    let whole = abs.floor();
    whole * 100.0 + (abs - whole) * 60.0
}

/// A `$GPGGA` position report, as uploaded to an NTRIP caster for
/// virtual reference station selection.
///
/// Fix quality, satellite count, HDOP and geoid separation are fixed
/// placeholders (`1`, `10`, `1.0`, `0.0`).
pub fn gga_report(latitude: f64, longitude: f64, altitude: f64, utc: DateTime<Utc>) -> String {
    let body = format!(
        "GPGGA,{}.00,{:010.5},{},{:011.5},{},1,10,1.0,{:.2},M,0.0,M,,",
        utc.format("%H%M%S"),
        to_nmea(latitude),
        if latitude >= 0.0 { 'N' } else { 'S' },
        to_nmea(longitude),
        if longitude >= 0.0 { 'E' } else { 'W' },
        altitude,
    );
    encode_sentence(&body)
}
