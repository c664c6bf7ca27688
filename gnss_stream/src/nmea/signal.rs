//! NMEA 4.11 signal id tables, keyed by system id and signal id character

/// Frequency band of a signal: `L1`, `L2`, `L5`, `L6` or `S`
pub fn band(system: u8, signal: char) -> Option<&'static str> {
    let signal = signal.to_ascii_uppercase();
    Some(match (system, signal) {
        (1, '0'..='3') => "L1",
        (1, '4'..='6') => "L2",
        (1, '7' | '8') => "L5",
        (2, '0'..='2') => "L1",
        (2, '3' | '4') => "L2",
        (3, '0' | '6' | '7') => "L1",
        (3, '1'..='3') => "L5",
        (3, '4' | '5') => "L6",
        (4, '0'..='4') => "L1",
        (4, '5'..='7' | 'B' | 'C') => "L5",
        (4, '8' | '9' | 'A') => "L6",
        (5, '0'..='4') => "L1",
        (5, '5' | '6') => "L2",
        (5, '7' | '8') => "L5",
        (5, '9' | 'A') => "L6",
        (6, '0' | '1' | '3') => "L5",
        (6, '2' | '4') => "S",
        (6, '5') => "L1",
        _ => return None,
    })
}

/// Full signal name such as `GPSL1CA`, or the bare constellation name for
/// signal id `0`
pub fn name(system: u8, signal: char) -> Option<&'static str> {
    let signal = signal.to_ascii_uppercase();
    Some(match (system, signal) {
        (1, '0') => "GPS",
        (1, '1') => "GPSL1CA",
        (1, '2') => "GPSL1P",
        (1, '3') => "GPSL1M",
        (1, '4') => "GPSL2P",
        (1, '5') => "GPSL2CM",
        (1, '6') => "GPSL2CL",
        (1, '7') => "GPSL5I",
        (1, '8') => "GPSL5Q",
        (2, '0') => "GLO",
        (2, '1') => "GLOG1CA",
        (2, '2') => "GLOG1P",
        (2, '3') => "GLOG2CA",
        (2, '4') => "GLOG2P",
        (3, '0') => "GAL",
        (3, '1') => "GALE5A",
        (3, '2') => "GALE5B",
        (3, '3') => "GALE5AB",
        (3, '4') => "GALE6A",
        (3, '5') => "GALE6BC",
        (3, '6') => "GALL1A",
        (3, '7') => "GALL1BC",
        (4, '0') => "BDS",
        (4, '1') => "BDSB1I",
        (4, '2') => "BDSB1Q",
        (4, '3') => "BDSB1C",
        (4, '4') => "BDSB1A",
        (4, '5') => "BDSB2A",
        (4, '6') => "BDSB2B",
        (4, '7') => "BDSB2AB",
        (4, '8') => "BDSB3I",
        (4, '9') => "BDSB3Q",
        (4, 'A') => "BDSB3A",
        (4, 'B') => "BDSB2I",
        (4, 'C') => "BDSB2Q",
        (5, '0') => "QZS",
        (5, '1') => "QZSL1CA",
        (5, '2') => "QZSL1CD",
        (5, '3') => "QZSL1CP",
        (5, '4') => "QZSL1S",
        (5, '5') => "QZSL2CM",
        (5, '6') => "QZSL2CL",
        (5, '7') => "QZSL5I",
        (5, '8') => "QZSL5Q",
        (5, '9') => "QZSL6D",
        (5, 'A') => "QZSL6E",
        (6, '0') => "NIC",
        (6, '1') => "NICL5",
        (6, '2') => "NICSSPS",
        (6, '3') => "NICL5RS",
        (6, '4') => "NICSRS",
        (6, '5') => "NICL1",
        _ => return None,
    })
}
