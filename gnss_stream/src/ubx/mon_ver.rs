use crate::error::FrameError;

const SOFTWARE_VERSION_LEN: usize = 30;
const HARDWARE_VERSION_LEN: usize = 10;

pub const MON_VER_MIN_LEN: usize = SOFTWARE_VERSION_LEN + HARDWARE_VERSION_LEN;

/// Receiver/Software Version
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MonVer {
    pub software_version: String,
    pub hardware_version: String,
}

/// Text up to the first NUL, or the whole field if there is none
fn cstr_lossy(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|x| *x == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

impl MonVer {
    pub fn parse(payload: &[u8]) -> Result<Self, FrameError> {
        if payload.len() < MON_VER_MIN_LEN {
            return Err(FrameError::InvalidPacketLen {
                packet: "MON-VER",
                expect: MON_VER_MIN_LEN,
                got: payload.len(),
            });
        }
        let (software, rest) = payload.split_at(SOFTWARE_VERSION_LEN);
        Ok(Self {
            software_version: cstr_lossy(software),
            hardware_version: cstr_lossy(&rest[..HARDWARE_VERSION_LEN]),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_versions() {
        let mut payload = [0u8; 70];
        payload[..9].copy_from_slice(b"ROM CORE ");
        payload[9..14].copy_from_slice(b"3.01 ");
        payload[30..38].copy_from_slice(b"00080000");
        // extension strings are ignored
        payload[40..50].copy_from_slice(b"PROTVER=18");

        let ver = MonVer::parse(&payload).unwrap();
        assert_eq!(ver.software_version, "ROM CORE 3.01 ");
        assert_eq!(ver.hardware_version, "00080000");
    }

    #[test]
    fn unterminated_field_uses_full_width() {
        let payload = [b'x'; 40];
        let ver = MonVer::parse(&payload).unwrap();
        assert_eq!(ver.software_version.len(), 30);
        assert_eq!(ver.hardware_version, "xxxxxxxxxx");
    }

    #[test]
    fn short_payload_rejected() {
        assert!(matches!(
            MonVer::parse(&[0u8; 39]),
            Err(FrameError::InvalidPacketLen { got: 39, .. })
        ));
    }
}
