use std::io::{Read, Seek, SeekFrom};

use pcap_parser::Linktype;

use super::error::PcapSourceError;
use super::layout;

/// Container format of a capture file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureFormat {
    Legacy,
    Ng,
}

impl CaptureFormat {
    pub fn from_magic(magic: &[u8; layout::MAGIC_LEN]) -> Self {
        if *magic == layout::PCAPNG_MAGIC {
            CaptureFormat::Ng
        } else {
            CaptureFormat::Legacy
        }
    }
}

/// Peek at the magic bytes, leaving the reader at offset 0.
///
/// # Errors
/// `PcapSourceError::Io` when fewer than four bytes can be read or the
/// reader cannot seek back.
pub fn sniff_format<R: Read + Seek>(reader: &mut R) -> Result<CaptureFormat, PcapSourceError> {
    let mut magic = [0u8; layout::MAGIC_LEN];
    reader.read_exact(&mut magic)?;
    reader.seek(SeekFrom::Start(0))?;
    Ok(CaptureFormat::from_magic(&magic))
}

/// Link type declared for interface `if_id`; Ethernet when undeclared.
pub fn linktype_for_interface(linktypes: &[Linktype], if_id: u32) -> Linktype {
    usize::try_from(if_id)
        .ok()
        .and_then(|index| linktypes.get(index))
        .copied()
        .unwrap_or(Linktype::ETHERNET)
}

pub fn legacy_ts_to_seconds(ts_sec: u32, ts_usec: u32) -> f64 {
    f64::from(ts_sec) + f64::from(ts_usec) / layout::MICROS_PER_SECOND
}

/// PCAPNG timestamps are 64-bit microsecond counts split in two halves.
pub fn pcapng_ts_to_seconds(ts_high: u32, ts_low: u32) -> f64 {
    let micros = (u64::from(ts_high) << 32) | u64::from(ts_low);
    micros as f64 / layout::MICROS_PER_SECOND
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};

    use pcap_parser::Linktype;

    use super::{
        CaptureFormat, legacy_ts_to_seconds, linktype_for_interface, pcapng_ts_to_seconds,
        sniff_format,
    };
    use crate::source::pcap::error::PcapSourceError;

    #[test]
    fn sniff_rewinds() {
        let mut cursor = Cursor::new([0x0A, 0x0D, 0x0D, 0x0A, 0x1C]);
        assert_eq!(sniff_format(&mut cursor).unwrap(), CaptureFormat::Ng);

        let mut first = [0u8; 1];
        cursor.read_exact(&mut first).unwrap();
        assert_eq!(first[0], 0x0A);
    }

    #[test]
    fn other_magic_is_legacy() {
        let mut cursor = Cursor::new([0xD4, 0xC3, 0xB2, 0xA1]);
        assert_eq!(sniff_format(&mut cursor).unwrap(), CaptureFormat::Legacy);
    }

    #[test]
    fn sniff_short_input() {
        let mut cursor = Cursor::new([0x0A, 0x0D]);
        assert!(matches!(
            sniff_format(&mut cursor),
            Err(PcapSourceError::Io(_))
        ));
    }

    #[test]
    fn undeclared_interface_is_ethernet() {
        let linktypes = [Linktype::RAW];
        assert_eq!(linktype_for_interface(&linktypes, 0), Linktype::RAW);
        assert_eq!(linktype_for_interface(&linktypes, 3), Linktype::ETHERNET);
    }

    #[test]
    fn timestamps_in_seconds() {
        assert!((legacy_ts_to_seconds(10, 250_000) - 10.25).abs() < 1e-9);
        assert!((pcapng_ts_to_seconds(0, 1_500_000) - 1.5).abs() < 1e-9);
        assert!(pcapng_ts_to_seconds(1, 0) > 4_294.0);
    }
}
