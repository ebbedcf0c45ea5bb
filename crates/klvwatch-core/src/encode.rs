//! ST 0601 packet builder, used for fixtures and tooling.

use crate::protocols::common::ber::encode_length;
use crate::protocols::st0601::layout::UNIVERSAL_KEY;

/// Accumulates `(tag, value)` records in insertion order.
///
/// # Examples
/// ```
/// use klvwatch_core::{LocalSetEncoder, parse_packet};
///
/// let mut encoder = LocalSetEncoder::new();
/// encoder.add_u16(1, 100).add_text(3, "MISSION01");
/// let packet = encoder.encode();
///
/// let local_set = parse_packet(&packet).unwrap();
/// assert_eq!(local_set.records.len(), 2);
/// assert_eq!(local_set.records[1].value, b"MISSION01");
/// ```
#[derive(Debug, Clone, Default)]
pub struct LocalSetEncoder {
    records: Vec<(u8, Vec<u8>)>,
}

impl LocalSetEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record with raw value bytes. The same tag may appear twice.
    pub fn add_raw(&mut self, tag: u8, value: &[u8]) -> &mut Self {
        self.records.push((tag, value.to_vec()));
        self
    }

    pub fn add_u8(&mut self, tag: u8, value: u8) -> &mut Self {
        self.add_raw(tag, &[value])
    }

    pub fn add_u16(&mut self, tag: u8, value: u16) -> &mut Self {
        self.add_raw(tag, &value.to_be_bytes())
    }

    pub fn add_i16(&mut self, tag: u8, value: i16) -> &mut Self {
        self.add_raw(tag, &value.to_be_bytes())
    }

    pub fn add_u32(&mut self, tag: u8, value: u32) -> &mut Self {
        self.add_raw(tag, &value.to_be_bytes())
    }

    pub fn add_i32(&mut self, tag: u8, value: i32) -> &mut Self {
        self.add_raw(tag, &value.to_be_bytes())
    }

    pub fn add_u64(&mut self, tag: u8, value: u64) -> &mut Self {
        self.add_raw(tag, &value.to_be_bytes())
    }

    pub fn add_text(&mut self, tag: u8, value: &str) -> &mut Self {
        self.add_raw(tag, value.as_bytes())
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Local set payload: every record as tag, BER length, value.
    pub fn payload(&self) -> Vec<u8> {
        let mut payload = Vec::new();
        for (tag, value) in &self.records {
            payload.push(*tag);
            payload.extend_from_slice(&encode_length(value.len() as u64));
            payload.extend_from_slice(value);
        }
        payload
    }

    /// Complete packet: key, BER payload length, payload.
    pub fn encode(&self) -> Vec<u8> {
        wrap_payload(&self.payload())
    }
}

/// Prefix `payload` with the universal key and its BER length.
pub fn wrap_payload(payload: &[u8]) -> Vec<u8> {
    let length = encode_length(payload.len() as u64);
    let mut packet = Vec::with_capacity(UNIVERSAL_KEY.len() + length.len() + payload.len());
    packet.extend_from_slice(UNIVERSAL_KEY);
    packet.extend_from_slice(&length);
    packet.extend_from_slice(payload);
    packet
}

#[cfg(test)]
mod tests {
    use super::{LocalSetEncoder, wrap_payload};
    use crate::protocols::st0601::layout::{LENGTH_OFFSET, UNIVERSAL_KEY};

    #[test]
    fn checksum_and_timestamp_layout() {
        let mut encoder = LocalSetEncoder::new();
        encoder.add_u16(1, 100).add_u64(2, 0x0004_6050_584E_0180);

        let packet = encoder.encode();
        assert_eq!(&packet[..LENGTH_OFFSET], UNIVERSAL_KEY);
        assert_eq!(packet[LENGTH_OFFSET], 14);
        assert_eq!(
            &packet[LENGTH_OFFSET + 1..],
            &[
                0x01, 0x02, 0x00, 0x64, 0x02, 0x08, 0x00, 0x04, 0x60, 0x50, 0x58, 0x4E, 0x01,
                0x80
            ]
        );
    }

    #[test]
    fn long_values_use_long_form_lengths() {
        let mut encoder = LocalSetEncoder::new();
        encoder.add_raw(74, &[0xAB; 200]);

        let payload = encoder.payload();
        assert_eq!(&payload[..3], &[74, 0x81, 200]);

        let packet = wrap_payload(&payload);
        assert_eq!(&packet[LENGTH_OFFSET..LENGTH_OFFSET + 2], &[0x81, 203]);
        assert_eq!(packet.len(), LENGTH_OFFSET + 2 + 203);
    }

    #[test]
    fn empty_encoder_is_bare_frame() {
        let encoder = LocalSetEncoder::new();
        assert!(encoder.is_empty());
        assert_eq!(encoder.encode().len(), LENGTH_OFFSET + 1);
    }
}
