use tracing::{debug, trace};

use super::error::St0601Error;
use super::layout;
use super::reader::St0601Reader;
use crate::protocols::common::ber::BerLength;

/// One `(tag, length, value)` record of a local set payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagRecord<'a> {
    pub tag: u8,
    pub length: BerLength,
    pub value: &'a [u8],
}

/// Records carved out of one packet payload, in wire order.
///
/// `truncated` holds the tag id of a trailing record whose length field or
/// value ran past the end of the payload. That record is not in `records`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalSet<'a> {
    pub records: Vec<TagRecord<'a>>,
    pub truncated: Option<u8>,
}

/// Parse a complete ST 0601 packet (key, length, payload) into its records.
///
/// Bytes after the declared payload are ignored.
///
/// # Examples
/// ```
/// use klvwatch_core::{UNIVERSAL_KEY, parse_packet};
///
/// let mut packet = UNIVERSAL_KEY.to_vec();
/// packet.extend_from_slice(&[0x04, 0x41, 0x02, 0x00, 0x13]);
/// let local_set = parse_packet(&packet).unwrap();
/// assert_eq!(local_set.records.len(), 1);
/// assert_eq!(local_set.records[0].tag, 0x41);
/// ```
///
/// # Errors
/// `St0601Error::MissingKey` when the packet does not start with the
/// universal key, `St0601Error::IncompletePacket` when it is shorter than the
/// minimum frame or than its declared length, and `St0601Error::Length` when
/// the packet length field cannot be represented.
pub fn parse_packet(packet: &[u8]) -> Result<LocalSet<'_>, St0601Error> {
    let reader = St0601Reader::new(packet);
    reader.require_len(layout::MIN_FRAME_LEN)?;

    let key = reader.read_key()?;
    if key != layout::UNIVERSAL_KEY {
        return Err(St0601Error::MissingKey);
    }

    let length = reader.read_length(layout::LENGTH_OFFSET)?;
    let payload_start = layout::LENGTH_OFFSET + length.field_size;
    let payload = reader.read_value(payload_start, length)?;
    Ok(parse_local_set(payload))
}

/// Walk a local set payload from offset 0 until the cursor reaches its end.
///
/// A record that cannot be read completely stops the walk; the records read
/// before it are kept.
pub fn parse_local_set(payload: &[u8]) -> LocalSet<'_> {
    let reader = St0601Reader::new(payload);
    let mut local_set = LocalSet::default();
    let mut cursor = 0;

    while cursor < payload.len() {
        match reader.read_record(cursor) {
            Ok((record, next)) => {
                trace!(
                    tag = record.tag,
                    len = record.value.len(),
                    "local set record"
                );
                local_set.records.push(record);
                cursor = next;
            }
            Err(err) => {
                if let Ok(tag) = reader.read_u8(cursor) {
                    debug!(tag, offset = cursor, error = %err, "truncated trailing record");
                    local_set.truncated = Some(tag);
                }
                break;
            }
        }
    }

    local_set
}
