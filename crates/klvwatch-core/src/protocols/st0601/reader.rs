use super::error::St0601Error;
use super::layout;
use super::parser::TagRecord;
use crate::protocols::common::ber::{BerLength, decode_length};
use crate::protocols::common::error::BerError;

pub struct St0601Reader<'a> {
    bytes: &'a [u8],
}

impl<'a> St0601Reader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub fn require_len(&self, needed: usize) -> Result<(), St0601Error> {
        if self.bytes.len() < needed {
            return Err(St0601Error::IncompletePacket {
                needed,
                actual: self.bytes.len(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, St0601Error> {
        self.bytes
            .get(offset)
            .copied()
            .ok_or(St0601Error::IncompletePacket {
                needed: offset.saturating_add(1),
                actual: self.bytes.len(),
            })
    }

    pub fn read_slice(&self, range: std::ops::Range<usize>) -> Result<&'a [u8], St0601Error> {
        self.bytes
            .get(range.clone())
            .ok_or(St0601Error::IncompletePacket {
                needed: range.end,
                actual: self.bytes.len(),
            })
    }

    pub fn read_key(&self) -> Result<&'a [u8], St0601Error> {
        self.read_slice(layout::KEY_RANGE)
    }

    /// Missing length bytes read as an incomplete packet; an unrepresentable
    /// long form is a length error.
    pub fn read_length(&self, offset: usize) -> Result<BerLength, St0601Error> {
        decode_length(self.bytes, offset).map_err(|err| match err {
            BerError::Insufficient { needed, actual } => {
                St0601Error::IncompletePacket { needed, actual }
            }
            other => St0601Error::Length(other),
        })
    }

    /// Read `[value_start, value_start + length)` where `length` is a decoded
    /// BER value that may not fit in memory.
    pub fn read_value(
        &self,
        value_start: usize,
        length: BerLength,
    ) -> Result<&'a [u8], St0601Error> {
        let too_short = St0601Error::IncompletePacket {
            needed: usize::MAX,
            actual: self.bytes.len(),
        };
        let len = usize::try_from(length.value).map_err(|_| too_short.clone())?;
        let end = value_start.checked_add(len).ok_or(too_short)?;
        self.read_slice(value_start..end)
    }

    /// Read one `(tag, length, value)` record at `offset` and return it with
    /// the offset just past its value.
    pub fn read_record(&self, offset: usize) -> Result<(TagRecord<'a>, usize), St0601Error> {
        let tag = self.read_u8(offset)?;
        let length_offset = offset + layout::TAG_ID_LEN;
        let length = self.read_length(length_offset)?;
        let value_start = length_offset + length.field_size;
        let value = self.read_value(value_start, length)?;
        let next = value_start + value.len();
        Ok((TagRecord { tag, length, value }, next))
    }
}
