use super::error::BerError;

/// Bit flagging the long form of a BER length field.
pub const LONG_FORM_FLAG: u8 = 0x80;
/// Widest long-form length that still fits a `u64`.
pub const MAX_LONG_FORM_BYTES: usize = 8;

/// Decoded BER-style length field.
///
/// `field_size` counts the whole field, including the leading byte.
///
/// # Examples
/// ```
/// use klvwatch_core::{BerLength, decode_length};
///
/// let short = decode_length(&[0x05], 0).unwrap();
/// assert_eq!(short, BerLength { value: 5, field_size: 1 });
///
/// let long = decode_length(&[0x82, 0x01, 0x2C], 0).unwrap();
/// assert_eq!(long, BerLength { value: 300, field_size: 3 });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BerLength {
    pub value: u64,
    pub field_size: usize,
}

/// Decode the length field starting at `offset`.
///
/// Short form: high bit clear, the byte is the length. Long form: the low
/// seven bits count the big-endian length bytes that follow. A long form with
/// a zero count decodes as length 0 over a single byte.
///
/// # Errors
/// `BerError::Insufficient` when the field runs past the end of `bytes`, and
/// `BerError::Overflow` when the long form declares more than eight bytes.
pub fn decode_length(bytes: &[u8], offset: usize) -> Result<BerLength, BerError> {
    let first = *bytes.get(offset).ok_or(BerError::Insufficient {
        needed: offset.saturating_add(1),
        actual: bytes.len(),
    })?;
    if first & LONG_FORM_FLAG == 0 {
        return Ok(BerLength {
            value: u64::from(first),
            field_size: 1,
        });
    }

    let count = usize::from(first & !LONG_FORM_FLAG);
    if count > MAX_LONG_FORM_BYTES {
        return Err(BerError::Overflow { count });
    }

    let start = offset + 1;
    let end = start + count;
    let digits = bytes.get(start..end).ok_or(BerError::Insufficient {
        needed: end,
        actual: bytes.len(),
    })?;
    let value = digits
        .iter()
        .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte));

    Ok(BerLength {
        value,
        field_size: 1 + count,
    })
}

/// Encode `value` using the shortest BER form.
///
/// # Examples
/// ```
/// use klvwatch_core::encode_length;
///
/// assert_eq!(encode_length(5), vec![0x05]);
/// assert_eq!(encode_length(300), vec![0x82, 0x01, 0x2C]);
/// ```
pub fn encode_length(value: u64) -> Vec<u8> {
    if value < u64::from(LONG_FORM_FLAG) {
        return vec![value as u8];
    }
    let bytes = value.to_be_bytes();
    let skip = bytes.iter().take_while(|byte| **byte == 0).count();
    let significant = &bytes[skip..];

    let mut out = Vec::with_capacity(1 + significant.len());
    out.push(LONG_FORM_FLAG | significant.len() as u8);
    out.extend_from_slice(significant);
    out
}
