//! Byte-to-value extractors.
//!
//! Every extractor returns `None` when the input is too short. Fixed-width
//! extractors read the leading bytes and ignore anything after them.

use super::table::Width;

fn leading<const N: usize>(bytes: &[u8]) -> Option<[u8; N]> {
    bytes.get(..N)?.try_into().ok()
}

pub fn u8_be(bytes: &[u8]) -> Option<u8> {
    bytes.first().copied()
}

pub fn i8_be(bytes: &[u8]) -> Option<i8> {
    leading::<1>(bytes).map(i8::from_be_bytes)
}

pub fn u16_be(bytes: &[u8]) -> Option<u16> {
    leading::<2>(bytes).map(u16::from_be_bytes)
}

pub fn i16_be(bytes: &[u8]) -> Option<i16> {
    leading::<2>(bytes).map(i16::from_be_bytes)
}

pub fn u32_be(bytes: &[u8]) -> Option<u32> {
    leading::<4>(bytes).map(u32::from_be_bytes)
}

pub fn i32_be(bytes: &[u8]) -> Option<i32> {
    leading::<4>(bytes).map(i32::from_be_bytes)
}

pub fn u64_be(bytes: &[u8]) -> Option<u64> {
    leading::<8>(bytes).map(u64::from_be_bytes)
}

pub fn i64_be(bytes: &[u8]) -> Option<i64> {
    leading::<8>(bytes).map(i64::from_be_bytes)
}

/// Unsigned integer spanning all of `bytes` (1 to 8 bytes).
pub fn uint_var(bytes: &[u8]) -> Option<u64> {
    if bytes.is_empty() || bytes.len() > 8 {
        return None;
    }
    Some(
        bytes
            .iter()
            .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte)),
    )
}

/// Unsigned integer of the given width, as `f64`.
pub fn unsigned(bytes: &[u8], width: Width) -> Option<f64> {
    match width {
        Width::W8 => u8_be(bytes).map(f64::from),
        Width::W16 => u16_be(bytes).map(f64::from),
        Width::W32 => u32_be(bytes).map(f64::from),
        Width::W64 => u64_be(bytes).map(|raw| raw as f64),
    }
}

/// Two's-complement integer of the given width, as `f64`.
pub fn signed(bytes: &[u8], width: Width) -> Option<f64> {
    match width {
        Width::W8 => i8_be(bytes).map(f64::from),
        Width::W16 => i16_be(bytes).map(f64::from),
        Width::W32 => i32_be(bytes).map(f64::from),
        Width::W64 => i64_be(bytes).map(|raw| raw as f64),
    }
}

/// `raw * scale + offset` with `raw` read as an integer of `width`.
///
/// # Examples
/// ```
/// use klvwatch_core::tags::{Width, extract};
///
/// let heading = extract::scaled(&[0x80, 0x00], Width::W16, false, 360.0 / 65535.0, 0.0).unwrap();
/// assert!((heading - 180.0027).abs() < 1e-4);
/// ```
pub fn scaled(
    bytes: &[u8],
    width: Width,
    signed_raw: bool,
    scale: f64,
    offset: f64,
) -> Option<f64> {
    let raw = if signed_raw {
        signed(bytes, width)?
    } else {
        unsigned(bytes, width)?
    };
    Some(raw * scale + offset)
}

/// Uppercase hexadecimal rendering of an opaque value.
pub fn hex_upper(bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() {
        return None;
    }
    Some(hex::encode_upper(bytes))
}

/// Normalized fraction: a length byte `n`, then `n` big-endian bytes `v`;
/// yields `v / (2^(8n) - 1)`.
///
/// This is a unit-interval value only; no per-tag range is applied.
///
/// # Examples
/// ```
/// use klvwatch_core::tags::extract;
///
/// assert_eq!(extract::imapb_fraction(&[0x01, 0xFF]), Some(1.0));
/// assert_eq!(extract::imapb_fraction(&[0x02, 0x00, 0x00]), Some(0.0));
/// assert_eq!(extract::imapb_fraction(&[0x03, 0x00]), None);
/// ```
pub fn imapb_fraction(bytes: &[u8]) -> Option<f64> {
    let (&n, rest) = bytes.split_first()?;
    let n = usize::from(n);
    if n == 0 || n > rest.len() {
        return None;
    }
    let raw = uint_var(&rest[..n])?;
    let full_scale = if n == 8 {
        u64::MAX as f64
    } else {
        ((1u64 << (8 * n)) - 1) as f64
    };
    Some(raw as f64 / full_scale)
}

/// UTF-8 text with trailing NUL padding removed; invalid sequences are
/// replaced rather than rejected.
pub fn text(bytes: &[u8]) -> Option<String> {
    let raw = String::from_utf8_lossy(bytes);
    Some(raw.trim_end_matches('\0').to_string())
}
