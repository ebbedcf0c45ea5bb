//! Range check applied to numeric tag values before they are stored.

use super::error::TagError;

/// Slack allowed on both ends of a declared range.
pub const TOLERANCE: f64 = 1e-5;

/// `true` when `value` lies in `[min - TOLERANCE, max + TOLERANCE]`.
///
/// NaN is never in range.
pub fn within_bounds(value: f64, min: f64, max: f64) -> bool {
    value >= min - TOLERANCE && value <= max + TOLERANCE
}

/// Reject `value` for `tag` when it falls outside the range. Values are never
/// clamped.
///
/// # Examples
/// ```
/// use klvwatch_core::tags::bounds::check_bounds;
///
/// assert!(check_bounds(5, 360.000_001, 0.0, 360.0).is_ok());
/// assert!(check_bounds(5, 361.0, 0.0, 360.0).is_err());
/// ```
///
/// # Errors
/// `TagError::OutOfBounds` carrying the rejected value and the range.
pub fn check_bounds(tag: u8, value: f64, min: f64, max: f64) -> Result<(), TagError> {
    if within_bounds(value, min, max) {
        Ok(())
    } else {
        Err(TagError::OutOfBounds {
            tag,
            value,
            min,
            max,
        })
    }
}
