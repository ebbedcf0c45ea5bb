use thiserror::Error;

/// Errors returned by the BER length codec.
///
/// # Examples
/// ```
/// use klvwatch_core::BerError;
///
/// let err = BerError::Overflow { count: 9 };
/// assert!(err.to_string().contains("9 length bytes"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BerError {
    #[error("insufficient data for length field: need {needed} bytes, got {actual}")]
    Insufficient { needed: usize, actual: usize },
    #[error("long-form length uses {count} length bytes, at most 8 are supported")]
    Overflow { count: usize },
}
