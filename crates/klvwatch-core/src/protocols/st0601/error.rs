use thiserror::Error;

use crate::protocols::common::error::BerError;

/// Errors returned by ST 0601 packet parsing.
///
/// # Examples
/// ```
/// use klvwatch_core::St0601Error;
///
/// let err = St0601Error::IncompletePacket { needed: 17, actual: 3 };
/// assert!(err.to_string().contains("incomplete packet"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum St0601Error {
    #[error("packet does not start with the ST 0601 universal key")]
    MissingKey,
    #[error("incomplete packet: need {needed} bytes, got {actual}")]
    IncompletePacket { needed: usize, actual: usize },
    #[error("invalid length field: {0}")]
    Length(#[from] BerError),
}
