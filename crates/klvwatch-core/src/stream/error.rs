use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// Not enough bytes buffered yet; never returned to callers of `feed`.
    #[error("insufficient data: need {needed} bytes, have {actual}")]
    InsufficientData { needed: usize, actual: usize },
    #[error("malformed packet: {reason} ({discarded} bytes discarded)")]
    MalformedPacket { reason: String, discarded: usize },
}
