//! Byte and frame sources. All file and stream I/O of the crate lives here.

mod chunk;
mod pcap;

pub use chunk::{ChunkSource, DEFAULT_CHUNK_SIZE};
pub use pcap::PcapFileSource;

use pcap_parser::Linktype;
use thiserror::Error;

/// One link-layer frame read from a capture.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    /// Seconds since the Unix epoch, when the capture records it.
    pub timestamp: Option<f64>,
    pub linktype: Linktype,
    pub data: Vec<u8>,
}

pub trait CaptureSource {
    fn next_frame(&mut self) -> Result<Option<CapturedFrame>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("capture parse error: {0}")]
    Capture(String),
}

impl From<pcap::error::PcapSourceError> for SourceError {
    fn from(value: pcap::error::PcapSourceError) -> Self {
        match value {
            pcap::error::PcapSourceError::Io(err) => SourceError::Io(err),
            pcap::error::PcapSourceError::Pcap { context, message } => {
                SourceError::Capture(format!("{context}: {message}"))
            }
        }
    }
}
