//! PCAP/PCAPNG capture files as a `CaptureSource`.
//!
//! The file format is sniffed from its magic; frames come out with their
//! link type and timestamp, undecoded.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use parser::PcapFileSource;
