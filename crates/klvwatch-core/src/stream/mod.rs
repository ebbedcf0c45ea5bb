//! Stream reassembly and decoding.
//!
//! `framer` cuts packets out of arbitrarily chunked input; `parser` feeds
//! them through the ST 0601 extractor and the tag decoder.

pub mod error;
pub mod framer;
pub mod parser;

pub use error::FrameError;
pub use framer::StreamFramer;
pub use parser::{KlvParser, StreamDecoder, StreamStats};
