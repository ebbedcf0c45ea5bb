//! klvwatch core library: MISB ST 0601 KLV stream decoding.
//!
//! Bytes arrive in arbitrary chunks. The stream framer finds packet
//! boundaries (sync key, BER length), the ST 0601 parser carves each packet
//! into `(tag, length, value)` records, and the tag decoder turns every
//! record into a typed, unit-tagged value using a declarative dispatch table
//! and a bounds check. One `PacketSnapshot` is produced per packet.
//!
//! Parsing is byte-oriented and side-effect free; I/O is isolated in `source`
//! and driven from `analysis` (raw streams and UDP captures).
//!
//! Invariants:
//! - Output does not depend on how the input was split into chunks.
//! - A value outside its declared range is rejected, never clamped.
//! - Tag-level problems never abort a packet; frame corruption discards one
//!   packet and the stream resynchronizes on the next key.
//!
//! Version française (résumé):
//! Cette crate décode un flux KLV MISB ST 0601 : découpage des paquets
//! (clé de synchronisation, longueur BER), extraction des enregistrements
//! TLV, puis décodage typé de chaque tag avec contrôle de bornes. Les E/S
//! restent dans `source`; le résultat ne dépend pas du découpage du flux.
//!
//! # Examples
//! ```
//! use klvwatch_core::{KlvParser, LocalSetEncoder};
//!
//! let mut encoder = LocalSetEncoder::new();
//! encoder.add_u16(1, 100).add_u64(2, 1_231_798_102_000_000);
//! let packet = encoder.encode();
//!
//! let mut snapshots = Vec::new();
//! let mut parser = KlvParser::with_defaults(|snapshot| snapshots.push(snapshot));
//! let (head, tail) = packet.split_at(7);
//! parser.feed(head)?;
//! parser.feed(tail)?;
//! drop(parser);
//!
//! assert_eq!(snapshots.len(), 1);
//! assert_eq!(snapshots[0].number(1), Some(100.0));
//! # Ok::<(), klvwatch_core::FrameError>(())
//! ```

mod analysis;
mod config;
mod encode;
mod protocols;
mod source;
pub mod stream;
pub mod tags;

pub use analysis::{
    AnalysisError, CaptureFilter, CapturePacket, CaptureSummary, FlowKey, FlowSummary,
    StreamSummary, decode_capture, decode_pcap_file, decode_reader, ts_to_rfc3339,
};
pub use config::{ConfigError, DEFAULT_MAX_PACKET_LEN, DecoderConfig, ImapbMode, ValueMode};
pub use encode::{LocalSetEncoder, wrap_payload};
pub use protocols::common::ber::{BerLength, decode_length, encode_length};
pub use protocols::common::error::BerError;
pub use protocols::st0601::error::St0601Error;
pub use protocols::st0601::layout::UNIVERSAL_KEY;
pub use protocols::st0601::{LocalSet, TagRecord, parse_local_set, parse_packet};
pub use source::{
    CaptureSource, CapturedFrame, ChunkSource, DEFAULT_CHUNK_SIZE, PcapFileSource, SourceError,
};
pub use stream::{FrameError, KlvParser, StreamDecoder, StreamFramer, StreamStats};
pub use tags::{
    PacketSnapshot, RegistryError, TagDecoder, TagDescriptor, TagIssue, TagRegistry, TagTemplate,
    TagValue,
};
