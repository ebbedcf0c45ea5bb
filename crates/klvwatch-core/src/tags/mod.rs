//! Tag-level decoding: dispatch table, extractors, bounds and per-stream
//! current values.
//!
//! `table` says how the bytes of each tag are read, `registry` holds the
//! descriptor a tag is reported with, and `decoder` applies both to the
//! records of a parsed local set.

pub mod bounds;
pub mod decoder;
pub mod error;
pub mod extract;
pub mod registry;
pub mod table;
pub mod value;

pub use decoder::{PacketSnapshot, TagDecoder};
pub use error::{TagError, TagIssue};
pub use registry::{RegistryError, TagRegistry, TagTemplate};
pub use table::{DecodeKind, ST0601_TAGS, TagSpec, Width, dispatch_kind};
pub use value::{TagDescriptor, TagValue};
