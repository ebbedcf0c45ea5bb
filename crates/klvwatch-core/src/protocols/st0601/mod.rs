//! MISB ST 0601 (UAS Datalink Local Set) packet decoding.
//!
//! A packet is the 16-byte universal key, a BER length and a payload made of
//! `(tag, BER length, value)` records. The parser checks the key and the
//! declared length, then walks the payload left to right; a record running
//! past the payload end stops the walk without failing the packet.
//!
//! Byte offsets live in `layout`, bounded reads in `reader`. Values are not
//! interpreted here; see `crate::tags` for per-tag decoding.
//!
//! Version française (résumé):
//! Le module découpe un paquet ST 0601 (clé, longueur BER, charge utile) en
//! enregistrements TLV. Un enregistrement final tronqué arrête le parcours
//! sans invalider le paquet.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use parser::{LocalSet, TagRecord, parse_local_set, parse_packet};
