//! Conventions shared by the KLV decoders.

pub mod ber;
pub mod error;
