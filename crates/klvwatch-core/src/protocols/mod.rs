//! Wire-level decoding.
//!
//! Each protocol follows a layered structure:
//! - `layout`: byte offsets and ranges
//! - `reader`: bounded byte access and protocol conventions
//! - `parser`: record-level decoding (no direct byte indexing)
//! - `error`: explicit, actionable errors
//!
//! Parsers are pure and contain no I/O.

pub mod common;
pub mod st0601;
