//! Per-stream tag decoding state.
//!
//! The registry is shared and immutable; current values belong to one
//! decoder so independent streams never see each other's values.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use super::bounds::check_bounds;
use super::error::{TagError, TagIssue};
use super::extract;
use super::registry::{TagRegistry, TagTemplate};
use super::table::{DecodeKind, dispatch_kind};
use super::value::{TagDescriptor, TagValue};
use crate::config::{DecoderConfig, ImapbMode, ValueMode};
use crate::protocols::st0601::LocalSet;

/// Decoded view of one packet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PacketSnapshot {
    /// 1-based packet counter of the decoder that produced the snapshot.
    pub sequence: u64,
    /// Every known tag seen in the packet, with its current value.
    pub tags: BTreeMap<u8, TagDescriptor>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<TagIssue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncated: Option<u8>,
}

impl PacketSnapshot {
    fn new(sequence: u64) -> Self {
        Self {
            sequence,
            tags: BTreeMap::new(),
            issues: Vec::new(),
            truncated: None,
        }
    }

    pub fn value(&self, tag: u8) -> Option<&TagValue> {
        self.tags.get(&tag)?.value.as_ref()
    }

    pub fn number(&self, tag: u8) -> Option<f64> {
        self.value(tag)?.as_number()
    }
}

#[derive(Debug, Clone)]
pub struct TagDecoder {
    registry: Arc<TagRegistry>,
    value_mode: ValueMode,
    imapb: ImapbMode,
    current: BTreeMap<u8, TagValue>,
    sequence: u64,
}

impl TagDecoder {
    pub fn new(registry: Arc<TagRegistry>, config: &DecoderConfig) -> Self {
        Self {
            registry,
            value_mode: config.value_mode,
            imapb: config.imapb,
            current: BTreeMap::new(),
            sequence: 0,
        }
    }

    /// Number of packets decoded so far.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn current(&self, tag: u8) -> Option<&TagValue> {
        self.current.get(&tag)
    }

    /// Forget all current values.
    pub fn clear(&mut self) {
        self.current.clear();
    }

    /// Run every record of `local_set` through [`TagDecoder::dispatch`] and
    /// collect the result.
    pub fn decode_packet(&mut self, local_set: &LocalSet<'_>) -> PacketSnapshot {
        self.sequence += 1;
        if self.value_mode == ValueMode::ResetPerPacket {
            self.clear();
        }

        let mut snapshot = PacketSnapshot::new(self.sequence);
        for record in &local_set.records {
            if let Err(err) = self.dispatch(record.tag, record.value) {
                log_rejection(&err);
                snapshot.issues.push(TagIssue::from(&err));
            }
            if let Some(descriptor) = self.descriptor(record.tag) {
                snapshot.tags.insert(record.tag, descriptor);
            }
        }
        snapshot.truncated = local_set.truncated;
        debug!(
            sequence = snapshot.sequence,
            tags = snapshot.tags.len(),
            issues = snapshot.issues.len(),
            "packet decoded"
        );
        snapshot
    }

    /// Decode one tag value and store it as the tag's current value.
    ///
    /// On error the current value is left untouched.
    ///
    /// # Errors
    /// `TagError::UnknownTag` without a dispatch entry,
    /// `TagError::MissingDescriptor` without a registry template,
    /// `TagError::DecodeFailure` when the bytes do not fit the decode kind and
    /// `TagError::OutOfBounds` for numeric values outside the declared range.
    pub fn dispatch(&mut self, tag: u8, value: &[u8]) -> Result<(), TagError> {
        let kind = dispatch_kind(tag).ok_or(TagError::UnknownTag { tag })?;
        let template = self
            .registry
            .get(tag)
            .ok_or(TagError::MissingDescriptor { tag })?;

        let decoded = decode_value(kind, self.imapb, template, value).ok_or(
            TagError::DecodeFailure {
                tag,
                length: value.len(),
            },
        )?;
        if let TagValue::Number(number) = decoded {
            let (min, max) = checked_range(kind, self.imapb, template);
            check_bounds(tag, number, min, max)?;
        }

        self.current.insert(tag, decoded);
        Ok(())
    }

    fn descriptor(&self, tag: u8) -> Option<TagDescriptor> {
        dispatch_kind(tag)?;
        let template = self.registry.get(tag)?;
        Some(TagDescriptor::new(template, self.current.get(&tag).cloned()))
    }
}

fn decode_value(
    kind: DecodeKind,
    imapb: ImapbMode,
    template: &TagTemplate,
    bytes: &[u8],
) -> Option<TagValue> {
    let number = match kind {
        DecodeKind::Unsigned { width } => extract::unsigned(bytes, width)?,
        DecodeKind::Signed { width } => extract::signed(bytes, width)?,
        DecodeKind::UnsignedVar => extract::uint_var(bytes)? as f64,
        DecodeKind::Scaled {
            width,
            signed,
            scale,
            offset,
        } => extract::scaled(bytes, width, signed, scale, offset)?,
        DecodeKind::Imapb => {
            let fraction = extract::imapb_fraction(bytes)?;
            match imapb {
                ImapbMode::Fraction => fraction,
                ImapbMode::Physical => template.min + fraction * (template.max - template.min),
            }
        }
        DecodeKind::Text => return extract::text(bytes).map(TagValue::Text),
        DecodeKind::Hex => return extract::hex_upper(bytes).map(TagValue::Hex),
    };
    Some(TagValue::Number(number))
}

// A fraction is checked against the unit interval, not the physical range.
fn checked_range(kind: DecodeKind, imapb: ImapbMode, template: &TagTemplate) -> (f64, f64) {
    match (kind, imapb) {
        (DecodeKind::Imapb, ImapbMode::Fraction) => (0.0, 1.0),
        _ => (template.min, template.max),
    }
}

fn log_rejection(err: &TagError) {
    match err {
        TagError::MissingDescriptor { tag } => debug!(tag, "no descriptor, tag skipped"),
        _ => warn!(tag = err.tag(), error = %err, "tag value rejected"),
    }
}
