//! Packet boundaries in a chunked byte stream.

use tracing::{debug, trace, warn};

use super::error::FrameError;
use crate::config::DEFAULT_MAX_PACKET_LEN;
use crate::protocols::common::ber::decode_length;
use crate::protocols::common::error::BerError;
use crate::protocols::st0601::layout::{KEY_LEN, LENGTH_OFFSET, MIN_FRAME_LEN, UNIVERSAL_KEY};

/// Bytes kept when no key is buffered: any longer suffix would already
/// contain a full key.
const KEY_PREFIX_TAIL: usize = KEY_LEN - 1;

/// Reassembles complete packets from arbitrarily split input.
///
/// The buffer holds at most one partial packet plus whatever could still
/// start the next key. Output depends only on the bytes pushed, never on how
/// they were split.
#[derive(Debug, Clone)]
pub struct StreamFramer {
    buffer: Vec<u8>,
    max_packet_len: u64,
    skipped: u64,
}

impl Default for StreamFramer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PACKET_LEN)
    }
}

impl StreamFramer {
    /// `max_packet_len` caps the declared payload length of a packet.
    pub fn new(max_packet_len: u64) -> Self {
        Self {
            buffer: Vec::new(),
            max_packet_len,
            skipped: 0,
        }
    }

    pub fn push(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Bytes dropped so far while searching for a key.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Next complete packet (key included), if one is fully buffered.
    ///
    /// # Errors
    /// `FrameError::MalformedPacket` when the length field after a key cannot
    /// be decoded or exceeds the limit. The key is dropped so the next call
    /// searches past it.
    pub fn next_packet(&mut self) -> Result<Option<Vec<u8>>, FrameError> {
        let Some(start) = find_key(&self.buffer) else {
            self.keep_key_prefix();
            return Ok(None);
        };
        if start > 0 {
            debug!(skipped = start, "discarding bytes before sync key");
            self.drop_front(start);
        }

        match self.frame_len() {
            Ok(total) => {
                trace!(len = total, "packet framed");
                Ok(Some(self.buffer.drain(..total).collect()))
            }
            Err(FrameError::InsufficientData { .. }) => Ok(None),
            Err(err) => {
                warn!(error = %err, "dropping sync key of malformed packet");
                self.drop_front(KEY_LEN);
                Err(err)
            }
        }
    }

    /// Size of the packet starting at offset 0, which holds a key.
    fn frame_len(&self) -> Result<usize, FrameError> {
        let actual = self.buffer.len();
        if actual < MIN_FRAME_LEN {
            return Err(FrameError::InsufficientData {
                needed: MIN_FRAME_LEN,
                actual,
            });
        }

        let length = decode_length(&self.buffer, LENGTH_OFFSET).map_err(|err| match err {
            BerError::Insufficient { needed, actual } => {
                FrameError::InsufficientData { needed, actual }
            }
            other => malformed(other.to_string()),
        })?;
        if length.value > self.max_packet_len {
            return Err(malformed(format!(
                "declared length {} exceeds limit {}",
                length.value, self.max_packet_len
            )));
        }

        let too_large = || malformed(format!("declared length {} too large", length.value));
        let payload_len = usize::try_from(length.value).map_err(|_| too_large())?;
        let needed = (LENGTH_OFFSET + length.field_size)
            .checked_add(payload_len)
            .ok_or_else(too_large)?;
        if actual < needed {
            return Err(FrameError::InsufficientData { needed, actual });
        }
        Ok(needed)
    }

    fn keep_key_prefix(&mut self) {
        if self.buffer.len() > KEY_PREFIX_TAIL {
            let excess = self.buffer.len() - KEY_PREFIX_TAIL;
            trace!(excess, "no sync key buffered");
            self.drop_front(excess);
        }
    }

    fn drop_front(&mut self, count: usize) {
        self.buffer.drain(..count);
        self.skipped += count as u64;
    }
}

fn malformed(reason: String) -> FrameError {
    FrameError::MalformedPacket {
        reason,
        discarded: KEY_LEN,
    }
}

fn find_key(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(KEY_LEN)
        .position(|window| window == UNIVERSAL_KEY.as_slice())
}
