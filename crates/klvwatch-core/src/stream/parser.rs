//! Framing plus tag decoding: bytes in, one snapshot per packet out.

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use super::error::FrameError;
use super::framer::StreamFramer;
use crate::config::DecoderConfig;
use crate::protocols::st0601::parse_packet;
use crate::tags::{PacketSnapshot, TagDecoder, TagRegistry};

/// Counters kept by a [`StreamDecoder`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StreamStats {
    pub bytes_in: u64,
    pub packets: u64,
    pub malformed: u64,
    pub skipped_bytes: u64,
    pub tag_issues: u64,
}

#[derive(Debug, Clone)]
pub struct StreamDecoder {
    framer: StreamFramer,
    tags: TagDecoder,
    stats: StreamStats,
}

impl StreamDecoder {
    pub fn new(registry: Arc<TagRegistry>, config: &DecoderConfig) -> Self {
        Self {
            framer: StreamFramer::new(config.max_packet_len),
            tags: TagDecoder::new(registry, config),
            stats: StreamStats::default(),
        }
    }

    /// Append `bytes` and decode every packet now complete, handing each
    /// snapshot to `on_packet` in stream order.
    ///
    /// # Errors
    /// The first `FrameError::MalformedPacket` met during the call, reported
    /// after all buffered input has been processed. The decoder stays usable.
    pub fn feed<F>(&mut self, bytes: &[u8], mut on_packet: F) -> Result<(), FrameError>
    where
        F: FnMut(PacketSnapshot),
    {
        self.stats.bytes_in += bytes.len() as u64;
        self.framer.push(bytes);

        let mut first_error = None;
        loop {
            match self.framer.next_packet() {
                Ok(Some(packet)) => match parse_packet(&packet) {
                    Ok(local_set) => {
                        let snapshot = self.tags.decode_packet(&local_set);
                        self.stats.packets += 1;
                        self.stats.tag_issues += snapshot.issues.len() as u64;
                        on_packet(snapshot);
                    }
                    Err(err) => {
                        warn!(error = %err, "framed packet rejected");
                        self.stats.malformed += 1;
                        first_error.get_or_insert(FrameError::MalformedPacket {
                            reason: err.to_string(),
                            discarded: packet.len(),
                        });
                    }
                },
                Ok(None) => break,
                Err(err) => {
                    self.stats.malformed += 1;
                    first_error.get_or_insert(err);
                }
            }
        }
        self.stats.skipped_bytes = self.framer.skipped();

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    /// Bytes held back waiting for the rest of a packet.
    pub fn buffered(&self) -> usize {
        self.framer.buffered()
    }

    pub fn tag_decoder(&self) -> &TagDecoder {
        &self.tags
    }
}

/// [`StreamDecoder`] bound to a per-packet callback.
///
/// # Examples
/// ```
/// use klvwatch_core::{KlvParser, LocalSetEncoder};
///
/// let mut encoder = LocalSetEncoder::new();
/// encoder.add_u16(1, 100);
/// let packet = encoder.encode();
///
/// let mut checksums = Vec::new();
/// let mut parser = KlvParser::with_defaults(|snapshot| checksums.push(snapshot.number(1)));
/// for byte in &packet {
///     parser.feed(std::slice::from_ref(byte)).unwrap();
/// }
/// drop(parser);
/// assert_eq!(checksums, vec![Some(100.0)]);
/// ```
pub struct KlvParser<F>
where
    F: FnMut(PacketSnapshot),
{
    decoder: StreamDecoder,
    on_packet: F,
}

impl<F> KlvParser<F>
where
    F: FnMut(PacketSnapshot),
{
    pub fn new(registry: Arc<TagRegistry>, config: &DecoderConfig, on_packet: F) -> Self {
        Self {
            decoder: StreamDecoder::new(registry, config),
            on_packet,
        }
    }

    /// ST 0601 registry and default config.
    pub fn with_defaults(on_packet: F) -> Self {
        Self::new(
            Arc::new(TagRegistry::st0601()),
            &DecoderConfig::default(),
            on_packet,
        )
    }

    /// # Errors
    /// See [`StreamDecoder::feed`].
    pub fn feed(&mut self, bytes: &[u8]) -> Result<(), FrameError> {
        self.decoder.feed(bytes, &mut self.on_packet)
    }

    pub fn stats(&self) -> StreamStats {
        self.decoder.stats()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{KlvParser, StreamDecoder};
    use crate::config::DecoderConfig;
    use crate::encode::LocalSetEncoder;
    use crate::protocols::st0601::layout::UNIVERSAL_KEY;
    use crate::stream::error::FrameError;
    use crate::tags::{PacketSnapshot, TagRegistry};

    fn packet(checksum: u16) -> Vec<u8> {
        let mut encoder = LocalSetEncoder::new();
        encoder
            .add_u16(1, checksum)
            .add_u64(2, 0x0004_6050_584E_0180)
            .add_text(3, "MISSION01");
        encoder.encode()
    }

    fn decode_in_chunks(stream: &[u8], chunk: usize) -> Vec<PacketSnapshot> {
        let mut decoder =
            StreamDecoder::new(Arc::new(TagRegistry::st0601()), &DecoderConfig::default());
        let mut out = Vec::new();
        for piece in stream.chunks(chunk) {
            decoder.feed(piece, |snapshot| out.push(snapshot)).unwrap();
        }
        out
    }

    #[test]
    fn split_points_do_not_change_output() {
        let stream = [packet(1), packet(2), packet(3)].concat();
        let whole = decode_in_chunks(&stream, stream.len());
        assert_eq!(whole.len(), 3);

        for chunk in [1, 2, 7, 16, 17, 31] {
            assert_eq!(decode_in_chunks(&stream, chunk), whole, "chunk size {chunk}");
        }
    }

    #[test]
    fn garbage_between_packets_is_skipped() {
        let stream = [
            vec![0xFF, 0x06, 0x0E, 0x2B],
            packet(7),
            vec![0x00; 33],
            packet(8),
        ]
        .concat();

        let mut decoder =
            StreamDecoder::new(Arc::new(TagRegistry::st0601()), &DecoderConfig::default());
        let mut checksums = Vec::new();
        decoder
            .feed(&stream, |snapshot| checksums.push(snapshot.number(1)))
            .unwrap();

        assert_eq!(checksums, vec![Some(7.0), Some(8.0)]);
        assert_eq!(decoder.stats().skipped_bytes, 37);
    }

    #[test]
    fn malformed_frame_is_reported_after_the_rest_is_decoded() {
        let config = DecoderConfig {
            max_packet_len: 128,
            ..DecoderConfig::default()
        };
        let mut oversized = UNIVERSAL_KEY.to_vec();
        oversized.extend_from_slice(&[0x83, 0x01, 0x00, 0x00]);
        let stream = [packet(1), oversized, packet(2)].concat();

        let mut sequences = Vec::new();
        let mut parser = KlvParser::new(Arc::new(TagRegistry::st0601()), &config, |snapshot| {
            sequences.push(snapshot.sequence)
        });
        let result = parser.feed(&stream);
        let stats = parser.stats();
        drop(parser);

        assert!(matches!(result, Err(FrameError::MalformedPacket { .. })));
        assert_eq!(sequences, vec![1, 2]);
        assert_eq!(stats.malformed, 1);
        assert_eq!(stats.packets, 2);
    }

    #[test]
    fn empty_feed_is_a_no_op() {
        let mut calls = 0;
        let mut parser = KlvParser::with_defaults(|_| calls += 1);
        parser.feed(&[]).unwrap();
        assert_eq!(parser.stats().bytes_in, 0);
        drop(parser);
        assert_eq!(calls, 0);
    }

    #[test]
    fn partial_packet_stays_buffered() {
        let packet = packet(5);
        let mut decoder =
            StreamDecoder::new(Arc::new(TagRegistry::st0601()), &DecoderConfig::default());
        let mut count = 0;
        decoder.feed(&packet[..20], |_| count += 1).unwrap();
        assert_eq!(count, 0);
        assert_eq!(decoder.buffered(), 20);

        decoder.feed(&packet[20..], |_| count += 1).unwrap();
        assert_eq!(count, 1);
        assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn tag_issues_are_counted() {
        let mut encoder = LocalSetEncoder::new();
        encoder.add_u16(1, 1).add_raw(250, &[0x01]).add_raw(2, &[0x00]);
        let mut decoder =
            StreamDecoder::new(Arc::new(TagRegistry::st0601()), &DecoderConfig::default());
        decoder.feed(&encoder.encode(), |_| {}).unwrap();

        assert_eq!(decoder.stats().tag_issues, 2);
        assert_eq!(decoder.tag_decoder().sequence(), 1);
    }
}
