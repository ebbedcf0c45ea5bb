//! Decoding drivers: a raw byte stream, or KLV carried in UDP datagrams of a
//! capture file.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::{debug, warn};

use crate::config::DecoderConfig;
use crate::source::{CaptureSource, ChunkSource, PcapFileSource, SourceError};
use crate::stream::{StreamDecoder, StreamStats};
use crate::tags::{PacketSnapshot, TagRegistry};

mod flows;
mod udp;

pub use flows::FlowKey;
use udp::parse_udp_datagram;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

/// Totals for one decoded byte stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamSummary {
    #[serde(flatten)]
    pub stats: StreamStats,
    /// Bytes still buffered at end of input (an unfinished packet).
    pub trailing_bytes: usize,
}

/// A snapshot decoded from a capture, tagged with where and when it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapturePacket {
    pub flow: FlowKey,
    pub timestamp: Option<String>,
    #[serde(flatten)]
    pub snapshot: PacketSnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowSummary {
    pub flow: FlowKey,
    pub datagrams: u64,
    #[serde(flatten)]
    pub stats: StreamStats,
    pub trailing_bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaptureSummary {
    pub frames_total: u64,
    pub udp_datagrams: u64,
    pub time_start: Option<String>,
    pub time_end: Option<String>,
    /// One entry per decoded flow, ordered by source then destination.
    pub flows: Vec<FlowSummary>,
}

impl CaptureSummary {
    pub fn packets(&self) -> u64 {
        self.flows.iter().map(|flow| flow.stats.packets).sum()
    }

    pub fn malformed(&self) -> u64 {
        self.flows.iter().map(|flow| flow.stats.malformed).sum()
    }

    pub fn tag_issues(&self) -> u64 {
        self.flows.iter().map(|flow| flow.stats.tag_issues).sum()
    }
}

/// Which datagrams of a capture are decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureFilter {
    /// Keep datagrams whose source or destination port matches.
    pub port: Option<u16>,
}

impl CaptureFilter {
    fn accepts(&self, flow: &FlowKey) -> bool {
        self.port
            .is_none_or(|port| flow.src.port() == port || flow.dst.port() == port)
    }
}

/// Decode a raw KLV byte stream read in `chunk_size` pieces.
///
/// Malformed frames are counted and logged; decoding continues past them.
///
/// # Errors
/// `AnalysisError::Source` when the reader fails.
pub fn decode_reader<R, F>(
    reader: R,
    registry: Arc<TagRegistry>,
    config: &DecoderConfig,
    chunk_size: usize,
    mut on_packet: F,
) -> Result<StreamSummary, AnalysisError>
where
    R: Read,
    F: FnMut(PacketSnapshot),
{
    let mut source = ChunkSource::with_chunk_size(reader, chunk_size);
    let mut decoder = StreamDecoder::new(registry, config);
    while let Some(chunk) = source.next_chunk()? {
        if let Err(err) = decoder.feed(chunk, &mut on_packet) {
            warn!(error = %err, "malformed frame in stream");
        }
    }

    let summary = StreamSummary {
        stats: decoder.stats(),
        trailing_bytes: decoder.buffered(),
    };
    debug!(packets = summary.stats.packets, "stream decoded");
    Ok(summary)
}

/// Decode KLV carried in the UDP datagrams of a PCAP/PCAPNG file.
///
/// # Errors
/// `AnalysisError::Source` when the file cannot be opened or read.
pub fn decode_pcap_file<F>(
    path: &Path,
    registry: Arc<TagRegistry>,
    config: &DecoderConfig,
    filter: CaptureFilter,
    on_packet: F,
) -> Result<CaptureSummary, AnalysisError>
where
    F: FnMut(CapturePacket),
{
    let source = PcapFileSource::open(path)?;
    decode_capture(source, registry, config, filter, on_packet)
}

/// Decode every UDP flow of `source` with its own stream decoder, so
/// interleaved flows never mix their bytes or their current values.
///
/// # Errors
/// `AnalysisError::Source` when the source fails mid-capture.
pub fn decode_capture<S, F>(
    mut source: S,
    registry: Arc<TagRegistry>,
    config: &DecoderConfig,
    filter: CaptureFilter,
    mut on_packet: F,
) -> Result<CaptureSummary, AnalysisError>
where
    S: CaptureSource,
    F: FnMut(CapturePacket),
{
    let mut frames_total = 0u64;
    let mut udp_datagrams = 0u64;
    let mut first_ts = None;
    let mut last_ts = None;
    let mut flows: BTreeMap<FlowKey, (u64, StreamDecoder)> = BTreeMap::new();

    while let Some(frame) = source.next_frame()? {
        frames_total += 1;
        update_ts_bounds(&mut first_ts, &mut last_ts, frame.timestamp);

        let datagram = match parse_udp_datagram(frame.linktype, &frame.data) {
            Ok(Some(datagram)) => datagram,
            Ok(None) => continue,
            Err(err) => {
                debug!(frame = frames_total, error = %err, "frame skipped");
                continue;
            }
        };
        udp_datagrams += 1;
        if !filter.accepts(&datagram.flow) {
            continue;
        }

        let flow = datagram.flow;
        let timestamp = ts_to_rfc3339(frame.timestamp);
        let (datagrams, decoder) = flows
            .entry(flow)
            .or_insert_with(|| (0, StreamDecoder::new(Arc::clone(&registry), config)));
        *datagrams += 1;
        let result = decoder.feed(datagram.payload, |snapshot| {
            on_packet(CapturePacket {
                flow,
                timestamp: timestamp.clone(),
                snapshot,
            })
        });
        if let Err(err) = result {
            warn!(%flow, error = %err, "malformed frame in flow");
        }
    }

    Ok(CaptureSummary {
        frames_total,
        udp_datagrams,
        time_start: ts_to_rfc3339(first_ts),
        time_end: ts_to_rfc3339(last_ts),
        flows: flows
            .into_iter()
            .map(|(flow, (datagrams, decoder))| FlowSummary {
                flow,
                datagrams,
                stats: decoder.stats(),
                trailing_bytes: decoder.buffered(),
            })
            .collect(),
    })
}

fn update_ts_bounds(first: &mut Option<f64>, last: &mut Option<f64>, ts: Option<f64>) {
    let Some(ts) = ts else {
        return;
    };
    if first.is_none_or(|existing| ts < existing) {
        *first = Some(ts);
    }
    if last.is_none_or(|existing| ts > existing) {
        *last = Some(ts);
    }
}

/// RFC 3339 rendering of a capture timestamp in seconds.
pub fn ts_to_rfc3339(ts: Option<f64>) -> Option<String> {
    let nanos = (ts? * 1_000_000_000.0) as i128;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok())
}
