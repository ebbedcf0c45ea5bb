use std::fs::File;
use std::path::Path;

use pcap_parser::traits::PcapReaderIterator;
use pcap_parser::{Block, LegacyPcapReader, Linktype, PcapBlockOwned, PcapError, PcapNGReader};
use tracing::trace;

use crate::source::{CaptureSource, CapturedFrame, SourceError};

use super::error::PcapSourceError;
use super::layout;
use super::reader::{
    CaptureFormat, legacy_ts_to_seconds, linktype_for_interface, pcapng_ts_to_seconds,
    sniff_format,
};

/// Frames of a PCAP or PCAPNG file, in file order.
pub struct PcapFileSource {
    reader: FileReader,
    links: LinkState,
}

enum FileReader {
    Legacy(LegacyPcapReader<File>),
    Ng(PcapNGReader<File>),
}

/// Link types announced by header blocks, needed to interpret packet blocks.
#[derive(Default)]
struct LinkState {
    legacy: Option<Linktype>,
    interfaces: Vec<Linktype>,
}

impl PcapFileSource {
    /// # Errors
    /// `SourceError::Io` when the file cannot be opened or is shorter than a
    /// magic number, `SourceError::Capture` when its header is invalid.
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let mut file = File::open(path)?;
        let reader = match sniff_format(&mut file)? {
            CaptureFormat::Ng => PcapNGReader::new(layout::PCAP_READER_BUFFER_SIZE, file)
                .map(FileReader::Ng)
                .map_err(|err| PcapSourceError::pcap("pcapng reader init", err))?,
            CaptureFormat::Legacy => LegacyPcapReader::new(layout::PCAP_READER_BUFFER_SIZE, file)
                .map(FileReader::Legacy)
                .map_err(|err| PcapSourceError::pcap("pcap reader init", err))?,
        };
        Ok(Self {
            reader,
            links: LinkState::default(),
        })
    }
}

impl CaptureSource for PcapFileSource {
    fn next_frame(&mut self) -> Result<Option<CapturedFrame>, SourceError> {
        let frame = match &mut self.reader {
            FileReader::Legacy(reader) => pump(reader, "pcap", &mut self.links),
            FileReader::Ng(reader) => pump(reader, "pcapng", &mut self.links),
        }?;
        Ok(frame)
    }
}

/// Read blocks until one yields a frame or the file ends.
fn pump<R: PcapReaderIterator>(
    reader: &mut R,
    context: &'static str,
    links: &mut LinkState,
) -> Result<Option<CapturedFrame>, PcapSourceError> {
    loop {
        match reader.next() {
            Ok((offset, block)) => {
                let frame = links.frame_from(block);
                reader.consume(offset);
                if frame.is_some() {
                    return Ok(frame);
                }
            }
            Err(PcapError::Eof) => return Ok(None),
            Err(PcapError::Incomplete(_)) => {
                if reader.reader_exhausted() {
                    return Err(PcapSourceError::pcap(context, "truncated block at end of file"));
                }
                reader
                    .refill()
                    .map_err(|err| PcapSourceError::pcap(context, err))?;
            }
            Err(err) => return Err(PcapSourceError::pcap(context, err)),
        }
    }
}

impl LinkState {
    fn frame_from(&mut self, block: PcapBlockOwned<'_>) -> Option<CapturedFrame> {
        match block {
            PcapBlockOwned::LegacyHeader(header) => {
                self.legacy = Some(header.network);
                None
            }
            PcapBlockOwned::Legacy(packet) => Some(CapturedFrame {
                timestamp: Some(legacy_ts_to_seconds(packet.ts_sec, packet.ts_usec)),
                linktype: self.legacy.unwrap_or(Linktype::ETHERNET),
                data: packet.data.to_vec(),
            }),
            PcapBlockOwned::NG(Block::SectionHeader(_)) => {
                self.interfaces.clear();
                None
            }
            PcapBlockOwned::NG(Block::InterfaceDescription(interface)) => {
                trace!(linktype = ?interface.linktype, "pcapng interface");
                self.interfaces.push(interface.linktype);
                None
            }
            PcapBlockOwned::NG(Block::EnhancedPacket(packet)) => Some(CapturedFrame {
                timestamp: Some(pcapng_ts_to_seconds(packet.ts_high, packet.ts_low)),
                linktype: linktype_for_interface(&self.interfaces, packet.if_id),
                data: packet.data.to_vec(),
            }),
            PcapBlockOwned::NG(Block::SimplePacket(packet)) => Some(CapturedFrame {
                timestamp: None,
                linktype: linktype_for_interface(&self.interfaces, 0),
                data: packet.data.to_vec(),
            }),
            _ => None,
        }
    }
}
