#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use etherparse::PacketBuilder;

const PCAPNG_SECTION_HEADER: u32 = 0x0A0D_0D0A;
const PCAPNG_INTERFACE_DESCRIPTION: u32 = 1;
const PCAPNG_ENHANCED_PACKET: u32 = 6;
const PCAPNG_BYTE_ORDER_MAGIC: u32 = 0x1A2B_3C4D;
const PCAP_LEGACY_MAGIC: u32 = 0xA1B2_C3D4;
const LINKTYPE_ETHERNET: u16 = 1;
const SNAPLEN: u32 = 65_535;

/// One captured frame: timestamp in microseconds and link-layer bytes.
pub type Frame = (u64, Vec<u8>);

pub const TIMESTAMP: [u8; 8] = [0x00, 0x04, 0x60, 0x50, 0x58, 0x4E, 0x01, 0x80];

/// Path in the temp dir that is unique per call.
pub fn temp_path(name: &str, extension: &str) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("klvwatch_{name}_{unique}.{extension}"))
}

pub fn udp_frame(src: [u8; 4], src_port: u16, dst_port: u16, payload: &[u8]) -> Vec<u8> {
    let builder = PacketBuilder::ethernet2([0x02, 0, 0, 0, 0, 1], [0x01, 0, 0x5E, 0, 0, 1])
        .ipv4(src, [239, 10, 0, 1], 16)
        .udp(src_port, dst_port);
    let mut frame = Vec::with_capacity(builder.size(payload.len()));
    builder.write(&mut frame, payload).unwrap();
    frame
}

/// Big-endian PCAPNG: section header, one Ethernet interface, one enhanced
/// packet block per frame.
pub fn write_pcapng(name: &str, frames: &[Frame]) -> PathBuf {
    let mut output = Vec::new();
    output.extend_from_slice(&block(PCAPNG_SECTION_HEADER, &section_header_body()));
    output.extend_from_slice(&block(
        PCAPNG_INTERFACE_DESCRIPTION,
        &interface_description_body(),
    ));
    for (ts_us, data) in frames {
        output.extend_from_slice(&block(
            PCAPNG_ENHANCED_PACKET,
            &enhanced_packet_body(*ts_us, data),
        ));
    }

    let path = temp_path(name, "pcapng");
    fs::write(&path, output).unwrap();
    path
}

/// Little-endian legacy PCAP with microsecond timestamps.
pub fn write_legacy_pcap(name: &str, frames: &[Frame]) -> PathBuf {
    let mut output = Vec::new();
    output.extend_from_slice(&PCAP_LEGACY_MAGIC.to_le_bytes());
    output.extend_from_slice(&2u16.to_le_bytes());
    output.extend_from_slice(&4u16.to_le_bytes());
    output.extend_from_slice(&0i32.to_le_bytes());
    output.extend_from_slice(&0u32.to_le_bytes());
    output.extend_from_slice(&SNAPLEN.to_le_bytes());
    output.extend_from_slice(&u32::from(LINKTYPE_ETHERNET).to_le_bytes());
    for (ts_us, data) in frames {
        let len = data.len() as u32;
        output.extend_from_slice(&((ts_us / 1_000_000) as u32).to_le_bytes());
        output.extend_from_slice(&((ts_us % 1_000_000) as u32).to_le_bytes());
        output.extend_from_slice(&len.to_le_bytes());
        output.extend_from_slice(&len.to_le_bytes());
        output.extend_from_slice(data);
    }

    let path = temp_path(name, "pcap");
    fs::write(&path, output).unwrap();
    path
}

fn block(block_type: u32, body: &[u8]) -> Vec<u8> {
    let total_len = (12 + body.len()) as u32;
    let mut block = Vec::with_capacity(total_len as usize);
    block.extend_from_slice(&block_type.to_be_bytes());
    block.extend_from_slice(&total_len.to_be_bytes());
    block.extend_from_slice(body);
    block.extend_from_slice(&total_len.to_be_bytes());
    block
}

fn section_header_body() -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&PCAPNG_BYTE_ORDER_MAGIC.to_be_bytes());
    body.extend_from_slice(&1u16.to_be_bytes());
    body.extend_from_slice(&0u16.to_be_bytes());
    body.extend_from_slice(&(-1i64).to_be_bytes());
    body
}

fn interface_description_body() -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&LINKTYPE_ETHERNET.to_be_bytes());
    body.extend_from_slice(&0u16.to_be_bytes());
    body.extend_from_slice(&SNAPLEN.to_be_bytes());
    body
}

fn enhanced_packet_body(ts_us: u64, data: &[u8]) -> Vec<u8> {
    let captured = data.len() as u32;
    let mut body = Vec::new();
    body.extend_from_slice(&0u32.to_be_bytes());
    body.extend_from_slice(&((ts_us >> 32) as u32).to_be_bytes());
    body.extend_from_slice(&(ts_us as u32).to_be_bytes());
    body.extend_from_slice(&captured.to_be_bytes());
    body.extend_from_slice(&captured.to_be_bytes());
    body.extend_from_slice(data);
    body.resize(body.len() + (4 - data.len() % 4) % 4, 0);
    body
}
