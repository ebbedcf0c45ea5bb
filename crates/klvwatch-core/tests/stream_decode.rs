mod common;

use std::io::Cursor;
use std::sync::Arc;

use common::TIMESTAMP;
use klvwatch_core::{
    DecoderConfig, FrameError, KlvParser, LocalSetEncoder, PacketSnapshot, StreamDecoder,
    TagRegistry, TagValue, UNIVERSAL_KEY, decode_reader, wrap_payload,
};

fn checksum_and_timestamp_packet() -> Vec<u8> {
    let mut packet = UNIVERSAL_KEY.to_vec();
    packet.push(0x0E);
    packet.extend_from_slice(&[0x01, 0x02, 0x00, 0x64, 0x02, 0x08]);
    packet.extend_from_slice(&TIMESTAMP);
    packet
}

fn collect(stream: &[u8], chunk: usize) -> Vec<PacketSnapshot> {
    let mut snapshots = Vec::new();
    let mut parser = KlvParser::with_defaults(|snapshot| snapshots.push(snapshot));
    for piece in stream.chunks(chunk.max(1)) {
        parser.feed(piece).unwrap();
    }
    drop(parser);
    snapshots
}

#[test]
fn checksum_and_timestamp_end_to_end() {
    let snapshots = collect(&checksum_and_timestamp_packet(), usize::MAX);

    assert_eq!(snapshots.len(), 1);
    let snapshot = &snapshots[0];
    assert_eq!(snapshot.number(1), Some(100.0));
    assert_eq!(snapshot.number(2), Some(u64::from_be_bytes(TIMESTAMP) as f64));
    assert!(snapshot.issues.is_empty());
    assert_eq!(snapshot.truncated, None);
}

#[test]
fn byte_at_a_time_matches_single_feed() {
    let mut encoder = LocalSetEncoder::new();
    encoder
        .add_u16(5, 0x8000)
        .add_i32(13, 0x1000_0000)
        .add_text(3, "MISSION01")
        .add_raw(74, &[0x55; 140]);
    let stream = [
        checksum_and_timestamp_packet(),
        encoder.encode(),
        checksum_and_timestamp_packet(),
    ]
    .concat();

    let whole = collect(&stream, stream.len());
    assert_eq!(whole.len(), 3);
    assert_eq!(collect(&stream, 1), whole);
    assert_eq!(collect(&stream, 13), whole);
}

#[test]
fn resynchronizes_after_garbage() {
    let mut stream = vec![0x13, 0x37, 0x06, 0x0E, 0x2B, 0x34, 0x02];
    stream.extend_from_slice(&checksum_and_timestamp_packet());

    let snapshots = collect(&stream, 4);
    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0].number(1), Some(100.0));
}

#[test]
fn unknown_tag_between_known_tags() {
    let mut encoder = LocalSetEncoder::new();
    encoder
        .add_u16(1, 100)
        .add_raw(250, &[0xDE, 0xAD])
        .add_raw(2, &TIMESTAMP);

    let snapshots = collect(&encoder.encode(), 64);
    let snapshot = &snapshots[0];
    assert_eq!(snapshot.tags.len(), 2);
    assert!(!snapshot.tags.contains_key(&250));
    assert_eq!(snapshot.number(1), Some(100.0));
    assert_eq!(snapshot.number(2), Some(u64::from_be_bytes(TIMESTAMP) as f64));
    assert_eq!(snapshot.issues.len(), 1);
    assert_eq!(snapshot.issues[0].tag, 250);
}

#[test]
fn truncated_trailing_record_keeps_earlier_tags() {
    let packet = wrap_payload(&[0x01, 0x02, 0x00, 0x64, 0x02, 0x08, 0x00, 0x04]);

    let snapshots = collect(&packet, 5);
    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0].number(1), Some(100.0));
    assert!(!snapshots[0].tags.contains_key(&2));
    assert_eq!(snapshots[0].truncated, Some(2));
}

#[test]
fn out_of_range_value_is_discarded_not_clamped() {
    let registry = TagRegistry::st0601()
        .with_overrides_from_json(
            r#"[{"id": 1, "name": "Bounded Checksum", "unit": "deg", "min": 0, "max": 360}]"#,
        )
        .unwrap();
    let mut snapshots = Vec::new();
    let mut parser = KlvParser::new(Arc::new(registry), &DecoderConfig::default(), |snapshot| {
        snapshots.push(snapshot)
    });

    let mut encoder = LocalSetEncoder::new();
    encoder.add_u16(1, 361);
    parser.feed(&encoder.encode()).unwrap();
    drop(parser);

    let snapshot = &snapshots[0];
    assert_eq!(snapshot.tags[&1].name, "Bounded Checksum");
    assert_eq!(snapshot.value(1), None);
    assert!(snapshot.issues[0].message.contains("out of bounds"));
}

#[test]
fn oversized_packet_is_skipped_and_stream_recovers() {
    let config = DecoderConfig::from_json(r#"{"max_packet_len": 256}"#).unwrap();
    let mut decoder = StreamDecoder::new(Arc::new(TagRegistry::st0601()), &config);

    let mut stream = UNIVERSAL_KEY.to_vec();
    stream.extend_from_slice(&[0x82, 0xFF, 0xFF]);
    stream.extend_from_slice(&checksum_and_timestamp_packet());

    let mut checksums = Vec::new();
    let result = decoder.feed(&stream, |snapshot| checksums.push(snapshot.number(1)));

    assert!(matches!(result, Err(FrameError::MalformedPacket { .. })));
    assert_eq!(checksums, vec![Some(100.0)]);
    assert_eq!(decoder.stats().malformed, 1);
}

#[test]
fn near_max_length_without_limit_is_malformed() {
    let config = DecoderConfig::from_json(r#"{"max_packet_len": 18446744073709551615}"#).unwrap();
    let mut decoder = StreamDecoder::new(Arc::new(TagRegistry::st0601()), &config);

    let mut stream = UNIVERSAL_KEY.to_vec();
    stream.extend_from_slice(&[0x88, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFA]);
    stream.extend_from_slice(&[0x00; 8]);
    stream.extend_from_slice(&checksum_and_timestamp_packet());

    let mut checksums = Vec::new();
    let result = decoder.feed(&stream, |snapshot| checksums.push(snapshot.number(1)));

    assert!(matches!(result, Err(FrameError::MalformedPacket { .. })));
    assert_eq!(checksums, vec![Some(100.0)]);
    assert_eq!(decoder.stats().malformed, 1);
}

#[test]
fn values_carry_forward_unless_reset() {
    let mut first = LocalSetEncoder::new();
    first.add_text(3, "MISSION01").add_u16(1, 1);
    let mut second = LocalSetEncoder::new();
    second.add_raw(3, &[]).add_raw(1, &[0x07]);
    let stream = [first.encode(), second.encode()].concat();

    let carried = collect(&stream, 9);
    assert_eq!(carried[1].number(1), Some(1.0));

    let config = DecoderConfig::from_json(r#"{"value_mode": "reset_per_packet"}"#).unwrap();
    let mut reset = Vec::new();
    decode_reader(
        Cursor::new(&stream),
        Arc::new(TagRegistry::st0601()),
        &config,
        9,
        |snapshot| reset.push(snapshot),
    )
    .unwrap();
    assert_eq!(reset[1].value(1), None);
    assert_eq!(reset[1].value(3), Some(&TagValue::Text(String::new())));
}

#[test]
fn snapshot_serializes_to_json() {
    let snapshots = collect(&checksum_and_timestamp_packet(), 1);
    let json = serde_json::to_value(&snapshots[0]).unwrap();

    assert_eq!(json["sequence"], 1);
    assert_eq!(json["tags"]["1"]["name"], "Checksum");
    assert_eq!(json["tags"]["1"]["value"], 100.0);
    assert_eq!(json["tags"]["2"]["unit"], "us");
    assert!(json.get("issues").is_none());
}

#[test]
fn reader_summary_reports_trailing_bytes() {
    let mut stream = checksum_and_timestamp_packet();
    stream.extend_from_slice(&checksum_and_timestamp_packet()[..20]);

    let summary = decode_reader(
        stream.as_slice(),
        Arc::new(TagRegistry::st0601()),
        &DecoderConfig::default(),
        1024,
        |_| {},
    )
    .unwrap();

    assert_eq!(summary.stats.packets, 1);
    assert_eq!(summary.trailing_bytes, 20);
    assert_eq!(summary.stats.bytes_in, stream.len() as u64);
}
