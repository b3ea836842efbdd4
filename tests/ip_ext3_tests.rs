//! Integration tests for UOR-2 extension 3 handling in the IP-only profile.
//!
//! Each test establishes a context with an IR packet, then sends a UOR-2
//! carrying an extension 3 and checks the rebuilt headers, the emitted
//! diagnostics, and strict-mode behaviour.

mod common;

use common::{build_engine, expected_ipv4_header, header_crc7, ir_packet, uor2_packet, FlowSpec};

use rohcdec::{
    ContextId, DecompressionError, RohcError, RohcParsingError, SequenceNumber,
};

const START_SN: u16 = 100;
const START_IP_ID: u16 = 0x2000;

/// IP-ID that the sequential (non-random) model predicts for `sn`.
fn sequential_ip_id(sn: u16) -> u16 {
    sn.wrapping_add(START_IP_ID.wrapping_sub(START_SN))
}

fn established_engine(
    strict: bool,
    rnd: bool,
) -> (rohcdec::RohcDecompEngine, std::sync::Arc<rohcdec::trace::MemoryTraceSink>) {
    let (mut engine, sink) = build_engine(strict);
    let mut out = [0u8; 128];
    engine
        .decompress(
            &ir_packet(&FlowSpec::default(), START_SN, START_IP_ID, rnd, &[]),
            &mut out,
        )
        .expect("IR packet must establish the context");
    sink.clear();
    (engine, sink)
}

#[test]
fn ext3_sn_octet_extends_the_base_sn() {
    let (mut engine, _sink) = established_engine(false, false);
    let spec = FlowSpec::default();

    // Thirteen SN bits: five in the base header, eight appended by EXT-3.
    let sn = 356u16;
    let expected = expected_ipv4_header(&spec, sequential_ip_id(sn), 20);
    let crc = header_crc7(&expected);
    // flags: S = 1, mode = 1.
    let extension = [0xE8, (sn & 0xFF) as u8];
    let packet = uor2_packet(sn >> 8, crc, &extension);

    let mut out = [0u8; 64];
    let written = engine.decompress(&packet, &mut out).unwrap();
    assert_eq!(written, 20);
    assert_eq!(&out[..20], &expected);
    assert_eq!(
        engine.context_last_sn(ContextId::new(0)),
        Some(SequenceNumber::new(sn))
    );
}

#[test]
fn ext3_explicit_ip_id_overrides_the_offset_model() {
    let (mut engine, _sink) = established_engine(false, false);
    let spec = FlowSpec::default();

    let sn = 101u16;
    let expected = expected_ipv4_header(&spec, 0xBEEF, 20);
    let crc = header_crc7(&expected);
    // flags: mode = 1, I = 1; then the 16-bit IP-ID.
    let packet = uor2_packet(sn, crc, &[0xCC, 0xBE, 0xEF]);

    let mut out = [0u8; 64];
    engine.decompress(&packet, &mut out).unwrap();
    assert_eq!(&out[4..6], &[0xBE, 0xEF]);
}

#[test]
fn ext3_mode_zero_warns_in_lenient_mode() {
    let (mut engine, sink) = established_engine(false, false);
    let spec = FlowSpec::default();

    let sn = 102u16;
    let expected = expected_ipv4_header(&spec, sequential_ip_id(sn), 20);
    let crc = header_crc7(&expected);
    let packet = uor2_packet(sn, crc, &[0xC0]);

    let mut out = [0u8; 64];
    let written = engine.decompress(&packet, &mut out).unwrap();
    assert_eq!(written, 20);
    assert_eq!(&out[..20], &expected);
    assert_eq!(sink.warning_count(), 1, "mode zero must be diagnosed");
}

#[test]
fn ext3_mode_zero_is_fatal_in_strict_mode() {
    let (mut engine, sink) = established_engine(true, false);

    let packet = uor2_packet(102, 0x00, &[0xC0]);
    let mut out = [0u8; 64];
    let err = engine.decompress(&packet, &mut out).unwrap_err();
    assert_eq!(
        err,
        RohcError::Parsing(RohcParsingError::MalformedMode)
    );
    assert_eq!(sink.warning_count(), 1);
    // The failed packet must not advance the context.
    assert_eq!(
        engine.context_last_sn(ContextId::new(0)),
        Some(SequenceNumber::new(START_SN))
    );
}

#[test]
fn ext3_ip_id_without_eligible_header_is_fatal() {
    // The flow was established with a random IP-ID, so no header can take
    // the 16-bit IP-ID announced by I = 1.
    let (mut engine, sink) = established_engine(false, true);

    let packet = uor2_packet(101, 0x00, &[0xCC, 0xBE, 0xEF]);
    let mut out = [0u8; 64];
    let err = engine.decompress(&packet, &mut out).unwrap_err();
    assert_eq!(err, RohcError::Parsing(RohcParsingError::NoIpIdTarget));
    assert_eq!(sink.warning_count(), 1);
    assert_eq!(
        engine.context_last_sn(ContextId::new(0)),
        Some(SequenceNumber::new(START_SN))
    );
}

#[test]
fn ext3_inner_field_block_updates_ttl() {
    let (mut engine, _sink) = established_engine(false, false);
    let mut spec = FlowSpec::default();
    spec.ttl = 32;

    let sn = 103u16;
    let expected = expected_ipv4_header(&spec, sequential_ip_id(sn), 20);
    let crc = header_crc7(&expected);
    // flags: mode = 1, ip = 1; inner flags octet announces a TTL field.
    let packet = uor2_packet(sn, crc, &[0xCA, 0b0100_0000, 32]);

    let mut out = [0u8; 64];
    engine.decompress(&packet, &mut out).unwrap();
    assert_eq!(out[8], 32);

    // The TTL update is committed: a plain UO-0 keeps it.
    let sn = 104u16;
    let expected = expected_ipv4_header(&spec, sequential_ip_id(sn), 20);
    let crc = common::header_crc3(&expected);
    let packet = common::uo0_packet(sn, crc);
    engine.decompress(&packet, &mut out).unwrap();
    assert_eq!(&out[..20], &expected);
}

#[test]
fn truncated_ext3_drops_the_packet_without_context_damage() {
    let (mut engine, _sink) = established_engine(false, false);

    // flags announce S and ip, but the packet ends right after them.
    let packet = uor2_packet(105, 0x00, &[0xEA]);
    let mut out = [0u8; 64];
    let err = engine.decompress(&packet, &mut out).unwrap_err();
    assert!(matches!(
        err,
        RohcError::Parsing(RohcParsingError::NotEnoughData { .. })
            | RohcError::Decompression(DecompressionError::ParsingFailed(_))
    ));
    assert_eq!(
        engine.context_last_sn(ContextId::new(0)),
        Some(SequenceNumber::new(START_SN))
    );
}
