//! Common test utilities for IP-only profile integration tests.
//!
//! Provides packet builders (IR with single or stacked IPv4 headers, UO
//! packets with computed CRCs), expected-header construction, and engine
//! constructors shared across the integration tests.

#![allow(dead_code)] // Not every helper is used by every test binary.

use std::sync::Arc;

use rohcdec::crc::CrcCalculators;
use rohcdec::trace::MemoryTraceSink;
use rohcdec::{DecompressorConfig, IpOnlyProfile, RohcDecompEngine};

/// Static and slow-moving fields of one IPv4 header in a test flow.
#[derive(Debug, Clone, Copy)]
pub struct FlowSpec {
    pub src: [u8; 4],
    pub dst: [u8; 4],
    pub protocol: u8,
    pub tos: u8,
    pub ttl: u8,
    pub df: bool,
}

impl Default for FlowSpec {
    fn default() -> Self {
        Self {
            src: [10, 0, 0, 1],
            dst: [10, 0, 0, 2],
            protocol: 17,
            tos: 0,
            ttl: 64,
            df: true,
        }
    }
}

/// Creates an engine with the IP-only profile registered and a collecting
/// trace sink.
pub fn build_engine(strict: bool) -> (RohcDecompEngine, Arc<MemoryTraceSink>) {
    let sink = Arc::new(MemoryTraceSink::new());
    let mut engine = RohcDecompEngine::new(DecompressorConfig { strict }, sink.clone());
    engine
        .register_profile(Box::new(IpOnlyProfile::new()))
        .expect("registering the IP-only profile must succeed");
    (engine, sink)
}

fn push_static_part(packet: &mut Vec<u8>, spec: &FlowSpec) {
    packet.push(0x40);
    packet.push(spec.protocol);
    packet.extend_from_slice(&spec.src);
    packet.extend_from_slice(&spec.dst);
}

fn push_dynamic_part(packet: &mut Vec<u8>, spec: &FlowSpec, ip_id: u16, rnd: bool) {
    packet.push(spec.tos);
    packet.push(spec.ttl);
    packet.extend_from_slice(&ip_id.to_be_bytes());
    let mut flags = 0u8;
    if spec.df {
        flags |= 0b1000_0000;
    }
    if rnd {
        flags |= 0b0100_0000;
    }
    flags |= 0b0010_0000; // NBO
    packet.push(flags);
    packet.push(0x00); // empty generic extension header list
}

/// Builds an IR packet (with dynamic chain) for a single-header flow.
pub fn ir_packet(spec: &FlowSpec, sn: u16, ip_id: u16, rnd: bool, payload: &[u8]) -> Vec<u8> {
    let crc_calculators = CrcCalculators::new();
    let mut packet = vec![0xFD, 0x04, 0x00];
    push_static_part(&mut packet, spec);
    push_dynamic_part(&mut packet, spec, ip_id, rnd);
    packet.extend_from_slice(&sn.to_be_bytes());
    packet[2] = crc_calculators.crc8_with_zeroed_octet(&packet, 2);
    packet.extend_from_slice(payload);
    packet
}

/// Builds an IR packet for an IPv4-in-IPv4 tunnel flow. The outer spec's
/// protocol is forced to 4.
pub fn ir_packet_tunnel(
    outer: &FlowSpec,
    inner: &FlowSpec,
    sn: u16,
    outer_id: u16,
    inner_id: u16,
) -> Vec<u8> {
    let crc_calculators = CrcCalculators::new();
    let mut outer = *outer;
    outer.protocol = 4;
    let mut packet = vec![0xFD, 0x04, 0x00];
    push_static_part(&mut packet, &outer);
    push_static_part(&mut packet, inner);
    push_dynamic_part(&mut packet, &outer, outer_id, false);
    push_dynamic_part(&mut packet, inner, inner_id, false);
    packet.extend_from_slice(&sn.to_be_bytes());
    packet[2] = crc_calculators.crc8_with_zeroed_octet(&packet, 2);
    packet
}

/// The IPv4 header the decompressor is expected to rebuild.
pub fn expected_ipv4_header(spec: &FlowSpec, ip_id: u16, total_len: u16) -> [u8; 20] {
    let mut header = [0u8; 20];
    header[0] = 0x45;
    header[1] = spec.tos;
    header[2..4].copy_from_slice(&total_len.to_be_bytes());
    header[4..6].copy_from_slice(&ip_id.to_be_bytes());
    let flags_frag: u16 = if spec.df { 0x4000 } else { 0 };
    header[6..8].copy_from_slice(&flags_frag.to_be_bytes());
    header[8] = spec.ttl;
    header[9] = spec.protocol;
    header[12..16].copy_from_slice(&spec.src);
    header[16..20].copy_from_slice(&spec.dst);
    let checksum = ipv4_checksum(&header);
    header[10..12].copy_from_slice(&checksum.to_be_bytes());
    header
}

fn ipv4_checksum(header: &[u8; 20]) -> u16 {
    let mut sum: u32 = 0;
    for chunk in header.chunks(2) {
        sum += u16::from_be_bytes([chunk[0], chunk[1]]) as u32;
    }
    while sum > 0xFFFF {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }
    !(sum as u16)
}

/// CRC-3 over the expected uncompressed headers, as a UO-0/UO-1 carries it.
pub fn header_crc3(headers: &[u8]) -> u8 {
    CrcCalculators::new().crc3(headers)
}

/// CRC-7 over the expected uncompressed headers, as a UOR-2 carries it.
pub fn header_crc7(headers: &[u8]) -> u8 {
    CrcCalculators::new().crc7(headers)
}

/// Builds a UO-0 packet: `0 SN(4) CRC(3)`.
pub fn uo0_packet(sn: u16, crc3: u8) -> Vec<u8> {
    vec![((sn as u8 & 0x0F) << 3) | (crc3 & 0x07)]
}

/// Builds a UO-1 packet: `10 IP-ID(6)` then `SN(5) CRC(3)`.
pub fn uo1_packet(ip_id: u16, sn: u16, crc3: u8) -> Vec<u8> {
    vec![
        0x80 | (ip_id as u8 & 0x3F),
        ((sn as u8 & 0x1F) << 3) | (crc3 & 0x07),
    ]
}

/// Builds a UOR-2 packet: `110 SN(5)` then `X CRC(7)` plus an optional
/// extension.
pub fn uor2_packet(sn: u16, crc7: u8, extension: &[u8]) -> Vec<u8> {
    let mut packet = vec![0xC0 | (sn as u8 & 0x1F)];
    let x_bit = if extension.is_empty() { 0x00 } else { 0x80 };
    packet.push(x_bit | (crc7 & 0x7F));
    packet.extend_from_slice(extension);
    packet
}
