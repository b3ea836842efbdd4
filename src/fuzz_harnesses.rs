//! Fuzz testing harnesses for rohcdec components.
//!
//! Entry points for external fuzzers: each harness feeds fuzzer-generated
//! bytes into one parsing surface and must never panic, whatever the input.

use std::sync::Arc;

use crate::crc::CrcCalculators;
use crate::engine::{DecompressorConfig, RohcDecompEngine};
use crate::profiles::ip_only::parsing::parse_ext3;
use crate::profiles::ip_only::{detect_packet_type, IpOnlyProfile};
use crate::rfc3095::context::Rfc3095DecompContext;
use crate::trace::NullTraceSink;
use crate::types::ContextId;

/// Fuzzes the packet type detector over the first input byte.
pub fn ip_packet_type_harness(data: &[u8]) {
    if let Some(&first_byte) = data.first() {
        let _ = detect_packet_type(first_byte);
    }
}

/// Fuzzes the extension 3 parser against an established-looking context.
pub fn ip_ext3_harness(data: &[u8]) {
    let context = Rfc3095DecompContext::new(
        ContextId::new(0),
        crate::packet_defs::RohcProfile::IpOnly,
        16,
        false,
        crate::profiles::ip_only::parsing::parse_dynamic_ip,
        parse_ext3,
        Arc::new(NullTraceSink),
    );
    let mut bits = context.reset_extr_bits();
    let _ = parse_ext3(&context, data, &mut bits);
}

/// Fuzzes the full engine decompression path.
///
/// Pre-conditions a context with a known-good IR packet so the fuzzer input
/// also reaches the compressed-packet parsers, then feeds the input as a
/// follow-up packet.
pub fn engine_decompress_harness(data: &[u8]) {
    let mut engine =
        RohcDecompEngine::new(DecompressorConfig::default(), Arc::new(NullTraceSink));
    if engine
        .register_profile(Box::new(IpOnlyProfile::new()))
        .is_err()
    {
        return;
    }

    let crc_calculators = CrcCalculators::new();
    let mut ir = vec![
        0xFD, 0x04, 0x00,
        0x40, 17, 1, 1, 1, 1, 2, 2, 2, 2,
        0x00, 64, 0x30, 0x39, 0b1010_0000, 0x00,
        0x00, 0x01,
    ];
    ir[2] = crc_calculators.crc8_with_zeroed_octet(&ir, 2);

    let mut out = [0u8; 512];
    let _ = engine.decompress(&ir, &mut out);
    let _ = engine.decompress(data, &mut out);
}
