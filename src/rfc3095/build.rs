//! Header reconstruction and CRC verification for RFC 3095 family profiles.
//!
//! Rebuilds the uncompressed IPv4 header stream from decoded values, appends
//! the payload, and verifies the header CRC a UO packet carried against the
//! rebuilt bytes. On a CRC miss, a bounded SN candidate search can repair
//! contexts that drifted by a few lost packets.

use crate::constants::{IPV4_MIN_HEADER_LENGTH_BYTES, IPV4_STANDARD_IHL};
use crate::crc::CrcCalculators;
use crate::error::{
    CrcType, DecompressionError, RohcBuildingError, RohcError, RohcParsingError,
};
use crate::rfc3095::bits::ExtractedBits;
use crate::rfc3095::context::Rfc3095DecompContext;
use crate::rfc3095::decode::{decode_with_sn, DecodedHeaders, DecodedIpHeader};
use crate::types::SequenceNumber;

/// Forward SN candidates tried during CRC repair.
const REPAIR_FORWARD_WINDOW: u16 = 32;
/// Backward SN candidates tried during CRC repair.
const REPAIR_BACKWARD_WINDOW: u16 = 8;

/// Writes the reconstructed header stream plus payload into `out`.
///
/// When the packet carried a 3- or 7-bit header CRC, the rebuilt header bytes
/// are checked against it before anything is considered delivered. The 8-bit
/// IR CRC is not re-checked here: it covers the ROHC packet itself and was
/// verified during parsing.
///
/// # Returns
/// Total number of bytes written (headers plus payload).
///
/// # Errors
/// - `RohcError::Building` - `out` cannot hold the reconstructed packet
/// - `RohcError::Parsing(CrcMismatch)` - Rebuilt headers disagree with the CRC
pub fn build_headers(
    decoded: &DecodedHeaders,
    bits: &ExtractedBits,
    payload: &[u8],
    out: &mut [u8],
    crc_calculators: &CrcCalculators,
) -> Result<usize, RohcError> {
    let header_count = 1 + usize::from(decoded.inner.is_some());
    let headers_len = header_count * IPV4_MIN_HEADER_LENGTH_BYTES;
    let total_len = headers_len + payload.len();
    if out.len() < total_len {
        return Err(RohcError::Building(RohcBuildingError::BufferTooSmall {
            needed: total_len,
            available: out.len(),
        }));
    }

    // Outer header's total length covers everything behind it, including a
    // tunnelled inner header.
    let outer_payload_len = total_len - IPV4_MIN_HEADER_LENGTH_BYTES;
    write_ipv4_header(&decoded.outer, outer_payload_len, &mut out[..20]);
    if let Some(inner) = &decoded.inner {
        write_ipv4_header(inner, payload.len(), &mut out[20..40]);
    }
    out[headers_len..total_len].copy_from_slice(payload);

    verify_header_crc(bits, &out[..headers_len], crc_calculators)?;

    Ok(total_len)
}

/// Checks a UO packet's received header CRC against the rebuilt headers.
fn verify_header_crc(
    bits: &ExtractedBits,
    headers: &[u8],
    crc_calculators: &CrcCalculators,
) -> Result<(), RohcParsingError> {
    let (calculated, crc_type) = match bits.crc_nr {
        3 => (crc_calculators.crc3(headers), CrcType::Rohc3),
        7 => (crc_calculators.crc7(headers), CrcType::Rohc7),
        _ => return Ok(()),
    };
    if calculated != bits.crc {
        return Err(RohcParsingError::CrcMismatch {
            expected: bits.crc,
            calculated,
            crc_type,
        });
    }
    Ok(())
}

/// Emits one 20-byte IPv4 header into `out`.
///
/// A cleared NBO flag means the compressor observed the IP-ID byte-swapped;
/// the reconstruction swaps it back.
fn write_ipv4_header(decoded: &DecodedIpHeader, payload_len: usize, out: &mut [u8]) {
    debug_assert_eq!(out.len(), IPV4_MIN_HEADER_LENGTH_BYTES);

    let total_length = (IPV4_MIN_HEADER_LENGTH_BYTES + payload_len) as u16;
    out[0] = 0x40 | IPV4_STANDARD_IHL;
    out[1] = decoded.tos;
    out[2..4].copy_from_slice(&total_length.to_be_bytes());
    let id_bytes = if decoded.nbo {
        decoded.ip_id.value().to_be_bytes()
    } else {
        decoded.ip_id.value().to_le_bytes()
    };
    out[4..6].copy_from_slice(&id_bytes);
    let flags_frag: u16 = if decoded.df { 0x4000 } else { 0x0000 };
    out[6..8].copy_from_slice(&flags_frag.to_be_bytes());
    out[8] = decoded.ttl;
    out[9] = decoded.protocol;
    out[10..12].copy_from_slice(&[0, 0]);
    out[12..16].copy_from_slice(&decoded.src_addr.octets());
    out[16..20].copy_from_slice(&decoded.dst_addr.octets());
    let checksum = ipv4_header_checksum(&out[..20]);
    out[10..12].copy_from_slice(&checksum.to_be_bytes());
}

/// Standard one's-complement IPv4 header checksum (checksum field zeroed).
fn ipv4_header_checksum(header: &[u8]) -> u16 {
    let mut sum: u32 = 0;
    for chunk in header.chunks(2) {
        let word = u16::from_be_bytes([chunk[0], *chunk.get(1).unwrap_or(&0)]);
        sum += word as u32;
    }
    while sum > 0xFFFF {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }
    !(sum as u16)
}

/// Attempts SN-based recovery after a header CRC mismatch.
///
/// Lost packets advance the compressor's SN past the decompressor's window
/// reference; the true SN then differs from the LSB interpretation but still
/// matches the received LSBs. The search walks candidates around the expected
/// next SN, keeps only those agreeing with the received LSBs, and accepts the
/// first whose rebuilt headers match the received CRC.
///
/// # Errors
/// - `RohcError::Decompression(CrcRepairFailed)` - No candidate matched
pub fn attempt_repair(
    context: &Rfc3095DecompContext,
    bits: &ExtractedBits,
    payload: &[u8],
    out: &mut [u8],
    crc_calculators: &CrcCalculators,
) -> Result<(DecodedHeaders, usize), RohcError> {
    let repair_failed = || {
        RohcError::Decompression(DecompressionError::CrcRepairFailed { cid: context.cid })
    };

    // Only LSB-encoded SNs can be mis-resolved; absolute SNs and CRC-8
    // packets have nothing to repair.
    if !context.ctxt_valid || !bits.is_sn_enc || bits.sn_nr == 0 || bits.sn_nr >= 16 {
        return Err(repair_failed());
    }
    if bits.crc_nr != 3 && bits.crc_nr != 7 {
        return Err(repair_failed());
    }

    let lsb_mask = (1u16 << bits.sn_nr) - 1;
    let expected_next = context.last_sn.wrapping_add(1);

    let forward = (1..=REPAIR_FORWARD_WINDOW).map(|off| expected_next.wrapping_add(off - 1));
    let backward = (1..=REPAIR_BACKWARD_WINDOW)
        .map(|off| SequenceNumber::new(context.last_sn.value().wrapping_sub(off)));

    for candidate in forward.chain(backward) {
        if candidate.value() & lsb_mask != bits.sn {
            continue;
        }
        let decoded = match decode_with_sn(context, bits, candidate) {
            Ok(decoded) => decoded,
            Err(_) => continue,
        };
        match build_headers(&decoded, bits, payload, out, crc_calculators) {
            Ok(written) => return Ok((decoded, written)),
            Err(RohcError::Parsing(RohcParsingError::CrcMismatch { .. })) => continue,
            Err(e) => return Err(e),
        }
    }

    Err(repair_failed())
}
