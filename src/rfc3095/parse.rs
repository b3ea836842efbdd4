//! Generic packet parsing for the RFC 3095 family profiles.
//!
//! Dispatches on the detected packet type and fills the volatile
//! extracted-bits record. Profile-specific sections (the next-header part of
//! a dynamic chain, extension 3) are reached through the hooks the profile
//! wired into the context at creation.

use std::net::Ipv4Addr;

use crate::constants::IP_PROTOCOL_IPIP;
use crate::crc::CrcCalculators;
use crate::cursor::PacketCursor;
use crate::error::{
    CrcType, DecompressionError, ParseContext, RohcError, RohcParsingError,
};
use crate::packet_defs::RohcPacketType;
use crate::rfc3095::bits::{is_ipv4_non_rnd_pkt, ExtractedBits, ExtractedIpBits};
use crate::rfc3095::context::Rfc3095DecompContext;

/// Position of the CRC-8 octet inside an IR or IR-DYN packet.
const IR_CRC_OCTET_POS: usize = 2;

/// Extension type discriminator: top two bits of the first extension octet.
const EXT_TYPE_MASK: u8 = 0b1100_0000;
const EXT_TYPE_0: u8 = 0b0000_0000;
const EXT_TYPE_1: u8 = 0b0100_0000;
const EXT_TYPE_2: u8 = 0b1000_0000;

/// Parses one core packet into `bits`.
///
/// # Returns
/// The number of header bytes consumed; the remainder of `packet` is payload.
///
/// # Errors
/// - `RohcError::Parsing` - Malformed or truncated packet
/// - `RohcError::Decompression(InvalidPacketType)` - Compressed packet before
///   any IR established the context
pub fn parse_packet(
    context: &Rfc3095DecompContext,
    packet_type: RohcPacketType,
    packet: &[u8],
    bits: &mut ExtractedBits,
    crc_calculators: &CrcCalculators,
) -> Result<usize, RohcError> {
    match packet_type {
        RohcPacketType::Ir => {
            let dynamic_present = packet
                .first()
                .is_some_and(|b| b & crate::constants::ROHC_GENERIC_IR_D_BIT_MASK != 0);
            parse_ir(context, packet, bits, crc_calculators, true, dynamic_present)
        }
        RohcPacketType::IrDyn => {
            require_valid_context(context, packet)?;
            parse_ir(context, packet, bits, crc_calculators, false, true)
        }
        RohcPacketType::Uo0 => {
            require_valid_context(context, packet)?;
            parse_uo0(packet, bits).map_err(RohcError::from)
        }
        RohcPacketType::Uo1 => {
            require_valid_context(context, packet)?;
            parse_uo1(packet, bits).map_err(RohcError::from)
        }
        RohcPacketType::Uor2 => {
            require_valid_context(context, packet)?;
            parse_uor2(context, packet, bits).map_err(RohcError::from)
        }
        RohcPacketType::Unknown(discriminator) => {
            context.trace.warning(&format!(
                "failed to recognize the packet type in byte 0x{discriminator:02x}"
            ));
            Err(RohcError::Parsing(RohcParsingError::InvalidPacketType {
                discriminator,
                profile_id: Some(context.profile_id.into()),
            }))
        }
    }
}

/// Compressed packets are meaningless until an IR established the context.
fn require_valid_context(
    context: &Rfc3095DecompContext,
    packet: &[u8],
) -> Result<(), RohcError> {
    if context.ctxt_valid {
        return Ok(());
    }
    Err(RohcError::Decompression(
        DecompressionError::InvalidPacketType {
            cid: context.cid,
            packet_type: packet.first().copied().unwrap_or(0),
        },
    ))
}

/// Parses an IR (`with_static = true`) or IR-DYN packet.
///
/// Layout: type octet, profile octet, CRC-8 octet, static chain (IR only),
/// dynamic chain (IR with D-bit, IR-DYN always), profile next-header part.
/// The CRC-8 covers every header byte with the CRC octet zeroed.
fn parse_ir(
    context: &Rfc3095DecompContext,
    packet: &[u8],
    bits: &mut ExtractedBits,
    crc_calculators: &CrcCalculators,
    with_static: bool,
    with_dynamic: bool,
) -> Result<usize, RohcError> {
    let mut cursor = PacketCursor::new(packet);
    cursor.skip(1, ParseContext::IrPacketPreamble)?;

    let profile_octet = cursor.read_u8(ParseContext::IrPacketPreamble)?;
    if crate::packet_defs::RohcProfile::from(profile_octet) != context.profile_id {
        return Err(RohcError::Parsing(RohcParsingError::InvalidProfileId(
            profile_octet,
        )));
    }
    let received_crc = cursor.read_u8(ParseContext::IrPacketPreamble)?;
    bits.crc = received_crc;
    bits.crc_nr = 8;

    if with_static {
        parse_static_chain(&mut cursor, bits)?;
    }
    if with_dynamic {
        parse_dynamic_chain(context, &mut cursor, bits)?;
    }

    let calculated =
        crc_calculators.crc8_with_zeroed_octet(&packet[..cursor.consumed()], IR_CRC_OCTET_POS);
    if calculated != received_crc {
        return Err(RohcError::Parsing(RohcParsingError::CrcMismatch {
            expected: received_crc,
            calculated,
            crc_type: CrcType::Rohc8,
        }));
    }

    Ok(cursor.consumed())
}

/// Parses the static chain: one IPv4 static part per IP header.
///
/// A protocol value of 4 (IP-in-IP) chains a second static part and marks the
/// flow as carrying stacked headers.
fn parse_static_chain(
    cursor: &mut PacketCursor<'_>,
    bits: &mut ExtractedBits,
) -> Result<(), RohcParsingError> {
    bits.multiple_ip = false;
    parse_static_ip_part(cursor, &mut bits.outer_ip)?;
    if bits.outer_ip.proto == IP_PROTOCOL_IPIP {
        parse_static_ip_part(cursor, &mut bits.inner_ip)?;
        bits.multiple_ip = true;
        if bits.inner_ip.proto == IP_PROTOCOL_IPIP {
            return Err(RohcParsingError::UnsupportedFeature {
                feature: "more than two stacked IP headers",
            });
        }
    }
    Ok(())
}

/// IPv4 static part: version nibble, protocol, source and destination address.
fn parse_static_ip_part(
    cursor: &mut PacketCursor<'_>,
    ip_bits: &mut ExtractedIpBits,
) -> Result<(), RohcParsingError> {
    let version_octet = cursor.read_u8(ParseContext::IrStaticChain)?;
    let version = version_octet >> 4;
    if version != 4 {
        return Err(RohcParsingError::InvalidIpVersion {
            expected: 4,
            got: version,
        });
    }
    ip_bits.version = 4;
    ip_bits.proto = cursor.read_u8(ParseContext::IrStaticChain)?;
    ip_bits.proto_nr = 8;
    ip_bits.saddr = Some(Ipv4Addr::from(
        cursor.read_array::<4>(ParseContext::IrStaticChain)?,
    ));
    ip_bits.daddr = Some(Ipv4Addr::from(
        cursor.read_array::<4>(ParseContext::IrStaticChain)?,
    ));
    Ok(())
}

/// Parses the dynamic chain: one IPv4 dynamic part per IP header, then the
/// profile's next-header part (the 16-bit SN for IP-only).
fn parse_dynamic_chain(
    context: &Rfc3095DecompContext,
    cursor: &mut PacketCursor<'_>,
    bits: &mut ExtractedBits,
) -> Result<(), RohcError> {
    let multiple_ip = bits.multiple_ip;
    parse_dynamic_ip_part(cursor, &mut bits.outer_ip)?;
    if multiple_ip {
        parse_dynamic_ip_part(cursor, &mut bits.inner_ip)?;
    }

    let read = (context.parse_dyn_next_hdr)(context, cursor.rest(), bits)?;
    cursor.skip(read, ParseContext::IrDynamicChain)?;
    Ok(())
}

/// IPv4 dynamic part: TOS, TTL, IP-ID, DF/RND/NBO flags octet, and the
/// generic extension header list (only the empty encoding is supported).
fn parse_dynamic_ip_part(
    cursor: &mut PacketCursor<'_>,
    ip_bits: &mut ExtractedIpBits,
) -> Result<(), RohcParsingError> {
    ip_bits.tos = cursor.read_u8(ParseContext::IrDynamicChain)?;
    ip_bits.tos_nr = 8;
    ip_bits.ttl = cursor.read_u8(ParseContext::IrDynamicChain)?;
    ip_bits.ttl_nr = 8;
    ip_bits.id = cursor.read_u16_be(ParseContext::IrDynamicChain)?;
    ip_bits.id_nr = 16;
    ip_bits.is_id_enc = false;

    let flags = cursor.read_u8(ParseContext::IrDynamicChain)?;
    ip_bits.df = flags & 0b1000_0000 != 0;
    ip_bits.df_nr = 1;
    ip_bits.rnd = flags & 0b0100_0000 != 0;
    ip_bits.rnd_nr = 1;
    ip_bits.nbo = flags & 0b0010_0000 != 0;
    ip_bits.nbo_nr = 1;

    let ext_list = cursor.read_u8(ParseContext::IrDynamicChain)?;
    if ext_list != 0 {
        return Err(RohcParsingError::UnsupportedFeature {
            feature: "generic extension header list in dynamic chain",
        });
    }
    Ok(())
}

/// UO-0: `0 SN(4) CRC(3)` in one octet.
fn parse_uo0(packet: &[u8], bits: &mut ExtractedBits) -> Result<usize, RohcParsingError> {
    let mut cursor = PacketCursor::new(packet);
    let octet = cursor.read_u8(ParseContext::Uo0Packet)?;
    bits.sn = ((octet >> 3) & 0x0F) as u16;
    bits.sn_nr = 4;
    bits.is_sn_enc = true;
    bits.crc = octet & 0x07;
    bits.crc_nr = 3;
    Ok(cursor.consumed())
}

/// UO-1 (non-RTP): `10 IP-ID(6)` then `SN(5) CRC(3)`.
fn parse_uo1(packet: &[u8], bits: &mut ExtractedBits) -> Result<usize, RohcParsingError> {
    let mut cursor = PacketCursor::new(packet);
    let first = cursor.read_u8(ParseContext::Uo1Packet)?;
    let second = cursor.read_u8(ParseContext::Uo1Packet)?;

    let target = innermost_non_rnd_ip(bits)?;
    target.id = (first & 0x3F) as u16;
    target.id_nr = 6;
    target.is_id_enc = true;

    bits.sn = (second >> 3) as u16;
    bits.sn_nr = 5;
    bits.is_sn_enc = true;
    bits.crc = second & 0x07;
    bits.crc_nr = 3;
    Ok(cursor.consumed())
}

/// UOR-2 (non-RTP): `110 SN(5)` then `X CRC(7)`, then an optional extension.
fn parse_uor2(
    context: &Rfc3095DecompContext,
    packet: &[u8],
    bits: &mut ExtractedBits,
) -> Result<usize, RohcParsingError> {
    let mut cursor = PacketCursor::new(packet);
    let first = cursor.read_u8(ParseContext::Uor2Packet)?;
    let second = cursor.read_u8(ParseContext::Uor2Packet)?;

    bits.sn = (first & 0x1F) as u16;
    bits.sn_nr = 5;
    bits.is_sn_enc = true;
    bits.crc = second & 0x7F;
    bits.crc_nr = 7;

    let extension_present = second & 0x80 != 0;
    if extension_present {
        parse_uor2_extension(context, &mut cursor, bits)?;
    }
    Ok(cursor.consumed())
}

/// Dispatches on the extension type in the top two bits of the first
/// extension octet. Extensions 0-2 are parsed inline; extension 3 goes
/// through the profile hook.
fn parse_uor2_extension(
    context: &Rfc3095DecompContext,
    cursor: &mut PacketCursor<'_>,
    bits: &mut ExtractedBits,
) -> Result<(), RohcParsingError> {
    use crate::rfc3095::bits::append_sn_bits;

    let type_octet = cursor.peek_u8(ParseContext::Uor2Extension)?;
    match type_octet & EXT_TYPE_MASK {
        EXT_TYPE_0 => {
            let octet = cursor.read_u8(ParseContext::Uor2Extension)?;
            append_sn_bits(bits, ((octet >> 3) & 0x07) as u16, 3)?;
            let target = innermost_non_rnd_ip(bits)?;
            target.id = (octet & 0x07) as u16;
            target.id_nr = 3;
            target.is_id_enc = true;
        }
        EXT_TYPE_1 => {
            let octet = cursor.read_u8(ParseContext::Uor2Extension)?;
            let id_octet = cursor.read_u8(ParseContext::Uor2Extension)?;
            append_sn_bits(bits, ((octet >> 3) & 0x07) as u16, 3)?;
            let target = innermost_non_rnd_ip(bits)?;
            target.id = (((octet & 0x07) as u16) << 8) | id_octet as u16;
            target.id_nr = 11;
            target.is_id_enc = true;
        }
        EXT_TYPE_2 => {
            let octet = cursor.read_u8(ParseContext::Uor2Extension)?;
            let id2_octet = cursor.read_u8(ParseContext::Uor2Extension)?;
            let id_octet = cursor.read_u8(ParseContext::Uor2Extension)?;
            append_sn_bits(bits, ((octet >> 3) & 0x07) as u16, 3)?;
            // IP-ID2 addresses the outer header of a stacked flow.
            bits.outer_ip.id = (((octet & 0x07) as u16) << 8) | id2_octet as u16;
            bits.outer_ip.id_nr = 11;
            bits.outer_ip.is_id_enc = true;
            let target = innermost_non_rnd_ip(bits)?;
            target.id = id_octet as u16;
            target.id_nr = 8;
            target.is_id_enc = true;
        }
        _ => {
            let read = (context.parse_ext3)(context, cursor.rest(), bits)?;
            cursor.skip(read, ParseContext::Uor2Extension)?;
        }
    }
    Ok(())
}

/// Routes IP-ID bits to the innermost IPv4 header with a non-random IP-ID.
fn innermost_non_rnd_ip(
    bits: &mut ExtractedBits,
) -> Result<&mut ExtractedIpBits, RohcParsingError> {
    if bits.multiple_ip && is_ipv4_non_rnd_pkt(&bits.inner_ip) {
        Ok(&mut bits.inner_ip)
    } else if is_ipv4_non_rnd_pkt(&bits.outer_ip) {
        Ok(&mut bits.outer_ip)
    } else {
        Err(RohcParsingError::NoIpIdTarget)
    }
}
