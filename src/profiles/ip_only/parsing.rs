//! Parsing hooks of the ROHC IP-only profile.
//!
//! Two sections of an IP-only packet are profile-specific rather than generic
//! RFC 3095 machinery: the tail of the dynamic chain (a bare 16-bit SN, since
//! there is no compressed transport header to follow the IP parts) and the
//! UOR-2 extension 3. Both are installed as hooks on the context at creation.

use crate::cursor::PacketCursor;
use crate::error::{IpHeaderPos, ParseContext, RohcParsingError};
use crate::rfc3095::bits::{append_sn_bits, is_ipv4_non_rnd_pkt, ExtractedBits};
use crate::rfc3095::context::Rfc3095DecompContext;
use crate::rfc3095::flags_fields::{parse_hdr_flags_fields, parse_outer_hdr_flags_fields};

use super::constants::{
    IP_EXT3_I_BIT, IP_EXT3_IP2_BIT, IP_EXT3_IP_BIT, IP_EXT3_MODE_MASK, IP_EXT3_MODE_SHIFT,
    IP_EXT3_S_BIT, IP_EXT3_SN_BITS,
};

/// Parses the IP-only part of a dynamic chain: the 16-bit master SN.
///
/// # Returns
/// The number of bytes read (always 2 on success).
///
/// # Errors
/// - `RohcParsingError::NotEnoughData` - Fewer than 2 bytes remain
pub fn parse_dynamic_ip(
    context: &Rfc3095DecompContext,
    data: &[u8],
    bits: &mut ExtractedBits,
) -> Result<usize, RohcParsingError> {
    let mut cursor = PacketCursor::new(data);
    let sn = cursor.read_u16_be(ParseContext::DynamicChainSn)?;
    bits.sn = sn;
    bits.sn_nr = 16;
    bits.is_sn_enc = false;
    context
        .trace
        .debug(&format!("SN = {} (0x{:04x})", sn, sn));
    Ok(cursor.consumed())
}

/// Parses the extension 3 of a UOR-2 packet.
///
/// Wire layout (RFC 3095, 5.7.5 and 5.11.4, non-RTP profiles):
///
/// ```text
///       0     1     2     3     4     5     6     7
///    +-----+-----+-----+-----+-----+-----+-----+-----+
/// 1  |  1     1  |  S  |   Mode    |  I  | ip  | ip2 |
///    +-----+-----+-----+-----+-----+-----+-----+-----+
/// 2  |            Inner IP header flags        |     |  if ip = 1
///    +-----+-----+-----+-----+-----+-----+-----+-----+
/// 3  |            Outer IP header flags              |  if ip2 = 1
///    +-----+-----+-----+-----+-----+-----+-----+-----+
/// 4  |                      SN                       |  if S = 1
///    +-----+-----+-----+-----+-----+-----+-----+-----+
/// 5  /            Inner IP header fields             /  if ip = 1
///    +-----+-----+-----+-----+-----+-----+-----+-----+
/// 6  |                     IP-ID                     |  2 octets, if I = 1
///    +-----+-----+-----+-----+-----+-----+-----+-----+
/// 7  /            Outer IP header fields             /  if ip2 = 1
///    +-----+-----+-----+-----+-----+-----+-----+-----+
/// ```
///
/// With a single IP header in the flow, the "inner" flags and fields of
/// octets 2 and 5 describe that only header, which the extracted-bits record
/// calls the outer one. The routing below follows `bits.multiple_ip`.
///
/// The 16-bit IP-ID of octet 6 is read in wire order but assigned only after
/// the outer field block: the outer flags octet may rewrite the outer RND
/// flag, and assigning earlier would route the IP-ID on stale RND state.
///
/// # Returns
/// The number of extension bytes consumed.
///
/// # Errors
/// - `RohcParsingError::NotEnoughData` - Truncated extension
/// - `RohcParsingError::MalformedMode` - Mode bits zero (strict mode)
/// - `RohcParsingError::MalformedReservedFlag` - Inner reserved bit set (strict mode)
/// - `RohcParsingError::IpIdAlreadySet` - IP-ID target already carried bits (strict mode)
/// - `RohcParsingError::NoIpIdTarget` - `I = 1` with no eligible header
pub fn parse_ext3(
    context: &Rfc3095DecompContext,
    data: &[u8],
    bits: &mut ExtractedBits,
) -> Result<usize, RohcParsingError> {
    let mut cursor = PacketCursor::new(data);

    let flags = cursor.read_u8(ParseContext::Ext3Flags)?;
    let s = flags & IP_EXT3_S_BIT != 0;
    bits.mode = (flags & IP_EXT3_MODE_MASK) >> IP_EXT3_MODE_SHIFT;
    bits.mode_nr = 2;
    if bits.mode == 0 {
        context.trace.warning(
            "malformed ROHC packet: mode bits in extension 3 are zero, a value \
             reserved for future use by RFC 3095",
        );
        if context.strict {
            return Err(RohcParsingError::MalformedMode);
        }
    }
    let i = flags & IP_EXT3_I_BIT != 0;
    let ip = flags & IP_EXT3_IP_BIT != 0;
    let ip2 = flags & IP_EXT3_IP2_BIT != 0;
    context.trace.debug(&format!(
        "S = {}, mode = 0x{:x}, I = {}, ip = {}, ip2 = {}",
        u8::from(s),
        bits.mode,
        u8::from(i),
        u8::from(ip),
        u8::from(ip2)
    ));

    // The three optional single-octet fields that follow the flags octet.
    cursor.require(
        usize::from(ip) + usize::from(ip2) + usize::from(s),
        ParseContext::Ext3FlagOctets,
    )?;

    // Flag octets are recorded now and interpreted after the SN octet, when
    // their field blocks arrive. With stacked headers the first octet
    // describes the inner header; with a single header it describes the one
    // header, held in the outer record.
    let mut ip_flags_octet = 0u8;
    let mut ip2_flags_octet = 0u8;
    if ip {
        let octet = cursor.read_u8(ParseContext::Ext3FlagOctets)?;
        if bits.multiple_ip {
            ip2_flags_octet = octet;
        } else {
            ip_flags_octet = octet;
        }
    }
    if ip2 {
        ip_flags_octet = cursor.read_u8(ParseContext::Ext3FlagOctets)?;
    }

    if s {
        let sn_octet = cursor.read_u8(ParseContext::Ext3FlagOctets)?;
        append_sn_bits(bits, sn_octet as u16, IP_EXT3_SN_BITS)?;
    }

    if ip {
        let read = if bits.multiple_ip {
            parse_inner_hdr_flags_fields(context, ip2_flags_octet, cursor.rest(), bits, true)?
        } else {
            parse_inner_hdr_flags_fields(context, ip_flags_octet, cursor.rest(), bits, false)?
        };
        cursor.skip(read, ParseContext::HdrFlagsFields)?;
    }

    // Read the IP-ID but defer its assignment past the outer field block; the
    // outer flags may still change which header counts as non-random.
    let i_bits = if i {
        cursor.read_u16_be(ParseContext::Ext3IpId)?
    } else {
        0
    };

    if ip2 {
        let read = parse_outer_hdr_flags_fields(ip_flags_octet, cursor.rest(), &mut bits.outer_ip)?;
        cursor.skip(read, ParseContext::HdrFlagsFields)?;
    }

    if i {
        assign_ext3_ip_id(context, bits, i_bits)?;
    }

    Ok(cursor.consumed())
}

/// Assigns the extension 3 IP-ID to the innermost IPv4 header whose
/// packet-level state says its IP-ID is not random.
fn assign_ext3_ip_id(
    context: &Rfc3095DecompContext,
    bits: &mut ExtractedBits,
    i_bits: u16,
) -> Result<(), RohcParsingError> {
    let (header, target) = if bits.multiple_ip && is_ipv4_non_rnd_pkt(&bits.inner_ip) {
        (IpHeaderPos::Inner, &mut bits.inner_ip)
    } else if is_ipv4_non_rnd_pkt(&bits.outer_ip) {
        (IpHeaderPos::Outer, &mut bits.outer_ip)
    } else {
        context.trace.warning(
            "extension 3 cannot contain IP-ID bits because no IP header is \
             IPv4 with non-random IP-ID",
        );
        return Err(RohcParsingError::NoIpIdTarget);
    };

    // A zero-valued earlier assignment counts as unset.
    if target.id_nr > 0 && target.id != 0 {
        context.trace.warning(&format!(
            "IP-ID field present (I = 1) but {} IP-ID already updated",
            header
        ));
        if context.strict {
            return Err(RohcParsingError::IpIdAlreadySet { header });
        }
    }
    target.id = i_bits;
    target.id_nr = 16;
    target.is_id_enc = true;
    Ok(())
}

/// Parses an inner IP header flags octet and its field block.
///
/// Thin wrapper over the generic parser: the inner octet's last bit is
/// reserved and shall be zero.
///
/// # Returns
/// The number of field-block bytes consumed.
pub(crate) fn parse_inner_hdr_flags_fields(
    context: &Rfc3095DecompContext,
    flags_octet: u8,
    fields: &[u8],
    bits: &mut ExtractedBits,
    into_inner: bool,
) -> Result<usize, RohcParsingError> {
    let ip_bits = if into_inner {
        &mut bits.inner_ip
    } else {
        &mut bits.outer_ip
    };
    let (reserved_flag, read) = parse_hdr_flags_fields(flags_octet, fields, ip_bits)?;
    if reserved_flag {
        context
            .trace
            .warning("malformed ROHC header flags: reserved field shall be zero");
        if context.strict {
            return Err(RohcParsingError::MalformedReservedFlag);
        }
    }
    Ok(read)
}
