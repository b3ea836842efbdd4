//! Generic IP header flags/fields parsing for extension 3 (RFC 3095, 5.7.5).
//!
//! An extension 3 flags octet announces which IP header fields follow in the
//! variable field block. The octet layout is shared between the inner and the
//! outer header; only the meaning of the last bit differs (reserved for the
//! inner header, `I2` for the outer header), so that interpretation is left to
//! the caller.

use crate::cursor::PacketCursor;
use crate::error::{ParseContext, RohcParsingError};
use crate::rfc3095::bits::ExtractedIpBits;

/// TOS field present.
const HDR_FLAG_TOS: u8 = 0b1000_0000;
/// TTL field present.
const HDR_FLAG_TTL: u8 = 0b0100_0000;
/// Don't Fragment flag value.
const HDR_FLAG_DF: u8 = 0b0010_0000;
/// Protocol field present.
const HDR_FLAG_PR: u8 = 0b0001_0000;
/// IP extension header list present.
const HDR_FLAG_IPX: u8 = 0b0000_1000;
/// Network Byte Order flag value.
const HDR_FLAG_NBO: u8 = 0b0000_0100;
/// Random IP-ID flag value.
const HDR_FLAG_RND: u8 = 0b0000_0010;
/// Last bit: reserved (inner header) or I2 (outer header).
const HDR_FLAG_BIT0: u8 = 0b0000_0001;

/// Parses one IP header flags octet plus its field block.
///
/// `flags` is the octet recorded earlier in the extension; `fields` starts at
/// the current position of the variable field block. Field values land in
/// `ip_bits`; the last flag bit is returned for the caller to interpret.
///
/// # Returns
/// `(bit0, consumed)` where `consumed` counts field-block bytes only (the
/// flags octet was consumed where it was recorded).
///
/// # Errors
/// - `RohcParsingError::NotEnoughData` - Field block shorter than the flags announce
/// - `RohcParsingError::UnsupportedFeature` - IPX set (IP extension header lists)
pub fn parse_hdr_flags_fields(
    flags: u8,
    fields: &[u8],
    ip_bits: &mut ExtractedIpBits,
) -> Result<(bool, usize), RohcParsingError> {
    let mut cursor = PacketCursor::new(fields);

    if flags & HDR_FLAG_TOS != 0 {
        ip_bits.tos = cursor.read_u8(ParseContext::HdrFlagsFields)?;
        ip_bits.tos_nr = 8;
    }
    if flags & HDR_FLAG_TTL != 0 {
        ip_bits.ttl = cursor.read_u8(ParseContext::HdrFlagsFields)?;
        ip_bits.ttl_nr = 8;
    }
    if flags & HDR_FLAG_PR != 0 {
        ip_bits.proto = cursor.read_u8(ParseContext::HdrFlagsFields)?;
        ip_bits.proto_nr = 8;
    }
    if flags & HDR_FLAG_IPX != 0 {
        return Err(RohcParsingError::UnsupportedFeature {
            feature: "IP extension header list in extension 3",
        });
    }

    ip_bits.df = flags & HDR_FLAG_DF != 0;
    ip_bits.df_nr = 1;
    ip_bits.nbo = flags & HDR_FLAG_NBO != 0;
    ip_bits.nbo_nr = 1;
    ip_bits.rnd = flags & HDR_FLAG_RND != 0;
    ip_bits.rnd_nr = 1;

    Ok((flags & HDR_FLAG_BIT0 != 0, cursor.consumed()))
}

/// Parses the outer IP header flags octet plus its field block.
///
/// Identical to [`parse_hdr_flags_fields`] except that the last flag bit is
/// `I2`: when set, a 16-bit big-endian outer IP-ID trails the field block.
///
/// # Returns
/// The number of field-block bytes consumed.
pub fn parse_outer_hdr_flags_fields(
    flags: u8,
    fields: &[u8],
    ip_bits: &mut ExtractedIpBits,
) -> Result<usize, RohcParsingError> {
    let (i2, consumed) = parse_hdr_flags_fields(flags, fields, ip_bits)?;
    let mut cursor = PacketCursor::new(fields);
    cursor.skip(consumed, ParseContext::HdrFlagsFields)?;

    if i2 {
        ip_bits.id = cursor.read_u16_be(ParseContext::HdrFlagsFields)?;
        ip_bits.id_nr = 16;
        ip_bits.is_id_enc = true;
    }

    Ok(cursor.consumed())
}
