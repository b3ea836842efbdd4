//! Per-packet extracted-bits records for the RFC 3095 family profiles.
//!
//! Parsing never touches the persistent context: every field bit recovered
//! from a packet lands in [`ExtractedBits`] first, gets decoded against the
//! context in a second phase, and is only committed to the context after the
//! rebuilt headers pass their CRC.

use std::net::Ipv4Addr;

use crate::error::{Field, RohcParsingError};

/// Field bits extracted for one IP header of the current packet.
///
/// Each value field travels with a companion `*_nr` bit count; a count of zero
/// means the packet did not carry the field and the decoder falls back to the
/// context. `rnd`/`nbo` are seeded from the context before parsing so that
/// flag-dependent routing decisions (notably the extension 3 IP-ID target) see
/// the freshest value even when the packet does not update the flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtractedIpBits {
    /// IP version of this header (4 for every header this crate decodes).
    pub version: u8,
    /// Source address, present only in IR static chains.
    pub saddr: Option<Ipv4Addr>,
    /// Destination address, present only in IR static chains.
    pub daddr: Option<Ipv4Addr>,
    /// Protocol / next header value.
    pub proto: u8,
    /// Number of valid bits in `proto` (0 or 8).
    pub proto_nr: u8,
    /// Type of service.
    pub tos: u8,
    /// Number of valid bits in `tos` (0 or 8).
    pub tos_nr: u8,
    /// Time to live.
    pub ttl: u8,
    /// Number of valid bits in `ttl` (0 or 8).
    pub ttl_nr: u8,
    /// IP-ID bits.
    pub id: u16,
    /// Number of valid bits in `id` (0 to 16).
    pub id_nr: u8,
    /// Whether `id` is network-order encoded data rather than offset bits.
    pub is_id_enc: bool,
    /// Don't Fragment flag.
    pub df: bool,
    /// Number of valid bits in `df` (0 or 1).
    pub df_nr: u8,
    /// Network Byte Order flag for the IP-ID.
    pub nbo: bool,
    /// Number of valid bits in `nbo` (0 or 1).
    pub nbo_nr: u8,
    /// Random IP-ID flag.
    pub rnd: bool,
    /// Number of valid bits in `rnd` (0 or 1).
    pub rnd_nr: u8,
}

/// Everything one packet communicated, before decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtractedBits {
    /// SN bits (absolute or LSB-encoded, see `is_sn_enc`).
    pub sn: u16,
    /// Number of valid bits in `sn` (0, or up to 16).
    pub sn_nr: u8,
    /// Whether `sn` holds W-LSB encoded bits (`true`) or an absolute value.
    pub is_sn_enc: bool,
    /// Compression mode bits from extension 3.
    pub mode: u8,
    /// Number of valid bits in `mode` (0 or 2).
    pub mode_nr: u8,
    /// Whether the flow stacks two IP headers. Latched from the context before
    /// parsing, or set by an IR static chain carrying an IP-in-IP tunnel.
    pub multiple_ip: bool,
    /// Received header CRC bits.
    pub crc: u8,
    /// Number of valid bits in `crc` (0, 3, 7 or 8).
    pub crc_nr: u8,
    /// Bits of the first (or only) IP header.
    pub outer_ip: ExtractedIpBits,
    /// Bits of the second IP header, meaningful when `multiple_ip` is set.
    pub inner_ip: ExtractedIpBits,
}

/// Appends `k` freshly received SN bits to the bits collected so far.
///
/// This is the LSB-append protocol: a UOR-2 base header contributes 5 SN bits,
/// an extension may left-extend them with more significant bits. The combined
/// value stays LSB-encoded.
///
/// # Errors
/// - `RohcParsingError::InvalidLsbOperation` - Total would exceed the 16-bit SN
pub fn append_sn_bits(
    bits: &mut ExtractedBits,
    lsbs: u16,
    k: u8,
) -> Result<(), RohcParsingError> {
    let total = bits.sn_nr + k;
    if total > 16 {
        return Err(RohcParsingError::InvalidLsbOperation {
            field: Field::SnLsb,
            description: format!(
                "SN bit append overflows: {} bits collected, {} more received.",
                bits.sn_nr, k
            ),
        });
    }
    let combined = ((bits.sn as u32) << k) | (lsbs as u32 & ((1u32 << k) - 1));
    bits.sn = combined as u16;
    bits.sn_nr = total;
    bits.is_sn_enc = true;
    Ok(())
}

/// Whether this header's bit-level state says "IPv4 with non-random IP-ID".
///
/// The RND value consulted here is the packet's view: seeded from the context
/// and possibly overwritten by a flags octet parsed earlier in this packet.
pub fn is_ipv4_non_rnd_pkt(bits: &ExtractedIpBits) -> bool {
    bits.version == 4 && !bits.rnd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_sn_bits_left_extends() {
        let mut bits = ExtractedBits {
            sn: 0b10110,
            sn_nr: 5,
            is_sn_enc: true,
            ..Default::default()
        };
        append_sn_bits(&mut bits, 0xA5, 8).unwrap();
        assert_eq!(bits.sn, (0b10110 << 8) | 0xA5);
        assert_eq!(bits.sn_nr, 13);
        assert!(bits.is_sn_enc);
    }

    #[test]
    fn append_sn_bits_marks_encoded() {
        let mut bits = ExtractedBits::default();
        append_sn_bits(&mut bits, 0x55, 8).unwrap();
        assert_eq!(bits.sn, 0x55);
        assert_eq!(bits.sn_nr, 8);
        assert!(bits.is_sn_enc);
    }

    #[test]
    fn append_sn_bits_rejects_overflow() {
        let mut bits = ExtractedBits {
            sn_nr: 16,
            ..Default::default()
        };
        assert!(append_sn_bits(&mut bits, 1, 1).is_err());
    }

    #[test]
    fn append_sn_bits_masks_extra_bits() {
        let mut bits = ExtractedBits::default();
        append_sn_bits(&mut bits, 0xFF, 3).unwrap();
        assert_eq!(bits.sn, 0b111);
        assert_eq!(bits.sn_nr, 3);
    }

    #[test]
    fn ipv4_non_rnd_predicate() {
        let mut ip = ExtractedIpBits {
            version: 4,
            ..Default::default()
        };
        assert!(is_ipv4_non_rnd_pkt(&ip));
        ip.rnd = true;
        assert!(!is_ipv4_non_rnd_pkt(&ip));
        ip.rnd = false;
        ip.version = 6;
        assert!(!is_ipv4_non_rnd_pkt(&ip));
    }
}
