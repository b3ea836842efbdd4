//! Generic ROHC (Robust Header Compression) protocol constants and bitmasks.
//!
//! Defines constants broadly applicable across the ROHC framework or standard
//! protocol identifiers used by multiple ROHC profiles. Profile-specific
//! constants should reside within their respective profile modules.

// --- ROHC Packet Structure Constants (RFC 3095, Sec 5.2.3) ---

/// Mask for the prefix of an Add-CID octet (`1110xxxx`).
pub const ROHC_ADD_CID_PREFIX_MASK: u8 = 0b1111_0000; // F0
/// Expected prefix value for an Add-CID octet.
pub const ROHC_ADD_CID_PREFIX_VALUE: u8 = 0b1110_0000; // E0
/// Mask to extract the small CID (0-15) from an Add-CID octet.
pub const ROHC_SMALL_CID_MASK: u8 = 0x0F;

/// Base value for generic IR packet type discriminators (bits 7-1: `1111110`).
pub const ROHC_GENERIC_IR_PACKET_TYPE_BASE: u8 = 0b1111_1100; // 0xFC
/// Mask for the D-bit (Dynamic Chain present) in an IR packet type's LSB.
pub const ROHC_GENERIC_IR_D_BIT_MASK: u8 = 0b0000_0001; // 0x01
/// IR-DYN packet type discriminator (`11111000`).
pub const ROHC_GENERIC_IR_DYN_PACKET_TYPE: u8 = 0b1111_1000; // 0xF8

// --- ROHC Profile Identifiers (see `crate::packet_defs::RohcProfile` enum for primary type) ---

/// ROHC Uncompressed Profile Identifier (0x0000).
pub const PROFILE_ID_UNCOMPRESSED: u8 = 0x00;
/// ROHC RTP/UDP/IP Profile Identifier (0x0001, RFC 3095).
pub const PROFILE_ID_RTP_UDP_IP: u8 = 0x01;
/// ROHC UDP/IP Profile Identifier (0x0002, RFC 3095).
pub const PROFILE_ID_UDP_IP: u8 = 0x02;
/// ROHC ESP/IP Profile Identifier (0x0003, RFC 3095).
pub const PROFILE_ID_ESP_IP: u8 = 0x03;
/// ROHC IP-only Profile Identifier (0x0004, RFC 3843).
pub const PROFILE_ID_IP_ONLY: u8 = 0x04;
/// ROHC TCP/IP Profile Identifier (0x0006, RFC 6846).
pub const PROFILE_ID_TCP_IP: u8 = 0x06;

// --- Standard Internet Protocol Numbers (IANA Assigned) ---

/// IP protocol number for IP-in-IP encapsulation (IPv4 tunneling).
pub const IP_PROTOCOL_IPIP: u8 = 4;
/// IP protocol number for TCP (Transmission Control Protocol).
pub const IP_PROTOCOL_TCP: u8 = 6;
/// IP protocol number for UDP (User Datagram Protocol).
pub const IP_PROTOCOL_UDP: u8 = 17;

// --- General Header Field Constants ---

/// Minimum IPv4 header length in bytes (5 words * 4 bytes/word).
pub const IPV4_MIN_HEADER_LENGTH_BYTES: usize = 20;
/// Standard IPv4 IHL (Internet Header Length) in 32-bit words (no options).
pub const IPV4_STANDARD_IHL: u8 = 5;
/// Default IPv4 TTL (Time To Live) for contexts with no decoded TTL yet.
pub const DEFAULT_IPV4_TTL: u8 = 64;

/// Default `p` offset for W-LSB decoding of sequence numbers.
pub const DEFAULT_WLSB_P_OFFSET: i64 = 0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_id_constants_are_correct() {
        assert_eq!(PROFILE_ID_UNCOMPRESSED, 0x00);
        assert_eq!(PROFILE_ID_RTP_UDP_IP, 0x01);
        assert_eq!(PROFILE_ID_UDP_IP, 0x02);
        assert_eq!(PROFILE_ID_ESP_IP, 0x03);
        assert_eq!(PROFILE_ID_IP_ONLY, 0x04);
        assert_eq!(PROFILE_ID_TCP_IP, 0x06);
    }

    #[test]
    fn add_cid_octet_detection() {
        assert_eq!(0xE5 & ROHC_ADD_CID_PREFIX_MASK, ROHC_ADD_CID_PREFIX_VALUE);
        assert_eq!(0xE5 & ROHC_SMALL_CID_MASK, 5);
        // IR and IR-DYN type octets must not look like Add-CID octets.
        assert_ne!(0xFC & ROHC_ADD_CID_PREFIX_MASK, ROHC_ADD_CID_PREFIX_VALUE);
        assert_ne!(0xF8 & ROHC_ADD_CID_PREFIX_MASK, ROHC_ADD_CID_PREFIX_VALUE);
    }

    #[test]
    fn ir_type_octets_cover_d_bit() {
        assert_eq!(ROHC_GENERIC_IR_PACKET_TYPE_BASE, 0xFC);
        assert_eq!(
            ROHC_GENERIC_IR_PACKET_TYPE_BASE | ROHC_GENERIC_IR_D_BIT_MASK,
            0xFD
        );
        assert_eq!(ROHC_GENERIC_IR_DYN_PACKET_TYPE, 0xF8);
    }
}
