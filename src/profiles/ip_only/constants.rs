//! Constants specific to the ROHC IP-only profile (RFC 3843).

/// Profile identifier of the IP-only profile.
pub const IP_PROFILE_ID: u8 = 0x04;

/// Width of the master sequence number the IP-only profile maintains.
pub const IP_MSN_MAX_BITS: u8 = 16;

// --- Packet type discrimination (first core byte) ---

/// UO-0 packets match `0xxxxxxx`.
pub const IP_UO0_TYPE_MASK: u8 = 0b1000_0000;
/// UO-1 packets match `10xxxxxx`.
pub const IP_UO1_TYPE_MASK: u8 = 0b1100_0000;
/// Expected masked value for UO-1.
pub const IP_UO1_TYPE_VALUE: u8 = 0b1000_0000;
/// UOR-2 packets match `110xxxxx`.
pub const IP_UOR2_TYPE_MASK: u8 = 0b1110_0000;
/// Expected masked value for UOR-2.
pub const IP_UOR2_TYPE_VALUE: u8 = 0b1100_0000;
/// IR-DYN packets match exactly `11111000`.
pub const IP_IR_DYN_TYPE: u8 = 0b1111_1000;
/// IR packets match `1111110x` (LSB is the D-bit).
pub const IP_IR_TYPE_MASK: u8 = 0b1111_1110;
/// Expected masked value for IR.
pub const IP_IR_TYPE_VALUE: u8 = 0b1111_1100;

// --- Extension 3 flags octet: `1 1 S mode(2) I ip ip2` ---

/// S bit: an SN octet follows.
pub const IP_EXT3_S_BIT: u8 = 0b0010_0000;
/// Mode field mask.
pub const IP_EXT3_MODE_MASK: u8 = 0b0001_1000;
/// Mode field shift.
pub const IP_EXT3_MODE_SHIFT: u8 = 3;
/// I bit: a 16-bit IP-ID follows the inner field block.
pub const IP_EXT3_I_BIT: u8 = 0b0000_0100;
/// ip bit: an inner IP header flags octet follows.
pub const IP_EXT3_IP_BIT: u8 = 0b0000_0010;
/// ip2 bit: an outer IP header flags octet follows.
pub const IP_EXT3_IP2_BIT: u8 = 0b0000_0001;

/// Number of SN bits an extension 3 SN octet appends.
pub const IP_EXT3_SN_BITS: u8 = 8;
