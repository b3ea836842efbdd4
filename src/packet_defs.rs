//! ROHC profile identifiers and packet type definitions.
//!
//! Defines the profile numbering shared by the engine and the per-profile
//! handlers, and the packet-type classification the non-RTP profiles produce
//! from a packet's first core byte.

use serde::{Deserialize, Serialize};

use crate::constants::{
    PROFILE_ID_ESP_IP, PROFILE_ID_IP_ONLY, PROFILE_ID_RTP_UDP_IP, PROFILE_ID_TCP_IP,
    PROFILE_ID_UDP_IP, PROFILE_ID_UNCOMPRESSED,
};

/// Supported ROHC profile identifiers.
///
/// Each profile specifies a different set of protocols that can be compressed.
/// The numeric values correspond to the profile identifiers defined in the
/// ROHC RFCs (3095, 3843, 6846).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RohcProfile {
    /// Uncompressed mode (profile 0x0000)
    Uncompressed,
    /// RTP/UDP/IP compression (profile 0x0001)
    RtpUdpIp,
    /// UDP/IP compression (profile 0x0002)
    UdpIp,
    /// ESP/IP compression (profile 0x0003)
    EspIp,
    /// IP-only compression (profile 0x0004, RFC 3843)
    IpOnly,
    /// TCP/IP compression (profile 0x0006)
    TcpIp,
    /// Unknown or unsupported profile
    Unknown(u8),
}

impl From<u8> for RohcProfile {
    fn from(value: u8) -> Self {
        match value {
            PROFILE_ID_UNCOMPRESSED => RohcProfile::Uncompressed,
            PROFILE_ID_RTP_UDP_IP => RohcProfile::RtpUdpIp,
            PROFILE_ID_UDP_IP => RohcProfile::UdpIp,
            PROFILE_ID_ESP_IP => RohcProfile::EspIp,
            PROFILE_ID_IP_ONLY => RohcProfile::IpOnly,
            PROFILE_ID_TCP_IP => RohcProfile::TcpIp,
            unknown_id => RohcProfile::Unknown(unknown_id),
        }
    }
}

impl From<RohcProfile> for u8 {
    fn from(profile: RohcProfile) -> Self {
        match profile {
            RohcProfile::Uncompressed => PROFILE_ID_UNCOMPRESSED,
            RohcProfile::RtpUdpIp => PROFILE_ID_RTP_UDP_IP,
            RohcProfile::UdpIp => PROFILE_ID_UDP_IP,
            RohcProfile::EspIp => PROFILE_ID_ESP_IP,
            RohcProfile::IpOnly => PROFILE_ID_IP_ONLY,
            RohcProfile::TcpIp => PROFILE_ID_TCP_IP,
            RohcProfile::Unknown(val) => val,
        }
    }
}

/// Packet types of the non-RTP RFC 3095 family profiles.
///
/// Classification happens on the first byte of the core packet (after Add-CID
/// processing) and drives the parser dispatch for the current packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RohcPacketType {
    /// Unidirectional Optimistic type 0 packet (`0xxxxxxx`).
    Uo0,
    /// Unidirectional Optimistic type 1 packet (`10xxxxxx`).
    Uo1,
    /// Unidirectional/Optimistic/Reliable type 2 packet (`110xxxxx`).
    Uor2,
    /// Initialization/Refresh packet with dynamic chain only (`11111000`).
    IrDyn,
    /// Initialization/Refresh packet (`1111110D`, D = dynamic chain present).
    Ir,
    /// An unrecognized packet type. Contains the problematic first byte.
    Unknown(u8),
}

impl RohcPacketType {
    /// Returns `true` if the packet type is `Ir` or `IrDyn`.
    pub fn is_ir(&self) -> bool {
        matches!(self, RohcPacketType::Ir | RohcPacketType::IrDyn)
    }

    /// Returns `true` if the packet type is a compressed (non-IR) format.
    pub fn is_compressed(&self) -> bool {
        matches!(
            self,
            RohcPacketType::Uo0 | RohcPacketType::Uo1 | RohcPacketType::Uor2
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_roundtrip_conversions() {
        for id in [0x00u8, 0x01, 0x02, 0x03, 0x04, 0x06] {
            assert_eq!(u8::from(RohcProfile::from(id)), id);
        }
        assert_eq!(RohcProfile::from(0x42), RohcProfile::Unknown(0x42));
        assert_eq!(u8::from(RohcProfile::Unknown(0x42)), 0x42);
    }

    #[test]
    fn ip_only_profile_is_0x04() {
        assert_eq!(u8::from(RohcProfile::IpOnly), 0x04);
    }

    #[test]
    fn packet_type_predicates() {
        assert!(RohcPacketType::Ir.is_ir());
        assert!(RohcPacketType::IrDyn.is_ir());
        assert!(!RohcPacketType::Uo0.is_ir());
        assert!(RohcPacketType::Uor2.is_compressed());
        assert!(!RohcPacketType::Unknown(0xFE).is_compressed());
    }
}
