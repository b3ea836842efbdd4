//! ROHC (Robust Header Compression) error types and utilities.
//!
//! This module defines the error types used throughout the rohcdec library.
//! It distinguishes between parsing errors, header building errors, and general
//! operational errors. The `thiserror` crate is used for ergonomic error definitions.

use thiserror::Error;

use crate::packet_defs::RohcProfile;
use crate::types::ContextId;

/// Context types for parsing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseContext {
    RohcPacketInput,
    CorePacketAfterCid,
    ProfileIdPeek,
    IrPacketPreamble,
    IrStaticChain,
    IrDynamicChain,
    DynamicChainSn,
    Uo0Packet,
    Uo1Packet,
    Uor2Packet,
    Uor2Extension,
    Ext3Flags,
    Ext3FlagOctets,
    Ext3IpId,
    HdrFlagsFields,
}

impl std::fmt::Display for ParseContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::RohcPacketInput => "ROHC packet input",
            Self::CorePacketAfterCid => "Core ROHC packet after CID processing",
            Self::ProfileIdPeek => "Peeking profile ID from core packet",
            Self::IrPacketPreamble => "IR packet preamble (profile and CRC octets)",
            Self::IrStaticChain => "IR packet static chain",
            Self::IrDynamicChain => "IR packet dynamic chain",
            Self::DynamicChainSn => "Dynamic chain SN field",
            Self::Uo0Packet => "UO-0 packet",
            Self::Uo1Packet => "UO-1 packet",
            Self::Uor2Packet => "UOR-2 packet",
            Self::Uor2Extension => "UOR-2 extension",
            Self::Ext3Flags => "Extension 3 flags octet",
            Self::Ext3FlagOctets => "Extension 3 conditional flag octets",
            Self::Ext3IpId => "Extension 3 IP-ID field",
            Self::HdrFlagsFields => "IP header flags/fields block",
        };
        write!(f, "{}", s)
    }
}

/// Field types for structured error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Cid,
    ProfileId,
    NumLsbBits,
    ReceivedLsbs,
    SnLsb,
    IpIdLsb,
    IpVersion,
    BufferSize,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Cid => "CID",
            Self::ProfileId => "Profile ID",
            Self::NumLsbBits => "num_lsb_bits",
            Self::ReceivedLsbs => "received_lsbs",
            Self::SnLsb => "sn_lsb",
            Self::IpIdLsb => "ip_id_lsb",
            Self::IpVersion => "IP Version",
            Self::BufferSize => "Buffer Size",
        };
        write!(f, "{}", s)
    }
}

/// CRC types used in ROHC packet validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrcType {
    Rohc3,
    Rohc7,
    Rohc8,
}

impl std::fmt::Display for CrcType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Rohc3 => "ROHC-CRC3",
            Self::Rohc7 => "ROHC-CRC7",
            Self::Rohc8 => "ROHC-CRC8",
        };
        write!(f, "{}", s)
    }
}

/// Position of an IP header within a (possibly stacked) compressed flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpHeaderPos {
    Inner,
    Outer,
}

impl std::fmt::Display for IpHeaderPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Inner => "inner",
            Self::Outer => "outer",
        };
        write!(f, "{}", s)
    }
}

/// Errors that can occur during ROHC packet parsing.
///
/// These errors are local to one packet: the framework maps each of them to
/// "drop this packet, do not mutate context".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RohcParsingError {
    /// Insufficient data to parse a complete field or structure.
    #[error("Incomplete packet data: needed {needed} bytes, got {got} for {context}")]
    NotEnoughData {
        needed: usize,
        got: usize,
        context: ParseContext,
    },

    /// Invalid or unsupported ROHC profile identifier encountered.
    #[error("Invalid or unsupported ROHC profile ID: 0x{0:02X}")]
    InvalidProfileId(u8),

    /// Unrecognized ROHC packet type discriminator for the current profile.
    #[error(
        "Invalid ROHC packet type discriminator: 0x{discriminator:02X} for profile {profile_id:?}"
    )]
    InvalidPacketType {
        discriminator: u8,
        profile_id: Option<u8>,
    },

    /// Invalid IP version found; expected a specific version.
    #[error("Invalid IP version: expected {expected}, got {got}")]
    InvalidIpVersion { expected: u8, got: u8 },

    /// Extension 3 carried the reserved mode value zero (strict mode only).
    #[error("Malformed extension 3: mode value zero is reserved (RFC 3095)")]
    MalformedMode,

    /// Reserved bit of the inner IP header flags octet was set (strict mode only).
    #[error("Malformed IP header flags: reserved flag shall be zero")]
    MalformedReservedFlag,

    /// An explicit IP-ID arrived for a header whose IP-ID bits were already set.
    #[error("IP-ID field present (I = 1) but {header} IP-ID already updated")]
    IpIdAlreadySet { header: IpHeaderPos },

    /// An explicit IP-ID arrived but no header is IPv4 with a non-random IP-ID.
    #[error("Extension 3 cannot carry IP-ID bits: no IP header is IPv4 with non-random IP-ID")]
    NoIpIdTarget,

    /// CRC validation failed, indicating data corruption or context mismatch.
    #[error("CRC mismatch: expected 0x{expected:X}, got 0x{calculated:X} for {crc_type} CRC")]
    CrcMismatch {
        expected: u8,
        calculated: u8,
        crc_type: CrcType,
    },

    /// LSB decoding operation failed with specific values.
    #[error("Invalid LSB operation for field '{field}': {description}")]
    InvalidLsbOperation {
        field: Field,
        description: String, // Keep String for complex dynamic descriptions
    },

    /// Packet exercised a ROHC feature this decompressor does not implement.
    #[error("Unsupported ROHC feature: {feature}")]
    UnsupportedFeature { feature: &'static str },
}

/// Errors that can occur while writing reconstructed headers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RohcBuildingError {
    /// Provided output buffer was too small for the reconstructed packet.
    #[error("Buffer too small: needed {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },
}

/// Errors that can occur during ROHC decompression operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecompressionError {
    /// Context not found for the given CID.
    #[error("Context {cid} not found")]
    ContextNotFound { cid: ContextId },

    /// Packet type invalid for current context state.
    #[error("Packet type {packet_type:#04x} invalid for context {cid}")]
    InvalidPacketType { cid: ContextId, packet_type: u8 },

    /// CRC repair exhausted its candidate window without a matching SN.
    #[error("CRC repair failed for context {cid}: no candidate SN matched")]
    CrcRepairFailed { cid: ContextId },

    /// Packet parsing failed during decompression.
    #[error("Packet parsing failed: {0}")]
    ParsingFailed(#[from] RohcParsingError),
}

/// Errors that can occur during engine operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Profile handler not registered.
    #[error("Profile handler for {profile:?} not registered")]
    ProfileHandlerNotRegistered { profile: RohcProfile },

    /// Profile handler already registered.
    #[error("Profile handler for {profile:?} already registered")]
    ProfileHandlerAlreadyRegistered { profile: RohcProfile },

    /// Decompression operation failed.
    #[error("Decompression failed: {0}")]
    DecompressionFailed(#[from] DecompressionError),

    /// Internal engine error.
    #[error("Internal engine error: {reason}")]
    Internal { reason: &'static str },
}

/// Main error type for ROHC decompression in rohcdec.
///
/// Top-level error type that consolidates all specific error categories.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RohcError {
    /// Error during packet parsing.
    #[error("Parsing error: {0}")]
    Parsing(#[from] RohcParsingError),

    /// Error while writing reconstructed headers.
    #[error("Building error: {0}")]
    Building(#[from] RohcBuildingError),

    /// Error during decompression operations.
    #[error("Decompression error: {0}")]
    Decompression(#[from] DecompressionError),

    /// Error during engine operations.
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
}
