//! Core ROHC decompression traits.
//!
//! Defines the capability interface a profile presents to the engine: the
//! registration record of a C-style profile table becomes a trait object the
//! engine holds for the lifetime of the decompressor, and the per-packet
//! operations become trait methods the engine drives in a fixed order
//! (detect, parse, decode, build, update — with repair between build and
//! update on a CRC miss).

use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;

use crate::engine::DecompressorConfig;
use crate::error::RohcError;
use crate::packet_defs::{RohcPacketType, RohcProfile};
use crate::rfc3095::context::Rfc3095VolatileCtxt;
use crate::rfc3095::decode::DecodedHeaders;
use crate::trace::TraceSink;
use crate::types::{ContextId, SequenceNumber};

/// Defines the capabilities of a ROHC decompressor context.
pub trait RohcDecompressorContext: Send + Debug {
    /// ROHC Profile Identifier this context is configured for.
    fn profile_id(&self) -> RohcProfile;
    /// Context Identifier (CID) of this decompression flow.
    fn cid(&self) -> ContextId;
    /// Assigns new Context Identifier (CID).
    fn assign_cid(&mut self, cid: ContextId);
    /// Context as `&dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
    /// Context as `&mut dyn Any` for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// The operations one ROHC profile registers with the decompression engine.
///
/// The engine takes a boxed handler at registration time and calls these
/// methods per inbound packet. Parsing and decoding must not mutate the
/// persistent context: only [`update_context`], called after a packet fully
/// survives, commits state. Context destruction is `Drop`.
///
/// [`update_context`]: DecompressorProfile::update_context
pub trait DecompressorProfile: Send + Sync + Debug {
    /// ROHC Profile Identifier this handler implements.
    fn profile_id(&self) -> RohcProfile;

    /// Maximum number of bits of the master sequence number.
    fn msn_max_bits(&self) -> u8;

    /// Creates a new decompression context bound to this profile.
    fn create_context(
        &self,
        cid: ContextId,
        config: DecompressorConfig,
        trace: Arc<dyn TraceSink>,
    ) -> Box<dyn RohcDecompressorContext>;

    /// Classifies a core packet (after Add-CID processing) by its first byte.
    fn detect_packet_type(&self, packet: &[u8]) -> RohcPacketType;

    /// Parses the packet into the volatile extracted-bits record.
    ///
    /// # Returns
    /// The number of header bytes consumed; the rest of `packet` is payload.
    ///
    /// # Errors
    /// - `RohcError` - Malformed or truncated packet, wrong context state
    fn parse_packet(
        &self,
        context: &dyn RohcDecompressorContext,
        packet_type: RohcPacketType,
        packet: &[u8],
        volat: &mut Rfc3095VolatileCtxt,
    ) -> Result<usize, RohcError>;

    /// Resolves extracted bits into full header values using the context.
    ///
    /// # Errors
    /// - `RohcError` - LSB resolution failure or invalid context state
    fn decode_bits(
        &self,
        context: &dyn RohcDecompressorContext,
        volat: &Rfc3095VolatileCtxt,
    ) -> Result<DecodedHeaders, RohcError>;

    /// Writes the reconstructed headers plus payload into `out` and verifies
    /// the received header CRC against the rebuilt bytes.
    ///
    /// # Returns
    /// Total number of bytes written.
    ///
    /// # Errors
    /// - `RohcError::Parsing(RohcParsingError::CrcMismatch)` - Rebuilt headers
    ///   disagree with the received CRC (candidate for [`attempt_repair`])
    /// - `RohcError::Building` - Output buffer too small
    ///
    /// [`attempt_repair`]: DecompressorProfile::attempt_repair
    fn build_headers(
        &self,
        context: &dyn RohcDecompressorContext,
        volat: &Rfc3095VolatileCtxt,
        decoded: &DecodedHeaders,
        payload: &[u8],
        out: &mut [u8],
    ) -> Result<usize, RohcError>;

    /// Commits a fully decoded packet into the persistent context.
    ///
    /// # Errors
    /// - `RohcError::Engine` - Context is not of this profile's type
    fn update_context(
        &self,
        context: &mut dyn RohcDecompressorContext,
        decoded: &DecodedHeaders,
    ) -> Result<(), RohcError>;

    /// Attempts SN-based recovery after a header CRC mismatch.
    ///
    /// # Returns
    /// The repaired decoded values and the number of bytes written to `out`.
    ///
    /// # Errors
    /// - `RohcError::Decompression(DecompressionError::CrcRepairFailed)` - No
    ///   candidate SN produced matching headers
    fn attempt_repair(
        &self,
        context: &dyn RohcDecompressorContext,
        volat: &Rfc3095VolatileCtxt,
        payload: &[u8],
        out: &mut [u8],
    ) -> Result<(DecodedHeaders, usize), RohcError>;

    /// Last decoded master sequence number, if the context is established.
    fn last_sn(&self, context: &dyn RohcDecompressorContext) -> Option<SequenceNumber>;
}
