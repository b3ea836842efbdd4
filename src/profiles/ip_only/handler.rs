//! ROHC IP-only profile (RFC 3843) handler implementation.
//!
//! The concrete [`DecompressorProfile`] for profile 0x0004. Context creation
//! wires the profile's two parsing hooks and sizes the SN window; every other
//! operation delegates to the shared RFC 3095 machinery, which is exactly the
//! division of labour RFC 3843 prescribes ("same as RFC 3095, with the
//! compressed transport header removed").

use std::sync::Arc;

use crate::crc::CrcCalculators;
use crate::engine::DecompressorConfig;
use crate::error::{EngineError, RohcError};
use crate::packet_defs::{RohcPacketType, RohcProfile};
use crate::rfc3095::build;
use crate::rfc3095::context::{Rfc3095DecompContext, Rfc3095VolatileCtxt};
use crate::rfc3095::decode::{self, DecodedHeaders};
use crate::rfc3095::parse;
use crate::trace::TraceSink;
use crate::traits::{DecompressorProfile, RohcDecompressorContext};
use crate::types::{ContextId, SequenceNumber};

use super::constants::IP_MSN_MAX_BITS;
use super::discriminator::detect_packet_type;
use super::parsing::{parse_dynamic_ip, parse_ext3};

/// ROHC IP-only profile handler.
///
/// Stateless apart from its reusable CRC calculators; all per-flow state
/// lives in the contexts it creates.
#[derive(Debug, Default)]
pub struct IpOnlyProfile {
    /// Reusable CRC calculator instances.
    crc_calculators: CrcCalculators,
}

impl IpOnlyProfile {
    /// Creates a new IP-only profile handler.
    pub fn new() -> Self {
        IpOnlyProfile {
            crc_calculators: CrcCalculators::new(),
        }
    }

    fn downcast<'a>(
        &self,
        context: &'a dyn RohcDecompressorContext,
    ) -> Result<&'a Rfc3095DecompContext, RohcError> {
        context
            .as_any()
            .downcast_ref::<Rfc3095DecompContext>()
            .ok_or(RohcError::Engine(EngineError::Internal {
                reason: "IpOnlyProfile: incorrect context type",
            }))
    }
}

impl DecompressorProfile for IpOnlyProfile {
    fn profile_id(&self) -> RohcProfile {
        RohcProfile::IpOnly
    }

    fn msn_max_bits(&self) -> u8 {
        IP_MSN_MAX_BITS
    }

    /// Creates a context with the SN window sized to 16 bits and the two
    /// IP-only parsing hooks installed. The profile keeps no private state
    /// beyond the shared RFC 3095 context.
    fn create_context(
        &self,
        cid: ContextId,
        config: DecompressorConfig,
        trace: Arc<dyn TraceSink>,
    ) -> Box<dyn RohcDecompressorContext> {
        Box::new(Rfc3095DecompContext::new(
            cid,
            RohcProfile::IpOnly,
            IP_MSN_MAX_BITS,
            config.strict,
            parse_dynamic_ip,
            parse_ext3,
            trace,
        ))
    }

    fn detect_packet_type(&self, packet: &[u8]) -> RohcPacketType {
        match packet.first() {
            Some(&first_byte) => detect_packet_type(first_byte),
            None => RohcPacketType::Unknown(0),
        }
    }

    fn parse_packet(
        &self,
        context: &dyn RohcDecompressorContext,
        packet_type: RohcPacketType,
        packet: &[u8],
        volat: &mut Rfc3095VolatileCtxt,
    ) -> Result<usize, RohcError> {
        let ctx = self.downcast(context)?;
        volat.bits = ctx.reset_extr_bits();
        parse::parse_packet(ctx, packet_type, packet, &mut volat.bits, &self.crc_calculators)
    }

    fn decode_bits(
        &self,
        context: &dyn RohcDecompressorContext,
        volat: &Rfc3095VolatileCtxt,
    ) -> Result<DecodedHeaders, RohcError> {
        let ctx = self.downcast(context)?;
        decode::decode_bits(ctx, &volat.bits).map_err(RohcError::from)
    }

    fn build_headers(
        &self,
        context: &dyn RohcDecompressorContext,
        volat: &Rfc3095VolatileCtxt,
        decoded: &DecodedHeaders,
        payload: &[u8],
        out: &mut [u8],
    ) -> Result<usize, RohcError> {
        self.downcast(context)?;
        build::build_headers(decoded, &volat.bits, payload, out, &self.crc_calculators)
    }

    fn update_context(
        &self,
        context: &mut dyn RohcDecompressorContext,
        decoded: &DecodedHeaders,
    ) -> Result<(), RohcError> {
        let ctx = context
            .as_any_mut()
            .downcast_mut::<Rfc3095DecompContext>()
            .ok_or(RohcError::Engine(EngineError::Internal {
                reason: "IpOnlyProfile: incorrect context type",
            }))?;
        decode::update_context(ctx, decoded);
        Ok(())
    }

    fn attempt_repair(
        &self,
        context: &dyn RohcDecompressorContext,
        volat: &Rfc3095VolatileCtxt,
        payload: &[u8],
        out: &mut [u8],
    ) -> Result<(DecodedHeaders, usize), RohcError> {
        let ctx = self.downcast(context)?;
        build::attempt_repair(ctx, &volat.bits, payload, out, &self.crc_calculators)
    }

    fn last_sn(&self, context: &dyn RohcDecompressorContext) -> Option<SequenceNumber> {
        let ctx = self.downcast(context).ok()?;
        ctx.ctxt_valid.then_some(ctx.last_sn)
    }
}
