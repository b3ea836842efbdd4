//! The ROHC decompression engine.
//!
//! The engine owns the registered profile handlers and the per-CID contexts,
//! strips Add-CID octets, and drives every inbound packet through the fixed
//! pipeline: detect the packet type, parse into the volatile bits record,
//! decode against the context, rebuild the headers (repairing on a CRC miss),
//! and only then commit the context update. A packet that fails anywhere
//! leaves its context exactly as it was.

use std::collections::HashMap;
use std::sync::Arc;

use crate::constants::{
    ROHC_ADD_CID_PREFIX_MASK, ROHC_ADD_CID_PREFIX_VALUE, ROHC_GENERIC_IR_DYN_PACKET_TYPE,
    ROHC_GENERIC_IR_PACKET_TYPE_BASE, ROHC_SMALL_CID_MASK,
};
use crate::context_manager::ContextManager;
use crate::error::{
    DecompressionError, EngineError, ParseContext, RohcError, RohcParsingError,
};
use crate::packet_defs::RohcProfile;
use crate::rfc3095::context::Rfc3095VolatileCtxt;
use crate::trace::TraceSink;
use crate::traits::{DecompressorProfile, RohcDecompressorContext};
use crate::types::{ContextId, SequenceNumber};

/// Runtime configuration of a decompressor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecompressorConfig {
    /// When `true`, malformed-packet diagnostics (reserved flags, reserved
    /// mode value, redundant IP-ID updates) become fatal parse errors instead
    /// of warnings. Defaults to lenient.
    pub strict: bool,
}

/// The ROHC decompression engine.
///
/// ## Usage
///
/// 1. Create an engine with [`RohcDecompEngine::new`]
/// 2. Register profile handlers using [`register_profile`]
/// 3. Feed packets to [`decompress`]; contexts are created automatically from
///    IR packets and reused by CID afterwards
///
/// Contexts are processed serially: the engine takes `&mut self` and touches
/// one context per packet.
///
/// [`register_profile`]: Self::register_profile
/// [`decompress`]: Self::decompress
#[derive(Debug)]
pub struct RohcDecompEngine {
    /// Registered profile handlers, keyed by their `RohcProfile` identifier.
    profiles: HashMap<RohcProfile, Box<dyn DecompressorProfile>>,
    /// Active decompression contexts.
    context_manager: ContextManager,
    /// Runtime configuration copied into each new context.
    config: DecompressorConfig,
    /// Diagnostic sink shared with every context.
    trace: Arc<dyn TraceSink>,
}

impl RohcDecompEngine {
    /// Creates an engine with no registered profiles.
    pub fn new(config: DecompressorConfig, trace: Arc<dyn TraceSink>) -> Self {
        RohcDecompEngine {
            profiles: HashMap::new(),
            context_manager: ContextManager::new(),
            config,
            trace,
        }
    }

    /// Registers a profile handler.
    ///
    /// # Errors
    /// - `RohcError::Engine(ProfileHandlerAlreadyRegistered)` - Duplicate profile
    pub fn register_profile(
        &mut self,
        handler: Box<dyn DecompressorProfile>,
    ) -> Result<(), RohcError> {
        let profile = handler.profile_id();
        if self.profiles.contains_key(&profile) {
            return Err(RohcError::Engine(
                EngineError::ProfileHandlerAlreadyRegistered { profile },
            ));
        }
        self.profiles.insert(profile, handler);
        Ok(())
    }

    /// Decompresses one ROHC packet into `out`.
    ///
    /// # Returns
    /// The number of bytes written: the reconstructed header stream followed
    /// by the payload.
    ///
    /// # Errors
    /// - `RohcError::Parsing` - Malformed or truncated packet
    /// - `RohcError::Decompression(ContextNotFound)` - Compressed packet for an
    ///   unknown CID (an IR packet must establish the context first)
    /// - `RohcError::Engine(ProfileHandlerNotRegistered)` - IR names a profile
    ///   nobody registered
    pub fn decompress(&mut self, packet: &[u8], out: &mut [u8]) -> Result<usize, RohcError> {
        let (cid, core) = parse_cid(packet)?;
        if core.is_empty() {
            return Err(RohcError::Parsing(RohcParsingError::NotEnoughData {
                needed: 1,
                got: 0,
                context: ParseContext::CorePacketAfterCid,
            }));
        }

        match self.context_manager.get_context_mut(cid) {
            Ok(context_box) => {
                let profile_id = context_box.profile_id();
                let handler = self.profiles.get(&profile_id).ok_or(RohcError::Engine(
                    EngineError::Internal {
                        reason: "context exists but its profile handler is gone",
                    },
                ))?;
                run_pipeline(handler.as_ref(), context_box.as_mut(), core, out)
            }
            Err(RohcError::Decompression(DecompressionError::ContextNotFound { .. })) => {
                let profile_id = peek_ir_profile(cid, core)?;
                let handler = self.profiles.get(&profile_id).ok_or(RohcError::Engine(
                    EngineError::ProfileHandlerNotRegistered {
                        profile: profile_id,
                    },
                ))?;

                let mut new_context =
                    handler.create_context(cid, self.config, self.trace.clone());
                let written = run_pipeline(handler.as_ref(), new_context.as_mut(), core, out)?;
                self.context_manager.add_context(cid, new_context);
                Ok(written)
            }
            Err(e) => Err(e),
        }
    }

    /// Last decoded SN of the context bound to `cid`, if established.
    pub fn context_last_sn(&self, cid: ContextId) -> Option<SequenceNumber> {
        let context = self.context_manager.get_context(cid).ok()?;
        let handler = self.profiles.get(&context.profile_id())?;
        handler.last_sn(context)
    }

    /// Number of active decompression contexts.
    pub fn context_count(&self) -> usize {
        self.context_manager.context_count()
    }

    /// Drops the context bound to `cid`, if any.
    pub fn remove_context(&mut self, cid: ContextId) -> bool {
        self.context_manager.remove_context(cid)
    }
}

/// Splits a packet into its CID and core bytes, handling small-CID Add-CID
/// octets. Packets without an Add-CID octet belong to CID 0.
fn parse_cid(packet: &[u8]) -> Result<(ContextId, &[u8]), RohcError> {
    let first = *packet.first().ok_or(RohcError::Parsing(
        RohcParsingError::NotEnoughData {
            needed: 1,
            got: 0,
            context: ParseContext::RohcPacketInput,
        },
    ))?;
    if first & ROHC_ADD_CID_PREFIX_MASK == ROHC_ADD_CID_PREFIX_VALUE {
        let cid = ContextId::new((first & ROHC_SMALL_CID_MASK) as u16);
        Ok((cid, &packet[1..]))
    } else {
        Ok((ContextId::new(0), packet))
    }
}

/// Reads the profile octet of an IR/IR-DYN packet for context creation.
///
/// Compressed packet types carry no profile identifier, so an unknown CID can
/// only come to life through an IR; anything else is a missing context.
fn peek_ir_profile(cid: ContextId, core: &[u8]) -> Result<RohcProfile, RohcError> {
    let type_octet = core[0];
    let is_ir = type_octet & !crate::constants::ROHC_GENERIC_IR_D_BIT_MASK
        == ROHC_GENERIC_IR_PACKET_TYPE_BASE
        || type_octet == ROHC_GENERIC_IR_DYN_PACKET_TYPE;
    if !is_ir {
        return Err(RohcError::Decompression(
            DecompressionError::ContextNotFound { cid },
        ));
    }
    let profile_octet = *core.get(1).ok_or(RohcError::Parsing(
        RohcParsingError::NotEnoughData {
            needed: 2,
            got: core.len(),
            context: ParseContext::ProfileIdPeek,
        },
    ))?;
    Ok(RohcProfile::from(profile_octet))
}

/// Drives one packet through a profile's registered operations.
fn run_pipeline(
    profile: &dyn DecompressorProfile,
    context: &mut dyn RohcDecompressorContext,
    core: &[u8],
    out: &mut [u8],
) -> Result<usize, RohcError> {
    let packet_type = profile.detect_packet_type(core);
    let mut volat = Rfc3095VolatileCtxt::default();
    let consumed = profile.parse_packet(&*context, packet_type, core, &mut volat)?;
    let payload = &core[consumed..];
    let decoded = profile.decode_bits(&*context, &volat)?;

    let (decoded, written) =
        match profile.build_headers(&*context, &volat, &decoded, payload, out) {
            Ok(written) => (decoded, written),
            Err(RohcError::Parsing(RohcParsingError::CrcMismatch { .. })) => {
                profile.attempt_repair(&*context, &volat, payload, out)?
            }
            Err(e) => return Err(e),
        };

    profile.update_context(context, &decoded)?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crc::CrcCalculators;
    use crate::profiles::ip_only::IpOnlyProfile;
    use crate::trace::NullTraceSink;

    fn test_engine() -> RohcDecompEngine {
        let mut engine =
            RohcDecompEngine::new(DecompressorConfig::default(), Arc::new(NullTraceSink));
        engine
            .register_profile(Box::new(IpOnlyProfile::new()))
            .unwrap();
        engine
    }

    fn sample_ir_packet() -> Vec<u8> {
        let crc_calculators = CrcCalculators::new();
        let mut packet = vec![
            0xFD, 0x04, 0x00, // IR + D, profile, CRC placeholder
            0x40, 17, 10, 0, 0, 1, 10, 0, 0, 2, // static chain
            0x00, 64, 0x10, 0x00, 0b1010_0000, 0x00, // dynamic part
            0x00, 0x64, // SN = 100
        ];
        packet[2] = crc_calculators.crc8_with_zeroed_octet(&packet, 2);
        packet
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut engine = test_engine();
        let err = engine
            .register_profile(Box::new(IpOnlyProfile::new()))
            .unwrap_err();
        assert!(matches!(
            err,
            RohcError::Engine(EngineError::ProfileHandlerAlreadyRegistered {
                profile: RohcProfile::IpOnly,
            })
        ));
    }

    #[test]
    fn empty_packet_is_rejected() {
        let mut engine = test_engine();
        let mut out = [0u8; 64];
        assert!(matches!(
            engine.decompress(&[], &mut out).unwrap_err(),
            RohcError::Parsing(RohcParsingError::NotEnoughData { .. })
        ));
    }

    #[test]
    fn lone_add_cid_octet_is_rejected() {
        let mut engine = test_engine();
        let mut out = [0u8; 64];
        let err = engine.decompress(&[0xE5], &mut out).unwrap_err();
        assert!(matches!(
            err,
            RohcError::Parsing(RohcParsingError::NotEnoughData {
                context: ParseContext::CorePacketAfterCid,
                ..
            })
        ));
    }

    #[test]
    fn ir_establishes_context_and_emits_headers() {
        let mut engine = test_engine();
        let mut out = [0u8; 128];
        let written = engine.decompress(&sample_ir_packet(), &mut out).unwrap();
        assert_eq!(written, 20);
        assert_eq!(out[0], 0x45);
        assert_eq!(&out[12..16], &[10, 0, 0, 1]);
        assert_eq!(engine.context_count(), 1);
        assert_eq!(
            engine.context_last_sn(ContextId::new(0)),
            Some(SequenceNumber::new(100))
        );
    }

    #[test]
    fn compressed_packet_for_unknown_cid_is_dropped() {
        let mut engine = test_engine();
        let mut out = [0u8; 64];
        let err = engine.decompress(&[0x00], &mut out).unwrap_err();
        assert!(matches!(
            err,
            RohcError::Decompression(DecompressionError::ContextNotFound { .. })
        ));
        assert_eq!(engine.context_count(), 0);
    }

    #[test]
    fn unregistered_profile_in_ir_is_reported() {
        let mut engine =
            RohcDecompEngine::new(DecompressorConfig::default(), Arc::new(NullTraceSink));
        let mut out = [0u8; 64];
        let err = engine.decompress(&sample_ir_packet(), &mut out).unwrap_err();
        assert!(matches!(
            err,
            RohcError::Engine(EngineError::ProfileHandlerNotRegistered {
                profile: RohcProfile::IpOnly,
            })
        ));
    }

    #[test]
    fn add_cid_octet_selects_context() {
        let mut engine = test_engine();
        let mut packet = vec![0xE7];
        packet.extend_from_slice(&sample_ir_packet());
        let mut out = [0u8; 128];
        engine.decompress(&packet, &mut out).unwrap();
        assert_eq!(engine.context_count(), 1);
        assert!(engine.context_last_sn(ContextId::new(7)).is_some());
        assert!(engine.context_last_sn(ContextId::new(0)).is_none());
    }

    #[test]
    fn failed_ir_does_not_leave_a_context() {
        let mut engine = test_engine();
        let mut packet = sample_ir_packet();
        packet[2] ^= 0xFF; // corrupt the CRC
        let mut out = [0u8; 128];
        assert!(engine.decompress(&packet, &mut out).is_err());
        assert_eq!(engine.context_count(), 0);
    }
}
