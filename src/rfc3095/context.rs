//! Persistent and volatile decompression context for RFC 3095 family profiles.
//!
//! One persistent context lives per CID; it holds the long-lived per-flow
//! state (the SN window, per-header IP state) and the profile hooks wired at
//! creation. The volatile companion is rebuilt for every packet and owns the
//! extracted-bits record, which keeps the persistent state untouched until a
//! packet survives parse, decode, build and CRC.

use std::any::Any;
use std::net::Ipv4Addr;
use std::sync::Arc;

use crate::constants::DEFAULT_IPV4_TTL;
use crate::encodings::SnLsbWindow;
use crate::error::RohcParsingError;
use crate::packet_defs::RohcProfile;
use crate::rfc3095::bits::ExtractedBits;
use crate::trace::TraceSink;
use crate::traits::RohcDecompressorContext;
use crate::types::{ContextId, IpId, SequenceNumber};

/// Parser hook for the profile-specific part of a dynamic chain.
///
/// Called after the generic per-header IP dynamic parts; for the IP-only
/// profile it parses the trailing 16-bit SN.
pub type DynNextHdrParseFn =
    fn(&Rfc3095DecompContext, &[u8], &mut ExtractedBits) -> Result<usize, RohcParsingError>;

/// Parser hook for a UOR-2 extension 3.
pub type Ext3ParseFn =
    fn(&Rfc3095DecompContext, &[u8], &mut ExtractedBits) -> Result<usize, RohcParsingError>;

/// Long-lived state of one IP header of a flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpHeaderContext {
    /// IP version (always 4 for headers this crate decodes).
    pub version: u8,
    /// Protocol / next header of the last decoded packet.
    pub protocol: u8,
    /// Source address from the static chain.
    pub src_addr: Ipv4Addr,
    /// Destination address from the static chain.
    pub dst_addr: Ipv4Addr,
    /// Type of service of the last decoded packet.
    pub tos: u8,
    /// Time to live of the last decoded packet.
    pub ttl: u8,
    /// IP-ID of the last decoded packet.
    pub last_ip_id: IpId,
    /// Established IP-ID-minus-SN offset for sequential IP-IDs.
    pub ip_id_offset: u16,
    /// Whether this header's IP-ID behaves randomly (transmitted verbatim).
    pub rnd: bool,
    /// Whether this header's IP-ID is in network byte order.
    pub nbo: bool,
    /// Don't Fragment flag of the last decoded packet.
    pub df: bool,
}

impl Default for IpHeaderContext {
    fn default() -> Self {
        Self {
            version: 4,
            protocol: 0,
            src_addr: Ipv4Addr::UNSPECIFIED,
            dst_addr: Ipv4Addr::UNSPECIFIED,
            tos: 0,
            ttl: DEFAULT_IPV4_TTL,
            last_ip_id: IpId::default(),
            ip_id_offset: 0,
            rnd: false,
            nbo: true,
            df: false,
        }
    }
}

/// Persistent decompression context shared by the RFC 3095 family profiles.
///
/// Created by a profile's `create_context`, which wires the two parse hooks
/// and sizes the SN window to the profile's `msn_max_bits`.
#[derive(Debug)]
pub struct Rfc3095DecompContext {
    /// Profile this context is bound to.
    pub profile_id: RohcProfile,
    /// Context identifier of this flow.
    pub cid: ContextId,
    /// Whether malformed-packet diagnostics are fatal.
    pub strict: bool,
    /// Whether an IR packet has established this context yet.
    pub ctxt_valid: bool,
    /// W-LSB window for the master sequence number.
    pub sn_window: SnLsbWindow,
    /// Last decoded SN.
    pub last_sn: SequenceNumber,
    /// Whether the flow stacks two IP headers.
    pub multiple_ip: bool,
    /// First (or only) IP header state.
    pub outer_ip: IpHeaderContext,
    /// Second IP header state, meaningful when `multiple_ip` is set.
    pub inner_ip: IpHeaderContext,
    /// Profile hook: parse the next-header part of a dynamic chain.
    pub parse_dyn_next_hdr: DynNextHdrParseFn,
    /// Profile hook: parse a UOR-2 extension 3.
    pub parse_ext3: Ext3ParseFn,
    /// Diagnostic sink, shared with the engine.
    pub trace: Arc<dyn TraceSink>,
}

impl Rfc3095DecompContext {
    /// Creates a fresh, not-yet-valid context for `profile_id`.
    pub fn new(
        cid: ContextId,
        profile_id: RohcProfile,
        msn_max_bits: u8,
        strict: bool,
        parse_dyn_next_hdr: DynNextHdrParseFn,
        parse_ext3: Ext3ParseFn,
        trace: Arc<dyn TraceSink>,
    ) -> Self {
        Self {
            profile_id,
            cid,
            strict,
            ctxt_valid: false,
            sn_window: SnLsbWindow::new(msn_max_bits),
            last_sn: SequenceNumber::default(),
            multiple_ip: false,
            outer_ip: IpHeaderContext::default(),
            inner_ip: IpHeaderContext::default(),
            parse_dyn_next_hdr,
            parse_ext3,
            trace,
        }
    }

    /// Seeds a fresh extracted-bits record from this context.
    ///
    /// The packet's view of `multiple_ip` and of each header's RND/NBO flags
    /// starts at the context value; a flags octet inside the packet may
    /// overwrite them mid-parse.
    pub fn reset_extr_bits(&self) -> ExtractedBits {
        let mut bits = ExtractedBits::default();
        bits.multiple_ip = self.multiple_ip;
        bits.outer_ip.version = self.outer_ip.version;
        bits.outer_ip.rnd = self.outer_ip.rnd;
        bits.outer_ip.nbo = self.outer_ip.nbo;
        bits.inner_ip.version = self.inner_ip.version;
        bits.inner_ip.rnd = self.inner_ip.rnd;
        bits.inner_ip.nbo = self.inner_ip.nbo;
        bits
    }
}

impl RohcDecompressorContext for Rfc3095DecompContext {
    fn profile_id(&self) -> RohcProfile {
        self.profile_id
    }

    fn cid(&self) -> ContextId {
        self.cid
    }

    fn assign_cid(&mut self, cid: ContextId) {
        self.cid = cid;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Per-packet scratch state.
///
/// Rebuilt for every inbound packet; owns the extracted-bits record so that a
/// failed parse leaves no trace in the persistent context.
#[derive(Debug, Default)]
pub struct Rfc3095VolatileCtxt {
    /// Bits extracted from the current packet.
    pub bits: ExtractedBits,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::NullTraceSink;

    fn noop_dyn_parse(
        _ctx: &Rfc3095DecompContext,
        _data: &[u8],
        _bits: &mut ExtractedBits,
    ) -> Result<usize, RohcParsingError> {
        Ok(0)
    }

    fn noop_ext3_parse(
        _ctx: &Rfc3095DecompContext,
        _data: &[u8],
        _bits: &mut ExtractedBits,
    ) -> Result<usize, RohcParsingError> {
        Ok(0)
    }

    fn test_context() -> Rfc3095DecompContext {
        Rfc3095DecompContext::new(
            ContextId::new(0),
            RohcProfile::IpOnly,
            16,
            false,
            noop_dyn_parse,
            noop_ext3_parse,
            Arc::new(NullTraceSink),
        )
    }

    #[test]
    fn fresh_context_is_invalid_with_empty_window() {
        let ctx = test_context();
        assert!(!ctx.ctxt_valid);
        assert_eq!(ctx.sn_window.width(), 16);
        assert!(ctx.sn_window.reference().is_none());
        assert!(!ctx.multiple_ip);
    }

    #[test]
    fn reset_extr_bits_latches_flags_from_context() {
        let mut ctx = test_context();
        ctx.multiple_ip = true;
        ctx.inner_ip.rnd = true;
        ctx.outer_ip.nbo = false;
        let bits = ctx.reset_extr_bits();
        assert!(bits.multiple_ip);
        assert!(bits.inner_ip.rnd);
        assert!(!bits.outer_ip.nbo);
        assert_eq!(bits.sn_nr, 0);
        assert_eq!(bits.outer_ip.id_nr, 0);
    }

    #[test]
    fn context_exposes_cid_and_profile() {
        let mut ctx = test_context();
        assert_eq!(ctx.profile_id(), RohcProfile::IpOnly);
        assert_eq!(ctx.cid(), 0u16);
        ctx.assign_cid(ContextId::new(9));
        assert_eq!(ctx.cid(), 9u16);
    }
}
