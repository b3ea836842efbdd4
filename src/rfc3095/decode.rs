//! Bit decoding for the RFC 3095 family profiles.
//!
//! Turns the extracted-bits record of one packet into full header values,
//! consulting the persistent context for every field the packet did not carry.
//! Decoding is read-only with respect to the context; the decoded values are
//! committed separately once the rebuilt headers pass their CRC.

use std::net::Ipv4Addr;

use crate::encodings::decode_lsb;
use crate::error::{Field, RohcParsingError};
use crate::rfc3095::bits::{ExtractedBits, ExtractedIpBits};
use crate::rfc3095::context::{IpHeaderContext, Rfc3095DecompContext};
use crate::types::{IpId, SequenceNumber};

/// Fully decoded values of one IP header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedIpHeader {
    pub tos: u8,
    pub ttl: u8,
    pub protocol: u8,
    pub src_addr: Ipv4Addr,
    pub dst_addr: Ipv4Addr,
    pub ip_id: IpId,
    pub df: bool,
    pub nbo: bool,
    pub rnd: bool,
}

/// Fully decoded values of one packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedHeaders {
    /// Decoded master sequence number.
    pub sn: SequenceNumber,
    /// First (or only) IP header.
    pub outer: DecodedIpHeader,
    /// Second IP header for stacked flows.
    pub inner: Option<DecodedIpHeader>,
}

/// Decodes the extracted bits of one packet against the context.
///
/// # Errors
/// - `RohcParsingError::InvalidLsbOperation` - SN or IP-ID LSBs do not resolve
pub fn decode_bits(
    context: &Rfc3095DecompContext,
    bits: &ExtractedBits,
) -> Result<DecodedHeaders, RohcParsingError> {
    let sn = decode_sn(context, bits)?;
    decode_with_sn(context, bits, sn)
}

/// Decodes the SN carried by this packet, or infers it.
///
/// Packets without SN bits (UO-1 never omits them, but IR static-only chains
/// do) keep the context value.
fn decode_sn(
    context: &Rfc3095DecompContext,
    bits: &ExtractedBits,
) -> Result<SequenceNumber, RohcParsingError> {
    if bits.sn_nr == 0 {
        return Ok(context.last_sn);
    }
    if !bits.is_sn_enc {
        return Ok(SequenceNumber::new(bits.sn));
    }
    context.sn_window.decode(bits.sn, bits.sn_nr)
}

/// Decodes header values for a known SN (shared with the CRC repair path).
pub(crate) fn decode_with_sn(
    context: &Rfc3095DecompContext,
    bits: &ExtractedBits,
    sn: SequenceNumber,
) -> Result<DecodedHeaders, RohcParsingError> {
    let outer = decode_ip_header(&context.outer_ip, &bits.outer_ip, sn)?;
    let inner = if bits.multiple_ip {
        Some(decode_ip_header(&context.inner_ip, &bits.inner_ip, sn)?)
    } else {
        None
    };
    Ok(DecodedHeaders { sn, outer, inner })
}

fn decode_ip_header(
    ctxt: &IpHeaderContext,
    bits: &ExtractedIpBits,
    sn: SequenceNumber,
) -> Result<DecodedIpHeader, RohcParsingError> {
    let rnd = if bits.rnd_nr > 0 { bits.rnd } else { ctxt.rnd };
    let nbo = if bits.nbo_nr > 0 { bits.nbo } else { ctxt.nbo };
    let df = if bits.df_nr > 0 { bits.df } else { ctxt.df };

    let ip_id = decode_ip_id(ctxt, bits, sn, rnd)?;

    Ok(DecodedIpHeader {
        tos: if bits.tos_nr > 0 { bits.tos } else { ctxt.tos },
        ttl: if bits.ttl_nr > 0 { bits.ttl } else { ctxt.ttl },
        protocol: if bits.proto_nr > 0 {
            bits.proto
        } else {
            ctxt.protocol
        },
        src_addr: bits.saddr.unwrap_or(ctxt.src_addr),
        dst_addr: bits.daddr.unwrap_or(ctxt.dst_addr),
        ip_id,
        df,
        nbo,
        rnd,
    })
}

/// Resolves the IP-ID of one header.
///
/// Sixteen received bits are authoritative. Fewer bits resolve through W-LSB
/// against the last decoded IP-ID. No bits at all fall back to the offset
/// model of RFC 3095, 4.5.5: a sequential (non-random) IP-ID follows the SN
/// by the established offset, a random one repeats until replaced.
fn decode_ip_id(
    ctxt: &IpHeaderContext,
    bits: &ExtractedIpBits,
    sn: SequenceNumber,
    rnd: bool,
) -> Result<IpId, RohcParsingError> {
    if bits.id_nr == 16 {
        return Ok(IpId::new(bits.id));
    }
    if bits.id_nr > 0 {
        let decoded = decode_lsb(
            bits.id as u64,
            ctxt.last_ip_id.value() as u64,
            bits.id_nr,
            0,
        )
        .map_err(|_| RohcParsingError::InvalidLsbOperation {
            field: Field::IpIdLsb,
            description: format!(
                "IP-ID LSBs {:#x} ({} bits) do not resolve against {}.",
                bits.id, bits.id_nr, ctxt.last_ip_id
            ),
        })?;
        return Ok(IpId::new(decoded as u16));
    }
    if rnd {
        Ok(ctxt.last_ip_id)
    } else {
        Ok(IpId::new(sn.value().wrapping_add(ctxt.ip_id_offset)))
    }
}

/// Commits a decoded packet into the persistent context.
///
/// Called only after the rebuilt headers passed their CRC; this is the single
/// place persistent state changes.
pub fn update_context(context: &mut Rfc3095DecompContext, decoded: &DecodedHeaders) {
    context.ctxt_valid = true;
    context.last_sn = decoded.sn;
    context.sn_window.set_reference(decoded.sn);
    context.multiple_ip = decoded.inner.is_some();
    update_ip_header(&mut context.outer_ip, &decoded.outer, decoded.sn);
    if let Some(inner) = &decoded.inner {
        update_ip_header(&mut context.inner_ip, inner, decoded.sn);
    }
}

fn update_ip_header(ctxt: &mut IpHeaderContext, decoded: &DecodedIpHeader, sn: SequenceNumber) {
    ctxt.tos = decoded.tos;
    ctxt.ttl = decoded.ttl;
    ctxt.protocol = decoded.protocol;
    ctxt.src_addr = decoded.src_addr;
    ctxt.dst_addr = decoded.dst_addr;
    ctxt.last_ip_id = decoded.ip_id;
    ctxt.rnd = decoded.rnd;
    ctxt.nbo = decoded.nbo;
    ctxt.df = decoded.df;
    if !decoded.rnd {
        ctxt.ip_id_offset = decoded.ip_id.value().wrapping_sub(sn.value());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet_defs::RohcProfile;
    use crate::trace::NullTraceSink;
    use crate::types::ContextId;
    use std::sync::Arc;

    fn noop_parse(
        _ctx: &Rfc3095DecompContext,
        _data: &[u8],
        _bits: &mut ExtractedBits,
    ) -> Result<usize, RohcParsingError> {
        Ok(0)
    }

    fn established_context() -> Rfc3095DecompContext {
        let mut ctx = Rfc3095DecompContext::new(
            ContextId::new(0),
            RohcProfile::IpOnly,
            16,
            false,
            noop_parse,
            noop_parse,
            Arc::new(NullTraceSink),
        );
        ctx.ctxt_valid = true;
        ctx.last_sn = SequenceNumber::new(100);
        ctx.sn_window.set_reference(SequenceNumber::new(100));
        ctx.outer_ip.src_addr = Ipv4Addr::new(10, 0, 0, 1);
        ctx.outer_ip.dst_addr = Ipv4Addr::new(10, 0, 0, 2);
        ctx.outer_ip.protocol = 17;
        ctx.outer_ip.ttl = 64;
        ctx.outer_ip.last_ip_id = IpId::new(0x2000);
        ctx.outer_ip.ip_id_offset = 0x2000u16.wrapping_sub(100);
        ctx
    }

    #[test]
    fn absolute_sn_is_taken_verbatim() {
        let ctx = established_context();
        let mut bits = ctx.reset_extr_bits();
        bits.sn = 0x1234;
        bits.sn_nr = 16;
        bits.is_sn_enc = false;
        let decoded = decode_bits(&ctx, &bits).unwrap();
        assert_eq!(decoded.sn, SequenceNumber::new(0x1234));
    }

    #[test]
    fn lsb_sn_resolves_against_window() {
        let ctx = established_context();
        let mut bits = ctx.reset_extr_bits();
        // 4 LSBs of 101.
        bits.sn = 101 & 0xF;
        bits.sn_nr = 4;
        bits.is_sn_enc = true;
        let decoded = decode_bits(&ctx, &bits).unwrap();
        assert_eq!(decoded.sn, SequenceNumber::new(101));
    }

    #[test]
    fn sequential_ip_id_follows_sn_by_offset() {
        let ctx = established_context();
        let mut bits = ctx.reset_extr_bits();
        bits.sn = 101 & 0xF;
        bits.sn_nr = 4;
        bits.is_sn_enc = true;
        let decoded = decode_bits(&ctx, &bits).unwrap();
        assert_eq!(decoded.outer.ip_id, IpId::new(0x2001));
    }

    #[test]
    fn random_ip_id_repeats_last_value() {
        let mut ctx = established_context();
        ctx.outer_ip.rnd = true;
        let mut bits = ctx.reset_extr_bits();
        bits.sn = 105 & 0xF;
        bits.sn_nr = 4;
        bits.is_sn_enc = true;
        let decoded = decode_bits(&ctx, &bits).unwrap();
        assert_eq!(decoded.outer.ip_id, IpId::new(0x2000));
    }

    #[test]
    fn explicit_ip_id_overrides_offset_model() {
        let ctx = established_context();
        let mut bits = ctx.reset_extr_bits();
        bits.sn = 101 & 0xF;
        bits.sn_nr = 4;
        bits.is_sn_enc = true;
        bits.outer_ip.id = 0xBEEF;
        bits.outer_ip.id_nr = 16;
        bits.outer_ip.is_id_enc = true;
        let decoded = decode_bits(&ctx, &bits).unwrap();
        assert_eq!(decoded.outer.ip_id, IpId::new(0xBEEF));
    }

    #[test]
    fn fields_fall_back_to_context() {
        let ctx = established_context();
        let mut bits = ctx.reset_extr_bits();
        bits.sn = 16;
        bits.sn_nr = 16;
        bits.is_sn_enc = false;
        let decoded = decode_bits(&ctx, &bits).unwrap();
        assert_eq!(decoded.outer.ttl, 64);
        assert_eq!(decoded.outer.protocol, 17);
        assert_eq!(decoded.outer.src_addr, Ipv4Addr::new(10, 0, 0, 1));
        assert!(decoded.inner.is_none());
    }

    #[test]
    fn update_context_commits_and_tracks_offset() {
        let mut ctx = established_context();
        let decoded = DecodedHeaders {
            sn: SequenceNumber::new(200),
            outer: DecodedIpHeader {
                tos: 0x10,
                ttl: 63,
                protocol: 17,
                src_addr: Ipv4Addr::new(10, 0, 0, 1),
                dst_addr: Ipv4Addr::new(10, 0, 0, 2),
                ip_id: IpId::new(0x3000),
                df: true,
                nbo: true,
                rnd: false,
            },
            inner: None,
        };
        update_context(&mut ctx, &decoded);
        assert_eq!(ctx.last_sn, SequenceNumber::new(200));
        assert_eq!(ctx.sn_window.reference(), Some(SequenceNumber::new(200)));
        assert_eq!(ctx.outer_ip.last_ip_id, IpId::new(0x3000));
        assert_eq!(ctx.outer_ip.ip_id_offset, 0x3000u16.wrapping_sub(200));
        assert!(ctx.outer_ip.df);
        assert!(!ctx.multiple_ip);
    }
}
