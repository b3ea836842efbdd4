//! `rohcdec`: a memory-safe ROHC (Robust Header Compression) decompression
//! framework in Rust.
//!
//! This library implements the receiving side of ROHC: a generic RFC 3095
//! decompression framework plus the IP-only profile defined by RFC 3843
//! (profile 0x0004), which compresses flows of bare IPv4 headers, including
//! IPv4-in-IPv4 tunnels. The primary entry point is the [`RohcDecompEngine`].
//!
//! ## Core Concepts
//!
//! - **[`RohcDecompEngine`]**: owns the registered profiles and the per-CID
//!   contexts, and drives each packet through detect, parse, decode, build
//!   and update.
//! - **Profiles**: one [`DecompressorProfile`] implementation per ROHC
//!   profile; [`IpOnlyProfile`] is provided.
//! - **Contexts**: long-lived per-flow state (SN window, per-header IP
//!   state), created from IR packets and keyed by CID.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use rohcdec::profiles::IpOnlyProfile;
//! use rohcdec::trace::NullTraceSink;
//! use rohcdec::{DecompressorConfig, RohcDecompEngine};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut engine = RohcDecompEngine::new(
//!         DecompressorConfig::default(), // lenient mode
//!         Arc::new(NullTraceSink),       // diagnostics sink
//!     );
//!     engine.register_profile(Box::new(IpOnlyProfile::new()))?;
//!
//!     // An IR packet for CID 0 establishes the context ...
//!     let ir_packet: &[u8] = &[
//!         0xFD, 0x04, 0x09, // type, profile, CRC-8
//!         0x40, 17, 10, 0, 0, 1, 10, 0, 0, 2, // IPv4 static part
//!         0x00, 64, 0x10, 0x00, 0xA0, 0x00, // IPv4 dynamic part
//!         0x00, 0x64, // SN
//!     ];
//!     let mut out = [0u8; 1500];
//!     match engine.decompress(ir_packet, &mut out) {
//!         Ok(written) => println!("rebuilt {} header bytes", written),
//!         Err(e) => println!("packet dropped: {}", e),
//!     }
//!     // ... and UO-0/UO-1/UOR-2 packets ride on it afterwards.
//!     Ok(())
//! }
//! ```
//!
//! ## Scope
//!
//! Decompression only: there is no compressor, no feedback channel, and no
//! large-CID support. Additional profiles can be added by implementing
//! [`DecompressorProfile`].

pub mod constants;
pub mod context_manager;
pub mod crc;
pub mod cursor;
pub mod encodings;
pub mod engine;
pub mod error;
pub mod fuzz_harnesses;
pub mod packet_defs;
pub mod profiles;
pub mod rfc3095;
pub mod trace;
pub mod traits;
pub mod types;

pub use engine::{DecompressorConfig, RohcDecompEngine};
pub use error::{
    CrcType, DecompressionError, EngineError, Field, IpHeaderPos, ParseContext,
    RohcBuildingError, RohcError, RohcParsingError,
};
pub use packet_defs::{RohcPacketType, RohcProfile};
pub use profiles::IpOnlyProfile;
pub use traits::{DecompressorProfile, RohcDecompressorContext};
pub use types::{ContextId, IpId, SequenceNumber};
