//! Shared decompression machinery of the RFC 3095 profile family.
//!
//! The RFC 3095 profiles (RTP, UDP, ESP, and the RFC 3843 IP-only profile)
//! differ in their chain tails and extension 3 shapes but share packet
//! formats, context layout, and the parse/decode/build/update pipeline. A
//! profile contributes its specifics through two hooks wired into the
//! context at creation; everything else lives here.

pub mod bits;
pub mod build;
pub mod context;
pub mod decode;
pub mod flags_fields;
pub mod parse;

pub use self::bits::{ExtractedBits, ExtractedIpBits};
pub use self::context::{Rfc3095DecompContext, Rfc3095VolatileCtxt};
pub use self::decode::{DecodedHeaders, DecodedIpHeader};
