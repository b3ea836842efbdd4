//! ROHC IP-only profile (RFC 3843) decompression.
//!
//! The IP-only profile compresses flows of bare IP headers (including
//! IPv4-in-IPv4 tunnels) the way RFC 3095 compresses RTP flows, minus the
//! transport header: the master sequence number is generated by the
//! compressor and carried as a 16-bit field in the dynamic chain.
//!
//! Key components:
//! - `handler`: Implements the [`DecompressorProfile`] trait for profile 0x0004.
//! - `discriminator`: Classifies packets by their first core byte.
//! - `parsing`: The profile's dynamic-chain and extension 3 hooks.
//! - `constants`: Bit masks and identifiers specific to this profile.
//!
//! [`DecompressorProfile`]: crate::traits::DecompressorProfile

pub mod constants;
pub mod discriminator;
pub mod handler;
pub mod parsing;

pub use self::discriminator::detect_packet_type;
pub use self::handler::IpOnlyProfile;
