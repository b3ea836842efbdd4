//! Core type definitions for the ROHC decompressor.
//!
//! Provides zero-cost newtypes to prevent field mixups at compile time.
//! All types use `#[repr(transparent)]` for guaranteed zero runtime cost.

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

/// Macro to generate ROHC newtype wrappers with common implementations.
macro_rules! rohc_newtype {
    (
        $(#[$meta:meta])*
        $name:ident($inner:ty) => $prefix:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        #[derive(Serialize, Deserialize)]
        #[repr(transparent)]
        pub struct $name(pub $inner);

        impl $name {
            /// Creates a new instance
            #[inline]
            pub const fn new(value: $inner) -> Self {
                Self(value)
            }

            /// Raw value
            #[inline]
            pub const fn value(self) -> $inner {
                self.0
            }

            /// Wrapping addition
            #[inline]
            pub const fn wrapping_add(self, rhs: $inner) -> Self {
                Self(self.0.wrapping_add(rhs))
            }

            /// Wrapping subtraction returning the inner type
            #[inline]
            pub const fn wrapping_sub(self, rhs: Self) -> $inner {
                self.0.wrapping_sub(rhs.0)
            }
        }

        // Display with custom prefix
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }

        // Deref for transparent access
        impl Deref for $name {
            type Target = $inner;

            #[inline]
            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        // From/Into conversions
        impl From<$inner> for $name {
            #[inline]
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }

        impl From<$name> for $inner {
            #[inline]
            fn from(value: $name) -> Self {
                value.0
            }
        }

        // Enable direct comparisons with raw values
        impl PartialEq<$inner> for $name {
            #[inline]
            fn eq(&self, other: &$inner) -> bool {
                self.0 == *other
            }
        }

        impl PartialEq<$name> for $inner {
            #[inline]
            fn eq(&self, other: &$name) -> bool {
                *self == other.0
            }
        }

        impl PartialOrd<$inner> for $name {
            #[inline]
            fn partial_cmp(&self, other: &$inner) -> Option<std::cmp::Ordering> {
                self.0.partial_cmp(other)
            }
        }

        impl PartialOrd<$name> for $inner {
            #[inline]
            fn partial_cmp(&self, other: &$name) -> Option<std::cmp::Ordering> {
                self.partial_cmp(&other.0)
            }
        }
    };
}

rohc_newtype! {
    /// ROHC Context Identifier (CID).
    ///
    /// Identifies one compressed flow between a compressor and a decompressor.
    /// Small CIDs (0-15) may be carried in an Add-CID octet.
    ContextId(u16) => "CID"
}

rohc_newtype! {
    /// Master Sequence Number (MSN) of an RFC 3095 context.
    ///
    /// The IP-only profile generates this 16-bit counter at the compressor; the
    /// decompressor tracks it through a W-LSB window.
    SequenceNumber(u16) => "SN"
}

rohc_newtype! {
    /// IPv4 Identification field value.
    IpId(u16) => "IP-ID"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newtype_construction_and_value() {
        let cid = ContextId::new(7);
        assert_eq!(cid.value(), 7);
        assert_eq!(ContextId::from(7u16), cid);
        assert_eq!(u16::from(cid), 7);
    }

    #[test]
    fn newtype_wrapping_arithmetic() {
        let sn = SequenceNumber::new(u16::MAX);
        assert_eq!(sn.wrapping_add(1), SequenceNumber::new(0));
        assert_eq!(
            SequenceNumber::new(0).wrapping_sub(SequenceNumber::new(1)),
            u16::MAX
        );
    }

    #[test]
    fn newtype_mixed_comparisons() {
        let id = IpId::new(0x1234);
        assert_eq!(id, 0x1234u16);
        assert!(id > 0x1233u16);
        assert!(0x1235u16 > id);
    }

    #[test]
    fn newtype_display_prefixes() {
        assert_eq!(format!("{}", ContextId::new(3)), "CID3");
        assert_eq!(format!("{}", SequenceNumber::new(42)), "SN42");
        assert_eq!(format!("{}", IpId::new(9)), "IP-ID9");
    }
}
