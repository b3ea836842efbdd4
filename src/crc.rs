//! ROHC (Robust Header Compression) CRC (Cyclic Redundancy Check) calculation utilities.
//!
//! This module implements wrappers around the `crc` crate to provide the specific
//! CRC algorithms used within the ROHC framework for packet validation: the 3-bit
//! CRC guarding UO-0/UO-1 packets, the 7-bit CRC guarding UOR-2 packets, and the
//! 8-bit CRC guarding IR/IR-DYN packets (RFC 3095, Section 5.9).

use std::fmt;

use crc::{Crc, CRC_3_ROHC, CRC_7_ROHC, CRC_8_ROHC};

/// A struct holding pre-initialized CRC algorithm instances for ROHC.
///
/// Intended for reuse so that `Crc<u8>` instances are not re-created on every
/// packet. One instance lives on each profile handler.
pub struct CrcCalculators {
    crc3_calculator: Crc<u8>,
    crc7_calculator: Crc<u8>,
    crc8_calculator: Crc<u8>,
}

impl fmt::Debug for CrcCalculators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrcCalculators")
            .field("crc3_calculator", &format_args!("Crc<u8>(ROHC_CRC3_Algo)"))
            .field("crc7_calculator", &format_args!("Crc<u8>(ROHC_CRC7_Algo)"))
            .field("crc8_calculator", &format_args!("Crc<u8>(ROHC_CRC8_Algo)"))
            .finish()
    }
}

impl CrcCalculators {
    /// Creates a new `CrcCalculators` instance with the three ROHC algorithms
    /// pre-initialized.
    pub fn new() -> Self {
        Self {
            crc3_calculator: Crc::<u8>::new(&CRC_3_ROHC),
            crc7_calculator: Crc::<u8>::new(&CRC_7_ROHC),
            crc8_calculator: Crc::<u8>::new(&CRC_8_ROHC),
        }
    }

    /// Calculates the ROHC 3-bit CRC (CRC-3/ROHC) over `input`.
    ///
    /// # Returns
    /// The calculated 3-bit CRC value (ranging from `0x00` to `0x07`).
    #[inline]
    pub fn crc3(&self, input: &[u8]) -> u8 {
        self.crc3_calculator.checksum(input)
    }

    /// Calculates the ROHC 7-bit CRC (CRC-7/ROHC) over `input`.
    ///
    /// # Returns
    /// The calculated 7-bit CRC value (ranging from `0x00` to `0x7F`).
    #[inline]
    pub fn crc7(&self, input: &[u8]) -> u8 {
        self.crc7_calculator.checksum(input)
    }

    /// Calculates the ROHC 8-bit CRC (CRC-8/ROHC) over `input`.
    #[inline]
    pub fn crc8(&self, input: &[u8]) -> u8 {
        self.crc8_calculator.checksum(input)
    }

    /// Calculates the ROHC CRC-8 over `packet` with the octet at `crc_pos`
    /// treated as zero.
    ///
    /// IR and IR-DYN packets carry their CRC-8 inside the region the CRC
    /// covers; the sender computes it with the CRC field zeroed, so the
    /// receiver must do the same.
    pub fn crc8_with_zeroed_octet(&self, packet: &[u8], crc_pos: usize) -> u8 {
        debug_assert!(crc_pos < packet.len(), "CRC octet outside packet");
        let mut digest = self.crc8_calculator.digest();
        digest.update(&packet[..crc_pos]);
        digest.update(&[0u8]);
        digest.update(&packet[crc_pos + 1..]);
        digest.finalize()
    }
}

impl Default for CrcCalculators {
    fn default() -> Self {
        Self::new()
    }
}
