//! ROHC (Robust Header Compression) decoding utilities.
//!
//! This module implements Window-based Least Significant Bits (W-LSB) decoding
//! as specified in RFC 3095, Section 4.5 and Section 5.3.1, plus the sequence
//! number window a decompression context carries between packets.

use crate::constants::DEFAULT_WLSB_P_OFFSET;
use crate::error::{Field, RohcParsingError};
use crate::types::SequenceNumber;

/// Reconstructs the original value from its W-LSB encoded representation.
///
/// Finds a candidate value that has the same `k` least significant bits as
/// `received_lsb` and falls within the W-LSB interpretation window:
/// `[reference_value - p_offset, reference_value - p_offset + (2^k) - 1]`.
///
/// # Errors
/// - `RohcParsingError::InvalidLsbOperation` - Invalid parameters, LSBs too large,
///   or no unique resolution
pub fn decode_lsb(
    received_lsb: u64,
    reference_value: u64,
    num_lsb_bits: u8,
    p_offset: i64,
) -> Result<u64, RohcParsingError> {
    if num_lsb_bits == 0 || num_lsb_bits >= 64 {
        return Err(RohcParsingError::InvalidLsbOperation {
            field: Field::NumLsbBits,
            description: format!(
                "Number of LSBs (k) must be between 1 and 63 for W-LSB decoding, got {}.",
                num_lsb_bits
            ),
        });
    }

    let window_size = 1u64 << num_lsb_bits;
    let lsb_mask = window_size - 1;

    if received_lsb > lsb_mask {
        return Err(RohcParsingError::InvalidLsbOperation {
            field: Field::ReceivedLsbs,
            description: format!(
                "Received LSB value {:#x} is too large for {} LSBs (max value {:#x}).",
                received_lsb, num_lsb_bits, lsb_mask
            ),
        });
    }

    let interval_base = if p_offset >= 0 {
        reference_value.wrapping_sub(p_offset as u64)
    } else {
        reference_value.wrapping_add((-p_offset) as u64)
    };

    // RFC 3095 Section 4.5.1: find v_cand with v_cand % 2^k == received_lsb
    // inside the interpretation window.
    let mut candidate = (interval_base & !lsb_mask).wrapping_add(received_lsb);
    if candidate < interval_base {
        candidate = candidate.wrapping_add(window_size);
    }

    if candidate.wrapping_sub(interval_base) < window_size {
        Ok(candidate)
    } else {
        let alternative = candidate.wrapping_sub(window_size);
        if alternative.wrapping_sub(interval_base) < window_size {
            Ok(alternative)
        } else {
            // LSB value cannot be resolved - context drift or synchronization issue
            Err(RohcParsingError::InvalidLsbOperation {
                field: Field::ReceivedLsbs,
                description: format!(
                    "Cannot be uniquely resolved to a value in the interpretation window. LSBs: \
                     {:#x}, ref: {:#x}, k: {}, p: {}.",
                    received_lsb, reference_value, num_lsb_bits, p_offset
                ),
            })
        }
    }
}

/// W-LSB interpretation window for the master sequence number of one context.
///
/// Holds the last decoded SN as the window reference. The window width is the
/// profile's `msn_max_bits`: 16 for the RFC 3095 family profiles this crate
/// implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnLsbWindow {
    width: u8,
    reference: Option<SequenceNumber>,
}

impl SnLsbWindow {
    /// Creates a window with no reference yet (context not initialized).
    pub fn new(width: u8) -> Self {
        debug_assert!(width > 0 && width <= 16, "SN window width out of range");
        Self {
            width,
            reference: None,
        }
    }

    /// Maximum number of SN bits this window resolves.
    pub fn width(&self) -> u8 {
        self.width
    }

    /// Last decoded SN, if any packet has established one.
    pub fn reference(&self) -> Option<SequenceNumber> {
        self.reference
    }

    /// Sets the window reference to a freshly decoded SN.
    pub fn set_reference(&mut self, sn: SequenceNumber) {
        self.reference = Some(sn);
    }

    /// Decodes `k` received SN bits against the window reference.
    ///
    /// # Errors
    /// - `RohcParsingError::InvalidLsbOperation` - No reference established,
    ///   `k` exceeds the window width, or the LSBs do not resolve
    pub fn decode(&self, received_lsb: u16, k: u8) -> Result<SequenceNumber, RohcParsingError> {
        if k > self.width {
            return Err(RohcParsingError::InvalidLsbOperation {
                field: Field::NumLsbBits,
                description: format!(
                    "Received {} SN bits but the window is only {} bits wide.",
                    k, self.width
                ),
            });
        }
        let reference = self.reference.ok_or_else(|| RohcParsingError::InvalidLsbOperation {
            field: Field::SnLsb,
            description: "No SN reference established for this context yet.".to_string(),
        })?;
        let decoded = decode_lsb(
            received_lsb as u64,
            reference.value() as u64,
            k,
            DEFAULT_WLSB_P_OFFSET,
        )?;
        Ok(SequenceNumber::new(decoded as u16))
    }
}
