//! Sequence-number arithmetic for the receive core.
//!
//! The wire header carries only a truncated sequence number (SN); the full
//! count value additionally contains a hyper frame number (HFN) in its upper
//! bits that both peers track implicitly. This module reconstructs the full
//! count from a received SN using half-window disambiguation around the
//! delivery low-water mark, reproducing exact modular wraparound behavior.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::Count;

/// Configured bit-width of the wire-visible sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnSize {
    /// 12-bit sequence numbers (two-octet data-PDU header).
    Len12,
    /// 18-bit sequence numbers (three-octet data-PDU header).
    Len18,
}

impl SnSize {
    /// Number of SN bits on the wire.
    #[inline]
    pub const fn bits(self) -> u8 {
        match self {
            SnSize::Len12 => 12,
            SnSize::Len18 => 18,
        }
    }

    /// Data-PDU header length in bytes for this SN size.
    #[inline]
    pub const fn header_len(self) -> usize {
        match self {
            SnSize::Len12 => 2,
            SnSize::Len18 => 3,
        }
    }

    /// Bitmask covering the SN bits.
    #[inline]
    pub const fn mask(self) -> u32 {
        (1u32 << self.bits()) - 1
    }

    /// Size of the SN space (`2^bits`).
    #[inline]
    pub const fn modulus(self) -> u32 {
        1u32 << self.bits()
    }

    /// Half the SN space; also the reordering-window capacity.
    #[inline]
    pub const fn window_size(self) -> u32 {
        1u32 << (self.bits() - 1)
    }
}

impl fmt::Display for SnSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}bit", self.bits())
    }
}

/// Extracts the wire-visible SN bits of a full count.
#[inline]
pub fn sn_of(count: Count, sn_size: SnSize) -> u32 {
    count.value() & sn_size.mask()
}

/// Extracts the hyper frame number bits of a full count.
#[inline]
pub fn hfn_of(count: Count, sn_size: SnSize) -> u32 {
    count.value() >> sn_size.bits()
}

/// Reconstructs the full count a sender intended from a received SN.
///
/// Resolves the HFN ambiguity with the half-window rule: a received SN more
/// than half the SN space below the low bits of `rx_deliv` implies one HFN
/// rollover forward, more than half above implies one rollover backward,
/// otherwise the HFN of `rx_deliv` applies. For any true count within
/// plus/minus half the SN space of `rx_deliv`, reconstruction is exact.
///
/// # Parameters
/// - `rcvd_sn`: The received SN. Must fit within `sn_size` bits.
/// - `rx_deliv`: The delivery low-water mark used as the reference point.
/// - `sn_size`: The configured SN bit-width.
///
/// # Returns
/// The reconstructed full count, wrapping modulo the count space.
pub fn decode_count(rcvd_sn: u32, rx_deliv: Count, sn_size: SnSize) -> Count {
    debug_assert!(rcvd_sn <= sn_size.mask());

    let window = i64::from(sn_size.window_size());
    let sn_deliv = i64::from(sn_of(rx_deliv, sn_size));
    let hfn_deliv = i64::from(hfn_of(rx_deliv, sn_size));
    let rcvd = i64::from(rcvd_sn);

    let rcvd_hfn = if rcvd < sn_deliv - window {
        hfn_deliv + 1
    } else if rcvd >= sn_deliv + window {
        hfn_deliv - 1
    } else {
        hfn_deliv
    };

    // Two's-complement truncation yields the correct modular wrap at the
    // edges of the 32-bit count space.
    Count::new(((rcvd_hfn << sn_size.bits()) | rcvd) as u32)
}
