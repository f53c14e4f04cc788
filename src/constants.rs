//! PDCP wire-format constants and receive-side defaults.
//!
//! Defines constants broadly applicable across the receive core: header
//! bitmasks, fixed field widths and default configuration values. Values
//! that depend on the configured sequence-number length live on
//! [`SnSize`](crate::sn::SnSize) instead.

use std::time::Duration;

// --- PDU header structure ---

/// Mask for the D/C bit in the first octet of any PDU (1 = data, 0 = control).
pub const PDCP_DC_BIT_MASK: u8 = 0b1000_0000;

/// Reserved bits of the first data-PDU octet when a 12-bit SN is configured.
pub const PDCP_DATA_SN12_RESERVED_MASK: u8 = 0b0111_0000;
/// Reserved bits of the first data-PDU octet when an 18-bit SN is configured.
pub const PDCP_DATA_SN18_RESERVED_MASK: u8 = 0b0111_1100;

/// Mask to extract the 3-bit control-PDU type from the first octet.
pub const PDCP_CONTROL_PDU_TYPE_MASK: u8 = 0b0111_0000;
/// Shift to align the control-PDU type field to the LSB.
pub const PDCP_CONTROL_PDU_TYPE_SHIFT: u8 = 4;
/// Reserved low bits of the first control-PDU octet.
pub const PDCP_CONTROL_RESERVED_MASK: u8 = 0b0000_1111;

/// Control-PDU type discriminator for a status report.
pub const PDCP_CONTROL_PDU_TYPE_STATUS: u8 = 0b000;

// --- Fixed field widths ---

/// Length of the trailing message authentication code field in bytes.
pub const PDCP_MAC_LEN: usize = 4;

/// Length of a status-report control PDU without any bitmap octets
/// (header octet plus the 4-byte first-missing-count field).
pub const STATUS_REPORT_MIN_LEN: usize = 5;

// --- Defaults ---

/// Default upper bound on a compiled status report, in bytes.
pub const DEFAULT_MAX_STATUS_REPORT_LEN: usize = 9000;

/// Default reordering timeout for newly constructed entities.
pub const DEFAULT_T_REORDERING: Duration = Duration::from_millis(100);
