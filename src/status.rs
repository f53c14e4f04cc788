//! Status-report compilation and decoding.
//!
//! A status report is a control PDU describing the receive state relative to
//! the delivery low-water mark: the first-missing-count (FMC) field carries
//! the low-water mark itself, followed by a bitmap over the subsequent
//! counts. Bit `i` of the bitmap (MSB-first within each octet, counting from
//! the start of the bitmap) corresponds to count `FMC + i`; a set bit means
//! that count has been received. Bit 0 refers to the FMC itself and is
//! therefore always zero. Counts beyond the configured maximum report length
//! are omitted: undercounting is acceptable, overcounting is a bug.

use bytes::Bytes;

use crate::constants::STATUS_REPORT_MIN_LEN;
use crate::error::PdcpParsingError;
use crate::types::Count;
use crate::window::ReorderWindow;

/// Decoded status report, for the paired transmit entity and for test
/// introspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    /// First missing count: the peer's delivery low-water mark.
    pub fmc: Count,
    /// Counts above `fmc` reported as received.
    pub received: Vec<Count>,
}

/// Compiles a status-report control PDU from the current receive state.
///
/// # Parameters
/// - `rx_deliv`: The delivery low-water mark, emitted as the FMC field.
/// - `window`: The reordering window whose buffered counts populate the bitmap.
/// - `max_len`: Upper bound on the compiled PDU length in bytes; bitmap
///   octets beyond it are omitted.
pub fn compile_status_report(rx_deliv: Count, window: &ReorderWindow, max_len: usize) -> Bytes {
    let mut pdu = vec![0u8; STATUS_REPORT_MIN_LEN];
    // Header octet: D/C = 0, PDU type = status report, reserved bits zero.
    pdu[1..STATUS_REPORT_MIN_LEN].copy_from_slice(&rx_deliv.to_be_bytes());

    let max_bitmap_octets = max_len.saturating_sub(STATUS_REPORT_MIN_LEN);
    let max_bits = (max_bitmap_octets as u64).saturating_mul(8);
    let mut bitmap: Vec<u8> = Vec::new();
    for count in window.counts_from(rx_deliv) {
        let bit = u64::from(count - rx_deliv);
        if bit >= max_bits {
            break;
        }
        let octet = (bit / 8) as usize;
        if octet >= bitmap.len() {
            bitmap.resize(octet + 1, 0);
        }
        bitmap[octet] |= 0x80 >> (bit % 8);
    }
    pdu.extend_from_slice(&bitmap);
    Bytes::from(pdu)
}

/// Decodes a status-report control PDU body.
///
/// # Errors
/// - [`PdcpParsingError::NotEnoughData`] - PDU shorter than header plus FMC
pub fn parse_status_report(buf: &[u8]) -> Result<StatusReport, PdcpParsingError> {
    if buf.len() < STATUS_REPORT_MIN_LEN {
        return Err(PdcpParsingError::NotEnoughData {
            needed: STATUS_REPORT_MIN_LEN,
            got: buf.len(),
            context: "status report",
        });
    }
    let fmc = Count::new(u32::from_be_bytes([buf[1], buf[2], buf[3], buf[4]]));
    let mut received = Vec::new();
    for (octet_idx, octet) in buf[STATUS_REPORT_MIN_LEN..].iter().enumerate() {
        for bit_in_octet in 0..8u32 {
            if octet & (0x80 >> bit_in_octet) != 0 {
                let bit = octet_idx as u32 * 8 + bit_in_octet;
                received.push(fmc + bit);
            }
        }
    }
    Ok(StatusReport { fmc, received })
}
