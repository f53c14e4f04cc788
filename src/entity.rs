//! The receive entity.
//!
//! This module provides [`RxEntity`], the per-bearer orchestrator tying the
//! classifier, security engine, reordering window and reordering timer
//! together. One entity owns exactly one window, one timer and one security
//! configuration; the surrounding system serializes all calls into it
//! (PDU handling, timer expiry and reconfiguration share a single logical
//! execution context).
//!
//! Every failure on the receive path is local: malformed, stale or
//! unverifiable frames are dropped, counted in [`RxMetrics`] and, where the
//! taxonomy calls for it, reported through [`UpperControlNotifier`]. No
//! input leaves the counters, window or timer in an inconsistent state.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::constants::{DEFAULT_MAX_STATUS_REPORT_LEN, DEFAULT_T_REORDERING, PDCP_MAC_LEN};
use crate::error::ConfigError;
use crate::pdu::{self, ControlPduType, PduType};
use crate::security::{SecurityConfig, SecurityEngine};
use crate::sn::{self, SnSize};
use crate::status;
use crate::timer::{Clock, ReorderingTimer};
use crate::types::{Count, RbId};
use crate::window::{InsertOutcome, ReorderWindow};

/// Receive-side configuration of one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RxConfig {
    /// Wire SN bit-width; also determines the reordering-window capacity.
    pub sn_size: SnSize,
    /// Reordering timeout; `None` means infinity (never force delivery).
    pub t_reordering: Option<Duration>,
    /// Upper bound on compiled status reports, in bytes.
    pub max_status_report_len: usize,
}

impl Default for RxConfig {
    fn default() -> Self {
        Self {
            sn_size: SnSize::Len12,
            t_reordering: Some(DEFAULT_T_REORDERING),
            max_status_report_len: DEFAULT_MAX_STATUS_REPORT_LEN,
        }
    }
}

/// Receive state counters.
///
/// `rx_next` is the count expected in the next never-before-seen SDU,
/// `rx_deliv` the oldest count not yet delivered upward, and `rx_reord` the
/// count that armed the currently running reordering timer (meaningful only
/// while it runs). `rx_deliv <= rx_next` holds at all times.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RxState {
    pub rx_next: Count,
    pub rx_deliv: Count,
    pub rx_reord: Count,
}

impl fmt::Display for RxState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rx_next={} rx_deliv={} rx_reord={}",
            self.rx_next.value(),
            self.rx_deliv.value(),
            self.rx_reord.value()
        )
    }
}

/// Per-entity receive counters. Every dropped frame is accounted exactly
/// once under its drop cause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RxMetrics {
    /// Data PDUs handed to the entity.
    pub rx_data_pdus: u64,
    /// Control PDUs handed to the entity.
    pub rx_control_pdus: u64,
    /// SDUs delivered upward.
    pub delivered_sdus: u64,
    /// Frames dropped for malformed headers or truncation.
    pub dropped_parse: u64,
    /// Frames dropped for failed integrity verification.
    pub dropped_integrity: u64,
    /// Frames dropped as stale or already-buffered duplicates.
    pub dropped_duplicate: u64,
    /// Frames dropped for exceeding the reordering-window capacity.
    pub dropped_out_of_window: u64,
}

/// Upward data delivery: receives each deliverable SDU exactly once, in
/// ascending count order.
pub trait UpperDataNotifier: Send {
    fn on_new_sdu(&mut self, count: Count, sdu: Bytes);
}

/// Upward control notifications: security failures and protocol anomalies.
/// Neither is fatal to the entity.
pub trait UpperControlNotifier: Send {
    /// A data PDU failed integrity verification and was discarded.
    fn on_integrity_failure(&mut self, count: Count);
    /// A frame violated the protocol (reordering-window overflow).
    fn on_protocol_failure(&mut self);
}

/// Sink for inbound status reports, wired to the paired transmit entity.
pub trait TxStatusHandler: Send {
    fn on_status_report(&mut self, report: Bytes);
}

/// Receive entity for one bearer.
pub struct RxEntity {
    rb_id: RbId,
    cfg: RxConfig,
    st: RxState,
    window: ReorderWindow,
    timer: ReorderingTimer,
    security: SecurityEngine,
    upper_dn: Box<dyn UpperDataNotifier>,
    upper_cn: Box<dyn UpperControlNotifier>,
    status_handler: Option<Box<dyn TxStatusHandler>>,
    metrics: RxMetrics,
}

impl RxEntity {
    /// Creates an entity with zeroed state and an empty window.
    ///
    /// The reordering-window capacity is derived from the configured SN
    /// size (half the SN space). The security engine starts with whatever
    /// configuration it was constructed with; protections are enabled
    /// separately.
    pub fn new(
        rb_id: RbId,
        cfg: RxConfig,
        security: SecurityEngine,
        upper_dn: Box<dyn UpperDataNotifier>,
        upper_cn: Box<dyn UpperControlNotifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let window = ReorderWindow::new(cfg.sn_size.window_size());
        let timer = ReorderingTimer::new(clock, cfg.t_reordering);
        info!(
            rb_id = %rb_id,
            "RX entity created: sn_size={} t_reordering={:?}",
            cfg.sn_size, cfg.t_reordering
        );
        Self {
            rb_id,
            cfg,
            st: RxState::default(),
            window,
            timer,
            security,
            upper_dn,
            upper_cn,
            status_handler: None,
            metrics: RxMetrics::default(),
        }
    }

    /// Wires the paired transmit entity's status-report sink.
    pub fn set_status_handler(&mut self, handler: Box<dyn TxStatusHandler>) {
        self.status_handler = Some(handler);
    }

    /// Handles one inbound frame.
    ///
    /// Classifies the frame and runs the data or control path. All failure
    /// modes degrade to a dropped, counted frame; this method never leaves
    /// the receive state partially mutated.
    pub fn handle_pdu(&mut self, buf: &[u8]) {
        match pdu::classify(buf) {
            Ok(PduType::Data) => self.handle_data_pdu(buf),
            Ok(PduType::Control) => self.handle_control_pdu(buf),
            Err(err) => {
                self.metrics.dropped_parse += 1;
                warn!(rb_id = %self.rb_id, "Dropping PDU: {}", err);
            }
        }
    }

    fn handle_data_pdu(&mut self, buf: &[u8]) {
        self.metrics.rx_data_pdus += 1;

        let (header, header_len) = match pdu::parse_data_pdu_header(buf, self.cfg.sn_size) {
            Ok(parsed) => parsed,
            Err(err) => {
                self.metrics.dropped_parse += 1;
                warn!(rb_id = %self.rb_id, "Dropping data PDU: {}", err);
                return;
            }
        };
        let rcvd_count = sn::decode_count(header.sn, self.st.rx_deliv, self.cfg.sn_size);

        if rcvd_count < self.st.rx_deliv {
            self.metrics.dropped_duplicate += 1;
            debug!(
                rb_id = %self.rb_id,
                "Dropping late data PDU: {} below delivery mark {}",
                rcvd_count, self.st.rx_deliv
            );
            return;
        }

        // Integrity covers the header and the payload as received; the MAC
        // trailer itself is outside the protected region.
        let body = &buf[header_len..];
        let payload = if self.security.is_integrity_enabled() {
            let (payload, mac) = match pdu::split_mac(body) {
                Ok(split) => split,
                Err(err) => {
                    self.metrics.dropped_parse += 1;
                    warn!(rb_id = %self.rb_id, "Dropping data PDU: {}", err);
                    return;
                }
            };
            let message = &buf[..buf.len() - PDCP_MAC_LEN];
            if !self.security.verify_integrity(message, rcvd_count, mac) {
                self.metrics.dropped_integrity += 1;
                warn!(rb_id = %self.rb_id, "Integrity verification failed for {}", rcvd_count);
                self.upper_cn.on_integrity_failure(rcvd_count);
                return;
            }
            payload
        } else {
            body
        };

        let sdu = Bytes::from(self.security.decipher(payload, rcvd_count));

        match self.window.try_insert(self.st.rx_deliv, rcvd_count, sdu) {
            InsertOutcome::Duplicate => {
                self.metrics.dropped_duplicate += 1;
                debug!(rb_id = %self.rb_id, "Dropping duplicate data PDU for {}", rcvd_count);
                return;
            }
            InsertOutcome::OutOfWindow => {
                self.metrics.dropped_out_of_window += 1;
                warn!(
                    rb_id = %self.rb_id,
                    "Dropping data PDU for {}: outside reordering window ({})",
                    rcvd_count, self.st
                );
                self.upper_cn.on_protocol_failure();
                return;
            }
            InsertOutcome::Inserted => {}
        }

        if rcvd_count >= self.st.rx_next {
            self.st.rx_next = rcvd_count + 1;
        }
        if rcvd_count == self.st.rx_deliv {
            self.deliver_consecutive();
        }
        self.update_reordering_timer();
    }

    fn handle_control_pdu(&mut self, buf: &[u8]) {
        self.metrics.rx_control_pdus += 1;
        match pdu::parse_control_pdu_header(buf) {
            Ok(ControlPduType::StatusReport) => match &mut self.status_handler {
                Some(handler) => handler.on_status_report(Bytes::copy_from_slice(buf)),
                None => {
                    debug!(rb_id = %self.rb_id, "No status handler wired; dropping status report");
                }
            },
            Err(err) => {
                self.metrics.dropped_parse += 1;
                warn!(rb_id = %self.rb_id, "Dropping control PDU: {}", err);
            }
        }
    }

    /// Delivers the contiguous run starting at `rx_deliv` and advances the
    /// low-water mark past it.
    fn deliver_consecutive(&mut self) {
        let (drained, next_deliv) = self.window.drain_contiguous_from(self.st.rx_deliv);
        for (count, sdu) in drained {
            self.metrics.delivered_sdus += 1;
            self.upper_dn.on_new_sdu(count, sdu);
        }
        self.st.rx_deliv = next_deliv;
    }

    /// Stops the timer once the low-water mark has caught up, then re-arms
    /// it if a gap remains. Cancellation runs first so a catch-up never
    /// triggers a spurious forced drain.
    fn update_reordering_timer(&mut self) {
        if self.timer.is_running() && self.st.rx_deliv >= self.st.rx_reord {
            self.timer.stop();
        }
        let gap_remains = self.st.rx_deliv < self.st.rx_next;
        if !self.timer.is_running() && gap_remains && self.timer.start() {
            self.st.rx_reord = self.st.rx_next;
        }
    }

    /// Handles expiry of the reordering timer.
    ///
    /// Delivers every buffered SDU below `rx_reord` (abandoning the wait for
    /// the missing counts), then the contiguous run from `rx_reord`, and
    /// re-arms the timer if a further gap remains. A stale expiry, observed
    /// after the timer was stopped (for example by [`reestablish`]), is a
    /// no-op.
    ///
    /// The surrounding system must invoke this on the entity's own
    /// execution context.
    ///
    /// [`reestablish`]: Self::reestablish
    pub fn handle_reordering_expiry(&mut self) {
        if !self.timer.is_running() {
            return;
        }
        self.timer.stop();
        debug!(
            rb_id = %self.rb_id,
            "Reordering timeout: forcing delivery below {} ({})", self.st.rx_reord, self.st
        );

        let flushed = self.window.discard_up_to(self.st.rx_reord);
        for (count, sdu) in flushed {
            self.metrics.delivered_sdus += 1;
            self.upper_dn.on_new_sdu(count, sdu);
        }
        self.st.rx_deliv = self.st.rx_reord;
        self.deliver_consecutive();
        self.update_reordering_timer();
    }

    /// Runs the expiry handler if the armed timer has reached its deadline.
    ///
    /// Convenience for drivers that poll instead of scheduling callbacks.
    pub fn poll_reordering_timer(&mut self) {
        if self.timer.is_expired() {
            self.handle_reordering_expiry();
        }
    }

    /// Performs a peer-triggered full reset.
    ///
    /// Validates and installs `sec_cfg`, stops the reordering timer,
    /// discards (never delivers) all buffered SDUs and zeroes all three
    /// counters. On a configuration error nothing changes and the previous
    /// configuration stays active.
    pub fn reestablish(&mut self, sec_cfg: SecurityConfig) -> Result<(), ConfigError> {
        self.security.configure(sec_cfg)?;
        self.timer.stop();
        let discarded = self.window.clear();
        self.st = RxState::default();
        info!(rb_id = %self.rb_id, discarded, "RX entity re-established");
        Ok(())
    }

    /// Validates and installs a new security configuration.
    ///
    /// Takes effect for the next processed PDU, never retroactively.
    pub fn configure_security(&mut self, sec_cfg: SecurityConfig) -> Result<(), ConfigError> {
        self.security.configure(sec_cfg)
    }

    /// Enables or disables integrity protection.
    pub fn set_integrity_protection(&mut self, enabled: bool) -> Result<(), ConfigError> {
        self.security.set_integrity_protection(enabled)
    }

    /// Enables or disables ciphering.
    pub fn set_ciphering(&mut self, enabled: bool) -> Result<(), ConfigError> {
        self.security.set_ciphering(enabled)
    }

    /// Compiles a status report describing the current receive state.
    pub fn compile_status_report(&self) -> Bytes {
        status::compile_status_report(
            self.st.rx_deliv,
            &self.window,
            self.cfg.max_status_report_len,
        )
    }

    /// Current receive state counters.
    pub fn state(&self) -> RxState {
        self.st
    }

    /// Overwrites the receive state counters. Testing helper.
    pub fn set_state(&mut self, st: RxState) {
        self.st = st;
    }

    /// Whether the reordering timer is currently armed.
    pub fn is_reordering_timer_running(&self) -> bool {
        self.timer.is_running()
    }

    /// The active security configuration.
    pub fn security_config(&self) -> &SecurityConfig {
        self.security.config()
    }

    /// Snapshot of the receive counters.
    pub fn metrics(&self) -> RxMetrics {
        self.metrics
    }

    /// Number of SDUs currently buffered in the reordering window.
    pub fn window_len(&self) -> usize {
        self.window.len()
    }
}

impl fmt::Debug for RxEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RxEntity")
            .field("rb_id", &self.rb_id)
            .field("cfg", &self.cfg)
            .field("st", &self.st)
            .field("window_len", &self.window.len())
            .field("timer_running", &self.timer.is_running())
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}
