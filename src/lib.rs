//! `pdcpstar`: a memory-safe receive-side packet-data-convergence core in Rust.
//!
//! This library turns an unordered, possibly duplicated, possibly malicious
//! stream of link-layer frames into an ordered, deduplicated, authenticated
//! sequence of upper-layer SDUs. The primary entry point is the
//! [`RxEntity`], one instance per bearer.
//!
//! ## Core Concepts
//!
//! - **[`RxEntity`]**: the per-bearer orchestrator. Feed it raw frames via
//!   [`RxEntity::handle_pdu`]; it classifies, verifies, deciphers, reorders
//!   and delivers.
//! - **Counts**: every SDU occupies a position in a modular count space; the
//!   wire carries only a truncated sequence number that
//!   [`sn::decode_count`] resolves against the delivery low-water mark.
//! - **Security**: integrity verification and deciphering run per packet
//!   through an injected [`SecurityPrimitives`] capability; the entity never
//!   implements ciphers itself.
//! - **Reordering**: a bounded window buffers out-of-order SDUs; the
//!   t-Reordering countdown forces delivery past counts that never arrive.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use bytes::Bytes;
//! use pdcpstar::entity::{RxConfig, RxEntity, UpperControlNotifier, UpperDataNotifier};
//! use pdcpstar::pdu::build_data_pdu_header;
//! use pdcpstar::security::{NullSecurityPrimitives, SecurityDirection, SecurityEngine};
//! use pdcpstar::timer::SystemClock;
//! use pdcpstar::types::{Count, RbId};
//!
//! struct Printer;
//! impl UpperDataNotifier for Printer {
//!     fn on_new_sdu(&mut self, count: Count, sdu: Bytes) {
//!         println!("delivered {count}: {} bytes", sdu.len());
//!     }
//! }
//!
//! struct Alarms;
//! impl UpperControlNotifier for Alarms {
//!     fn on_integrity_failure(&mut self, count: Count) {
//!         eprintln!("integrity failure at {count}");
//!     }
//!     fn on_protocol_failure(&mut self) {}
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = RxConfig::default();
//!     let security =
//!         SecurityEngine::new(SecurityDirection::Uplink, Box::new(NullSecurityPrimitives));
//!     let mut entity = RxEntity::new(
//!         RbId::new(1),
//!         cfg,
//!         security,
//!         Box::new(Printer),
//!         Box::new(Alarms),
//!         Arc::new(SystemClock),
//!     );
//!
//!     // Frames may arrive out of order; delivery stays in order.
//!     let mut late = build_data_pdu_header(1, cfg.sn_size)?;
//!     late.extend_from_slice(b"second");
//!     entity.handle_pdu(&late);
//!
//!     let mut first = build_data_pdu_header(0, cfg.sn_size)?;
//!     first.extend_from_slice(b"first");
//!     entity.handle_pdu(&first);
//!
//!     assert_eq!(entity.metrics().delivered_sdus, 2);
//!     Ok(())
//! }
//! ```
//!
//! ## Concurrency model
//!
//! An entity is single-owner: the surrounding system serializes
//! `handle_pdu`, timer expiry and reconfiguration onto one logical execution
//! context. Nothing in this crate blocks or suspends.

pub mod constants;
pub mod entity;
pub mod error;
pub mod pdu;
pub mod security;
pub mod sn;
pub mod status;
pub mod timer;
pub mod types;
pub mod window;

pub use entity::{
    RxConfig, RxEntity, RxMetrics, RxState, TxStatusHandler, UpperControlNotifier,
    UpperDataNotifier,
};
pub use error::{ConfigError, PdcpBuildingError, PdcpError, PdcpParsingError};
pub use security::{
    CipheringAlgorithm, IntegrityAlgorithm, NullSecurityPrimitives, SecurityConfig,
    SecurityDirection, SecurityDomain, SecurityEngine, SecurityPrimitives,
};
pub use sn::SnSize;
pub use status::{StatusReport, compile_status_report, parse_status_report};
pub use timer::mock_clock::MockClock;
pub use timer::{Clock, SystemClock};
pub use types::{Count, RbId};
pub use window::{InsertOutcome, ReorderWindow};
