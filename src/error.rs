//! Error types for the PDCP receive core.
//!
//! This module distinguishes between PDU parsing errors, PDU building errors
//! and security-configuration errors, consolidated under [`PdcpError`]. The
//! `thiserror` crate is used for ergonomic error definitions. None of these
//! errors is fatal to an entity: parse and security failures result in a
//! dropped, counted frame, and configuration errors leave the previous
//! configuration active.

use thiserror::Error;

use crate::security::{CipheringAlgorithm, IntegrityAlgorithm};

/// Errors that can occur while parsing an inbound PDU.
///
/// These errors indicate issues with the format or length of a received
/// frame. The frame is dropped and counted; no receive state is mutated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PdcpParsingError {
    /// Insufficient data to parse a complete field or structure.
    #[error("Incomplete PDU data: needed {needed} bytes, got {got} for {context}")]
    NotEnoughData {
        needed: usize,
        got: usize,
        context: &'static str,
    },

    /// Unrecognized control-PDU type discriminator.
    #[error("Invalid control PDU type discriminator: 0b{discriminator:03b}")]
    InvalidControlPduType { discriminator: u8 },

    /// Reserved header bits were not zero.
    #[error("Reserved header bits set in first octet 0x{octet:02X} for {context}")]
    ReservedBitsSet { octet: u8, context: &'static str },
}

/// Errors that can occur while building an outbound PDU (status reports,
/// and data-PDU headers used by tests and the paired transmit side).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PdcpBuildingError {
    /// Sequence number does not fit the configured SN bit-width.
    #[error("SN {sn} does not fit in {sn_bits} bits")]
    SnTooLarge { sn: u32, sn_bits: u8 },
}

/// Errors raised when validating a security (re-)configuration.
///
/// A rejected configuration never takes effect; the entity keeps operating
/// with its previous configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Integrity protection requires a configured integrity key.
    #[error("Cannot enable integrity protection: integrity key is not configured")]
    IntegrityKeyMissing,

    /// Integrity protection requires a configured integrity algorithm.
    #[error("Cannot enable integrity protection: integrity algorithm is not configured")]
    IntegrityAlgorithmMissing,

    /// Ciphering with a non-null algorithm requires a configured ciphering key.
    #[error("Cannot enable ciphering: ciphering key is not configured")]
    CipheringKeyMissing,

    /// The null integrity algorithm may only be paired with null ciphering.
    #[error("{integrity} is only permitted together with NEA0, got {ciphering}")]
    NullIntegrityRequiresNullCiphering {
        integrity: IntegrityAlgorithm,
        ciphering: CipheringAlgorithm,
    },

    /// The null integrity algorithm is restricted to control-plane bearers.
    #[error("{integrity} is only permitted on control-plane bearers")]
    NullIntegrityOnUserPlane { integrity: IntegrityAlgorithm },

    /// The injected primitives provider cannot execute this integrity algorithm.
    #[error("Integrity algorithm {0} is not supported by the configured primitives")]
    UnsupportedIntegrityAlgorithm(IntegrityAlgorithm),

    /// The injected primitives provider cannot execute this ciphering algorithm.
    #[error("Ciphering algorithm {0} is not supported by the configured primitives")]
    UnsupportedCipheringAlgorithm(CipheringAlgorithm),
}

/// Main error type for receive-core operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PdcpError {
    /// Error during PDU parsing.
    #[error("Parsing error: {0}")]
    Parsing(#[from] PdcpParsingError),

    /// Error during PDU building.
    #[error("Building error: {0}")]
    Building(#[from] PdcpBuildingError),

    /// Error during security configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
