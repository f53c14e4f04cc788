//! Per-packet security for the receive core.
//!
//! The [`SecurityEngine`] owns the negotiated security configuration of one
//! entity and applies integrity verification and deciphering to inbound data
//! PDUs. The cryptographic primitives themselves are not implemented here:
//! they are injected as a [`SecurityPrimitives`] capability, stateless pure
//! functions keyed by (key, algorithm, count, direction, domain). The engine
//! only decides *whether* and *with which parameters* to call them.
//!
//! Integrity protection and ciphering are independently toggleable at
//! runtime; configuration changes take effect for the next processed PDU,
//! never retroactively.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use tracing::{debug, info};

use crate::error::ConfigError;
use crate::types::Count;

/// A 128-bit key as installed by the key-management collaborator.
pub type SecurityKey = [u8; 16];

/// A message authentication code as carried in the data-PDU trailer.
pub type Mac = [u8; 4];

/// Negotiable integrity algorithms. `Nia0` is the null algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntegrityAlgorithm {
    Nia0,
    Nia1,
    Nia2,
    Nia3,
}

impl fmt::Display for IntegrityAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IntegrityAlgorithm::Nia0 => "NIA0",
            IntegrityAlgorithm::Nia1 => "NIA1",
            IntegrityAlgorithm::Nia2 => "NIA2",
            IntegrityAlgorithm::Nia3 => "NIA3",
        };
        f.write_str(name)
    }
}

/// Negotiable ciphering algorithms. `Nea0` is the null algorithm
/// (identity transform).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CipheringAlgorithm {
    Nea0,
    Nea1,
    Nea2,
    Nea3,
}

impl fmt::Display for CipheringAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CipheringAlgorithm::Nea0 => "NEA0",
            CipheringAlgorithm::Nea1 => "NEA1",
            CipheringAlgorithm::Nea2 => "NEA2",
            CipheringAlgorithm::Nea3 => "NEA3",
        };
        f.write_str(name)
    }
}

/// Transmission direction of the link this entity receives from.
/// Fixed per entity role at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecurityDirection {
    Uplink,
    Downlink,
}

impl SecurityDirection {
    /// Direction bit as fed to the primitives.
    #[inline]
    pub const fn bit(self) -> u8 {
        match self {
            SecurityDirection::Uplink => 0,
            SecurityDirection::Downlink => 1,
        }
    }
}

/// Traffic domain of the bearer: control plane or user plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecurityDomain {
    /// Control-plane signalling bearer.
    Rrc,
    /// User-plane data bearer.
    Up,
}

impl fmt::Display for SecurityDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecurityDomain::Rrc => f.write_str("rrc"),
            SecurityDomain::Up => f.write_str("up"),
        }
    }
}

/// Security configuration of one entity.
///
/// Keys are modeled as explicit options so "integrity enabled but no key" is
/// statically distinguishable from "key present". Keys serialize as hex for
/// configuration files; they are never logged above debug severity.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Integrity algorithm, if integrity has been negotiated.
    pub integ_algo: Option<IntegrityAlgorithm>,
    /// Ciphering algorithm.
    pub cipher_algo: CipheringAlgorithm,
    /// 128-bit integrity key.
    #[serde_as(as = "Option<serde_with::hex::Hex>")]
    pub k_int: Option<SecurityKey>,
    /// 128-bit ciphering key.
    #[serde_as(as = "Option<serde_with::hex::Hex>")]
    pub k_enc: Option<SecurityKey>,
    /// Traffic domain of the owning bearer.
    pub domain: SecurityDomain,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            integ_algo: None,
            cipher_algo: CipheringAlgorithm::Nea0,
            k_int: None,
            k_enc: None,
            domain: SecurityDomain::Up,
        }
    }
}

/// Capability interface to the cryptographic primitives.
///
/// Implementations are stateless pure functions over their parameters. The
/// engine rejects, at configuration time, any algorithm the provider does
/// not advertise, so the compute methods are only ever called with supported
/// algorithms.
pub trait SecurityPrimitives: Send + fmt::Debug {
    /// Whether this provider can execute `algo`.
    fn supports_integrity(&self, algo: IntegrityAlgorithm) -> bool;

    /// Whether this provider can execute `algo`.
    fn supports_ciphering(&self, algo: CipheringAlgorithm) -> bool;

    /// Computes the message authentication code over `message`.
    fn compute_mac(
        &self,
        key: &SecurityKey,
        algo: IntegrityAlgorithm,
        count: Count,
        direction: SecurityDirection,
        domain: SecurityDomain,
        message: &[u8],
    ) -> Mac;

    /// Applies the keystream to `payload`, returning the transformed bytes.
    /// Keystream application is an involution: the same call deciphers.
    fn apply_keystream(
        &self,
        key: &SecurityKey,
        algo: CipheringAlgorithm,
        count: Count,
        direction: SecurityDirection,
        domain: SecurityDomain,
        payload: &[u8],
    ) -> Vec<u8>;
}

/// Primitives provider implementing only the null algorithms: `Nia0`
/// produces an all-zero MAC and `Nea0` is the identity transform.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSecurityPrimitives;

impl SecurityPrimitives for NullSecurityPrimitives {
    fn supports_integrity(&self, algo: IntegrityAlgorithm) -> bool {
        algo == IntegrityAlgorithm::Nia0
    }

    fn supports_ciphering(&self, algo: CipheringAlgorithm) -> bool {
        algo == CipheringAlgorithm::Nea0
    }

    fn compute_mac(
        &self,
        _key: &SecurityKey,
        _algo: IntegrityAlgorithm,
        _count: Count,
        _direction: SecurityDirection,
        _domain: SecurityDomain,
        _message: &[u8],
    ) -> Mac {
        [0; 4]
    }

    fn apply_keystream(
        &self,
        _key: &SecurityKey,
        _algo: CipheringAlgorithm,
        _count: Count,
        _direction: SecurityDirection,
        _domain: SecurityDomain,
        payload: &[u8],
    ) -> Vec<u8> {
        payload.to_vec()
    }
}

/// Applies the configured security transforms to inbound data PDUs.
#[derive(Debug)]
pub struct SecurityEngine {
    cfg: SecurityConfig,
    direction: SecurityDirection,
    integrity_enabled: bool,
    ciphering_enabled: bool,
    primitives: Box<dyn SecurityPrimitives>,
}

impl SecurityEngine {
    /// Creates an engine with the default (unprotected) configuration.
    ///
    /// Both integrity protection and ciphering start disabled; they are
    /// switched on via [`set_integrity_protection`] and [`set_ciphering`]
    /// once a configuration with the required keys is installed.
    ///
    /// [`set_integrity_protection`]: Self::set_integrity_protection
    /// [`set_ciphering`]: Self::set_ciphering
    pub fn new(direction: SecurityDirection, primitives: Box<dyn SecurityPrimitives>) -> Self {
        Self {
            cfg: SecurityConfig::default(),
            direction,
            integrity_enabled: false,
            ciphering_enabled: false,
            primitives,
        }
    }

    /// Validates and installs a new security configuration.
    ///
    /// # Errors
    /// - [`ConfigError::NullIntegrityRequiresNullCiphering`] - `Nia0` paired with non-null ciphering
    /// - [`ConfigError::NullIntegrityOnUserPlane`] - `Nia0` on a user-plane bearer
    /// - [`ConfigError::UnsupportedIntegrityAlgorithm`] / [`ConfigError::UnsupportedCipheringAlgorithm`] -
    ///   algorithm not supported by the injected primitives
    /// - [`ConfigError::IntegrityKeyMissing`] / [`ConfigError::CipheringKeyMissing`] - a protection
    ///   that is currently enabled would be left without its key
    ///
    /// On error the previous configuration remains active.
    pub fn configure(&mut self, cfg: SecurityConfig) -> Result<(), ConfigError> {
        self.validate(&cfg)?;
        self.cfg = cfg;
        info!(
            "Security configured: integrity={} ciphering={} domain={}",
            self.cfg
                .integ_algo
                .map_or_else(|| "none".to_string(), |a| a.to_string()),
            self.cfg.cipher_algo,
            self.cfg.domain,
        );
        if let Some(k_int) = &self.cfg.k_int {
            debug!("128-bit integrity key: {:02x?}", k_int);
        }
        if let Some(k_enc) = &self.cfg.k_enc {
            debug!("128-bit ciphering key: {:02x?}", k_enc);
        }
        Ok(())
    }

    fn validate(&self, cfg: &SecurityConfig) -> Result<(), ConfigError> {
        if let Some(integ_algo) = cfg.integ_algo {
            if integ_algo == IntegrityAlgorithm::Nia0 {
                if cfg.cipher_algo != CipheringAlgorithm::Nea0 {
                    return Err(ConfigError::NullIntegrityRequiresNullCiphering {
                        integrity: integ_algo,
                        ciphering: cfg.cipher_algo,
                    });
                }
                if cfg.domain != SecurityDomain::Rrc {
                    return Err(ConfigError::NullIntegrityOnUserPlane {
                        integrity: integ_algo,
                    });
                }
            }
            if !self.primitives.supports_integrity(integ_algo) {
                return Err(ConfigError::UnsupportedIntegrityAlgorithm(integ_algo));
            }
        }
        if !self.primitives.supports_ciphering(cfg.cipher_algo) {
            return Err(ConfigError::UnsupportedCipheringAlgorithm(cfg.cipher_algo));
        }
        // A protection that is already switched on must not lose its key or
        // algorithm through reconfiguration.
        if self.integrity_enabled {
            if cfg.integ_algo.is_none() {
                return Err(ConfigError::IntegrityAlgorithmMissing);
            }
            if cfg.k_int.is_none() {
                return Err(ConfigError::IntegrityKeyMissing);
            }
        }
        if self.ciphering_enabled
            && cfg.cipher_algo != CipheringAlgorithm::Nea0
            && cfg.k_enc.is_none()
        {
            return Err(ConfigError::CipheringKeyMissing);
        }
        Ok(())
    }

    /// Enables or disables integrity protection.
    ///
    /// # Errors
    /// - [`ConfigError::IntegrityKeyMissing`] - enabling without a configured key
    /// - [`ConfigError::IntegrityAlgorithmMissing`] - enabling without a configured algorithm
    pub fn set_integrity_protection(&mut self, enabled: bool) -> Result<(), ConfigError> {
        if enabled {
            if self.cfg.integ_algo.is_none() {
                return Err(ConfigError::IntegrityAlgorithmMissing);
            }
            if self.cfg.k_int.is_none() {
                return Err(ConfigError::IntegrityKeyMissing);
            }
        }
        self.integrity_enabled = enabled;
        info!("Set integrity_enabled={}", enabled);
        Ok(())
    }

    /// Enables or disables ciphering.
    ///
    /// # Errors
    /// - [`ConfigError::CipheringKeyMissing`] - enabling a non-null algorithm without a key
    pub fn set_ciphering(&mut self, enabled: bool) -> Result<(), ConfigError> {
        if enabled && self.cfg.cipher_algo != CipheringAlgorithm::Nea0 && self.cfg.k_enc.is_none() {
            return Err(ConfigError::CipheringKeyMissing);
        }
        self.ciphering_enabled = enabled;
        info!("Set ciphering_enabled={}", enabled);
        Ok(())
    }

    /// Verifies the MAC over `message` for the given count.
    ///
    /// Returns `true` when integrity protection is disabled; verification is
    /// then skipped entirely.
    pub fn verify_integrity(&self, message: &[u8], count: Count, mac: Mac) -> bool {
        if !self.integrity_enabled {
            return true;
        }
        // Enabling integrity protection is gated on both being present.
        let (Some(algo), Some(key)) = (self.cfg.integ_algo, &self.cfg.k_int) else {
            return false;
        };
        let expected =
            self.primitives
                .compute_mac(key, algo, count, self.direction, self.cfg.domain, message);
        expected == mac
    }

    /// Deciphers `payload` for the given count.
    ///
    /// The identity transform applies when ciphering is disabled, the null
    /// algorithm is configured, or no key is installed.
    pub fn decipher(&self, payload: &[u8], count: Count) -> Vec<u8> {
        if !self.ciphering_enabled || self.cfg.cipher_algo == CipheringAlgorithm::Nea0 {
            return payload.to_vec();
        }
        match &self.cfg.k_enc {
            Some(key) => self.primitives.apply_keystream(
                key,
                self.cfg.cipher_algo,
                count,
                self.direction,
                self.cfg.domain,
                payload,
            ),
            None => payload.to_vec(),
        }
    }

    /// Whether integrity protection is currently enabled.
    pub fn is_integrity_enabled(&self) -> bool {
        self.integrity_enabled
    }

    /// Whether ciphering is currently enabled.
    pub fn is_ciphering_enabled(&self) -> bool {
        self.ciphering_enabled
    }

    /// The active security configuration.
    pub fn config(&self) -> &SecurityConfig {
        &self.cfg
    }

    /// The fixed direction of this entity.
    pub fn direction(&self) -> SecurityDirection {
        self.direction
    }
}
