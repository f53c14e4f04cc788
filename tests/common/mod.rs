//! Common test utilities for receive-core integration tests.
//!
//! Provides shared helper functions for creating entities under test,
//! recording notifiers, deterministic security primitives and PDU builders
//! used across all integration tests.

#![allow(dead_code)] // Not every helper is used by every test binary

use std::sync::{Arc, Mutex};
use std::time::Instant;

use bytes::Bytes;
use pdcpstar::entity::{
    RxConfig, RxEntity, TxStatusHandler, UpperControlNotifier, UpperDataNotifier,
};
use pdcpstar::pdu::build_data_pdu_header;
use pdcpstar::security::{
    CipheringAlgorithm, IntegrityAlgorithm, Mac, SecurityConfig, SecurityDirection, SecurityDomain,
    SecurityEngine, SecurityKey, SecurityPrimitives,
};
use pdcpstar::sn::SnSize;
use pdcpstar::timer::mock_clock::MockClock;
use pdcpstar::types::{Count, RbId};

/// Integrity key installed by the secured harness.
pub const K_INT: SecurityKey = [0x11; 16];
/// Ciphering key installed by the secured harness.
pub const K_ENC: SecurityKey = [0x22; 16];

/// Installs a tracing subscriber honoring `RUST_LOG`, once per process.
/// Subsequent calls are no-ops.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Deterministic security primitives for testing.
///
/// The MAC is a keyed rolling checksum over (count, direction, domain,
/// message); the keystream is a byte-wise XOR pad derived from (key, count).
/// Both are trivially forgeable and exist only to make verification and
/// deciphering observable in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct TestSecurityPrimitives;

impl TestSecurityPrimitives {
    fn keystream_byte(key: &SecurityKey, count: Count, i: usize) -> u8 {
        key[i % 16] ^ count.to_be_bytes()[i % 4] ^ (i as u8)
    }
}

impl SecurityPrimitives for TestSecurityPrimitives {
    fn supports_integrity(&self, algo: IntegrityAlgorithm) -> bool {
        matches!(algo, IntegrityAlgorithm::Nia0 | IntegrityAlgorithm::Nia2)
    }

    fn supports_ciphering(&self, algo: CipheringAlgorithm) -> bool {
        matches!(algo, CipheringAlgorithm::Nea0 | CipheringAlgorithm::Nea2)
    }

    fn compute_mac(
        &self,
        key: &SecurityKey,
        algo: IntegrityAlgorithm,
        count: Count,
        direction: SecurityDirection,
        domain: SecurityDomain,
        message: &[u8],
    ) -> Mac {
        if algo == IntegrityAlgorithm::Nia0 {
            return [0; 4];
        }
        let domain_tag = match domain {
            SecurityDomain::Rrc => 0x5A5A_0000u32,
            SecurityDomain::Up => 0,
        };
        let mut acc = count.value() ^ u32::from(direction.bit()) ^ domain_tag;
        for (i, byte) in message.iter().enumerate() {
            acc = acc.rotate_left(5) ^ u32::from(*byte) ^ u32::from(key[i % 16]);
        }
        acc.to_be_bytes()
    }

    fn apply_keystream(
        &self,
        key: &SecurityKey,
        algo: CipheringAlgorithm,
        count: Count,
        _direction: SecurityDirection,
        _domain: SecurityDomain,
        payload: &[u8],
    ) -> Vec<u8> {
        if algo == CipheringAlgorithm::Nea0 {
            return payload.to_vec();
        }
        payload
            .iter()
            .enumerate()
            .map(|(i, byte)| byte ^ Self::keystream_byte(key, count, i))
            .collect()
    }
}

/// Records every delivered SDU with its count, in delivery order.
#[derive(Clone, Default)]
pub struct RecordingSink {
    pub sdus: Arc<Mutex<Vec<(u32, Vec<u8>)>>>,
}

impl UpperDataNotifier for RecordingSink {
    fn on_new_sdu(&mut self, count: Count, sdu: Bytes) {
        self.sdus.lock().unwrap().push((count.value(), sdu.to_vec()));
    }
}

/// Records upward control notifications.
#[derive(Clone, Default)]
pub struct RecordingControl {
    pub integrity_failures: Arc<Mutex<Vec<u32>>>,
    pub protocol_failures: Arc<Mutex<u32>>,
}

impl UpperControlNotifier for RecordingControl {
    fn on_integrity_failure(&mut self, count: Count) {
        self.integrity_failures.lock().unwrap().push(count.value());
    }

    fn on_protocol_failure(&mut self) {
        *self.protocol_failures.lock().unwrap() += 1;
    }
}

/// Records status reports forwarded to the paired transmit side.
#[derive(Clone, Default)]
pub struct RecordingStatusHandler {
    pub reports: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl TxStatusHandler for RecordingStatusHandler {
    fn on_status_report(&mut self, report: Bytes) {
        self.reports.lock().unwrap().push(report.to_vec());
    }
}

/// An entity under test together with its controllable clock and recorders.
pub struct TestHarness {
    pub entity: RxEntity,
    pub clock: Arc<MockClock>,
    pub sink: RecordingSink,
    pub control: RecordingControl,
}

impl TestHarness {
    /// Counts delivered so far, in delivery order.
    pub fn delivered_counts(&self) -> Vec<u32> {
        self.sink
            .sdus
            .lock()
            .unwrap()
            .iter()
            .map(|(count, _)| *count)
            .collect()
    }

    /// Payloads delivered so far, in delivery order.
    pub fn delivered_payloads(&self) -> Vec<Vec<u8>> {
        self.sink
            .sdus
            .lock()
            .unwrap()
            .iter()
            .map(|(_, sdu)| sdu.clone())
            .collect()
    }
}

/// The security configuration installed by [`build_secured_harness`].
pub fn secured_config() -> SecurityConfig {
    SecurityConfig {
        integ_algo: Some(IntegrityAlgorithm::Nia2),
        cipher_algo: CipheringAlgorithm::Nea2,
        k_int: Some(K_INT),
        k_enc: Some(K_ENC),
        domain: SecurityDomain::Up,
    }
}

/// Creates an entity with both protections disabled (plaintext frames).
pub fn build_harness(cfg: RxConfig) -> TestHarness {
    init_tracing();
    let clock = Arc::new(MockClock::new(Instant::now()));
    let sink = RecordingSink::default();
    let control = RecordingControl::default();
    let security =
        SecurityEngine::new(SecurityDirection::Uplink, Box::new(TestSecurityPrimitives));
    let entity = RxEntity::new(
        RbId::new(1),
        cfg,
        security,
        Box::new(sink.clone()),
        Box::new(control.clone()),
        clock.clone(),
    );
    TestHarness {
        entity,
        clock,
        sink,
        control,
    }
}

/// Creates an entity with integrity protection and ciphering enabled,
/// keyed with [`K_INT`] and [`K_ENC`].
pub fn build_secured_harness(cfg: RxConfig) -> TestHarness {
    let mut harness = build_harness(cfg);
    harness.entity.configure_security(secured_config()).unwrap();
    harness.entity.set_integrity_protection(true).unwrap();
    harness.entity.set_ciphering(true).unwrap();
    harness
}

/// Builds a plaintext data PDU (no MAC trailer).
pub fn data_pdu(sn: u32, payload: &[u8], sn_size: SnSize) -> Vec<u8> {
    let mut buf = build_data_pdu_header(sn, sn_size).unwrap();
    buf.extend_from_slice(payload);
    buf
}

/// Builds a ciphered, integrity-protected data PDU for the given count.
///
/// The payload is XOR-ciphered under [`K_ENC`] and the MAC computed under
/// [`K_INT`] over the header plus ciphered payload, mirroring the receive
/// side's verify-then-decipher layering.
pub fn secured_data_pdu(sn: u32, count: Count, payload: &[u8], sn_size: SnSize) -> Vec<u8> {
    let primitives = TestSecurityPrimitives;
    let mut buf = build_data_pdu_header(sn, sn_size).unwrap();
    let ciphered = primitives.apply_keystream(
        &K_ENC,
        CipheringAlgorithm::Nea2,
        count,
        SecurityDirection::Uplink,
        SecurityDomain::Up,
        payload,
    );
    buf.extend_from_slice(&ciphered);
    let mac = primitives.compute_mac(
        &K_INT,
        IntegrityAlgorithm::Nia2,
        count,
        SecurityDirection::Uplink,
        SecurityDomain::Up,
        &buf,
    );
    buf.extend_from_slice(&mac);
    buf
}
