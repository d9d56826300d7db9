// crates/device-assertion-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Shared lookup stubs, audit capture, and signer builders.
// Purpose: Provide reusable test infrastructure for deterministic testing.
// Dependencies: device-assertion-core, async-trait, tokio
// ============================================================================

//! ## Overview
//! Lookup stubs answer with a fixed outcome (or never answer) and count how
//! often they were called, so tests can assert the service's delegation
//! behavior as well as its results.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use device_assertion_core::AssertionAuditSink;
use device_assertion_core::AssertionService;
use device_assertion_core::AssertionSigner;
use device_assertion_core::DeviceId;
use device_assertion_core::DeviceLookup;
use device_assertion_core::FixedClock;
use device_assertion_core::LookupError;
use device_assertion_core::LookupOutcome;
use device_assertion_core::RegistrationRecord;
use device_assertion_core::SigningAlgorithm;
use device_assertion_core::SigningSecret;
use device_assertion_core::TenantId;
use device_assertion_core::TokenSettings;
use device_assertion_core::runtime::AssertionAuditEvent;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Shared secret used by most tests.
pub const SECRET: &str = "secret";
/// Default tenant used by most tests.
pub const TENANT: &str = "DEFAULT_TENANT";
/// Device used by the assertion scenarios.
pub const DEVICE: &str = "4711";
/// Fixed clock start time (unix seconds).
pub const START: u64 = 1_700_000_000;

// ============================================================================
// SECTION: Lookup Stubs
// ============================================================================

/// Lookup answering every request with the same result.
pub struct StaticLookup {
    /// Result returned for every call.
    answer: Result<LookupOutcome, LookupError>,
    /// Number of calls observed.
    calls: AtomicUsize,
}

impl StaticLookup {
    pub fn new(answer: Result<LookupOutcome, LookupError>) -> Self {
        Self {
            answer,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn found(record: RegistrationRecord) -> Self {
        Self::new(Ok(LookupOutcome::Found(record)))
    }

    pub fn not_found() -> Self {
        Self::new(Ok(LookupOutcome::NotFound))
    }

    pub fn failing(error: LookupError) -> Self {
        Self::new(Err(error))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeviceLookup for StaticLookup {
    async fn get_device(
        &self,
        _tenant_id: &TenantId,
        _device_id: &DeviceId,
    ) -> Result<LookupOutcome, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.answer.clone()
    }
}

/// Lookup that never completes.
pub struct PendingLookup;

#[async_trait]
impl DeviceLookup for PendingLookup {
    async fn get_device(
        &self,
        _tenant_id: &TenantId,
        _device_id: &DeviceId,
    ) -> Result<LookupOutcome, LookupError> {
        std::future::pending().await
    }
}

/// Lookup that answers after a delay.
pub struct DelayedLookup {
    /// Delay before answering.
    pub delay: Duration,
    /// Outcome returned after the delay.
    pub outcome: LookupOutcome,
}

#[async_trait]
impl DeviceLookup for DelayedLookup {
    async fn get_device(
        &self,
        _tenant_id: &TenantId,
        _device_id: &DeviceId,
    ) -> Result<LookupOutcome, LookupError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.outcome.clone())
    }
}

// ============================================================================
// SECTION: Audit Capture
// ============================================================================

/// Audit sink collecting events in memory.
#[derive(Default)]
pub struct RecordingAuditSink {
    /// Captured events.
    events: Mutex<Vec<AssertionAuditEvent>>,
}

impl RecordingAuditSink {
    pub fn events(&self) -> Vec<AssertionAuditEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl AssertionAuditSink for RecordingAuditSink {
    fn record(&self, event: &AssertionAuditEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

// ============================================================================
// SECTION: Builders
// ============================================================================

pub fn tenant() -> TenantId {
    TenantId::new(TENANT)
}

pub fn device() -> DeviceId {
    DeviceId::new(DEVICE)
}

pub fn secret(value: &str) -> SigningSecret {
    SigningSecret::new(value.as_bytes()).unwrap()
}

pub fn hs256_signer(value: &str) -> AssertionSigner {
    AssertionSigner::new(&secret(value), SigningAlgorithm::Hs256, TokenSettings::default())
        .unwrap()
}

pub fn ed25519_signer(seed: [u8; 32]) -> AssertionSigner {
    let secret = SigningSecret::new(seed.to_vec()).unwrap();
    AssertionSigner::new(&secret, SigningAlgorithm::EdDsa, TokenSettings::default()).unwrap()
}

/// Builds a service with the shared secret and a fixed clock.
pub fn signed_service(lookup: Arc<dyn DeviceLookup>, clock: Arc<FixedClock>) -> AssertionService {
    AssertionService::new(lookup).with_clock(clock).with_signer(hs256_signer(SECRET)).unwrap()
}
