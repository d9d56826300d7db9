// crates/device-assertion-core/src/interfaces/mod.rs
// ============================================================================
// Module: Device Assertion Interfaces
// Description: Backend-agnostic interfaces for lookups, time, and auditing.
// Purpose: Define the contract surfaces used by the assertion service.
// Dependencies: async-trait, thiserror, crate::core, crate::runtime::audit
// ============================================================================

//! ## Overview
//! Interfaces define how the assertion service reaches the device registry,
//! reads time, and records audit events without embedding backend details.
//! Implementations must report transport failures as errors; they must never
//! translate an outage into "not found".

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use thiserror::Error;

use crate::core::DeviceId;
use crate::core::LookupOutcome;
use crate::core::TenantId;
use crate::runtime::audit::AssertionAuditEvent;

// ============================================================================
// SECTION: Device Lookup
// ============================================================================

/// Device lookup transport failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// Backend could not be reached or answered with an unexpected status.
    #[error("device lookup unavailable: {0}")]
    Unavailable(String),
    /// Backend did not answer within the configured timeout.
    #[error("device lookup timed out after {0} ms")]
    Timeout(u64),
    /// Backend answered with a malformed response.
    #[error("device lookup invalid response: {0}")]
    InvalidResponse(String),
}

impl LookupError {
    /// Returns a stable label for audit logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "lookup_unavailable",
            Self::Timeout(_) => "lookup_timeout",
            Self::InvalidResponse(_) => "lookup_invalid_response",
        }
    }
}

/// Device registry lookup.
#[async_trait]
pub trait DeviceLookup: Send + Sync {
    /// Resolves a tenant/device pair into a registration record or absence.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] when the registry cannot answer.
    async fn get_device(
        &self,
        tenant_id: &TenantId,
        device_id: &DeviceId,
    ) -> Result<LookupOutcome, LookupError>;
}

// ============================================================================
// SECTION: Clock
// ============================================================================

/// Wall-clock source for token timestamps.
pub trait Clock: Send + Sync {
    /// Returns the current time in unix seconds.
    fn now_unix_seconds(&self) -> u64;
}

// ============================================================================
// SECTION: Audit Sink
// ============================================================================

/// Audit sink for assertion request events.
pub trait AssertionAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &AssertionAuditEvent);
}
