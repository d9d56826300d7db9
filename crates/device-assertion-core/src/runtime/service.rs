// crates/device-assertion-core/src/runtime/service.rs
// ============================================================================
// Module: Registration Assertion Service
// Description: Lookup, enablement decision, and token issuance per request.
// Purpose: Answer "may this device's registration be asserted" with a signed token.
// Dependencies: crate::{core, interfaces, token}, tokio
// ============================================================================

//! ## Overview
//! [`AssertionService`] delegates the registry read to an injected
//! [`DeviceLookup`], applies [`decide_registration`], and signs a token for
//! enabled devices. Business outcomes (success, not found, forbidden) are
//! returned as [`AssertionResult`]; configuration, lookup, and record
//! failures are returned as [`AssertionError`].
//!
//! The signer is written once into a [`OnceLock`] during startup. Requests
//! read it without locking; a service with no signer fails every request
//! before touching the registry.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::sync::OnceLock;
use std::time::Duration;

use thiserror::Error;

use crate::core::AssertionResult;
use crate::core::DeviceId;
use crate::core::IdentifierError;
use crate::core::RecordError;
use crate::core::TenantId;
use crate::interfaces::AssertionAuditSink;
use crate::interfaces::Clock;
use crate::interfaces::DeviceLookup;
use crate::interfaces::LookupError;
use crate::runtime::audit::AssertionAuditEvent;
use crate::runtime::audit::AssertionAuditEventParams;
use crate::runtime::audit::NoopAuditSink;
use crate::runtime::clock::SystemClock;
use crate::runtime::decision::RegistrationDecision;
use crate::runtime::decision::decide_registration;
use crate::token::AssertionSigner;
use crate::token::AssertionVerifier;
use crate::token::TokenError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Assertion request failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssertionError {
    /// Tenant or device identifier is malformed.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(#[from] IdentifierError),
    /// No signer was configured before serving requests.
    #[error("assertion signer not configured")]
    SignerNotConfigured,
    /// A signer was already configured; it cannot be replaced.
    #[error("assertion signer already configured")]
    SignerAlreadyConfigured,
    /// Device lookup failed at the transport or backend level.
    #[error(transparent)]
    Lookup(#[from] LookupError),
    /// Registration record is malformed.
    #[error("invalid registration record: {0}")]
    InvalidRecord(#[from] RecordError),
    /// Token signing failed.
    #[error(transparent)]
    Token(#[from] TokenError),
}

impl AssertionError {
    /// Returns a stable label for audit logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidIdentifier(_) => "invalid_identifier",
            Self::SignerNotConfigured => "signer_not_configured",
            Self::SignerAlreadyConfigured => "signer_already_configured",
            Self::Lookup(err) => err.kind(),
            Self::InvalidRecord(_) => "invalid_record",
            Self::Token(err) => err.kind(),
        }
    }

    /// Returns true for failures caused by service configuration.
    #[must_use]
    pub const fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::SignerNotConfigured | Self::SignerAlreadyConfigured | Self::Token(_)
        )
    }
}

// ============================================================================
// SECTION: Service
// ============================================================================

/// Registration assertion service.
pub struct AssertionService {
    /// Registry lookup backend.
    lookup: Arc<dyn DeviceLookup>,
    /// Signer, written once at startup.
    signer: OnceLock<AssertionSigner>,
    /// Time source for token timestamps.
    clock: Arc<dyn Clock>,
    /// Audit event sink.
    audit: Arc<dyn AssertionAuditSink>,
    /// Upper bound on a single lookup, when configured.
    lookup_timeout: Option<Duration>,
}

impl AssertionService {
    /// Creates a service with no signer, the system clock, and no auditing.
    #[must_use]
    pub fn new(lookup: Arc<dyn DeviceLookup>) -> Self {
        Self {
            lookup,
            signer: OnceLock::new(),
            clock: Arc::new(SystemClock),
            audit: Arc::new(NoopAuditSink),
            lookup_timeout: None,
        }
    }

    /// Replaces the time source.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the audit sink.
    #[must_use]
    pub fn with_audit_sink(mut self, audit: Arc<dyn AssertionAuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Bounds every lookup by `timeout`.
    #[must_use]
    pub const fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = Some(timeout);
        self
    }

    /// Configures the signer and returns the service.
    ///
    /// # Errors
    ///
    /// Returns [`AssertionError::SignerAlreadyConfigured`] when a signer is
    /// already present.
    pub fn with_signer(self, signer: AssertionSigner) -> Result<Self, AssertionError> {
        self.configure_signer(signer)?;
        Ok(self)
    }

    /// Configures the signer exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`AssertionError::SignerAlreadyConfigured`] when a signer is
    /// already present.
    pub fn configure_signer(&self, signer: AssertionSigner) -> Result<(), AssertionError> {
        self.signer.set(signer).map_err(|_| AssertionError::SignerAlreadyConfigured)
    }

    /// Returns true once a signer has been configured.
    #[must_use]
    pub fn is_signer_configured(&self) -> bool {
        self.signer.get().is_some()
    }

    /// Returns the verifier matching the configured signer.
    #[must_use]
    pub fn verifier(&self) -> Option<&AssertionVerifier> {
        self.signer.get().map(AssertionSigner::verifier)
    }

    /// Asserts the registration status of a device.
    ///
    /// # Errors
    ///
    /// Returns [`AssertionError`] when identifiers are invalid, no signer is
    /// configured, the lookup fails, the record is malformed, or signing
    /// fails. Unknown and disabled devices are not errors.
    pub async fn assert_registration(
        &self,
        tenant_id: &TenantId,
        device_id: &DeviceId,
    ) -> Result<AssertionResult, AssertionError> {
        let outcome = self.execute(tenant_id, device_id).await;
        self.record_audit(tenant_id, device_id, &outcome);
        outcome.map(|(result, _)| result)
    }

    /// Runs one request and reports the token expiry for auditing.
    async fn execute(
        &self,
        tenant_id: &TenantId,
        device_id: &DeviceId,
    ) -> Result<(AssertionResult, Option<u64>), AssertionError> {
        tenant_id.validate()?;
        device_id.validate()?;
        let signer = self.signer.get().ok_or(AssertionError::SignerNotConfigured)?;

        let lookup = self.lookup.get_device(tenant_id, device_id);
        let outcome = match self.lookup_timeout {
            Some(timeout) => tokio::time::timeout(timeout, lookup)
                .await
                .map_err(|_| LookupError::Timeout(duration_millis(timeout)))??,
            None => lookup.await?,
        };

        match decide_registration(outcome)? {
            RegistrationDecision::Absent => Ok((AssertionResult::not_found(), None)),
            RegistrationDecision::Disabled => Ok((AssertionResult::forbidden(), None)),
            RegistrationDecision::Enabled(record) => {
                let claims =
                    signer.claims_for(tenant_id, device_id, self.clock.now_unix_seconds());
                let token = signer.sign(&claims)?;
                Ok((AssertionResult::success(record, token), Some(claims.expires_at)))
            }
        }
    }

    /// Emits the audit event for a finished request.
    fn record_audit(
        &self,
        tenant_id: &TenantId,
        device_id: &DeviceId,
        outcome: &Result<(AssertionResult, Option<u64>), AssertionError>,
    ) {
        let (label, error_kind, expires_at) = match outcome {
            Ok((result, expires_at)) => (result.status().as_str(), None, *expires_at),
            Err(err) => ("error", Some(err.kind()), None),
        };
        let algorithm = expires_at
            .and(self.signer.get())
            .map(|signer| signer.algorithm().as_str());
        self.audit.record(&AssertionAuditEvent::new(AssertionAuditEventParams {
            tenant_id: tenant_id.to_string(),
            device_id: device_id.to_string(),
            outcome: label,
            error_kind,
            algorithm,
            expires_at,
        }));
    }
}

impl fmt::Debug for AssertionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssertionService")
            .field("signer", &self.signer.get())
            .field("lookup_timeout", &self.lookup_timeout)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Converts a duration to whole milliseconds, saturating.
fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
