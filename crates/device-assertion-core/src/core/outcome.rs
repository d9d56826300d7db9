// crates/device-assertion-core/src/core/outcome.rs
// ============================================================================
// Module: Lookup and Assertion Outcomes
// Description: Result shapes exchanged with lookup providers and callers.
// Purpose: Enforce the payload invariants of assertion results at construction.
// Dependencies: serde, crate::core::record, crate::token
// ============================================================================

//! ## Overview
//! [`LookupOutcome`] is what a registry reports for a (tenant, device) pair.
//! [`AssertionResult`] is what the service answers: a status and, only on
//! success, the record carrying a signed token.
//!
//! Both non-success statuses carry no payload so callers cannot tell a
//! disabled device from an absent one by payload content, only by status.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::record::FIELD_ASSERTION;
use crate::core::record::RegistrationRecord;
use crate::token::AssertionToken;

// ============================================================================
// SECTION: Lookup Outcome
// ============================================================================

/// Registry answer for a single device lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// The device is registered; the record is attached.
    Found(RegistrationRecord),
    /// No record exists for the tenant/device pair.
    NotFound,
}

impl LookupOutcome {
    /// Returns true when a record was found.
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

// ============================================================================
// SECTION: Assertion Status
// ============================================================================

/// Business outcome of an assertion request.
///
/// # Invariants
/// - Variants are stable for audit labeling and wire encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssertionStatus {
    /// Device is registered and enabled; a token was issued.
    Success,
    /// No registration exists for the device.
    NotFound,
    /// Device is registered but disabled.
    Forbidden,
}

impl AssertionStatus {
    /// Returns a stable label for the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::NotFound => "not_found",
            Self::Forbidden => "forbidden",
        }
    }

    /// Returns the HTTP status code used by transport bindings.
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::Success => 200,
            Self::NotFound => 404,
            Self::Forbidden => 403,
        }
    }
}

// ============================================================================
// SECTION: Assertion Result
// ============================================================================

/// Assertion service reply.
///
/// # Invariants
/// - `Success` always carries a payload with a non-empty `assertion` field.
/// - `NotFound` and `Forbidden` never carry a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssertionResult {
    /// Business outcome.
    status: AssertionStatus,
    /// Record with the embedded token, present only on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<RegistrationRecord>,
}

impl AssertionResult {
    /// Builds a success result by embedding the token into the record.
    #[must_use]
    pub fn success(mut record: RegistrationRecord, token: AssertionToken) -> Self {
        record.insert(FIELD_ASSERTION, Value::String(token.into_string()));
        Self {
            status: AssertionStatus::Success,
            payload: Some(record),
        }
    }

    /// Builds a not-found result.
    #[must_use]
    pub const fn not_found() -> Self {
        Self {
            status: AssertionStatus::NotFound,
            payload: None,
        }
    }

    /// Builds a forbidden result.
    #[must_use]
    pub const fn forbidden() -> Self {
        Self {
            status: AssertionStatus::Forbidden,
            payload: None,
        }
    }

    /// Returns the business outcome.
    #[must_use]
    pub const fn status(&self) -> AssertionStatus {
        self.status
    }

    /// Returns the payload when the assertion succeeded.
    #[must_use]
    pub const fn payload(&self) -> Option<&RegistrationRecord> {
        self.payload.as_ref()
    }

    /// Returns the signed token when the assertion succeeded.
    #[must_use]
    pub fn assertion(&self) -> Option<&str> {
        self.payload.as_ref().and_then(RegistrationRecord::assertion)
    }

    /// Consumes the result and returns the payload.
    #[must_use]
    pub fn into_payload(self) -> Option<RegistrationRecord> {
        self.payload
    }
}
