// crates/device-assertion-core/src/core/identifiers.rs
// ============================================================================
// Module: Device Assertion Identifiers
// Description: Opaque identifiers for tenants and devices.
// Purpose: Provide strongly typed, serializable IDs with stable string forms.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Tenant and device identifiers are opaque strings that serialize
//! transparently. Construction never fails; validation is applied at the
//! service boundary via [`TenantId::validate`] and [`DeviceId::validate`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum identifier length in bytes.
pub const MAX_IDENTIFIER_LENGTH: usize = 256;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Identifier validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    /// Identifier is empty or whitespace only.
    #[error("{0} must be non-empty")]
    Empty(&'static str),
    /// Identifier exceeds [`MAX_IDENTIFIER_LENGTH`].
    #[error("{0} exceeds max length")]
    TooLong(&'static str),
    /// Identifier contains control characters.
    #[error("{0} contains control characters")]
    ControlCharacter(&'static str),
}

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Tenant identifier partitioning devices between operators.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// Creates a new tenant identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validates the identifier for use in an assertion request.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError`] when the identifier is empty, too long, or
    /// contains control characters.
    pub fn validate(&self) -> Result<(), IdentifierError> {
        validate_identifier("tenant id", &self.0)
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for TenantId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TenantId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Device identifier scoped to a tenant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    /// Creates a new device identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validates the identifier for use in an assertion request.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError`] when the identifier is empty, too long, or
    /// contains control characters.
    pub fn validate(&self) -> Result<(), IdentifierError> {
        validate_identifier("device id", &self.0)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for DeviceId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for DeviceId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Applies the shared identifier rules.
fn validate_identifier(field: &'static str, value: &str) -> Result<(), IdentifierError> {
    if value.trim().is_empty() {
        return Err(IdentifierError::Empty(field));
    }
    if value.len() > MAX_IDENTIFIER_LENGTH {
        return Err(IdentifierError::TooLong(field));
    }
    if value.chars().any(char::is_control) {
        return Err(IdentifierError::ControlCharacter(field));
    }
    Ok(())
}
