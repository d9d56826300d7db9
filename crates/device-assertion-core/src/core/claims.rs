// crates/device-assertion-core/src/core/claims.rs
// ============================================================================
// Module: Assertion Claims
// Description: Claim set carried inside assertion tokens.
// Purpose: Fix the wire names of the registered and private claims.
// Dependencies: serde, crate::core::identifiers
// ============================================================================

//! ## Overview
//! Claims bind a token to one device of one tenant for a bounded time window.
//! Times are unix seconds, matching JWT `NumericDate`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::DeviceId;
use crate::core::identifiers::TenantId;

// ============================================================================
// SECTION: Claims
// ============================================================================

/// Claim set of an assertion token.
///
/// # Invariants
/// - `exp` is strictly greater than `iat` for tokens minted by this crate.
/// - `jti` is unique per minted token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionClaims {
    /// Subject: the asserted device.
    #[serde(rename = "sub")]
    pub device_id: DeviceId,
    /// Tenant the device belongs to.
    #[serde(rename = "ten")]
    pub tenant_id: TenantId,
    /// Issued-at time (unix seconds).
    #[serde(rename = "iat")]
    pub issued_at: u64,
    /// Expiration time (unix seconds).
    #[serde(rename = "exp")]
    pub expires_at: u64,
    /// Unique token identifier.
    #[serde(rename = "jti")]
    pub token_id: String,
    /// Optional issuer label.
    #[serde(rename = "iss", default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
}

impl AssertionClaims {
    /// Returns true when the token is expired at `now` (after leeway).
    #[must_use]
    pub const fn is_expired_at(&self, now: u64, leeway_secs: u64) -> bool {
        self.expires_at.saturating_add(leeway_secs) <= now
    }

    /// Returns true when the claims name the given tenant and device.
    #[must_use]
    pub fn is_bound_to(&self, tenant_id: &TenantId, device_id: &DeviceId) -> bool {
        &self.tenant_id == tenant_id && &self.device_id == device_id
    }
}
