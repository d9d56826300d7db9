// crates/device-assertion-core/src/token/error.rs
// ============================================================================
// Module: Token Errors
// Description: Failure taxonomy for token signing and verification.
// Purpose: Separate key/configuration failures from token rejection reasons.
// Dependencies: thiserror
// ============================================================================

//! Token signing and verification errors.

use thiserror::Error;

/// Token signing and verification errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Signing secret is missing, empty, or malformed.
    #[error("invalid signing secret: {0}")]
    InvalidSecret(String),
    /// Signing or verification key is unusable for the algorithm.
    #[error("invalid key: {0}")]
    InvalidKey(String),
    /// Token settings are out of range.
    #[error("invalid token settings: {0}")]
    InvalidSettings(String),
    /// Signing backend failed.
    #[error("token signing failed: {0}")]
    Signing(String),
    /// Token is malformed or misses required claims.
    #[error("invalid token: {0}")]
    InvalidToken(String),
    /// Signature does not match the verification key.
    #[error("token signature invalid")]
    InvalidSignature,
    /// Token header names an algorithm other than the configured one.
    #[error("token algorithm mismatch")]
    AlgorithmMismatch,
    /// Token issuer differs from the configured issuer.
    #[error("token issuer mismatch")]
    IssuerMismatch,
    /// Token expired.
    #[error("token expired at {expires_at} (now {now})")]
    Expired {
        /// Expiration time (unix seconds).
        expires_at: u64,
        /// Verification time (unix seconds).
        now: u64,
    },
    /// Token asserts a different tenant or device than expected.
    #[error("token subject does not match the requested device")]
    DeviceMismatch,
}

impl TokenError {
    /// Returns a stable label for audit logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidSecret(_) => "invalid_secret",
            Self::InvalidKey(_) => "invalid_key",
            Self::InvalidSettings(_) => "invalid_settings",
            Self::Signing(_) => "signing_failed",
            Self::InvalidToken(_) => "invalid_token",
            Self::InvalidSignature => "invalid_signature",
            Self::AlgorithmMismatch => "algorithm_mismatch",
            Self::IssuerMismatch => "issuer_mismatch",
            Self::Expired {
                ..
            } => "expired",
            Self::DeviceMismatch => "device_mismatch",
        }
    }
}
