// crates/device-assertion-core/src/token/keys.rs
// ============================================================================
// Module: Signing Keys
// Description: Signing algorithm selection and secret handling.
// Purpose: Keep raw key bytes private and map algorithms onto the JWS codec.
// Dependencies: base64, jsonwebtoken, serde
// ============================================================================

//! ## Overview
//! A [`SigningSecret`] is the process-wide byte string used to sign tokens.
//! Its interpretation depends on the [`SigningAlgorithm`]: HMAC algorithms use
//! the bytes as the shared key, Ed25519 uses them as the 32-byte seed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as Base64;
use jsonwebtoken::Algorithm;
use serde::Deserialize;
use serde::Serialize;

use crate::token::error::TokenError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Length of an Ed25519 seed in bytes.
pub const ED25519_SEED_LENGTH: usize = 32;

// ============================================================================
// SECTION: Signing Algorithm
// ============================================================================

/// Token signing algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SigningAlgorithm {
    /// HMAC with SHA-256 over a shared secret.
    #[default]
    Hs256,
    /// HMAC with SHA-384 over a shared secret.
    Hs384,
    /// HMAC with SHA-512 over a shared secret.
    Hs512,
    /// Ed25519 signatures; verifiers hold only the public key.
    EdDsa,
}

impl SigningAlgorithm {
    /// Returns the JWS `alg` header value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hs256 => "HS256",
            Self::Hs384 => "HS384",
            Self::Hs512 => "HS512",
            Self::EdDsa => "EdDSA",
        }
    }

    /// Returns true when signer and verifier share the same secret.
    #[must_use]
    pub const fn is_symmetric(self) -> bool {
        !matches!(self, Self::EdDsa)
    }

    /// Maps onto the codec algorithm identifier.
    pub(crate) const fn jwt_algorithm(self) -> Algorithm {
        match self {
            Self::Hs256 => Algorithm::HS256,
            Self::Hs384 => Algorithm::HS384,
            Self::Hs512 => Algorithm::HS512,
            Self::EdDsa => Algorithm::EdDSA,
        }
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Signing Secret
// ============================================================================

/// Secret key material used to sign assertion tokens.
///
/// # Invariants
/// - Never empty.
/// - `Debug` output reports the length only.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    /// Wraps raw secret bytes.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidSecret`] when the secret is empty.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, TokenError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(TokenError::InvalidSecret("secret must be non-empty".to_string()));
        }
        Ok(Self(bytes))
    }

    /// Decodes a standard base64 secret.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidSecret`] when decoding fails or the
    /// result is empty.
    pub fn from_base64(encoded: &str) -> Result<Self, TokenError> {
        let bytes = Base64
            .decode(encoded.trim())
            .map_err(|_| TokenError::InvalidSecret("invalid base64 secret".to_string()))?;
        Self::new(bytes)
    }

    /// Returns the secret length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; empty secrets cannot be constructed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the raw secret bytes.
    pub(crate) fn expose(&self) -> &[u8] {
        &self.0
    }

    /// Interprets the secret as an Ed25519 seed.
    pub(crate) fn ed25519_seed(&self) -> Result<[u8; ED25519_SEED_LENGTH], TokenError> {
        <[u8; ED25519_SEED_LENGTH]>::try_from(self.0.as_slice()).map_err(|_| {
            TokenError::InvalidSecret(format!(
                "ed_dsa secret must be a {ED25519_SEED_LENGTH}-byte seed, found {} bytes",
                self.0.len()
            ))
        })
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningSecret").field("len", &self.0.len()).finish_non_exhaustive()
    }
}
