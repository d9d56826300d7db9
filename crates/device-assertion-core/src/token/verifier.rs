// crates/device-assertion-core/src/token/verifier.rs
// ============================================================================
// Module: Assertion Verifier
// Description: Offline verification of assertion tokens.
// Purpose: Let downstream components trust assertions without a registry round-trip.
// Dependencies: jsonwebtoken, ed25519-dalek, base64
// ============================================================================

//! ## Overview
//! [`AssertionVerifier`] checks signature, algorithm, required claims, issuer,
//! and expiry. Expiry is evaluated against a caller-supplied time so checks
//! stay deterministic; [`AssertionVerifier::verify`] uses the system clock.
//! Security posture: tokens are untrusted input; every check fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as Base64;
use ed25519_dalek::PUBLIC_KEY_LENGTH;
use ed25519_dalek::VerifyingKey;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::Validation;
use jsonwebtoken::errors::ErrorKind;

use crate::core::AssertionClaims;
use crate::core::DeviceId;
use crate::core::TenantId;
use crate::interfaces::Clock;
use crate::runtime::SystemClock;
use crate::token::error::TokenError;
use crate::token::keys::SigningAlgorithm;
use crate::token::keys::SigningSecret;

// ============================================================================
// SECTION: Verifier
// ============================================================================

/// Token verifier bound to one verification key.
#[derive(Clone)]
pub struct AssertionVerifier {
    /// Only algorithm accepted in token headers.
    algorithm: SigningAlgorithm,
    /// Key used to check signatures.
    decoding_key: DecodingKey,
    /// Ed25519 public key bytes when the algorithm is asymmetric.
    public_key: Option<[u8; PUBLIC_KEY_LENGTH]>,
    /// Required issuer, when configured.
    issuer: Option<String>,
    /// Clock skew tolerated for `exp` and `iat`, in seconds.
    leeway_secs: u64,
}

impl AssertionVerifier {
    /// Builds a verifier for a shared-secret algorithm.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidKey`] when `algorithm` is asymmetric.
    pub fn from_secret(
        secret: &SigningSecret,
        algorithm: SigningAlgorithm,
    ) -> Result<Self, TokenError> {
        if !algorithm.is_symmetric() {
            return Err(TokenError::InvalidKey(format!(
                "{algorithm} verification requires a public key"
            )));
        }
        Ok(Self {
            algorithm,
            decoding_key: DecodingKey::from_secret(secret.expose()),
            public_key: None,
            issuer: None,
            leeway_secs: 0,
        })
    }

    /// Builds an Ed25519 verifier from raw public key bytes.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidKey`] when the bytes are not a valid
    /// Ed25519 public key.
    pub fn from_ed25519_public_key(bytes: &[u8]) -> Result<Self, TokenError> {
        let key_bytes = <[u8; PUBLIC_KEY_LENGTH]>::try_from(bytes)
            .map_err(|_| TokenError::InvalidKey("invalid ed25519 public key length".to_string()))?;
        VerifyingKey::from_bytes(&key_bytes)
            .map_err(|_| TokenError::InvalidKey("invalid ed25519 public key".to_string()))?;
        Ok(Self {
            algorithm: SigningAlgorithm::EdDsa,
            decoding_key: DecodingKey::from_ed_der(&key_bytes),
            public_key: Some(key_bytes),
            issuer: None,
            leeway_secs: 0,
        })
    }

    /// Builds an Ed25519 verifier from a standard base64 public key.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidKey`] when decoding fails or the key is
    /// invalid.
    pub fn from_ed25519_public_key_base64(encoded: &str) -> Result<Self, TokenError> {
        let bytes = Base64
            .decode(encoded.trim())
            .map_err(|_| TokenError::InvalidKey("invalid base64 public key".to_string()))?;
        Self::from_ed25519_public_key(&bytes)
    }

    /// Requires the given issuer on verified tokens.
    #[must_use]
    pub fn with_issuer(mut self, issuer: Option<String>) -> Self {
        self.issuer = issuer;
        self
    }

    /// Sets the tolerated clock skew in seconds.
    #[must_use]
    pub const fn with_leeway(mut self, leeway_secs: u64) -> Self {
        self.leeway_secs = leeway_secs;
        self
    }

    /// Returns the accepted algorithm.
    #[must_use]
    pub const fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }

    /// Returns the Ed25519 public key as standard base64, when asymmetric.
    #[must_use]
    pub fn public_key_base64(&self) -> Option<String> {
        self.public_key.map(|key| Base64.encode(key))
    }

    /// Verifies a token against the system clock.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError`] when any check fails.
    pub fn verify(&self, token: &str) -> Result<AssertionClaims, TokenError> {
        self.verify_at(token, SystemClock.now_unix_seconds())
    }

    /// Verifies a token at the given time (unix seconds).
    ///
    /// # Errors
    ///
    /// Returns [`TokenError`] when the token is malformed, the signature,
    /// algorithm, or issuer do not match, or the token is expired.
    pub fn verify_at(&self, token: &str, now: u64) -> Result<AssertionClaims, TokenError> {
        let mut validation = Validation::new(self.algorithm.jwt_algorithm());
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer.as_str()]);
        }
        let claims = jsonwebtoken::decode::<AssertionClaims>(token, &self.decoding_key, &validation)
            .map_err(|err| map_decode_error(&err))?
            .claims;
        if claims.expires_at <= claims.issued_at {
            return Err(TokenError::InvalidToken("expiration precedes issue time".to_string()));
        }
        if claims.issued_at > now.saturating_add(self.leeway_secs) {
            return Err(TokenError::InvalidToken("token issued in the future".to_string()));
        }
        if claims.is_expired_at(now, self.leeway_secs) {
            return Err(TokenError::Expired {
                expires_at: claims.expires_at,
                now,
            });
        }
        Ok(claims)
    }

    /// Verifies a token and checks it asserts the given tenant and device.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::DeviceMismatch`] when the token is valid but
    /// names another tenant or device, or any [`Self::verify_at`] error.
    pub fn verify_for_device_at(
        &self,
        token: &str,
        tenant_id: &TenantId,
        device_id: &DeviceId,
        now: u64,
    ) -> Result<AssertionClaims, TokenError> {
        let claims = self.verify_at(token, now)?;
        if !claims.is_bound_to(tenant_id, device_id) {
            return Err(TokenError::DeviceMismatch);
        }
        Ok(claims)
    }
}

impl fmt::Debug for AssertionVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssertionVerifier")
            .field("algorithm", &self.algorithm)
            .field("issuer", &self.issuer)
            .field("leeway_secs", &self.leeway_secs)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Maps codec failures onto the token error taxonomy.
fn map_decode_error(err: &jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        ErrorKind::InvalidAlgorithm => TokenError::AlgorithmMismatch,
        ErrorKind::InvalidIssuer => TokenError::IssuerMismatch,
        _ => TokenError::InvalidToken(err.to_string()),
    }
}
