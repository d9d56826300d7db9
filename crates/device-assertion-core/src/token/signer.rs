// crates/device-assertion-core/src/token/signer.rs
// ============================================================================
// Module: Assertion Signer
// Description: Claim construction and JWS signing for assertion tokens.
// Purpose: Mint short-lived tokens binding a device to its tenant.
// Dependencies: jsonwebtoken, ed25519-dalek, base64, rand
// ============================================================================

//! ## Overview
//! [`AssertionSigner`] owns the encoding key derived from the configured
//! [`SigningSecret`] and the [`AssertionVerifier`] matching it. It is built
//! once at startup and shared read-only across requests.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use ed25519_dalek::SigningKey;
use ed25519_dalek::pkcs8::EncodePrivateKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use rand::RngCore;

use crate::core::AssertionClaims;
use crate::core::DeviceId;
use crate::core::TenantId;
use crate::token::error::TokenError;
use crate::token::keys::SigningAlgorithm;
use crate::token::keys::SigningSecret;
use crate::token::verifier::AssertionVerifier;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default validity window of an assertion token in seconds.
pub const DEFAULT_TOKEN_VALIDITY_SECS: u64 = 10;
/// Random bytes in a token identifier.
const TOKEN_ID_BYTES: usize = 16;

// ============================================================================
// SECTION: Token Types
// ============================================================================

/// Signed compact assertion token.
///
/// # Invariants
/// - Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionToken(String);

impl AssertionToken {
    /// Returns the compact token string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the token and returns the compact string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

/// Token issuance settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSettings {
    /// Time between issue and expiration.
    pub validity: Duration,
    /// Optional issuer written to and required on tokens.
    pub issuer: Option<String>,
    /// Clock skew tolerated during verification, in seconds.
    pub leeway_secs: u64,
}

impl Default for TokenSettings {
    fn default() -> Self {
        Self {
            validity: Duration::from_secs(DEFAULT_TOKEN_VALIDITY_SECS),
            issuer: None,
            leeway_secs: 0,
        }
    }
}

// ============================================================================
// SECTION: Signer
// ============================================================================

/// Token signer bound to one secret and algorithm.
pub struct AssertionSigner {
    /// Algorithm written to the token header.
    algorithm: SigningAlgorithm,
    /// Key used to produce signatures.
    encoding_key: EncodingKey,
    /// Issuance settings.
    settings: TokenSettings,
    /// Verifier matching the encoding key.
    verifier: AssertionVerifier,
}

impl AssertionSigner {
    /// Builds a signer from the configured secret.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError`] when the settings are out of range or the secret
    /// cannot serve as a key for `algorithm`.
    pub fn new(
        secret: &SigningSecret,
        algorithm: SigningAlgorithm,
        settings: TokenSettings,
    ) -> Result<Self, TokenError> {
        if settings.validity.as_secs() == 0 {
            return Err(TokenError::InvalidSettings(
                "token validity must be at least one second".to_string(),
            ));
        }
        let (encoding_key, verifier) = if algorithm.is_symmetric() {
            (
                EncodingKey::from_secret(secret.expose()),
                AssertionVerifier::from_secret(secret, algorithm)?,
            )
        } else {
            let signing_key = SigningKey::from_bytes(&secret.ed25519_seed()?);
            let document = signing_key
                .to_pkcs8_der()
                .map_err(|err| TokenError::InvalidKey(err.to_string()))?;
            (
                EncodingKey::from_ed_der(document.as_bytes()),
                AssertionVerifier::from_ed25519_public_key(signing_key.verifying_key().as_bytes())?,
            )
        };
        let verifier =
            verifier.with_issuer(settings.issuer.clone()).with_leeway(settings.leeway_secs);
        Ok(Self {
            algorithm,
            encoding_key,
            settings,
            verifier,
        })
    }

    /// Returns the signing algorithm.
    #[must_use]
    pub const fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }

    /// Returns the issuance settings.
    #[must_use]
    pub const fn settings(&self) -> &TokenSettings {
        &self.settings
    }

    /// Returns the verifier matching this signer.
    #[must_use]
    pub const fn verifier(&self) -> &AssertionVerifier {
        &self.verifier
    }

    /// Builds the claim set for a device asserted at `now` (unix seconds).
    #[must_use]
    pub fn claims_for(
        &self,
        tenant_id: &TenantId,
        device_id: &DeviceId,
        now: u64,
    ) -> AssertionClaims {
        AssertionClaims {
            device_id: device_id.clone(),
            tenant_id: tenant_id.clone(),
            issued_at: now,
            expires_at: now.saturating_add(self.settings.validity.as_secs()),
            token_id: random_token_id(),
            issuer: self.settings.issuer.clone(),
        }
    }

    /// Signs a claim set into a compact token.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Signing`] when the codec fails.
    pub fn sign(&self, claims: &AssertionClaims) -> Result<AssertionToken, TokenError> {
        let header = Header::new(self.algorithm.jwt_algorithm());
        let token = jsonwebtoken::encode(&header, claims, &self.encoding_key)
            .map_err(|err| TokenError::Signing(err.to_string()))?;
        if token.is_empty() {
            return Err(TokenError::Signing("codec produced an empty token".to_string()));
        }
        Ok(AssertionToken(token))
    }
}

impl fmt::Debug for AssertionSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssertionSigner")
            .field("algorithm", &self.algorithm)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Generates a random URL-safe token identifier.
fn random_token_id() -> String {
    let mut bytes = [0_u8; TOKEN_ID_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
