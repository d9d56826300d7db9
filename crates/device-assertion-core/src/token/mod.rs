// crates/device-assertion-core/src/token/mod.rs
// ============================================================================
// Module: Assertion Token Codec
// Description: Signing and verification of compact assertion tokens.
// Purpose: Produce JWS compact tokens verifiable without registry access.
// Dependencies: jsonwebtoken, ed25519-dalek, base64, rand
// ============================================================================

//! ## Overview
//! Assertion tokens are JWS compact strings (`header.claims.signature`).
//! Shared-secret HMAC algorithms and Ed25519 are supported. A signer always
//! carries the matching verifier so the service can hand verification
//! material to downstream components.
//! Security posture: key material never appears in `Debug` output.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod error;
pub mod keys;
pub mod signer;
pub mod verifier;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use error::TokenError;
pub use keys::ED25519_SEED_LENGTH;
pub use keys::SigningAlgorithm;
pub use keys::SigningSecret;
pub use signer::AssertionSigner;
pub use signer::AssertionToken;
pub use signer::DEFAULT_TOKEN_VALIDITY_SECS;
pub use signer::TokenSettings;
pub use verifier::AssertionVerifier;
