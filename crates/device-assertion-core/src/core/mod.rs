// crates/device-assertion-core/src/core/mod.rs
// ============================================================================
// Module: Device Assertion Core Types
// Description: Canonical identifiers, registration records, and assertion results.
// Purpose: Provide stable, serializable types shared by the service and adapters.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Core types describe what the registry hands back ([`LookupOutcome`],
//! [`RegistrationRecord`]) and what the service answers ([`AssertionResult`]).
//! They are the canonical source of truth for any transport binding.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod claims;
pub mod identifiers;
pub mod outcome;
pub mod record;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use claims::AssertionClaims;
pub use identifiers::DeviceId;
pub use identifiers::IdentifierError;
pub use identifiers::MAX_IDENTIFIER_LENGTH;
pub use identifiers::TenantId;
pub use outcome::AssertionResult;
pub use outcome::AssertionStatus;
pub use outcome::LookupOutcome;
pub use record::FIELD_ASSERTION;
pub use record::FIELD_ENABLED;
pub use record::RecordError;
pub use record::RegistrationRecord;
