// crates/device-assertion-core/src/lib.rs
// ============================================================================
// Module: Device Assertion Core Library
// Description: Public API surface for the Device Assertion core.
// Purpose: Expose core types, interfaces, token codec, and the assertion service.
// Dependencies: crate::{core, interfaces, runtime, token}
// ============================================================================

//! ## Overview
//! Device Assertion core decides whether a device's registration status may be
//! asserted and, if so, issues a signed, self-contained token that downstream
//! components verify without contacting the registry. The registry itself is
//! reached only through the [`DeviceLookup`] interface.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;
pub mod token;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::AssertionAuditSink;
pub use interfaces::Clock;
pub use interfaces::DeviceLookup;
pub use interfaces::LookupError;
pub use runtime::AssertionError;
pub use runtime::AssertionService;
pub use runtime::FixedClock;
pub use runtime::RegistrationDecision;
pub use runtime::SystemClock;
pub use runtime::decide_registration;
pub use token::AssertionSigner;
pub use token::AssertionToken;
pub use token::AssertionVerifier;
pub use token::SigningAlgorithm;
pub use token::SigningSecret;
pub use token::TokenError;
pub use token::TokenSettings;
