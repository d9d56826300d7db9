// crates/device-assertion-core/src/runtime/mod.rs
// ============================================================================
// Module: Device Assertion Runtime
// Description: Assertion service, decision procedure, clocks, and audit sinks.
// Purpose: Execute assertion requests against an injected device lookup.
// Dependencies: crate::{core, interfaces, token}, tokio
// ============================================================================

//! ## Overview
//! The runtime turns a lookup outcome into an assertion result. It is
//! stateless per request; the only lifecycle state is whether a signer has
//! been configured.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod audit;
pub mod clock;
pub mod decision;
pub mod service;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AssertionAuditEvent;
pub use audit::AssertionAuditEventParams;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use clock::FixedClock;
pub use clock::SystemClock;
pub use decision::RegistrationDecision;
pub use decision::decide_registration;
pub use service::AssertionError;
pub use service::AssertionService;
