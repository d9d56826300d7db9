// crates/device-assertion-config/src/lib.rs
// ============================================================================
// Module: Device Assertion Config Library
// Description: Canonical config model, validation, and service wiring.
// Purpose: Single source of truth for device-assertion.toml semantics.
// Dependencies: device-assertion-core, device-assertion-providers, serde, toml
// ============================================================================

//! ## Overview
//! `device-assertion-config` defines the configuration model for the device
//! assertion service. It provides strict, fail-closed validation and builds
//! the lookup backend, audit sink, signer, and service from a validated
//! config.
//!
//! Security posture: config inputs are untrusted and signing secrets are
//! redacted from all diagnostic output.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
