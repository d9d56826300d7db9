// crates/device-assertion-providers/src/lib.rs
// ============================================================================
// Module: Device Assertion Providers
// Description: Built-in device lookup adapters.
// Purpose: Connect the assertion service to in-memory, file, and HTTP registries.
// Dependencies: device-assertion-core, reqwest, serde, serde_json, serde_yaml
// ============================================================================

//! ## Overview
//! This crate ships [`DeviceLookup`](device_assertion_core::DeviceLookup)
//! adapters over existing registries. None of them owns registration data;
//! they translate a backend answer into a
//! [`LookupOutcome`](device_assertion_core::LookupOutcome) or a
//! [`LookupError`](device_assertion_core::LookupError).
//! Invariants:
//! - A missing registration is `NotFound`; any backend failure is an error.
//! - Registry documents and responses are size-limited and fail closed.
//!
//! Security posture: registry responses are untrusted input.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod file;
pub mod http;
pub mod memory;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use file::FileDeviceLookup;
pub use file::FileLookupConfig;
pub use http::HttpDeviceLookup;
pub use http::HttpLookupConfig;
pub use memory::InMemoryDeviceLookup;
