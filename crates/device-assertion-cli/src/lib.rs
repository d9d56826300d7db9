// crates/device-assertion-cli/src/lib.rs
// ============================================================================
// Module: Device Assertion CLI Library
// Description: Shared helpers for the device assertion command-line interface.
// Purpose: Provide reusable components (i18n) for the CLI binary and tests.
// Dependencies: Standard library.
// ============================================================================

//! ## Overview
//! This library module houses the CLI message catalog. The binary entry point
//! (`src/main.rs`) routes all user-facing output through it so messages stay
//! consistent across commands.

// ============================================================================
// SECTION: Modules
// ============================================================================

/// Message catalog and formatting helpers.
pub mod i18n;
