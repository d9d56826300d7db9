// crates/device-assertion-config/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Shared TOML builders and file helpers for config tests.
// Purpose: Provide reusable test infrastructure for deterministic testing.
// Dependencies: tempfile
// ============================================================================

//! ## Overview
//! Builders render small but complete `device-assertion.toml` documents so
//! each test only spells out the section it exercises.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only panic-based assertions are permitted."
)]

use std::path::Path;
use std::path::PathBuf;

/// Inline HS256 signing section.
pub const SIGNING_INLINE: &str = "[signing]\nsecret = \"secret\"\n";
/// File lookup section pointing at a path that is never read during validation.
pub const LOOKUP_FILE: &str = "[lookup]\ntype = \"file\"\npath = \"registry.json\"\n";
/// Base64 of a 32-byte Ed25519 seed.
pub const ED25519_SEED_BASE64: &str = "BwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwc=";
/// Base64 of a 16-byte value.
pub const SHORT_SEED_BASE64: &str = "BwcHBwcHBwcHBwcHBwcHBw==";

/// Registry with one enabled and one disabled device.
pub const REGISTRY_JSON: &str = r#"{
  "DEFAULT_TENANT": {
    "4711": { "model": "gw-200" },
    "4712": { "enabled": false }
  }
}"#;

/// Joins config sections into one document.
pub fn config_with(sections: &[&str]) -> String {
    sections.join("\n")
}

/// Renders a file lookup section for `path`.
pub fn file_lookup_section(path: &Path) -> String {
    format!("[lookup]\ntype = \"file\"\npath = '{}'\n", path.display())
}

/// Writes `contents` to `dir/name` and returns the path.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}
