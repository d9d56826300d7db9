// crates/device-assertion-config/tests/service_wiring.rs
// ============================================================================
// Module: Service Wiring Tests
// Description: Loading config from disk and building the assertion service.
// Purpose: Ensure validated config produces a working, fail-closed service.
// Dependencies: device-assertion-config, device-assertion-core, tempfile, tokio
// ============================================================================

//! ## Overview
//! Tests config loading and wiring for:
//! - File loading limits and errors
//! - Secret files and their encodings
//! - End-to-end assertions through a file-backed registry
//! - Audit sink selection

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use device_assertion_config::ConfigError;
use device_assertion_config::DeviceAssertionConfig;
use device_assertion_core::AssertionStatus;
use device_assertion_core::DeviceId;
use device_assertion_core::TenantId;
use serde_json::Value;

use crate::common::ED25519_SEED_BASE64;
use crate::common::LOOKUP_FILE;
use crate::common::REGISTRY_JSON;
use crate::common::SIGNING_INLINE;
use crate::common::config_with;
use crate::common::file_lookup_section;
use crate::common::write_file;

// ============================================================================
// SECTION: Loading
// ============================================================================

#[test]
fn load_reads_explicit_path() {
    let dir = tempfile::tempdir().unwrap();
    let path =
        write_file(dir.path(), "device-assertion.toml", &config_with(&[SIGNING_INLINE, LOOKUP_FILE]));

    let config = DeviceAssertionConfig::load(Some(&path)).unwrap();

    assert_eq!(config.signing.secret.as_deref(), Some("secret"));
}

#[test]
fn load_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = DeviceAssertionConfig::load(Some(&dir.path().join("absent.toml")));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn load_rejects_oversized_file() {
    let dir = tempfile::tempdir().unwrap();
    let padding = format!("# {}\n", "x".repeat(1024 * 1024));
    let path = write_file(
        dir.path(),
        "device-assertion.toml",
        &config_with(&[&padding, SIGNING_INLINE, LOOKUP_FILE]),
    );

    let result = DeviceAssertionConfig::load(Some(&path));

    assert_eq!(result.unwrap_err(), ConfigError::Invalid("config file exceeds size limit".to_string()));
}

#[test]
fn load_rejects_non_utf8_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("device-assertion.toml");
    std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();

    let result = DeviceAssertionConfig::load(Some(&path));

    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

// ============================================================================
// SECTION: Secrets
// ============================================================================

#[test]
fn secret_file_matches_inline_secret() {
    let dir = tempfile::tempdir().unwrap();
    let key_path = write_file(dir.path(), "signing.key", "secret\n");
    let from_file = DeviceAssertionConfig::from_toml_str(&config_with(&[
        &format!("[signing]\nsecret_path = '{}'\n", key_path.display()),
        LOOKUP_FILE,
    ]))
    .unwrap();
    let inline =
        DeviceAssertionConfig::from_toml_str(&config_with(&[SIGNING_INLINE, LOOKUP_FILE])).unwrap();

    let signer = from_file.signer().unwrap();
    let claims = signer.claims_for(&TenantId::new("t"), &DeviceId::new("d"), 1_700_000_000);
    let token = signer.sign(&claims).unwrap();

    let verified = inline.verifier().unwrap().verify_at(token.as_str(), 1_700_000_001).unwrap();
    assert_eq!(verified, claims);
}

#[test]
fn base64_secret_file_is_decoded() {
    let dir = tempfile::tempdir().unwrap();
    let key_path = write_file(dir.path(), "signing.key", &format!("{ED25519_SEED_BASE64}\n"));
    let config = DeviceAssertionConfig::from_toml_str(&config_with(&[
        &format!(
            "[signing]\nalgorithm = \"ed_dsa\"\nsecret_path = '{}'\nsecret_encoding = \"base64\"\n",
            key_path.display()
        ),
        LOOKUP_FILE,
    ]))
    .unwrap();

    let verifier = config.verifier().unwrap();

    assert!(verifier.public_key_base64().is_some());
}

#[test]
fn missing_secret_file_fails_signer_build() {
    let dir = tempfile::tempdir().unwrap();
    let config = DeviceAssertionConfig::from_toml_str(&config_with(&[
        &format!("[signing]\nsecret_path = '{}'\n", dir.path().join("absent.key").display()),
        LOOKUP_FILE,
    ]))
    .unwrap();

    assert!(matches!(config.signer(), Err(ConfigError::Io(_))));
    assert!(matches!(config.build_service(), Err(ConfigError::Io(_))));
}

#[test]
fn short_ed25519_seed_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let key_path = write_file(dir.path(), "signing.key", "too-short");
    let config = DeviceAssertionConfig::from_toml_str(&config_with(&[
        &format!("[signing]\nalgorithm = \"ed_dsa\"\nsecret_path = '{}'\n", key_path.display()),
        LOOKUP_FILE,
    ]))
    .unwrap();

    assert!(matches!(config.signer(), Err(ConfigError::Invalid(_))));
}

// ============================================================================
// SECTION: Service Wiring
// ============================================================================

#[tokio::test]
async fn built_service_asserts_registered_devices() {
    let dir = tempfile::tempdir().unwrap();
    let registry = write_file(dir.path(), "registry.json", REGISTRY_JSON);
    let config = DeviceAssertionConfig::from_toml_str(&config_with(&[
        SIGNING_INLINE,
        &file_lookup_section(&registry),
        "[audit]\nenabled = false\n",
    ]))
    .unwrap();
    let service = config.build_service().unwrap();
    let tenant = TenantId::new("DEFAULT_TENANT");

    let success = service.assert_registration(&tenant, &DeviceId::new("4711")).await.unwrap();
    let forbidden = service.assert_registration(&tenant, &DeviceId::new("4712")).await.unwrap();
    let missing = service.assert_registration(&tenant, &DeviceId::new("9999")).await.unwrap();

    assert_eq!(success.status(), AssertionStatus::Success);
    assert_eq!(forbidden.status(), AssertionStatus::Forbidden);
    assert_eq!(missing.status(), AssertionStatus::NotFound);
    let token = success.assertion().unwrap();
    let claims = config.verifier().unwrap().verify(token).unwrap();
    assert_eq!(claims.device_id, DeviceId::new("4711"));
    assert_eq!(claims.expires_at - claims.issued_at, 10);
}

#[test]
fn missing_registry_fails_service_build() {
    let dir = tempfile::tempdir().unwrap();
    let config = DeviceAssertionConfig::from_toml_str(&config_with(&[
        SIGNING_INLINE,
        &file_lookup_section(&dir.path().join("absent.json")),
    ]))
    .unwrap();

    assert!(matches!(config.build_service(), Err(ConfigError::Io(_))));
}

#[tokio::test]
async fn audit_file_receives_events() {
    let dir = tempfile::tempdir().unwrap();
    let registry = write_file(dir.path(), "registry.json", REGISTRY_JSON);
    let audit_path = dir.path().join("audit.jsonl");
    let config = DeviceAssertionConfig::from_toml_str(&config_with(&[
        SIGNING_INLINE,
        &file_lookup_section(&registry),
        &format!("[audit]\npath = '{}'\n", audit_path.display()),
    ]))
    .unwrap();
    let service = config.build_service().unwrap();

    service
        .assert_registration(&TenantId::new("DEFAULT_TENANT"), &DeviceId::new("4712"))
        .await
        .unwrap();

    let log = std::fs::read_to_string(&audit_path).unwrap();
    let event: Value = serde_json::from_str(log.lines().next().unwrap()).unwrap();
    assert_eq!(event["device_id"], "4712");
    assert_eq!(event["outcome"], "forbidden");
}

#[test]
fn http_lookup_builds_without_network() {
    let config = DeviceAssertionConfig::from_toml_str(&config_with(&[
        SIGNING_INLINE,
        "[lookup]\ntype = \"http\"\nbase_url = \"https://registry.example.com\"\ntimeout_ms = 500\n",
        "[audit]\nenabled = false\n",
    ]))
    .unwrap();

    let service = config.build_service().unwrap();

    assert!(service.is_signer_configured());
}
