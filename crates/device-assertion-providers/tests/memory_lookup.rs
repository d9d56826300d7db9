// crates/device-assertion-providers/tests/memory_lookup.rs
// ============================================================================
// Module: In-Memory Lookup Tests
// Description: Tests for the map-backed device lookup.
// Purpose: Validate seeding, document parsing, and tenant isolation.
// Dependencies: device-assertion-providers, device-assertion-core, serde_json
// ============================================================================

//! ## Overview
//! Exercises [`InMemoryDeviceLookup`] seeding and document parsing, plus a
//! property check that every seeded key is found under its own tenant only.

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

use device_assertion_core::DeviceId;
use device_assertion_core::DeviceLookup;
use device_assertion_core::LookupError;
use device_assertion_core::LookupOutcome;
use device_assertion_core::RegistrationRecord;
use device_assertion_core::TenantId;
use device_assertion_providers::InMemoryDeviceLookup;
use proptest::prelude::*;
use serde_json::json;

// ============================================================================
// SECTION: Seeding
// ============================================================================

#[tokio::test]
async fn inserted_device_is_found() {
    let lookup = InMemoryDeviceLookup::new();
    let record = RegistrationRecord::new().with_field("model", json!("gw-200"));
    lookup.insert(TenantId::new("t"), DeviceId::new("d"), record.clone()).unwrap();

    let outcome = lookup.get_device(&TenantId::new("t"), &DeviceId::new("d")).await.unwrap();

    assert_eq!(outcome, LookupOutcome::Found(record));
    assert_eq!(lookup.len().unwrap(), 1);
}

#[tokio::test]
async fn unknown_device_is_not_found() {
    let lookup = InMemoryDeviceLookup::new();
    assert!(lookup.is_empty().unwrap());

    let outcome = lookup.get_device(&TenantId::new("t"), &DeviceId::new("d")).await.unwrap();

    assert_eq!(outcome, LookupOutcome::NotFound);
}

#[tokio::test]
async fn devices_are_scoped_to_their_tenant() {
    let lookup = InMemoryDeviceLookup::new();
    lookup.insert(TenantId::new("a"), DeviceId::new("d"), RegistrationRecord::new()).unwrap();

    let outcome = lookup.get_device(&TenantId::new("b"), &DeviceId::new("d")).await.unwrap();

    assert_eq!(outcome, LookupOutcome::NotFound);
}

#[tokio::test]
async fn insert_replaces_and_remove_deletes() {
    let lookup = InMemoryDeviceLookup::new();
    let tenant = TenantId::new("t");
    let device = DeviceId::new("d");
    let first = RegistrationRecord::new().with_field("rev", json!(1));
    let second = RegistrationRecord::new().with_field("rev", json!(2));

    assert_eq!(lookup.insert(tenant.clone(), device.clone(), first.clone()).unwrap(), None);
    assert_eq!(lookup.insert(tenant.clone(), device.clone(), second.clone()).unwrap(), Some(first));
    assert_eq!(lookup.remove(&tenant, &device).unwrap(), Some(second));
    assert_eq!(lookup.get_device(&tenant, &device).await.unwrap(), LookupOutcome::NotFound);
}

// ============================================================================
// SECTION: Registry Documents
// ============================================================================

#[tokio::test]
async fn document_seeds_every_tenant() {
    let document = json!({
        "DEFAULT_TENANT": { "4711": {}, "4712": { "enabled": false } },
        "other": { "9": { "owner": "ops" } }
    });
    let lookup = InMemoryDeviceLookup::from_document(&document).unwrap();

    assert_eq!(lookup.len().unwrap(), 3);
    let outcome =
        lookup.get_device(&TenantId::new("other"), &DeviceId::new("9")).await.unwrap();
    let LookupOutcome::Found(record) = outcome else {
        panic!("expected found outcome");
    };
    assert_eq!(record.get("owner"), Some(&json!("ops")));
}

#[test]
fn malformed_documents_are_rejected() {
    for document in [
        json!([]),
        json!({ "t": [] }),
        json!({ "t": { "d": "not an object" } }),
        json!({ "t": { "d": null } }),
    ] {
        let result = InMemoryDeviceLookup::from_document(&document);
        assert!(
            matches!(result, Err(LookupError::InvalidResponse(_))),
            "document {document} should be rejected"
        );
    }
}

// ============================================================================
// SECTION: Properties
// ============================================================================

proptest! {
    #[test]
    fn seeded_keys_are_found_only_under_their_tenant(
        tenant in "[a-zA-Z0-9_-]{1,16}",
        device in "[a-zA-Z0-9_/ .-]{1,16}",
    ) {
        let document = json!({ tenant.clone(): { device.clone(): { "k": 1 } } });
        let lookup = InMemoryDeviceLookup::from_document(&document).unwrap();
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();

        let found = runtime
            .block_on(lookup.get_device(&TenantId::new(tenant.clone()), &DeviceId::new(device.clone())))
            .unwrap();
        prop_assert!(found.is_found());

        let other_tenant = format!("{tenant}-other");
        let missing = runtime
            .block_on(lookup.get_device(&TenantId::new(other_tenant), &DeviceId::new(device)))
            .unwrap();
        prop_assert_eq!(missing, LookupOutcome::NotFound);
    }
}
