// crates/device-assertion-core/tests/audit.rs
// ============================================================================
// Module: Audit Sink Tests
// Description: File-backed audit logging tests.
// Purpose: Ensure audit events land as redacted JSON lines.
// Dependencies: device-assertion-core, tempfile, serde_json
// ============================================================================

//! ## Overview
//! Drives the service with a [`FileAuditSink`] and reads the log back.

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

use std::sync::Arc;

use device_assertion_core::AssertionService;
use device_assertion_core::FIELD_ENABLED;
use device_assertion_core::FixedClock;
use device_assertion_core::RegistrationRecord;
use device_assertion_core::runtime::FileAuditSink;
use serde_json::Value;
use serde_json::json;

use crate::common::START;
use crate::common::StaticLookup;
use crate::common::device;
use crate::common::hs256_signer;
use crate::common::tenant;

/// Reads every JSON line from the audit log.
fn read_events(path: &std::path::Path) -> Vec<Value> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[tokio::test]
async fn file_sink_appends_one_line_per_request() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit.jsonl");
    let record = RegistrationRecord::new().with_field("owner", json!("ops-team"));
    let service = AssertionService::new(Arc::new(StaticLookup::found(record)))
        .with_clock(Arc::new(FixedClock::new(START)))
        .with_audit_sink(Arc::new(FileAuditSink::new(&path).unwrap()))
        .with_signer(hs256_signer("secret"))
        .unwrap();

    let first = service.assert_registration(&tenant(), &device()).await.unwrap();
    let second = service.assert_registration(&tenant(), &device()).await.unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    for token in [first.assertion().unwrap(), second.assertion().unwrap()] {
        assert!(!contents.contains(token));
    }
    assert!(!contents.contains("ops-team"));

    let events = read_events(&path);
    assert_eq!(events.len(), 2);
    for event in &events {
        assert_eq!(event["event"], "device_assertion");
        assert_eq!(event["outcome"], "success");
        assert_eq!(event["tenant_id"], "DEFAULT_TENANT");
        assert_eq!(event["algorithm"], "HS256");
        assert_eq!(event["expires_at"], START + 10);
        assert_eq!(event["redaction"], "token_and_record_omitted");
    }
}

#[tokio::test]
async fn file_sink_reopens_in_append_mode() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit.jsonl");
    let disabled = RegistrationRecord::new().with_field(FIELD_ENABLED, json!(false));

    for _ in 0 .. 2 {
        let service = AssertionService::new(Arc::new(StaticLookup::found(disabled.clone())))
            .with_audit_sink(Arc::new(FileAuditSink::new(&path).unwrap()))
            .with_signer(hs256_signer("secret"))
            .unwrap();
        service.assert_registration(&tenant(), &device()).await.unwrap();
    }

    let events = read_events(&path);
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|event| event["outcome"] == "forbidden"));
    assert!(events.iter().all(|event| event["expires_at"].is_null()));
}
