// crates/device-assertion-core/src/runtime/audit.rs
// ============================================================================
// Module: Assertion Audit Logging
// Description: Structured audit events for assertion requests.
// Purpose: Emit redacted JSON-line audit logs without hard dependencies.
// Dependencies: serde, serde_json, crate::interfaces
// ============================================================================

//! ## Overview
//! Every assertion request produces one [`AssertionAuditEvent`]. Events name
//! the tenant, device, and outcome, but never carry the token, the secret, or
//! record contents. Sinks route events to stderr, an append-only file, or
//! nowhere.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::interfaces::AssertionAuditSink;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Assertion audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct AssertionAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Tenant identifier as requested.
    pub tenant_id: String,
    /// Device identifier as requested.
    pub device_id: String,
    /// Outcome label (`success`, `not_found`, `forbidden`, or `error`).
    pub outcome: &'static str,
    /// Normalized error kind label when the request failed.
    pub error_kind: Option<&'static str>,
    /// Signing algorithm when a token was issued.
    pub algorithm: Option<&'static str>,
    /// Token expiration (unix seconds) when a token was issued.
    pub expires_at: Option<u64>,
    /// Redaction classification for payload logging.
    pub redaction: &'static str,
}

/// Inputs required to construct an assertion audit event.
pub struct AssertionAuditEventParams {
    /// Tenant identifier as requested.
    pub tenant_id: String,
    /// Device identifier as requested.
    pub device_id: String,
    /// Outcome label.
    pub outcome: &'static str,
    /// Normalized error kind label.
    pub error_kind: Option<&'static str>,
    /// Signing algorithm when a token was issued.
    pub algorithm: Option<&'static str>,
    /// Token expiration when a token was issued.
    pub expires_at: Option<u64>,
}

impl AssertionAuditEvent {
    /// Creates a new audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: AssertionAuditEventParams) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "device_assertion",
            timestamp_ms,
            tenant_id: params.tenant_id,
            device_id: params.device_id,
            outcome: params.outcome,
            error_kind: params.error_kind,
            algorithm: params.algorithm,
            expires_at: params.expires_at,
            redaction: "token_and_record_omitted",
        }
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl AssertionAuditSink for StderrAuditSink {
    fn record(&self, event: &AssertionAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl AssertionAuditSink for FileAuditSink {
    fn record(&self, event: &AssertionAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl AssertionAuditSink for NoopAuditSink {
    fn record(&self, _event: &AssertionAuditEvent) {}
}
