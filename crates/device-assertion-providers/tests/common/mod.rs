// crates/device-assertion-providers/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Shared registry fixtures for lookup adapter tests.
// Purpose: Provide reusable test infrastructure for deterministic testing.
// Dependencies: tiny_http, tempfile
// ============================================================================

//! ## Overview
//! Local registry servers answer one request each and hand back what they
//! received, so tests can assert on both the lookup result and the request
//! the adapter sent.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Registry Server
// ============================================================================

/// Request observed by a local registry server.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    /// Request method.
    pub method: String,
    /// Raw request path.
    pub path: String,
    /// Authorization header, when sent.
    pub authorization: Option<String>,
    /// Accept header, when sent.
    pub accept: Option<String>,
}

/// Canned response served by a local registry server.
pub struct CannedResponse {
    /// Response status code.
    pub status: u16,
    /// Response body.
    pub body: String,
    /// Delay before answering.
    pub delay: Duration,
}

impl CannedResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    pub const fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Spawns a registry server answering a single request.
pub fn spawn_registry(response: CannedResponse) -> (String, thread::JoinHandle<CapturedRequest>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let url = format!("http://{addr}");

    let handle = thread::spawn(move || {
        let request = server.recv().unwrap();
        let captured = CapturedRequest {
            method: request.method().to_string(),
            path: request.url().to_string(),
            authorization: header_value(request.headers(), "Authorization"),
            accept: header_value(request.headers(), "Accept"),
        };
        thread::sleep(response.delay);
        let reply = Response::from_string(response.body).with_status_code(response.status);
        let _ = request.respond(reply);
        captured
    });

    (url, handle)
}

/// Returns a base URL where nothing is listening.
pub fn unreachable_registry() -> String {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    drop(server);
    format!("http://{addr}")
}

/// Finds a header value by case-insensitive name.
fn header_value(headers: &[Header], name: &str) -> Option<String> {
    headers
        .iter()
        .find(|header| header.field.as_str().as_str().eq_ignore_ascii_case(name))
        .map(|header| header.value.as_str().to_string())
}

// ============================================================================
// SECTION: Registry Files
// ============================================================================

/// Writes a registry document into `dir`.
pub fn write_registry(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

/// Registry document with one enabled and one disabled device.
pub const REGISTRY_JSON: &str = r#"{
  "DEFAULT_TENANT": {
    "4711": { "model": "gw-200" },
    "4712": { "enabled": false }
  },
  "other": {
    "4711": { "enabled": true, "owner": "ops" }
  }
}"#;

/// Same registry as [`REGISTRY_JSON`], in YAML.
pub const REGISTRY_YAML: &str = "\
DEFAULT_TENANT:
  \"4711\":
    model: gw-200
  \"4712\":
    enabled: false
other:
  \"4711\":
    enabled: true
    owner: ops
";
