// crates/device-assertion-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payloads.
// Purpose: Deterministic examples for docs and tooling.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example `device-assertion.toml`. The example validates as-is;
//! building a service from it additionally needs the referenced secret file.

/// Returns a canonical example `device-assertion.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[signing]
algorithm = "hs256"
secret_path = "/etc/device-assertion/signing.key"
secret_encoding = "base64"

[token]
validity_secs = 10
issuer = "device-registry"
leeway_secs = 0

[lookup]
type = "http"
base_url = "https://registry.example.com/v1"
timeout_ms = 6000
connect_timeout_ms = 2000
request_timeout_ms = 5000
max_body_bytes = 1048576
allow_http = false
user_agent = "device-assertion/0.1"
# auth_token = "registry-read-token"

# File-backed registry alternative:
# [lookup]
# type = "file"
# path = "/etc/device-assertion/registry.yaml"
# max_bytes = 1048576
# allow_yaml = true

[audit]
enabled = true
path = "/var/log/device-assertion/audit.jsonl"
"#,
    )
}
