// crates/device-assertion-providers/src/http.rs
// ============================================================================
// Module: HTTP Device Lookup
// Description: Device lookup backed by a remote device registry over HTTP.
// Purpose: Fetch registration records with strict status, size, and time limits.
// Dependencies: device-assertion-core, reqwest, serde, serde_json
// ============================================================================

//! ## Overview
//! [`HttpDeviceLookup`] issues `GET {base_url}/registration/{tenant}/{device}`
//! and maps the answer onto a lookup outcome:
//! - `200` with a record object (or a `{"device-id", "data"}` envelope) is found
//! - `404` is not found
//! - any other status, connection failure, or redirect is unavailable
//! - malformed or oversized bodies are invalid responses
//!
//! Redirects are never followed. Identifier path segments are
//! percent-encoded and the dot segments `.` and `..` are rejected, so
//! identifiers cannot escape the registration path.
//! Security posture: the registry endpoint is untrusted; fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use device_assertion_core::DeviceId;
use device_assertion_core::DeviceLookup;
use device_assertion_core::LookupError;
use device_assertion_core::LookupOutcome;
use device_assertion_core::RegistrationRecord;
use device_assertion_core::TenantId;
use reqwest::Client;
use reqwest::Response;
use reqwest::StatusCode;
use reqwest::Url;
use reqwest::header::ACCEPT;
use reqwest::header::AUTHORIZATION;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use reqwest::redirect::Policy;
use serde::Deserialize;
use serde_json::Value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Path segment under which the registry exposes registrations.
const REGISTRATION_SEGMENT: &str = "registration";
/// Envelope key naming the device.
const ENVELOPE_DEVICE_KEY: &str = "device-id";
/// Envelope key holding the record.
const ENVELOPE_DATA_KEY: &str = "data";

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the HTTP lookup.
///
/// # Invariants
/// - `allow_http = false` blocks cleartext `http://` base URLs.
/// - `max_body_bytes` is a hard upper bound on response bodies.
/// - Base URLs with embedded credentials are rejected.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpLookupConfig {
    /// Registry base URL.
    pub base_url: String,
    /// Optional bearer token sent with every request.
    #[serde(default)]
    pub auth_token: Option<String>,
    /// Connect timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Whole-request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Maximum response body size, in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Allow cleartext HTTP (disabled by default).
    #[serde(default)]
    pub allow_http: bool,
    /// User agent string for outbound requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl HttpLookupConfig {
    /// Creates a configuration with default limits for `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth_token: None,
            connect_timeout_ms: default_connect_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            max_body_bytes: default_max_body_bytes(),
            allow_http: false,
            user_agent: default_user_agent(),
        }
    }
}

impl fmt::Debug for HttpLookupConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpLookupConfig")
            .field("base_url", &self.base_url)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("allow_http", &self.allow_http)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Serde default for [`HttpLookupConfig::connect_timeout_ms`].
const fn default_connect_timeout_ms() -> u64 {
    2_000
}

/// Serde default for [`HttpLookupConfig::request_timeout_ms`].
const fn default_request_timeout_ms() -> u64 {
    5_000
}

/// Serde default for [`HttpLookupConfig::max_body_bytes`].
const fn default_max_body_bytes() -> usize {
    1024 * 1024
}

/// Serde default for [`HttpLookupConfig::user_agent`].
fn default_user_agent() -> String {
    "device-assertion/0.1".to_string()
}

// ============================================================================
// SECTION: Lookup Implementation
// ============================================================================

/// Device lookup querying a remote registry.
///
/// # Invariants
/// - Redirects are not followed.
/// - Responses exceeding configured limits fail closed.
pub struct HttpDeviceLookup {
    /// Parsed registry base URL.
    base_url: Url,
    /// Headers sent with every request.
    headers: HeaderMap,
    /// Whole-request timeout reported on expiry.
    request_timeout_ms: u64,
    /// Maximum response body size, in bytes.
    max_body_bytes: usize,
    /// HTTP client configured with timeouts.
    client: Client,
}

impl HttpDeviceLookup {
    /// Creates a lookup for the configured registry.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Unavailable`] when the base URL, token, or
    /// limits are invalid or the HTTP client cannot be built.
    pub fn new(config: &HttpLookupConfig) -> Result<Self, LookupError> {
        let base_url = parse_base_url(&config.base_url, config.allow_http)?;
        if config.connect_timeout_ms == 0 || config.request_timeout_ms == 0 {
            return Err(unavailable("http lookup timeouts must be greater than zero"));
        }
        if config.max_body_bytes == 0 {
            return Err(unavailable("http lookup body limit must be greater than zero"));
        }
        let headers = build_headers(config.auth_token.as_deref())?;
        let client = Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .user_agent(config.user_agent.clone())
            .redirect(Policy::none())
            .build()
            .map_err(|err| LookupError::Unavailable(format!("http client build failed: {err}")))?;
        Ok(Self {
            base_url,
            headers,
            request_timeout_ms: config.request_timeout_ms,
            max_body_bytes: config.max_body_bytes,
            client,
        })
    }

    /// Returns the registration URL for a device.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Unavailable`] when the base URL cannot carry
    /// path segments or when an identifier is a dot segment.
    pub fn registration_url(
        &self,
        tenant_id: &TenantId,
        device_id: &DeviceId,
    ) -> Result<Url, LookupError> {
        let tenant = path_segment("tenant id", tenant_id.as_str())?;
        let device = path_segment("device id", device_id.as_str())?;
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| unavailable("registry base url cannot carry a path"))?
            .pop_if_empty()
            .extend([REGISTRATION_SEGMENT, tenant, device]);
        Ok(url)
    }
}

#[async_trait]
impl DeviceLookup for HttpDeviceLookup {
    async fn get_device(
        &self,
        tenant_id: &TenantId,
        device_id: &DeviceId,
    ) -> Result<LookupOutcome, LookupError> {
        let url = self.registration_url(tenant_id, device_id)?;
        let response = self
            .client
            .get(url)
            .headers(self.headers.clone())
            .send()
            .await
            .map_err(|err| self.map_transport_error(&err))?;
        match response.status() {
            StatusCode::OK => {
                let body = self.read_body_limited(response).await?;
                decode_registration(&body, device_id).map(LookupOutcome::Found)
            }
            StatusCode::NOT_FOUND => Ok(LookupOutcome::NotFound),
            status => Err(LookupError::Unavailable(format!("registry returned status {status}"))),
        }
    }
}

impl HttpDeviceLookup {
    /// Maps a client error onto the lookup error taxonomy.
    fn map_transport_error(&self, err: &reqwest::Error) -> LookupError {
        if err.is_timeout() {
            LookupError::Timeout(self.request_timeout_ms)
        } else {
            LookupError::Unavailable(format!("registry request failed: {err}"))
        }
    }

    /// Reads the response body while enforcing the byte limit.
    async fn read_body_limited(&self, mut response: Response) -> Result<Vec<u8>, LookupError> {
        let max_bytes = self.max_body_bytes;
        if let Some(expected) = response.content_length()
            && expected > u64::try_from(max_bytes).unwrap_or(u64::MAX)
        {
            return Err(oversized());
        }
        let mut buf = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|err| {
            if err.is_timeout() {
                LookupError::Timeout(self.request_timeout_ms)
            } else {
                LookupError::Unavailable("failed to read registry response".to_string())
            }
        })? {
            if buf.len().saturating_add(chunk.len()) > max_bytes {
                return Err(oversized());
            }
            buf.extend_from_slice(&chunk);
        }
        Ok(buf)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses and validates the registry base URL.
fn parse_base_url(raw: &str, allow_http: bool) -> Result<Url, LookupError> {
    let url = Url::parse(raw.trim()).map_err(|_| unavailable("invalid registry base url"))?;
    match url.scheme() {
        "https" => {}
        "http" if allow_http => {}
        _ => return Err(unavailable("unsupported registry url scheme")),
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err(unavailable("registry url credentials are not allowed"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(unavailable("registry url must not carry a query or fragment"));
    }
    if url.cannot_be_a_base() {
        return Err(unavailable("registry base url cannot carry a path"));
    }
    Ok(url)
}

/// Builds the static request headers.
fn build_headers(auth_token: Option<&str>) -> Result<HeaderMap, LookupError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    if let Some(token) = auth_token {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
            .map_err(|_| unavailable("invalid registry auth token"))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }
    Ok(headers)
}

/// Returns `value` when it is usable as a single URL path segment.
///
/// URL path handling drops `.` and `..`, which would address a different
/// registry resource than the requested registration.
fn path_segment<'a>(field: &str, value: &'a str) -> Result<&'a str, LookupError> {
    if matches!(value, "." | "..") {
        return Err(LookupError::Unavailable(format!(
            "{field} cannot be used as a registry path segment"
        )));
    }
    Ok(value)
}

/// Decodes a registration body, unwrapping the device envelope when present.
fn decode_registration(
    body: &[u8],
    device_id: &DeviceId,
) -> Result<RegistrationRecord, LookupError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|_| LookupError::InvalidResponse("registry response is not json".to_string()))?;
    let Value::Object(mut fields) = value else {
        return Err(LookupError::InvalidResponse(
            "registry response must be a json object".to_string(),
        ));
    };
    let is_envelope = fields.contains_key(ENVELOPE_DEVICE_KEY)
        && fields.get(ENVELOPE_DATA_KEY).is_some_and(Value::is_object);
    if !is_envelope {
        return Ok(RegistrationRecord::from_fields(fields));
    }
    match fields.get(ENVELOPE_DEVICE_KEY) {
        Some(Value::String(named)) if named == device_id.as_str() => {}
        _ => {
            return Err(LookupError::InvalidResponse(
                "registry response names a different device".to_string(),
            ));
        }
    }
    match fields.remove(ENVELOPE_DATA_KEY) {
        Some(Value::Object(data)) => Ok(RegistrationRecord::from_fields(data)),
        _ => Err(LookupError::InvalidResponse("registry envelope data missing".to_string())),
    }
}

/// Builds an unavailable error from a static message.
fn unavailable(message: &str) -> LookupError {
    LookupError::Unavailable(message.to_string())
}

/// Error returned for bodies over the configured limit.
fn oversized() -> LookupError {
    LookupError::InvalidResponse("registry response exceeds size limit".to_string())
}
