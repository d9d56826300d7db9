// crates/device-assertion-config/src/config.rs
// ============================================================================
// Module: Device Assertion Configuration
// Description: Configuration loading, validation, and service wiring.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: device-assertion-core, device-assertion-providers, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Missing or invalid configuration fails closed: a service is never built
//! without a signing secret, and validation never touches the network.
//! Security posture: config inputs are untrusted; secrets never appear in
//! `Debug` output or error messages.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fmt;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use device_assertion_core::AssertionAuditSink;
use device_assertion_core::AssertionService;
use device_assertion_core::AssertionSigner;
use device_assertion_core::AssertionVerifier;
use device_assertion_core::DeviceLookup;
use device_assertion_core::LookupError;
use device_assertion_core::SigningAlgorithm;
use device_assertion_core::SigningSecret;
use device_assertion_core::TokenError;
use device_assertion_core::TokenSettings;
use device_assertion_core::runtime::FileAuditSink;
use device_assertion_core::runtime::NoopAuditSink;
use device_assertion_core::runtime::StderrAuditSink;
use device_assertion_core::token::DEFAULT_TOKEN_VALIDITY_SECS;
use device_assertion_core::token::ED25519_SEED_LENGTH;
use device_assertion_providers::FileDeviceLookup;
use device_assertion_providers::FileLookupConfig;
use device_assertion_providers::HttpDeviceLookup;
use device_assertion_providers::HttpLookupConfig;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "device-assertion.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "DEVICE_ASSERTION_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum signing secret file size in bytes.
pub(crate) const MAX_SECRET_FILE_SIZE: usize = 64 * 1024;
/// Minimum token validity window in seconds.
pub(crate) const MIN_TOKEN_VALIDITY_SECS: u64 = 1;
/// Maximum token validity window in seconds.
pub(crate) const MAX_TOKEN_VALIDITY_SECS: u64 = 86_400;
/// Maximum verification leeway in seconds.
pub(crate) const MAX_LEEWAY_SECS: u64 = 300;
/// Maximum issuer length in bytes.
pub(crate) const MAX_ISSUER_LENGTH: usize = 256;
/// Maximum service-level lookup timeout in milliseconds.
pub(crate) const MAX_LOOKUP_TIMEOUT_MS: u64 = 60_000;
/// Maximum registry file size in bytes.
pub(crate) const MAX_REGISTRY_FILE_BYTES: usize = 64 * 1024 * 1024;
/// Maximum registry response size in bytes.
pub(crate) const MAX_HTTP_BODY_BYTES: usize = 16 * 1024 * 1024;
/// Maximum HTTP connect or request timeout in milliseconds.
pub(crate) const MAX_HTTP_TIMEOUT_MS: u64 = 60_000;
/// Maximum length of a registry auth token.
pub(crate) const MAX_AUTH_TOKEN_LENGTH: usize = 256;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Device assertion service configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceAssertionConfig {
    /// Signing key configuration.
    pub signing: SigningConfig,
    /// Token issuance configuration.
    #[serde(default)]
    pub token: TokenConfig,
    /// Registry lookup configuration.
    pub lookup: LookupConfig,
    /// Audit logging configuration.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl DeviceAssertionConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// Resolution order: explicit `path`, then `DEVICE_ASSERTION_CONFIG`,
    /// then `device-assertion.toml` in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] when validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.signing.validate()?;
        self.token.validate()?;
        self.lookup.validate()?;
        self.audit.validate()?;
        Ok(())
    }

    /// Builds the token signer from the signing and token sections.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the secret cannot be loaded or is not a
    /// valid key for the configured algorithm.
    pub fn signer(&self) -> Result<AssertionSigner, ConfigError> {
        let secret = self.signing.load_secret()?;
        AssertionSigner::new(&secret, self.signing.algorithm, self.token.settings())
            .map_err(|err| token_error(&err))
    }

    /// Builds the verifier matching the configured signer.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the signer cannot be built.
    pub fn verifier(&self) -> Result<AssertionVerifier, ConfigError> {
        Ok(self.signer()?.verifier().clone())
    }

    /// Builds a fully configured assertion service.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the lookup backend, audit sink, or signer
    /// cannot be built.
    pub fn build_service(&self) -> Result<AssertionService, ConfigError> {
        let signer = self.signer()?;
        let mut service =
            AssertionService::new(self.lookup.build()?).with_audit_sink(self.audit.build_sink()?);
        if let Some(timeout) = self.lookup.timeout() {
            service = service.with_lookup_timeout(timeout);
        }
        service.with_signer(signer).map_err(|err| ConfigError::Invalid(err.to_string()))
    }
}

// ============================================================================
// SECTION: Signing
// ============================================================================

/// Encoding of the configured signing secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretEncoding {
    /// Secret bytes are the UTF-8 text as written.
    #[default]
    Utf8,
    /// Secret bytes are standard base64.
    Base64,
}

impl SecretEncoding {
    /// Decodes secret text into key material.
    fn decode_text(self, raw: &str) -> Result<SigningSecret, TokenError> {
        match self {
            Self::Utf8 => SigningSecret::new(raw.as_bytes()),
            Self::Base64 => SigningSecret::from_base64(raw),
        }
    }

    /// Decodes secret file contents into key material.
    fn decode_file(self, bytes: &[u8]) -> Result<SigningSecret, ConfigError> {
        let result = match self {
            Self::Utf8 => SigningSecret::new(strip_line_ending(bytes)),
            Self::Base64 => {
                let text = std::str::from_utf8(bytes).map_err(|_| {
                    ConfigError::Invalid("signing.secret_path must contain base64 text".to_string())
                })?;
                SigningSecret::from_base64(text)
            }
        };
        result.map_err(|err| token_error(&err))
    }
}

/// Signing key configuration.
///
/// # Invariants
/// - Exactly one of `secret` and `secret_path` is set.
/// - `Debug` output never includes the inline secret.
#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SigningConfig {
    /// Token signing algorithm.
    #[serde(default)]
    pub algorithm: SigningAlgorithm,
    /// Inline secret.
    #[serde(default)]
    pub secret: Option<String>,
    /// Path to a file holding the secret.
    #[serde(default)]
    pub secret_path: Option<PathBuf>,
    /// Encoding of the secret text.
    #[serde(default)]
    pub secret_encoding: SecretEncoding,
}

impl SigningConfig {
    /// Validates the signing configuration without reading secret files.
    fn validate(&self) -> Result<(), ConfigError> {
        match (&self.secret, &self.secret_path) {
            (Some(_), Some(_)) => Err(ConfigError::Invalid(
                "signing.secret and signing.secret_path are mutually exclusive".to_string(),
            )),
            (None, None) => Err(ConfigError::Invalid(
                "signing.secret or signing.secret_path must be set".to_string(),
            )),
            (Some(secret), None) => {
                let secret = self.secret_encoding.decode_text(secret).map_err(|err| token_error(&err))?;
                self.check_key_length(&secret)
            }
            (None, Some(path)) => validate_path_string("signing.secret_path", &path.to_string_lossy()),
        }
    }

    /// Loads the secret from the inline value or the secret file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the secret is missing, unreadable, or
    /// malformed.
    pub fn load_secret(&self) -> Result<SigningSecret, ConfigError> {
        let secret = match (&self.secret, &self.secret_path) {
            (Some(secret), None) => {
                self.secret_encoding.decode_text(secret).map_err(|err| token_error(&err))?
            }
            (None, Some(path)) => self.secret_encoding.decode_file(&read_secret_file(path)?)?,
            _ => return Err(ConfigError::Invalid("signing secret source is ambiguous".to_string())),
        };
        self.check_key_length(&secret)?;
        Ok(secret)
    }

    /// Rejects Ed25519 seeds of the wrong length.
    fn check_key_length(&self, secret: &SigningSecret) -> Result<(), ConfigError> {
        if self.algorithm == SigningAlgorithm::EdDsa && secret.len() != ED25519_SEED_LENGTH {
            return Err(ConfigError::Invalid(format!(
                "signing.secret for ed_dsa must decode to {ED25519_SEED_LENGTH} bytes"
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for SigningConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningConfig")
            .field("algorithm", &self.algorithm)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("secret_path", &self.secret_path)
            .field("secret_encoding", &self.secret_encoding)
            .finish()
    }
}

// ============================================================================
// SECTION: Token
// ============================================================================

/// Token issuance configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenConfig {
    /// Token validity window in seconds.
    #[serde(default = "default_validity_secs")]
    pub validity_secs: u64,
    /// Optional issuer written to tokens.
    #[serde(default)]
    pub issuer: Option<String>,
    /// Clock skew tolerated during verification, in seconds.
    #[serde(default)]
    pub leeway_secs: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            validity_secs: DEFAULT_TOKEN_VALIDITY_SECS,
            issuer: None,
            leeway_secs: 0,
        }
    }
}

impl TokenConfig {
    /// Validates token settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_TOKEN_VALIDITY_SECS ..= MAX_TOKEN_VALIDITY_SECS).contains(&self.validity_secs) {
            return Err(ConfigError::Invalid(format!(
                "token.validity_secs must be between {MIN_TOKEN_VALIDITY_SECS} and \
                 {MAX_TOKEN_VALIDITY_SECS}"
            )));
        }
        if self.leeway_secs > MAX_LEEWAY_SECS {
            return Err(ConfigError::Invalid(format!(
                "token.leeway_secs must be at most {MAX_LEEWAY_SECS}"
            )));
        }
        if let Some(issuer) = &self.issuer {
            if issuer.trim().is_empty() {
                return Err(ConfigError::Invalid("token.issuer must be non-empty".to_string()));
            }
            if issuer.len() > MAX_ISSUER_LENGTH {
                return Err(ConfigError::Invalid("token.issuer exceeds max length".to_string()));
            }
            if issuer.chars().any(char::is_control) {
                return Err(ConfigError::Invalid(
                    "token.issuer must not contain control characters".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Returns the core token settings.
    #[must_use]
    pub fn settings(&self) -> TokenSettings {
        TokenSettings {
            validity: Duration::from_secs(self.validity_secs),
            issuer: self.issuer.clone(),
            leeway_secs: self.leeway_secs,
        }
    }
}

/// Serde default for [`TokenConfig::validity_secs`].
const fn default_validity_secs() -> u64 {
    DEFAULT_TOKEN_VALIDITY_SECS
}

// ============================================================================
// SECTION: Lookup
// ============================================================================

/// Registry lookup configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LookupConfig {
    /// Upper bound on a single lookup, enforced by the service.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// Backend selection and settings.
    #[serde(flatten)]
    pub backend: LookupBackendConfig,
}

/// Registry backend selection.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LookupBackendConfig {
    /// Registry document on disk.
    File(FileLookupConfig),
    /// Remote registry over HTTP.
    Http(HttpLookupConfig),
}

impl LookupConfig {
    /// Validates lookup settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(timeout_ms) = self.timeout_ms
            && (timeout_ms == 0 || timeout_ms > MAX_LOOKUP_TIMEOUT_MS)
        {
            return Err(ConfigError::Invalid(format!(
                "lookup.timeout_ms must be between 1 and {MAX_LOOKUP_TIMEOUT_MS}"
            )));
        }
        match &self.backend {
            LookupBackendConfig::File(file) => validate_file_lookup(file),
            LookupBackendConfig::Http(http) => validate_http_lookup(http),
        }
    }

    /// Returns the service-level lookup timeout, when configured.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Builds the configured lookup backend.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the registry cannot be read and
    /// [`ConfigError::Invalid`] when the backend rejects its settings.
    pub fn build(&self) -> Result<Arc<dyn DeviceLookup>, ConfigError> {
        match &self.backend {
            LookupBackendConfig::File(file) => {
                let lookup = FileDeviceLookup::load(file.clone()).map_err(|err| lookup_error(&err))?;
                Ok(Arc::new(lookup))
            }
            LookupBackendConfig::Http(http) => {
                let lookup = HttpDeviceLookup::new(http).map_err(|err| lookup_error(&err))?;
                Ok(Arc::new(lookup))
            }
        }
    }
}

/// Validates the file backend settings.
fn validate_file_lookup(config: &FileLookupConfig) -> Result<(), ConfigError> {
    validate_path_string("lookup.path", &config.path.to_string_lossy())?;
    if config.max_bytes == 0 || config.max_bytes > MAX_REGISTRY_FILE_BYTES {
        return Err(ConfigError::Invalid(format!(
            "lookup.max_bytes must be between 1 and {MAX_REGISTRY_FILE_BYTES}"
        )));
    }
    Ok(())
}

/// Validates the HTTP backend settings.
fn validate_http_lookup(config: &HttpLookupConfig) -> Result<(), ConfigError> {
    let base_url = config.base_url.trim().to_ascii_lowercase();
    if base_url.is_empty() {
        return Err(ConfigError::Invalid("lookup.base_url must be set".to_string()));
    }
    let scheme_allowed =
        base_url.starts_with("https://") || (config.allow_http && base_url.starts_with("http://"));
    if !scheme_allowed {
        return Err(ConfigError::Invalid(
            "lookup.base_url must use https (set allow_http for cleartext)".to_string(),
        ));
    }
    if let Some(token) = &config.auth_token {
        let token = token.trim();
        if token.is_empty() {
            return Err(ConfigError::Invalid("lookup.auth_token must be non-empty".to_string()));
        }
        if token.len() > MAX_AUTH_TOKEN_LENGTH {
            return Err(ConfigError::Invalid("lookup.auth_token exceeds max length".to_string()));
        }
        if !token.chars().all(|ch| ch.is_ascii_graphic()) {
            return Err(ConfigError::Invalid(
                "lookup.auth_token must be visible ascii".to_string(),
            ));
        }
    }
    for (field, value) in [
        ("lookup.connect_timeout_ms", config.connect_timeout_ms),
        ("lookup.request_timeout_ms", config.request_timeout_ms),
    ] {
        if value == 0 || value > MAX_HTTP_TIMEOUT_MS {
            return Err(ConfigError::Invalid(format!(
                "{field} must be between 1 and {MAX_HTTP_TIMEOUT_MS}"
            )));
        }
    }
    if config.max_body_bytes == 0 || config.max_body_bytes > MAX_HTTP_BODY_BYTES {
        return Err(ConfigError::Invalid(format!(
            "lookup.max_body_bytes must be between 1 and {MAX_HTTP_BODY_BYTES}"
        )));
    }
    Ok(())
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Enable audit logging.
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,
    /// JSON lines file; stderr when absent.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

impl AuditConfig {
    /// Validates audit settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("audit.path", &path.to_string_lossy())?;
        }
        Ok(())
    }

    /// Builds the configured audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the audit file cannot be opened.
    pub fn build_sink(&self) -> Result<Arc<dyn AssertionAuditSink>, ConfigError> {
        if !self.enabled {
            return Ok(Arc::new(NoopAuditSink));
        }
        match &self.path {
            Some(path) => {
                let sink = FileAuditSink::new(path)
                    .map_err(|err| ConfigError::Io(format!("unable to open audit log: {err}")))?;
                Ok(Arc::new(sink))
            }
            None => Ok(Arc::new(StderrAuditSink)),
        }
    }
}

/// Serde default for [`AuditConfig::enabled`].
const fn default_audit_enabled() -> bool {
    true
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration or referenced files.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    let path = Path::new(trimmed);
    for component in path.components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Reads a secret file while enforcing the size limit.
fn read_secret_file(path: &Path) -> Result<Vec<u8>, ConfigError> {
    let bytes = fs::read(path)
        .map_err(|err| ConfigError::Io(format!("unable to read signing.secret_path: {err}")))?;
    if bytes.len() > MAX_SECRET_FILE_SIZE {
        return Err(ConfigError::Invalid("signing.secret_path exceeds size limit".to_string()));
    }
    Ok(bytes)
}

/// Drops one trailing line ending from secret file contents.
fn strip_line_ending(bytes: &[u8]) -> &[u8] {
    let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    bytes.strip_suffix(b"\r").unwrap_or(bytes)
}

/// Maps key and token setting failures onto config errors.
fn token_error(err: &TokenError) -> ConfigError {
    ConfigError::Invalid(format!("signing: {err}"))
}

/// Maps lookup construction failures onto config errors.
fn lookup_error(err: &LookupError) -> ConfigError {
    match err {
        LookupError::Unavailable(message) => ConfigError::Io(format!("lookup: {message}")),
        other => ConfigError::Invalid(format!("lookup: {other}")),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
