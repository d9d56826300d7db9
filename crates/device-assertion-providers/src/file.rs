// crates/device-assertion-providers/src/file.rs
// ============================================================================
// Module: File Device Lookup
// Description: Device lookup backed by a JSON or YAML registry document.
// Purpose: Run the assertion service against a registry snapshot on disk.
// Dependencies: device-assertion-core, serde, serde_json, serde_yaml
// ============================================================================

//! ## Overview
//! [`FileDeviceLookup`] loads a registry document once at construction and
//! serves lookups from memory. [`FileDeviceLookup::reload`] swaps in a fresh
//! snapshot atomically; a failed reload leaves the previous snapshot intact.
//! Security posture: registry files are untrusted; reads are size-limited.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;

use async_trait::async_trait;
use device_assertion_core::DeviceId;
use device_assertion_core::DeviceLookup;
use device_assertion_core::LookupError;
use device_assertion_core::LookupOutcome;
use device_assertion_core::TenantId;
use serde::Deserialize;
use serde_json::Value;

use crate::memory::InMemoryDeviceLookup;
use crate::memory::RecordMap;
use crate::memory::parse_registry_document;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Default maximum registry document size in bytes.
pub const DEFAULT_MAX_REGISTRY_BYTES: usize = 1024 * 1024;

/// Configuration for the file lookup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileLookupConfig {
    /// Registry document path.
    pub path: PathBuf,
    /// Maximum file size allowed, in bytes.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
    /// Allow YAML parsing when the file extension is .yaml or .yml.
    #[serde(default = "default_allow_yaml")]
    pub allow_yaml: bool,
}

impl FileLookupConfig {
    /// Creates a configuration with default limits for `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_bytes: DEFAULT_MAX_REGISTRY_BYTES,
            allow_yaml: true,
        }
    }
}

/// Serde default for [`FileLookupConfig::max_bytes`].
const fn default_max_bytes() -> usize {
    DEFAULT_MAX_REGISTRY_BYTES
}

/// Serde default for [`FileLookupConfig::allow_yaml`].
const fn default_allow_yaml() -> bool {
    true
}

// ============================================================================
// SECTION: Lookup Implementation
// ============================================================================

/// Device lookup serving a registry document loaded from disk.
#[derive(Debug)]
pub struct FileDeviceLookup {
    /// File configuration, including limits.
    config: FileLookupConfig,
    /// Current registry snapshot.
    snapshot: InMemoryDeviceLookup,
}

impl FileDeviceLookup {
    /// Loads the registry document described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Unavailable`] when the file cannot be read and
    /// [`LookupError::InvalidResponse`] when it is oversized or malformed.
    pub fn load(config: FileLookupConfig) -> Result<Self, LookupError> {
        let snapshot = InMemoryDeviceLookup::new();
        snapshot.replace_all(read_registry(&config)?)?;
        Ok(Self {
            config,
            snapshot,
        })
    }

    /// Re-reads the registry document and replaces the snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] when the document cannot be loaded; the
    /// previous snapshot stays in place.
    pub fn reload(&self) -> Result<(), LookupError> {
        let records = read_registry(&self.config)?;
        self.snapshot.replace_all(records)
    }

    /// Returns the registry document path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.config.path
    }
}

#[async_trait]
impl DeviceLookup for FileDeviceLookup {
    async fn get_device(
        &self,
        tenant_id: &TenantId,
        device_id: &DeviceId,
    ) -> Result<LookupOutcome, LookupError> {
        self.snapshot.get_device(tenant_id, device_id).await
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads and parses the configured registry document.
fn read_registry(config: &FileLookupConfig) -> Result<RecordMap, LookupError> {
    let content = read_file_limited(&config.path, config.max_bytes)?;
    let document = parse_document(&config.path, &content, config.allow_yaml)?;
    parse_registry_document(&document)
}

/// Reads a file while enforcing a maximum byte limit.
fn read_file_limited(path: &Path, max_bytes: usize) -> Result<Vec<u8>, LookupError> {
    let file = File::open(path).map_err(|err| {
        LookupError::Unavailable(format!("unable to open registry file: {err}"))
    })?;
    let mut buf = Vec::new();
    let limit = max_bytes.saturating_add(1);
    let limit = u64::try_from(limit)
        .map_err(|_| LookupError::InvalidResponse("registry size limit exceeds u64".to_string()))?;
    let mut handle = file.take(limit);
    handle.read_to_end(&mut buf).map_err(|err| {
        LookupError::Unavailable(format!("unable to read registry file: {err}"))
    })?;
    if buf.len() > max_bytes {
        return Err(LookupError::InvalidResponse("registry file exceeds size limit".to_string()));
    }
    Ok(buf)
}

/// Parses a JSON or YAML registry document.
fn parse_document(path: &Path, content: &[u8], allow_yaml: bool) -> Result<Value, LookupError> {
    let ext = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default();
    let ext = ext.to_ascii_lowercase();
    if ext == "yaml" || ext == "yml" {
        if !allow_yaml {
            return Err(LookupError::InvalidResponse("yaml parsing is disabled".to_string()));
        }
        return serde_yaml::from_slice(content)
            .map_err(|_| LookupError::InvalidResponse("invalid yaml registry".to_string()));
    }
    serde_json::from_slice(content)
        .map_err(|_| LookupError::InvalidResponse("invalid json registry".to_string()))
}
