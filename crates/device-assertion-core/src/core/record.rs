// crates/device-assertion-core/src/core/record.rs
// ============================================================================
// Module: Registration Records
// Description: Opaque device registration data returned by lookup providers.
// Purpose: Interpret the reserved enablement field and carry assertion payloads.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! A [`RegistrationRecord`] is a JSON object owned by the registry. The core
//! reads exactly one reserved field, `enabled`, and writes exactly one,
//! `assertion`, when a token is issued. Every other field passes through
//! untouched.
//! Security posture: records come from an external backend and are untrusted;
//! a malformed `enabled` flag fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Reserved boolean field controlling whether assertions may be issued.
pub const FIELD_ENABLED: &str = "enabled";
/// Reserved field holding the signed assertion token on success.
pub const FIELD_ASSERTION: &str = "assertion";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Registration record validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// The record document is not a JSON object.
    #[error("registration record must be a json object")]
    NotAnObject,
    /// The `enabled` field is present but not a boolean.
    #[error("registration record field `enabled` must be a boolean, found {0}")]
    InvalidEnabled(&'static str),
}

// ============================================================================
// SECTION: Record Type
// ============================================================================

/// Device registration data keyed by field name.
///
/// # Invariants
/// - `enabled`, when present, must be a JSON boolean to be interpreted.
/// - Absent `enabled` means the device is enabled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistrationRecord(Map<String, Value>);

impl RegistrationRecord {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Wraps an existing field map.
    #[must_use]
    pub const fn from_fields(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Returns the underlying field map.
    #[must_use]
    pub const fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consumes the record and returns the field map.
    #[must_use]
    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }

    /// Returns a field value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Sets a field, returning the previous value when present.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Sets a field and returns the record.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    /// Returns the number of fields in the record.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Interprets the reserved `enabled` field.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidEnabled`] when the field is present but
    /// is not a boolean.
    pub fn enablement(&self) -> Result<bool, RecordError> {
        match self.0.get(FIELD_ENABLED) {
            None => Ok(true),
            Some(Value::Bool(enabled)) => Ok(*enabled),
            Some(other) => Err(RecordError::InvalidEnabled(json_kind(other))),
        }
    }

    /// Returns the embedded assertion token, if any.
    #[must_use]
    pub fn assertion(&self) -> Option<&str> {
        self.0.get(FIELD_ASSERTION).and_then(Value::as_str)
    }
}

impl TryFrom<Value> for RegistrationRecord {
    type Error = RecordError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            _ => Err(RecordError::NotAnObject),
        }
    }
}

impl From<RegistrationRecord> for Value {
    fn from(record: RegistrationRecord) -> Self {
        Self::Object(record.0)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns a stable label for a JSON value kind.
const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
