// crates/device-assertion-providers/src/memory.rs
// ============================================================================
// Module: In-Memory Device Lookup
// Description: Device lookup backed by a process-local map.
// Purpose: Serve fixtures and file-loaded registries without I/O per request.
// Dependencies: device-assertion-core, serde_json
// ============================================================================

//! ## Overview
//! [`InMemoryDeviceLookup`] keys registration records by `(tenant, device)`.
//! It can be seeded record by record or from a registry document shaped as
//! `{ "<tenant>": { "<device>": { ...record } } }`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use device_assertion_core::DeviceId;
use device_assertion_core::DeviceLookup;
use device_assertion_core::LookupError;
use device_assertion_core::LookupOutcome;
use device_assertion_core::RegistrationRecord;
use device_assertion_core::TenantId;
use serde_json::Value;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Records keyed by tenant and device.
pub(crate) type RecordMap = BTreeMap<(TenantId, DeviceId), RegistrationRecord>;

/// Device lookup backed by an in-memory map.
#[derive(Debug, Default)]
pub struct InMemoryDeviceLookup {
    /// Registered devices.
    records: RwLock<RecordMap>,
}

impl InMemoryDeviceLookup {
    /// Creates an empty lookup.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a lookup from a registry document.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::InvalidResponse`] when the document does not
    /// map tenants to devices to record objects.
    pub fn from_document(document: &Value) -> Result<Self, LookupError> {
        Ok(Self {
            records: RwLock::new(parse_registry_document(document)?),
        })
    }

    /// Registers or replaces a device record, returning the previous record.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Unavailable`] when the map lock is poisoned.
    pub fn insert(
        &self,
        tenant_id: TenantId,
        device_id: DeviceId,
        record: RegistrationRecord,
    ) -> Result<Option<RegistrationRecord>, LookupError> {
        let mut records = self.records.write().map_err(|_| poisoned())?;
        Ok(records.insert((tenant_id, device_id), record))
    }

    /// Removes a device record, returning it when present.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Unavailable`] when the map lock is poisoned.
    pub fn remove(
        &self,
        tenant_id: &TenantId,
        device_id: &DeviceId,
    ) -> Result<Option<RegistrationRecord>, LookupError> {
        let mut records = self.records.write().map_err(|_| poisoned())?;
        Ok(records.remove(&(tenant_id.clone(), device_id.clone())))
    }

    /// Returns the number of registered devices.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Unavailable`] when the map lock is poisoned.
    pub fn len(&self) -> Result<usize, LookupError> {
        Ok(self.records.read().map_err(|_| poisoned())?.len())
    }

    /// Returns true when no devices are registered.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Unavailable`] when the map lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, LookupError> {
        Ok(self.len()? == 0)
    }

    /// Replaces every record at once.
    pub(crate) fn replace_all(&self, replacement: RecordMap) -> Result<(), LookupError> {
        let mut records = self.records.write().map_err(|_| poisoned())?;
        *records = replacement;
        Ok(())
    }

    /// Looks up a record without going through the async interface.
    fn find(
        &self,
        tenant_id: &TenantId,
        device_id: &DeviceId,
    ) -> Result<LookupOutcome, LookupError> {
        let records = self.records.read().map_err(|_| poisoned())?;
        Ok(records
            .get(&(tenant_id.clone(), device_id.clone()))
            .cloned()
            .map_or(LookupOutcome::NotFound, LookupOutcome::Found))
    }
}

#[async_trait]
impl DeviceLookup for InMemoryDeviceLookup {
    async fn get_device(
        &self,
        tenant_id: &TenantId,
        device_id: &DeviceId,
    ) -> Result<LookupOutcome, LookupError> {
        self.find(tenant_id, device_id)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses a `{ tenant: { device: record } }` registry document.
pub(crate) fn parse_registry_document(document: &Value) -> Result<RecordMap, LookupError> {
    let Value::Object(tenants) = document else {
        return Err(invalid_document("registry document must be an object"));
    };
    let mut records = RecordMap::new();
    for (tenant, devices) in tenants {
        let Value::Object(devices) = devices else {
            return Err(invalid_document(&format!("tenant {tenant} must map to an object")));
        };
        for (device, record) in devices {
            let record = RegistrationRecord::try_from(record.clone()).map_err(|_| {
                invalid_document(&format!("record for {tenant}/{device} must be an object"))
            })?;
            records.insert((TenantId::new(tenant.as_str()), DeviceId::new(device.as_str())), record);
        }
    }
    Ok(records)
}

/// Builds a document validation error.
fn invalid_document(message: &str) -> LookupError {
    LookupError::InvalidResponse(message.to_string())
}

/// Error returned when a writer panicked while holding the map lock.
fn poisoned() -> LookupError {
    LookupError::Unavailable("device registry lock poisoned".to_string())
}
