//! JSON output formatting.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use smarthub_core::{AccountIdentity, ReadingKind, ReadingSet, ReadingSnapshot};
use smarthub_store::SensorState;

// ============================================================================
// Output Types
// ============================================================================

/// Result of a one-shot fetch.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingsOutput {
    pub account: String,
    pub device: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readings: Option<ReadingSet>,
    #[serde(serialize_with = "serialize_datetime")]
    pub fetched_at: DateTime<Utc>,
}

impl ReadingsOutput {
    pub fn new(identity: &AccountIdentity, readings: Option<ReadingSet>) -> Self {
        Self {
            account: identity.unique_id(),
            device: identity.device_name(),
            readings,
            fetched_at: Utc::now(),
        }
    }
}

/// One published snapshot in watch mode.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotOutput {
    pub account: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(serialize_with = "serialize_datetime")]
    pub updated_at: DateTime<Utc>,
    pub sensors: Vec<SensorState>,
}

/// Device metadata.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceOutput {
    pub unique_id: String,
    pub name: String,
    pub manufacturer: &'static str,
    pub model: &'static str,
    pub configuration_url: String,
}

impl From<&AccountIdentity> for DeviceOutput {
    fn from(identity: &AccountIdentity) -> Self {
        Self {
            unique_id: identity.unique_id(),
            name: identity.device_name(),
            manufacturer: identity.manufacturer(),
            model: identity.model(),
            configuration_url: identity.configuration_url(),
        }
    }
}

/// Sensor metadata.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorInfoOutput {
    pub unique_id: String,
    pub key: &'static str,
    pub name: &'static str,
    pub unit: &'static str,
    pub device_class: &'static str,
    pub state_class: &'static str,
    pub icon: &'static str,
}

impl SensorInfoOutput {
    pub fn new(identity: &AccountIdentity, kind: ReadingKind) -> Self {
        let descriptor = kind.descriptor();
        Self {
            unique_id: identity.sensor_unique_id(kind),
            key: kind.key(),
            name: descriptor.name,
            unit: descriptor.unit,
            device_class: descriptor.device_class.as_str(),
            state_class: descriptor.state_class.as_str(),
            icon: descriptor.icon,
        }
    }
}

// ============================================================================
// Serialization helpers
// ============================================================================

#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_datetime<S>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_str(&dt.to_rfc3339())
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats a snapshot together with its sensor states.
    pub fn format_snapshot(
        &self,
        identity: &AccountIdentity,
        snapshot: &ReadingSnapshot,
        sensors: Vec<SensorState>,
    ) -> Result<String> {
        self.format(&SnapshotOutput {
            account: identity.unique_id(),
            success: snapshot.last_update_success,
            error: snapshot.error.clone(),
            updated_at: snapshot.updated_at,
            sensors,
        })
    }
}
