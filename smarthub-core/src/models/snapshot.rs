//! The result of one polling cycle as seen by readers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::reading::{ReadingKind, ReadingSet};

/// Readings plus the outcome of the most recent poll.
///
/// A failed poll keeps the last good readings around but marks every
/// sensor unavailable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingSnapshot {
    /// Last readings received, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readings: Option<ReadingSet>,
    /// Whether the most recent poll succeeded.
    pub last_update_success: bool,
    /// Error message from the most recent poll, if it failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the most recent poll finished.
    pub updated_at: DateTime<Utc>,
}

impl ReadingSnapshot {
    /// Snapshot after a successful poll.
    ///
    /// A poll that returned no data point keeps `previous` readings.
    pub fn success(previous: Option<&ReadingSnapshot>, readings: Option<ReadingSet>) -> Self {
        Self {
            readings: readings.or_else(|| previous.and_then(|p| p.readings)),
            last_update_success: true,
            error: None,
            updated_at: Utc::now(),
        }
    }

    /// Snapshot after a failed poll.
    pub fn failure(previous: Option<&ReadingSnapshot>, error: impl Into<String>) -> Self {
        Self {
            readings: previous.and_then(|p| p.readings),
            last_update_success: false,
            error: Some(error.into()),
            updated_at: Utc::now(),
        }
    }

    /// Value of one reading, regardless of availability.
    pub fn value(&self, kind: ReadingKind) -> Option<f64> {
        self.readings.and_then(|r| r.get(kind))
    }

    /// Whether the sensor for `kind` should report a state.
    ///
    /// Usage is available whenever the last poll succeeded. Optional
    /// readings additionally need a value.
    pub fn is_available(&self, kind: ReadingKind) -> bool {
        self.last_update_success && (kind.is_mandatory() || self.value(kind).is_some())
    }

    /// Value of one reading if its sensor is available.
    pub fn state(&self, kind: ReadingKind) -> Option<f64> {
        if self.is_available(kind) {
            self.value(kind)
        } else {
            None
        }
    }
}
