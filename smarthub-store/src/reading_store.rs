//! Latest-snapshot cell shared between the poller and its readers.
//!
//! There is exactly one writer, the [`ReadingStore`]. Readers hold a cheap
//! [`ReadingReader`] and are notified through a watch channel whenever a
//! new snapshot is published.

use chrono::{DateTime, Utc};
use serde::Serialize;
use smarthub_core::{AccountIdentity, ReadingKind, ReadingSet, ReadingSnapshot, SensorDescriptor};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

type Slot = Option<Arc<ReadingSnapshot>>;

// ============================================================================
// Writer
// ============================================================================

/// Owns the latest snapshot and publishes replacements.
#[derive(Debug)]
pub struct ReadingStore {
    identity: AccountIdentity,
    tx: watch::Sender<Slot>,
}

impl ReadingStore {
    /// Creates an empty store for one account.
    pub fn new(identity: AccountIdentity) -> Self {
        let (tx, _) = watch::channel(None);
        Self { identity, tx }
    }

    /// Account this store holds readings for.
    pub fn identity(&self) -> &AccountIdentity {
        &self.identity
    }

    /// Latest published snapshot.
    pub fn latest(&self) -> Option<Arc<ReadingSnapshot>> {
        self.tx.borrow().clone()
    }

    /// Publishes the result of a successful poll.
    pub fn record_success(&mut self, readings: Option<ReadingSet>) -> Arc<ReadingSnapshot> {
        let previous = self.latest();
        self.publish(ReadingSnapshot::success(previous.as_deref(), readings))
    }

    /// Publishes the result of a failed poll.
    pub fn record_failure(&mut self, error: impl Into<String>) -> Arc<ReadingSnapshot> {
        let previous = self.latest();
        self.publish(ReadingSnapshot::failure(previous.as_deref(), error))
    }

    fn publish(&mut self, snapshot: ReadingSnapshot) -> Arc<ReadingSnapshot> {
        let snapshot = Arc::new(snapshot);
        debug!(
            success = snapshot.last_update_success,
            receivers = self.tx.receiver_count(),
            "Publishing snapshot"
        );
        self.tx.send_replace(Some(Arc::clone(&snapshot)));
        snapshot
    }

    /// Returns a new reader handle.
    pub fn reader(&self) -> ReadingReader {
        ReadingReader {
            identity: Arc::new(self.identity.clone()),
            rx: self.tx.subscribe(),
        }
    }
}

// ============================================================================
// Readers
// ============================================================================

/// Read-only handle to the latest snapshot.
#[derive(Debug, Clone)]
pub struct ReadingReader {
    identity: Arc<AccountIdentity>,
    rx: watch::Receiver<Slot>,
}

impl ReadingReader {
    /// Account the readings belong to.
    pub fn identity(&self) -> &AccountIdentity {
        &self.identity
    }

    /// Latest published snapshot.
    pub fn latest(&self) -> Option<Arc<ReadingSnapshot>> {
        self.rx.borrow().clone()
    }

    /// Waits for the next published snapshot.
    ///
    /// Returns `None` once the store has been dropped.
    pub async fn changed(&mut self) -> Option<Arc<ReadingSnapshot>> {
        self.rx.changed().await.ok()?;
        self.rx.borrow_and_update().clone()
    }

    /// Projects one reading out of the latest snapshot.
    pub fn sensor(&self, kind: ReadingKind) -> SensorView {
        SensorView {
            identity: Arc::clone(&self.identity),
            kind,
            snapshot: self.latest(),
        }
    }

    /// Projects every reading out of the latest snapshot.
    pub fn sensors(&self) -> Vec<SensorView> {
        self.project(self.latest())
    }

    /// Projects every reading out of a snapshot already taken from this
    /// reader, such as the one returned by [`ReadingReader::changed`].
    pub fn sensors_for(&self, snapshot: &Arc<ReadingSnapshot>) -> Vec<SensorView> {
        self.project(Some(Arc::clone(snapshot)))
    }

    fn project(&self, snapshot: Option<Arc<ReadingSnapshot>>) -> Vec<SensorView> {
        ReadingKind::all()
            .iter()
            .map(|&kind| SensorView {
                identity: Arc::clone(&self.identity),
                kind,
                snapshot: snapshot.clone(),
            })
            .collect()
    }
}

/// One named reading as a sensor would expose it.
#[derive(Debug, Clone)]
pub struct SensorView {
    identity: Arc<AccountIdentity>,
    kind: ReadingKind,
    snapshot: Option<Arc<ReadingSnapshot>>,
}

impl SensorView {
    /// Reading this sensor publishes.
    pub fn kind(&self) -> ReadingKind {
        self.kind
    }

    /// Stable unique id for this sensor.
    pub fn unique_id(&self) -> String {
        self.identity.sensor_unique_id(self.kind)
    }

    /// Display metadata.
    pub fn descriptor(&self) -> SensorDescriptor {
        self.kind.descriptor()
    }

    /// Whether the sensor currently reports a state.
    pub fn available(&self) -> bool {
        self.snapshot
            .as_ref()
            .is_some_and(|s| s.is_available(self.kind))
    }

    /// Current value, `None` when unavailable or absent.
    pub fn value(&self) -> Option<f64> {
        self.snapshot.as_ref().and_then(|s| s.state(self.kind))
    }

    /// When the underlying snapshot was published.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.snapshot.as_ref().map(|s| s.updated_at)
    }

    /// Serializable state of this sensor.
    pub fn state(&self) -> SensorState {
        let descriptor = self.descriptor();
        SensorState {
            unique_id: self.unique_id(),
            key: self.kind.key(),
            name: descriptor.name,
            unit: descriptor.unit,
            available: self.available(),
            value: self.value(),
            updated_at: self.updated_at(),
        }
    }
}

/// Flattened sensor state for output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorState {
    /// Stable unique id.
    pub unique_id: String,
    /// Reading key.
    pub key: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Unit of measurement.
    pub unit: &'static str,
    /// Whether a state is reported.
    pub available: bool,
    /// Current value.
    pub value: Option<f64>,
    /// Publication time of the backing snapshot.
    pub updated_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> AccountIdentity {
        AccountIdentity {
            email: "user@example.com".to_string(),
            host: "myutility.smarthub.coop".to_string(),
            account_id: "12345".to_string(),
        }
    }

    fn readings() -> ReadingSet {
        ReadingSet {
            usage: Some(42.5),
            cost: Some(6.1),
            demand: None,
        }
    }

    #[test]
    fn test_nothing_available_before_first_poll() {
        let store = ReadingStore::new(identity());
        let reader = store.reader();

        assert!(reader.latest().is_none());
        for sensor in reader.sensors() {
            assert!(!sensor.available());
            assert_eq!(sensor.value(), None);
            assert_eq!(sensor.updated_at(), None);
        }
    }

    #[test]
    fn test_sensors_after_success() {
        let mut store = ReadingStore::new(identity());
        let reader = store.reader();
        store.record_success(Some(readings()));

        let usage = reader.sensor(ReadingKind::Usage);
        assert!(usage.available());
        assert_eq!(usage.value(), Some(42.5));
        assert_eq!(
            usage.unique_id(),
            "user@example.com_myutility.smarthub.coop_12345_energy_usage"
        );

        assert_eq!(reader.sensor(ReadingKind::Cost).value(), Some(6.1));
        assert!(!reader.sensor(ReadingKind::Demand).available());
    }

    #[test]
    fn test_failure_hides_values() {
        let mut store = ReadingStore::new(identity());
        let reader = store.reader();
        store.record_success(Some(readings()));
        store.record_failure("Portal returned HTTP 500");

        assert!(reader.sensors().iter().all(|s| !s.available()));
        let snapshot = reader.latest().unwrap();
        assert_eq!(snapshot.readings, Some(readings()));
        assert_eq!(snapshot.error.as_deref(), Some("Portal returned HTTP 500"));
    }

    #[test]
    fn test_view_is_a_point_in_time() {
        let mut store = ReadingStore::new(identity());
        let reader = store.reader();
        store.record_success(Some(readings()));

        let view = reader.sensor(ReadingKind::Usage);
        store.record_failure("boom");

        assert!(view.available());
        assert!(!reader.sensor(ReadingKind::Usage).available());
    }

    #[tokio::test]
    async fn test_sensors_for_uses_given_snapshot() {
        let mut store = ReadingStore::new(identity());
        let mut reader = store.reader();

        store.record_success(Some(readings()));
        let snapshot = reader.changed().await.unwrap();
        store.record_failure("Portal returned HTTP 500");

        let sensors = reader.sensors_for(&snapshot);
        assert_eq!(sensors.len(), ReadingKind::all().len());
        assert!(sensors[0].available());
        assert_eq!(sensors[0].value(), Some(42.5));
        assert!(reader.sensors().iter().all(|s| !s.available()));
    }

    #[test]
    fn test_sensor_state_serializes() {
        let mut store = ReadingStore::new(identity());
        let reader = store.reader();
        store.record_success(Some(readings()));

        let json = serde_json::to_value(reader.sensor(ReadingKind::Cost).state()).unwrap();
        assert_eq!(json["key"], "current_energy_cost");
        assert_eq!(json["unit"], "USD");
        assert_eq!(json["available"], true);
        assert_eq!(json["value"], 6.1);
    }

    #[tokio::test]
    async fn test_reader_is_notified() {
        let mut store = ReadingStore::new(identity());
        let mut reader = store.reader();

        store.record_success(Some(readings()));
        let snapshot = reader.changed().await.unwrap();
        assert!(snapshot.last_update_success);

        drop(store);
        assert!(reader.changed().await.is_none());
    }
}
