//! Reading types.
//!
//! - [`ReadingKind`] - The fixed set of readings a poll can produce
//! - [`ReadingSet`] - Parsed readings from one poll response
//! - [`SensorDescriptor`] - How a reading is presented as a sensor

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Reading Kind
// ============================================================================

/// A named reading extracted from the usage report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingKind {
    /// Energy consumed in the latest period.
    Usage,
    /// Cost of the latest period.
    Cost,
    /// Peak demand in the latest period.
    Demand,
}

impl ReadingKind {
    /// Returns all reading kinds in publication order.
    pub fn all() -> &'static [ReadingKind] {
        &[Self::Usage, Self::Cost, Self::Demand]
    }

    /// Key of this reading in a [`ReadingSet`].
    pub fn key(&self) -> &'static str {
        match self {
            Self::Usage => "current_energy_usage",
            Self::Cost => "current_energy_cost",
            Self::Demand => "current_energy_demand",
        }
    }

    /// Suffix appended to the account unique id to form the sensor id.
    pub fn sensor_suffix(&self) -> &'static str {
        match self {
            Self::Usage => "energy_usage",
            Self::Cost => "energy_cost",
            Self::Demand => "energy_demand",
        }
    }

    /// Entry `type` tag in the poll payload that carries this reading.
    pub fn entry_type(&self) -> &'static str {
        match self {
            Self::Usage => "USAGE",
            Self::Cost => "COST",
            Self::Demand => "DEMAND",
        }
    }

    /// Looks up the reading kind for a payload entry `type` tag.
    pub fn from_entry_type(tag: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.entry_type() == tag)
    }

    /// Looks up the reading kind for a reading key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.key() == key)
    }

    /// Whether a sensor for this reading is always published.
    ///
    /// Usage is mandatory; cost and demand are only reported by some portals.
    pub fn is_mandatory(&self) -> bool {
        matches!(self, Self::Usage)
    }

    /// Returns the sensor metadata for this reading.
    pub fn descriptor(&self) -> SensorDescriptor {
        match self {
            Self::Usage => SensorDescriptor {
                kind: *self,
                name: "Energy Usage",
                unit: "kWh",
                device_class: DeviceClass::Energy,
                state_class: StateClass::TotalIncreasing,
                icon: "mdi:power-plug",
            },
            Self::Cost => SensorDescriptor {
                kind: *self,
                name: "Energy Cost",
                unit: "USD",
                device_class: DeviceClass::Monetary,
                state_class: StateClass::Total,
                icon: "mdi:currency-usd",
            },
            Self::Demand => SensorDescriptor {
                kind: *self,
                name: "Energy Demand",
                unit: "kW",
                device_class: DeviceClass::Power,
                state_class: StateClass::Measurement,
                icon: "mdi:flash",
            },
        }
    }
}

impl fmt::Display for ReadingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

// ============================================================================
// Sensor Metadata
// ============================================================================

/// What a sensor measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    /// Energy in kWh.
    Energy,
    /// Money.
    Monetary,
    /// Power in kW.
    Power,
}

impl DeviceClass {
    /// Lowercase name as used in sensor metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Energy => "energy",
            Self::Monetary => "monetary",
            Self::Power => "power",
        }
    }
}

/// How successive sensor values relate to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateClass {
    /// Point-in-time measurement.
    Measurement,
    /// Running total that may go up or down.
    Total,
    /// Running total that only resets to zero.
    TotalIncreasing,
}

impl StateClass {
    /// Lowercase name as used in sensor metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Measurement => "measurement",
            Self::Total => "total",
            Self::TotalIncreasing => "total_increasing",
        }
    }
}

/// Display metadata for the sensor publishing one reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SensorDescriptor {
    /// Reading this sensor publishes.
    pub kind: ReadingKind,
    /// Display name.
    pub name: &'static str,
    /// Native unit of measurement.
    pub unit: &'static str,
    /// Device class.
    pub device_class: DeviceClass,
    /// State class.
    pub state_class: StateClass,
    /// Material Design icon name.
    pub icon: &'static str,
}

// ============================================================================
// Reading Set
// ============================================================================

/// The readings parsed from one poll response.
///
/// Serializes as a flat object containing only the readings that are present,
/// e.g. `{"current_energy_usage": 42.5}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadingSet {
    /// Latest energy usage (kWh).
    #[serde(
        rename = "current_energy_usage",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub usage: Option<f64>,

    /// Latest energy cost.
    #[serde(
        rename = "current_energy_cost",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub cost: Option<f64>,

    /// Latest peak demand (kW).
    #[serde(
        rename = "current_energy_demand",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub demand: Option<f64>,
}

impl ReadingSet {
    /// Creates an empty reading set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value for a reading kind.
    pub fn get(&self, kind: ReadingKind) -> Option<f64> {
        match kind {
            ReadingKind::Usage => self.usage,
            ReadingKind::Cost => self.cost,
            ReadingKind::Demand => self.demand,
        }
    }

    /// Returns the value for a reading key such as `current_energy_cost`.
    pub fn get_by_key(&self, key: &str) -> Option<f64> {
        ReadingKind::from_key(key).and_then(|k| self.get(k))
    }

    /// Overwrites the value for a reading kind; `None` clears it.
    pub fn replace(&mut self, kind: ReadingKind, value: Option<f64>) {
        let slot = match kind {
            ReadingKind::Usage => &mut self.usage,
            ReadingKind::Cost => &mut self.cost,
            ReadingKind::Demand => &mut self.demand,
        };
        *slot = value;
    }

    /// Iterates over the readings that are present.
    pub fn iter(&self) -> impl Iterator<Item = (ReadingKind, f64)> + '_ {
        ReadingKind::all()
            .iter()
            .filter_map(|&k| self.get(k).map(|v| (k, v)))
    }

    /// Returns true if no reading is present.
    pub fn is_empty(&self) -> bool {
        self.usage.is_none() && self.cost.is_none() && self.demand.is_none()
    }
}

// ============================================================================
// Tests
// ============================================================================
