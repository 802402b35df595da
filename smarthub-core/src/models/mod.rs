//! Domain models for `SmartHub`.
//!
//! ## Submodules
//!
//! - [`account`] - Credentials and the structured account identity
//! - [`reading`] - Reading kinds, reading sets, and sensor metadata
//! - [`snapshot`] - Outcome of the latest poll with availability rules

mod account;
mod reading;
mod snapshot;

pub use account::{AccountIdentity, Credentials};
pub use reading::{DeviceClass, ReadingKind, ReadingSet, SensorDescriptor, StateClass};
pub use snapshot::ReadingSnapshot;
