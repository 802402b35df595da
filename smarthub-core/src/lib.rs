// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `SmartHub` Core
//!
//! Core types, models, and the usage parser for the `SmartHub` energy
//! integration.
//!
//! This crate has no I/O. It provides:
//!
//! - Domain models (credentials, account identity, reading sets)
//! - Sensor metadata for each reading kind
//! - The pure [`parser::extract_readings`] function that turns a raw poll
//!   payload into a [`ReadingSet`]
//! - Error types
//!
//! ## Key Types
//!
//! - [`Credentials`] - Portal login and account selection, fixed per client
//! - [`AccountIdentity`] - Structured identity used for device metadata
//! - [`ReadingKind`] - Usage, cost, or demand
//! - [`ReadingSet`] - The flat set of readings parsed from one response
//! - [`ReadingSnapshot`] - Latest readings plus the outcome of the last poll
//! - [`SensorDescriptor`] - Display metadata for a reading kind

pub mod error;
pub mod models;
pub mod parser;

pub use error::{CoreError, ParseError};
pub use models::{
    AccountIdentity, Credentials, DeviceClass, ReadingKind, ReadingSet, ReadingSnapshot,
    SensorDescriptor, StateClass,
};
pub use parser::extract_readings;
