// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `SmartHub` Store
//!
//! Host-side state for the `SmartHub` integration.
//!
//! ## Features
//!
//! - **Configuration**: JSON config with account and polling settings
//! - **Reading store**: Latest snapshot shared through a watch channel
//! - **Sensor views**: Per-reading projections with availability rules
//! - **Poller**: Cancellable background task on a fixed cadence
//!
//! ## Example
//!
//! ```ignore
//! use smarthub_store::{Config, Poller};
//! use tokio_util::sync::CancellationToken;
//!
//! let config = Config::load_from(&Config::default_path()).await?;
//! let poller = Poller::new(config.build_client()?, config.polling.interval());
//! let mut reader = poller.reader();
//! let handle = poller.spawn(CancellationToken::new());
//!
//! while let Some(snapshot) = reader.changed().await {
//!     println!("{:?}", snapshot.readings);
//! }
//! ```

pub mod config;
pub mod error;
pub mod persistence;
pub mod poller;
pub mod reading_store;

pub use config::{AccountConfig, Config, PollingConfig, MIN_INTERVAL_SECS, PASSWORD_ENV};
pub use error::StoreError;
pub use poller::Poller;
pub use reading_store::{ReadingReader, ReadingStore, SensorState, SensorView};
