// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `SmartHub` Fetch
//!
//! Network client for `SmartHub` utility portals.
//!
//! - [`client::SmartHubClient`] - Authenticates and polls for usage reports
//! - [`retry::RetryStrategy`] - How long to keep polling a `PENDING` report
//! - [`window::TimeWindow`] - The rolling month every query asks for
//! - [`api`] - Endpoint paths and wire types
//! - [`source::UsageSource`] - Trait the polling task consumes
//!
//! ## Example
//!
//! ```ignore
//! use smarthub_core::Credentials;
//! use smarthub_fetch::SmartHubClient;
//!
//! let credentials = Credentials::new(email, password, account, location, host)?;
//! let mut client = SmartHubClient::new(credentials)?;
//!
//! match client.fetch_latest().await? {
//!     Some(readings) => println!("usage: {:?} kWh", readings.usage),
//!     None => println!("no data yet"),
//! }
//! ```

pub mod api;
pub mod client;
pub mod error;
pub mod retry;
pub mod source;
pub mod window;

pub use client::{DEFAULT_TIMEOUT_SECS, SmartHubClient};
pub use error::{AuthFailure, FetchError};
pub use retry::RetryStrategy;
pub use source::UsageSource;
pub use window::TimeWindow;
