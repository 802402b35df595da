//! The seam between the client and whatever schedules it.

use async_trait::async_trait;
use smarthub_core::{AccountIdentity, ReadingSet};

use crate::client::SmartHubClient;
use crate::error::FetchError;

/// Something that can produce the latest reading set on demand.
///
/// The polling task only depends on this trait, so it can be driven by a
/// scripted source in tests.
#[async_trait]
pub trait UsageSource: Send {
    /// Identity of the account being polled.
    fn identity(&self) -> AccountIdentity;

    /// Runs one full fetch cycle.
    ///
    /// `Ok(None)` means the source answered but had no data point yet.
    async fn fetch_latest(&mut self) -> Result<Option<ReadingSet>, FetchError>;
}

#[async_trait]
impl UsageSource for SmartHubClient {
    fn identity(&self) -> AccountIdentity {
        SmartHubClient::identity(self)
    }

    async fn fetch_latest(&mut self) -> Result<Option<ReadingSet>, FetchError> {
        SmartHubClient::fetch_latest(self).await
    }
}
