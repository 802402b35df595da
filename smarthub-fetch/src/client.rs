//! `SmartHub` portal client.
//!
//! One fetch cycle runs:
//!
//! 1. `POST` credentials to the auth endpoint and keep the bearer token
//! 2. `POST` a usage query to the poll endpoint
//! 3. While the portal answers `PENDING`, wait and poll again, up to the
//!    retry budget
//! 4. Hand the completed report to the parser
//!
//! Every fetch authenticates first; tokens are never reused across fetches.
//! Dropping a fetch future aborts its in-flight request and any pending
//! retry delay.

use reqwest::{Client, StatusCode};
use serde_json::Value;
use smarthub_core::{AccountIdentity, Credentials, ParseError, ReadingSet, extract_readings};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::api::{
    AUTH_ENDPOINT, AuthForm, AuthResponse, POLL_ENDPOINT, USERNAME_HEADER, UsageQuery, is_pending,
};
use crate::error::{AuthFailure, FetchError};
use crate::retry::RetryStrategy;
use crate::window::TimeWindow;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User agent string.
const USER_AGENT: &str = concat!("smarthub/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Client
// ============================================================================

/// Client for one account on one `SmartHub` portal.
///
/// Methods that touch the token take `&mut self`, so a single client can
/// never run two fetch cycles at once.
#[derive(Debug)]
pub struct SmartHubClient {
    http: Client,
    credentials: Credentials,
    base_url: Url,
    retry: RetryStrategy,
    token: Option<String>,
}

impl SmartHubClient {
    /// Creates a client for `https://{host}` with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidConfig`] if the host does not form a
    /// valid URL, or [`FetchError::Transport`] if the HTTP client cannot be
    /// built.
    pub fn new(credentials: Credentials) -> Result<Self, FetchError> {
        Self::with_timeout(credentials, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a client with a custom request timeout.
    ///
    /// # Errors
    ///
    /// See [`SmartHubClient::new`].
    pub fn with_timeout(credentials: Credentials, timeout: Duration) -> Result<Self, FetchError> {
        let base_url = parse_base_url(&format!("https://{}", credentials.host()))?;
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            credentials,
            base_url,
            retry: RetryStrategy::default(),
            token: None,
        })
    }

    /// Sends requests to `base_url` instead of `https://{host}`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidConfig`] if `base_url` is not an
    /// `http`/`https` URL.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, FetchError> {
        self.base_url = parse_base_url(base_url)?;
        Ok(self)
    }

    /// Sets the pending-retry strategy.
    pub fn with_retry_strategy(mut self, strategy: RetryStrategy) -> Self {
        self.retry = strategy;
        self
    }

    /// The account identity this client polls.
    pub fn identity(&self) -> AccountIdentity {
        self.credentials.identity()
    }

    /// Returns true if the last authentication produced a token.
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Resolves an endpoint below the base URL, keeping any base path.
    fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| FetchError::InvalidConfig(format!("invalid endpoint {path}: {e}")))
    }

    // ========================================================================
    // Authentication
    // ========================================================================

    /// Logs in and stores a fresh bearer token.
    ///
    /// Any previous token is discarded before the request, so a failed login
    /// never leaves a stale token behind.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Auth`] on a non-200 status, a response without
    /// a token, or an unreachable endpoint.
    #[instrument(skip(self), fields(host = %self.credentials.host()))]
    pub async fn authenticate(&mut self) -> Result<(), FetchError> {
        self.token = None;
        let url = self.endpoint(AUTH_ENDPOINT)?;
        debug!("Requesting authorization token");

        let response = self
            .http
            .post(url)
            .form(&AuthForm::new(&self.credentials))
            .send()
            .await
            .map_err(|e| AuthFailure::Unreachable(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(status = status.as_u16(), "Authorization request rejected");
            return Err(AuthFailure::Status(status.as_u16()).into());
        }

        let body = response
            .text()
            .await
            .map_err(|e| AuthFailure::Unreachable(e.to_string()))?;
        let auth: AuthResponse = serde_json::from_str(&body).map_err(|e| {
            warn!(error = %e, "Failed to parse authorization response");
            AuthFailure::InvalidResponse(e.to_string())
        })?;

        let token = auth.into_token().ok_or(AuthFailure::MissingToken)?;
        self.token = Some(token);

        debug!("Authorization token received");
        Ok(())
    }

    // ========================================================================
    // Usage
    // ========================================================================

    /// Authenticates, polls for the current month's report, and parses it.
    ///
    /// Returns `Ok(None)` when the report is complete but holds no data point
    /// yet. Callers should treat that as "no new data", not as a failure.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Auth`] if login fails (no poll request is sent)
    /// - [`FetchError::Http`] on a non-200 poll response (not retried)
    /// - [`FetchError::Transport`] if a poll request cannot be sent (not retried)
    /// - [`FetchError::StillPending`] if every attempt came back `PENDING`
    /// - [`FetchError::Parse`] if the completed report is malformed
    #[instrument(skip(self), fields(host = %self.credentials.host()))]
    pub async fn fetch_latest(&mut self) -> Result<Option<ReadingSet>, FetchError> {
        self.fetch_window(TimeWindow::current()).await
    }

    /// Like [`SmartHubClient::fetch_latest`], for an explicit time window.
    ///
    /// # Errors
    ///
    /// See [`SmartHubClient::fetch_latest`].
    pub async fn fetch_window(&mut self, window: TimeWindow) -> Result<Option<ReadingSet>, FetchError> {
        self.authenticate().await?;
        let token = self.token.as_deref().ok_or(AuthFailure::MissingToken)?;

        let query = UsageQuery::monthly(&self.credentials, &window);
        let url = self.endpoint(POLL_ENDPOINT)?;

        let mut attempt = 0;
        loop {
            attempt += 1;
            debug!(attempt, max_attempts = self.retry.max_attempts, "Polling usage report");

            let body = self.poll(url.clone(), token, &query).await?;

            if !is_pending(&body) {
                let readings = extract_readings(&body).inspect_err(|e| {
                    warn!(error = %e, "Failed to parse usage report");
                })?;
                match &readings {
                    Some(r) => info!(attempt, usage = ?r.usage, cost = ?r.cost, "Usage report received"),
                    None => info!(attempt, "Usage report contained no data points"),
                }
                return Ok(readings);
            }

            if !self.retry.should_retry(attempt) {
                warn!(attempts = attempt, "Maximum retries reached, report still pending");
                return Err(FetchError::StillPending { attempts: attempt });
            }

            debug!(delay_ms = self.retry.delay.as_millis(), "Report pending, retrying");
            tokio::time::sleep(self.retry.delay).await;
        }
    }

    /// Sends one poll request and returns the decoded body.
    async fn poll(&self, url: Url, token: &str, query: &UsageQuery<'_>) -> Result<Value, FetchError> {
        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .header(USERNAME_HEADER, self.credentials.email())
            .json(query)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(status = status.as_u16(), "Poll request failed");
            return Err(FetchError::Http {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let value = serde_json::from_str(&body)
            .map_err(|e| ParseError::new("$", format!("invalid JSON: {e}")))?;
        Ok(value)
    }
}

/// Parses and checks a base URL. The path always ends in `/` so endpoints
/// resolve below it.
fn parse_base_url(raw: &str) -> Result<Url, FetchError> {
    let mut url = Url::parse(raw).map_err(|e| FetchError::InvalidConfig(format!("invalid URL {raw}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(FetchError::InvalidConfig(format!(
            "expected an http(s) URL with a host, got {raw}"
        )));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

// ============================================================================
// Tests
// ============================================================================
