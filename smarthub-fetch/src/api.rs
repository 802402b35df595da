//! Portal endpoints and wire types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use smarthub_core::Credentials;

use crate::window::TimeWindow;

// ============================================================================
// Constants
// ============================================================================

/// Authentication endpoint.
pub const AUTH_ENDPOINT: &str = "/services/oauth/auth/v2";

/// Usage poll endpoint.
pub const POLL_ENDPOINT: &str = "/services/secured/utility-usage/poll";

/// Header carrying the portal user name on poll requests.
pub const USERNAME_HEADER: &str = "X-Nisc-Smarthub-Username";

/// Poll status meaning the report is still being computed.
pub const STATUS_PENDING: &str = "PENDING";

/// Industry filter sent with every query.
pub const INDUSTRY_ELECTRIC: &str = "ELECTRIC";

// ============================================================================
// Authentication
// ============================================================================

/// Form body for the authentication endpoint.
#[derive(Debug, Serialize)]
pub struct AuthForm<'a> {
    /// Login password.
    pub password: &'a str,
    /// Login email.
    #[serde(rename = "userId")]
    pub user_id: &'a str,
}

impl<'a> AuthForm<'a> {
    /// Builds the form from credentials.
    pub fn new(credentials: &'a Credentials) -> Self {
        Self {
            password: credentials.password(),
            user_id: credentials.email(),
        }
    }
}

/// Response from the authentication endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Bearer token for the poll endpoint.
    #[serde(default)]
    pub authorization_token: Option<String>,
}

impl AuthResponse {
    /// Returns the token if it is present and non-blank.
    pub fn into_token(self) -> Option<String> {
        self.authorization_token.filter(|t| !t.trim().is_empty())
    }
}

// ============================================================================
// Usage Query
// ============================================================================

/// JSON body for the poll endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageQuery<'a> {
    /// Report granularity.
    pub time_frame: &'static str,
    /// Portal user id (the login email).
    pub user_id: &'a str,
    /// Portal screen the report belongs to.
    pub screen: &'static str,
    /// Whether to include demand series.
    pub include_demand: bool,
    /// Service location number.
    pub service_location_number: &'a str,
    /// Account number.
    pub account_number: &'a str,
    /// Industries to report.
    pub industries: [&'static str; 1],
    /// Window start in epoch milliseconds.
    pub start_date_time: String,
    /// Window end in epoch milliseconds.
    pub end_date_time: String,
}

impl<'a> UsageQuery<'a> {
    /// Builds the monthly electric usage query for `window`.
    pub fn monthly(credentials: &'a Credentials, window: &TimeWindow) -> Self {
        Self {
            time_frame: "MONTHLY",
            user_id: credentials.email(),
            screen: "USAGE_EXPLORER",
            include_demand: false,
            service_location_number: credentials.location_id(),
            account_number: credentials.account_id(),
            industries: [INDUSTRY_ELECTRIC],
            start_date_time: window.start_millis().to_string(),
            end_date_time: window.end_millis().to_string(),
        }
    }
}

/// Returns true if a poll response reports the `PENDING` status.
pub fn is_pending(body: &Value) -> bool {
    body.get("status").and_then(Value::as_str) == Some(STATUS_PENDING)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use serde_json::json;

    fn credentials() -> Credentials {
        Credentials::new("user@example.com", "pw", "12345", "67890", "host.example").unwrap()
    }

    #[test]
    fn test_usage_query_body() {
        let creds = credentials();
        let window = TimeWindow::ending_on(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(), &Utc);

        let body = serde_json::to_value(UsageQuery::monthly(&creds, &window)).unwrap();
        assert_eq!(
            body,
            json!({
                "timeFrame": "MONTHLY",
                "userId": "user@example.com",
                "screen": "USAGE_EXPLORER",
                "includeDemand": false,
                "serviceLocationNumber": "67890",
                "accountNumber": "12345",
                "industries": ["ELECTRIC"],
                "startDateTime": "1709316000000",
                "endDateTime": "1711904400000"
            })
        );
    }

    #[test]
    fn test_auth_response_token() {
        let response: AuthResponse =
            serde_json::from_str(r#"{"authorizationToken": "abc", "expiresIn": 3600}"#).unwrap();
        assert_eq!(response.into_token().as_deref(), Some("abc"));

        let response: AuthResponse = serde_json::from_str(r#"{"authorizationToken": " "}"#).unwrap();
        assert!(response.into_token().is_none());

        let response: AuthResponse = serde_json::from_str(r"{}").unwrap();
        assert!(response.into_token().is_none());
    }

    #[test]
    fn test_is_pending() {
        assert!(is_pending(&json!({"status": "PENDING"})));
        assert!(!is_pending(&json!({"status": "COMPLETE"})));
        assert!(!is_pending(&json!({"status": "pending"})));
        assert!(!is_pending(&json!({})));
        assert!(!is_pending(&json!([])));
    }
}
