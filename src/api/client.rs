//! API client for the attendance backend.
//!
//! This module provides the `ApiClient` struct for making authenticated
//! requests: exchanging credentials for a token at the identity endpoint,
//! then fetching today's records and archived days as JSON.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::{header, Client};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::warn;

use crate::auth::SessionData;
use crate::models::AttendanceRecord;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Default backend base URL, overridable via config or ROLLCALL_API_URL
pub const DEFAULT_BASE_URL: &str = "https://api.rollcall.example.org";

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    user: TokenUser,
}

#[derive(Debug, Deserialize)]
struct TokenUser {
    id: String,
}

/// API client for the attendance backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client against the given base URL
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            token: None,
        })
    }

    /// Set the bearer token for authenticated requests
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    /// Exchange credentials for a session token at the identity endpoint
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<SessionData> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.base_url);

        let response = self
            .client
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .json(&TokenRequest { email, password })
            .send()
            .await
            .context("Failed to send authentication request")?;

        let response = Self::check_response(response).await?;

        let auth: TokenResponse = response
            .json()
            .await
            .context("Failed to parse token response")?;

        if auth.access_token.is_empty() {
            warn!("Identity endpoint returned an empty access token");
            return Err(ApiError::InvalidResponse("empty access token".to_string()).into());
        }

        Ok(SessionData {
            token: auth.access_token,
            user_id: auth.user.id,
            email: email.to_string(),
            created_at: Utc::now(),
            expires_in: auth.expires_in,
        })
    }

    /// Fetch today's attendance records
    pub async fn fetch_records(&self) -> Result<Vec<AttendanceRecord>> {
        let url = format!("{}/api/attendance", self.base_url);
        self.get(&url).await
    }

    /// Fetch the list of archived dates (YYYY-MM-DD, newest first)
    pub async fn fetch_archived_dates(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/attendance/dates", self.base_url);
        self.get(&url).await
    }

    /// Fetch the records archived for a specific date
    pub async fn fetch_records_for_date(&self, date: &str) -> Result<Vec<AttendanceRecord>> {
        let url = format!("{}/api/attendance?date={}", self.base_url, date);
        self.get(&url).await
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        if let Some(ref token) = self.token {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }
        Ok(headers)
    }

    /// Check if response is successful, returning Ok(Some(response)) for
    /// success, Ok(None) for rate limit (should retry), or Err otherwise.
    async fn check_response_for_retry(
        response: reqwest::Response,
    ) -> Result<Option<reqwest::Response>> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            // Rate limited - signal to retry
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = self
                .client
                .get(url)
                .headers(self.auth_headers()?)
                .send()
                .await
                .with_context(|| format!("Failed to send GET request to {}", url))?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => {
                    return response
                        .json()
                        .await
                        .with_context(|| format!("Failed to parse JSON response from {}", url));
                }
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited.into());
                    }
                    warn!(
                        url = url,
                        retry = retries,
                        backoff_ms = backoff_ms,
                        "Rate limited, backing off"
                    );
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2; // Exponential backoff
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimeSpent;

    #[test]
    fn test_parse_token_response() {
        let json = r#"{
            "access_token": "eyJhbGciOiJIUzI1NiJ9.abc.def",
            "token_type": "bearer",
            "expires_in": 3600,
            "user": {"id": "b7f2c9e1-3a44-4c6a-9f0e-2d8b1e5a7c33", "email": "staff@example.org"}
        }"#;

        let resp: TokenResponse =
            serde_json::from_str(json).expect("Failed to parse token test JSON");
        assert_eq!(resp.access_token, "eyJhbGciOiJIUzI1NiJ9.abc.def");
        assert_eq!(resp.expires_in, Some(3600));
        assert_eq!(resp.user.id, "b7f2c9e1-3a44-4c6a-9f0e-2d8b1e5a7c33");
    }

    #[test]
    fn test_parse_records_response() {
        // Wire shape as the backend sends it: snake_case, mixed time_spent
        let json = r#"[
            {"id": 1, "student_id": 10, "student_name": "Ann Chu", "status": "checked_in",
             "parent_notified": true, "checkin_time": "2026-03-02T08:15:00Z",
             "time_spent": "1h 15m"},
            {"id": 2, "student_id": 11, "student_name": "Bo Diaz", "status": "checked_out",
             "parent_notified": false, "checkin_time": "2026-03-02T08:30:00Z",
             "checkout_time": "2026-03-02T09:00:00Z", "time_spent": 30}
        ]"#;

        let records: Vec<AttendanceRecord> =
            serde_json::from_str(json).expect("Failed to parse records test JSON");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].student_name, "Ann Chu");
        assert_eq!(
            records[0].time_spent,
            Some(TimeSpent::Text("1h 15m".to_string()))
        );
        assert_eq!(records[1].time_spent, Some(TimeSpent::Minutes(30.0)));
        assert_eq!(records[1].checkout_time.as_deref(), Some("2026-03-02T09:00:00Z"));
    }
}
