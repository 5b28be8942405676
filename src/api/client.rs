//! API client for communicating with the threat-monitoring REST API.
//!
//! This module provides the `ApiClient` struct for making authenticated
//! API requests to fetch identity, scan, threat, and source data.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header, Client};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::warn;

use crate::models::{
    DashboardData, Identity, NewIdentity, ProfileUpdate, Scan, ScanListResponse, ScanStatus,
    Source, SourceStats, ThreatPage, ThreatReport, User,
};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
/// 3 retries with exponential backoff usually succeeds without excessive delay.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
/// 1 second is polite to the server while not making users wait too long.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Page size for paged finding queries.
const DEFAULT_PAGE_LIMIT: i64 = 50;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// API client for the monitoring backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client against the given base URL
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Set the bearer token for authenticated requests
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    /// Drop the bearer token (logout is purely local, no server call)
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Exchange credentials for an access token.
    ///
    /// The backend takes a form-urlencoded body on this one endpoint;
    /// everything else is JSON.
    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        let url = self.url("/users/login");

        let response = self
            .client
            .post(&url)
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .context("Failed to send login request")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::login_error(status, &body).into());
        }

        let token: TokenResponse = response
            .json()
            .await
            .context("Failed to parse login response")?;

        Ok(token.access_token)
    }

    /// Map a failed login response onto the error taxonomy. Bad credentials
    /// come back as 400 or 401 with a `detail` message worth showing.
    fn login_error(status: reqwest::StatusCode, body: &str) -> ApiError {
        match status.as_u16() {
            400 | 401 => {
                let detail = ApiError::extract_detail(body)
                    .unwrap_or_else(|| "Invalid username or password".to_string());
                ApiError::AuthenticationFailed(detail)
            }
            _ => ApiError::from_status(status, body),
        }
    }

    /// Create a new account. The caller still has to log in afterwards.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<User> {
        let url = self.url("/users/register");
        let body = serde_json::json!({
            "name": name,
            "email": email,
            "password": password,
        });
        self.post(&url, &body).await
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

    /// Check if response is successful, returning an error with body if not.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
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
                    return response.json().await
                        .with_context(|| format!("Failed to parse JSON response from {}", url));
                }
                None => {
                    // Rate limited
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited.into());
                    }
                    warn!(url = url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2; // Exponential backoff
                }
            }
        }
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, url: &str, body: &B) -> Result<T> {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = self
                .client
                .post(url)
                .headers(self.auth_headers()?)
                .json(body)
                .send()
                .await
                .with_context(|| format!("Failed to send POST request to {}", url))?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => {
                    return response.json().await
                        .with_context(|| format!("Failed to parse JSON response from {}", url));
                }
                None => {
                    // Rate limited
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited.into());
                    }
                    warn!(url = url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2; // Exponential backoff
                }
            }
        }
    }

    async fn put<T: DeserializeOwned, B: Serialize>(&self, url: &str, body: &B) -> Result<T> {
        let response = self
            .client
            .put(url)
            .headers(self.auth_headers()?)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to send PUT request to {}", url))?;

        let response = Self::check_response(response).await?;
        response.json().await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    async fn delete(&self, url: &str) -> Result<()> {
        let response = self
            .client
            .delete(url)
            .headers(self.auth_headers()?)
            .send()
            .await
            .with_context(|| format!("Failed to send DELETE request to {}", url))?;

        Self::check_response(response).await?;
        Ok(())
    }

    // ===== Data Fetching Methods =====

    /// Fetch the logged-in account's profile
    pub async fn fetch_me(&self) -> Result<User> {
        self.get(&self.url("/users/me")).await
    }

    /// Update the logged-in account's profile
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
        self.put(&self.url("/users/me"), update).await
    }

    /// Fetch the dashboard overview snapshot
    pub async fn fetch_dashboard(&self) -> Result<DashboardData> {
        self.get(&self.url("/dashboard/overview")).await
    }

    /// Fetch all monitored identities
    pub async fn fetch_identities(&self) -> Result<Vec<Identity>> {
        self.get(&self.url("/monitoring/identities")).await
    }

    /// Add a new monitored identity
    pub async fn add_identity(&self, identity: &NewIdentity) -> Result<Identity> {
        self.post(&self.url("/monitoring/identities"), identity).await
    }

    /// Remove a monitored identity
    pub async fn delete_identity(&self, id: i64) -> Result<()> {
        self.delete(&self.url(&format!("/monitoring/identities/{}", id))).await
    }

    /// Fetch the scan history. Newer servers wrap the list in an object,
    /// older ones return a bare array.
    pub async fn fetch_scans(&self) -> Result<Vec<Scan>> {
        let response: ScanListResponse = self.get(&self.url("/scan/list/scans")).await?;
        Ok(response.into_scans())
    }

    /// Kick off a new scan against a monitored identity
    pub async fn start_scan(&self, scan_type: &str, identity_id: i64) -> Result<Scan> {
        let url = self.url("/scan/start");
        let body = serde_json::json!({
            "scan_type": scan_type,
            "identity_id": identity_id,
        });
        self.post(&url, &body).await
    }

    /// Fetch the current status record for one scan
    pub async fn fetch_scan_status(&self, scan_uuid: &str) -> Result<ScanStatus> {
        self.get(&self.url(&format!("/scan/status/{}", scan_uuid))).await
    }

    /// Fetch a page of findings for one scan
    pub async fn fetch_scan_threats(&self, scan_uuid: &str, skip: i64) -> Result<ThreatPage> {
        let url = self.url(&format!(
            "/scan/threats/{}?skip={}&limit={}",
            scan_uuid, skip, DEFAULT_PAGE_LIMIT
        ));
        self.get(&url).await
    }

    /// Fetch the aggregate threat report
    pub async fn fetch_threat_report(&self) -> Result<ThreatReport> {
        self.get(&self.url("/threats/report")).await
    }

    /// Fetch all monitored sources
    pub async fn fetch_sources(&self) -> Result<Vec<Source>> {
        self.get(&self.url("/sources")).await
    }

    /// Fetch source aggregate stats
    pub async fn fetch_source_stats(&self) -> Result<SourceStats> {
        self.get(&self.url("/sources/stats")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_parses() {
        let json = r#"{"access_token": "eyJhbGciOi.fake.token", "token_type": "bearer"}"#;
        let resp: TokenResponse = serde_json::from_str(json)
            .expect("Failed to parse token test JSON");
        assert_eq!(resp.access_token, "eyJhbGciOi.fake.token");
    }

    #[test]
    fn test_login_error_uses_server_detail() {
        let err = ApiClient::login_error(
            reqwest::StatusCode::UNAUTHORIZED,
            r#"{"detail": "Incorrect email or password"}"#,
        );
        match err {
            ApiError::AuthenticationFailed(msg) => {
                assert_eq!(msg, "Incorrect email or password")
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_login_error_falls_back_without_detail() {
        let err = ApiClient::login_error(reqwest::StatusCode::BAD_REQUEST, "nonsense");
        match err {
            ApiError::AuthenticationFailed(msg) => {
                assert_eq!(msg, "Invalid username or password")
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_login_error_passes_through_server_errors() {
        let err = ApiClient::login_error(reqwest::StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert!(matches!(err, ApiError::ServerError(_)));
    }

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let client = ApiClient::new("http://localhost:8000/").unwrap();
        assert_eq!(client.url("/users/me"), "http://localhost:8000/users/me");
    }
}
