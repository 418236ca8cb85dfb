//! HTTP client for the XL Release REST API.
//!
//! The client logs in once in [`XlrClient::connect`] and then replays the
//! session cookies (and the anti-forgery token derived from them) on every
//! request. Certificate validation is disabled.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, COOKIE, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::models::{Phase, ReleaseRecord, TaskRecord};
use crate::search::SearchBody;

/// Cookie carrying the anti-forgery token.
const XSRF_COOKIE: &str = "XSRF-TOKEN";
/// Header the server expects the anti-forgery token in.
const XSRF_HEADER: &str = "X-XSRF-TOKEN";

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: check XLR_USER and XLR_PASSWORD")]
    Unauthorized,

    #[error("Server error: {0}")]
    Server(String),

    #[error("Invalid session header '{0}'")]
    InvalidHeader(String),
}

/// Login credentials for the orchestration server.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    cis: Vec<ReleaseRecord>,
}

/// Authenticated session against one XL Release server.
#[derive(Debug, Clone)]
pub struct XlrClient {
    base_url: String,
    credentials: Credentials,
    client: Client,
}

impl XlrClient {
    /// Log in and build the session client.
    pub async fn connect(
        base_url: impl Into<String>,
        credentials: Credentials,
    ) -> Result<Self, ClientError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        tracing::info!(
            "Connecting to {} with user {}...",
            base_url,
            credentials.username
        );
        let login = build_client(base_headers())?;
        let response = login
            .post(format!("{}/login", base_url))
            .basic_auth(&credentials.username, Some(&credentials.password))
            .json(&serde_json::json!({
                "username": credentials.username,
                "password": credentials.password,
            }))
            .send()
            .await?;
        let response = check_status(response).await?;
        tracing::info!("Connection OK.");

        let cookies: Vec<(String, String)> = response
            .cookies()
            .map(|c| (c.name().to_string(), c.value().to_string()))
            .collect();
        let headers = session_headers(&cookies)?;

        let mut names: Vec<&str> = headers.keys().map(HeaderName::as_str).collect();
        names.sort_unstable();
        names.dedup();
        tracing::debug!("Session headers: {}", names.join(", "));

        Ok(Self {
            base_url,
            credentials,
            client: build_client(headers)?,
        })
    }

    /// Browsable UI link for a release.
    pub fn release_url(&self, release_id_long: &str) -> String {
        format!("{}/#/releases/{}", self.base_url, release_id_long)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client
            .request(method, &url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        Ok(check_status(response).await?.json().await?)
    }

    // ============================================================
    // Release Operations
    // ============================================================

    /// Fetch one page of the release search.
    pub async fn search_releases_page(
        &self,
        body: &SearchBody<'_>,
        page: u32,
        results_per_page: u32,
    ) -> Result<Vec<ReleaseRecord>, ClientError> {
        let path = format!(
            "/releases/search?page={}&resultsPerPage={}&pageIsOffset=false",
            page, results_per_page
        );
        let response = self
            .request(reqwest::Method::POST, &path)
            .json(body)
            .send()
            .await?;
        let page: SearchPage = self.handle_response(response).await?;
        Ok(page.cis)
    }

    /// Active tasks of a release, by bare release id (`Release...`).
    pub async fn get_active_tasks(&self, release_id: &str) -> Result<Vec<TaskRecord>, ClientError> {
        let response = self
            .request(
                reqwest::Method::GET,
                &format!("/api/v1/releases/{}/active-tasks", release_id),
            )
            .send()
            .await?;
        self.handle_response(response).await
    }

    // ============================================================
    // Phase Operations
    // ============================================================

    /// Get a phase by its full composite id.
    pub async fn get_phase(&self, phase_id_long: &str) -> Result<Phase, ClientError> {
        let response = self
            .request(
                reqwest::Method::GET,
                &format!("/api/v1/phases/{}", phase_id_long),
            )
            .send()
            .await?;
        self.handle_response(response).await
    }
}

fn build_client(headers: HeaderMap) -> Result<Client, ClientError> {
    Ok(Client::builder()
        .danger_accept_invalid_certs(true)
        .default_headers(headers)
        .build()?)
}

fn base_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(concat!("release-monitor/", env!("CARGO_PKG_VERSION"))),
    );
    headers.insert(
        HeaderName::from_static("x-http-auth-override"),
        HeaderValue::from_static("true"),
    );
    headers
}

/// Default headers for an established session.
///
/// Every cookie is replayed as a header of the same name, the XSRF cookie is
/// mirrored into `X-XSRF-TOKEN` (empty when absent) and a literal `Cookie`
/// header is assembled from all of them.
pub fn session_headers(cookies: &[(String, String)]) -> Result<HeaderMap, ClientError> {
    let mut headers = base_headers();

    for (name, value) in cookies {
        let header = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ClientError::InvalidHeader(name.clone()))?;
        headers.insert(header, header_value(name, value)?);
    }

    let xsrf = cookies
        .iter()
        .find(|(name, _)| name == XSRF_COOKIE)
        .map(|(_, value)| value.as_str())
        .unwrap_or("");
    headers.insert(
        HeaderName::from_static("x-xsrf-token"),
        header_value(XSRF_HEADER, xsrf)?,
    );

    let cookie: String = cookies
        .iter()
        .map(|(name, value)| format!("{}={}; ", name, value))
        .collect();
    headers.insert(COOKIE, header_value("Cookie", &cookie)?);

    Ok(headers)
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, ClientError> {
    HeaderValue::from_str(value).map_err(|_| ClientError::InvalidHeader(name.to_string()))
}

/// Map non-success statuses to [`ClientError`].
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    match status {
        StatusCode::NOT_FOUND => Err(ClientError::NotFound(body)),
        StatusCode::BAD_REQUEST => Err(ClientError::BadRequest(body)),
        StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
        _ => Err(ClientError::Server(format!("{}: {}", status, body))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cookies(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_session_headers_replay_cookies() {
        let headers = session_headers(&cookies(&[
            ("JSESSIONID", "node01abc.node0"),
            ("XSRF-TOKEN", "40880eda"),
        ]))
        .unwrap();

        assert_eq!(headers["jsessionid"], "node01abc.node0");
        assert_eq!(headers["x-xsrf-token"], "40880eda");
        assert_eq!(
            headers[COOKIE],
            "JSESSIONID=node01abc.node0; XSRF-TOKEN=40880eda; "
        );
        assert_eq!(headers[ACCEPT], "application/json");
    }

    #[test]
    fn test_missing_xsrf_cookie_gives_empty_token() {
        let headers = session_headers(&cookies(&[("JSESSIONID", "x")])).unwrap();
        assert_eq!(headers["x-xsrf-token"], "");
    }

    #[test]
    fn test_invalid_cookie_name_is_rejected() {
        let err = session_headers(&cookies(&[("bad name", "x")])).unwrap_err();
        assert!(matches!(err, ClientError::InvalidHeader(name) if name == "bad name"));
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = Credentials {
            username: "alice".to_string(),
            password: "hunter2".to_string(),
        };
        let debug = format!("{:?}", creds);
        assert!(debug.contains("alice"));
        assert!(!debug.contains("hunter2"));
    }
}
