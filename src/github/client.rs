//! GitHub REST API client wrapper
//!
//! Every request authenticates with basic auth: blank username, the token
//! as password, which is the contract the host API expects for PATs.

use reqwest::header::ACCEPT;
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::error::Result;

/// Default GitHub REST API endpoint
const GITHUB_API_URL: &str = "https://api.github.com";

/// Accept header for the check-runs preview API
const CHECKS_PREVIEW_ACCEPT: &str = "application/vnd.github.antiope-preview+json";

/// GitHub API client wrapper
///
/// Owns the HTTP client, the repository identity and the bearer token.
/// Handlers borrow it per concern (branches, contents, checks, secrets).
pub struct GitHubClient {
    http: Client,
    base_url: String,
    /// Repository identifier in `owner/name` form
    pub repo: String,
    token: SecretString,
}

impl GitHubClient {
    /// Create a new client for the given repository
    pub fn new(repo: impl Into<String>, token: SecretString) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("pipeup/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: GITHUB_API_URL.to_string(),
            repo: repo.into(),
            token,
        })
    }

    /// Point the client at a different API root (used by tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Build a URL under `/repos/{owner}/{name}`
    pub(crate) fn repo_url(&self, tail: &str) -> String {
        format!("{}/repos/{}{}", self.base_url, self.repo, tail)
    }

    pub(crate) async fn get(&self, url: &str) -> Result<Response> {
        let response = self
            .http
            .get(url)
            .basic_auth("", Some(self.token.expose_secret()))
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        Ok(response)
    }

    /// GET with the check-runs preview Accept header
    pub(crate) async fn get_preview(&self, url: &str) -> Result<Response> {
        let response = self
            .http
            .get(url)
            .basic_auth("", Some(self.token.expose_secret()))
            .header(ACCEPT, CHECKS_PREVIEW_ACCEPT)
            .send()
            .await?;
        Ok(response)
    }

    pub(crate) async fn post<B: Serialize>(&self, url: &str, body: &B) -> Result<Response> {
        let response = self
            .http
            .post(url)
            .basic_auth("", Some(self.token.expose_secret()))
            .header(ACCEPT, "application/json")
            .json(body)
            .send()
            .await?;
        Ok(response)
    }

    pub(crate) async fn put<B: Serialize>(&self, url: &str, body: &B) -> Result<Response> {
        let response = self
            .http
            .put(url)
            .basic_auth("", Some(self.token.expose_secret()))
            .header(ACCEPT, "application/json")
            .json(body)
            .send()
            .await?;
        Ok(response)
    }
}

/// Human-readable reason for a status line, for error messages
pub(crate) fn status_reason(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.as_u16().to_string())
}
