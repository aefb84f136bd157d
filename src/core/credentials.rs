//! GitHub credential resolution
//!
//! Resolves the token used for every API call, first match wins:
//! 1. `GITHUB_PAT` environment variable - used as-is, no validation
//! 2. A token already minted by this provider
//! 3. Interactive minting via the authorizations API (basic auth with an
//!    optional one-time-code resubmission)
//!
//! The minted token is cached in-process only and is never written to
//! disk. A provider mints at most once regardless of how many call sites
//! ask for a token.

use chrono::Utc;
use reqwest::header::ACCEPT;
use reqwest::{Client, Response, StatusCode};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::cli::prompt;
use crate::error::{PipeupError, Result};

/// Environment variable short-circuiting all interactive credential flows
pub const GITHUB_PAT_ENV: &str = "GITHUB_PAT";

/// Endpoint for minting personal access tokens
const AUTHORIZATIONS_URL: &str = "https://api.github.com/authorizations";

/// Scopes requested for minted tokens
const TOKEN_SCOPES: &[&str] = &["admin:repo_hook", "repo", "user"];

/// Provider challenge header for one-time codes
const OTP_HEADER: &str = "X-GitHub-OTP";

#[derive(Debug, Serialize)]
struct AuthorizationRequest<'a> {
    scopes: &'a [&'a str],
    note: &'a str,
}

#[derive(Debug, Deserialize)]
struct AuthorizationResponse {
    token: String,
}

/// Lazily-initialized credential provider
///
/// Owned by the orchestration call site and passed where needed; the
/// one-shot guard makes concurrent and repeated lookups observe the same
/// minted token.
pub struct TokenProvider {
    note_prefix: String,
    env_key: String,
    minted: OnceCell<SecretString>,
}

impl TokenProvider {
    /// Create a provider; `note_prefix` feeds the audit note attached to
    /// minted tokens
    pub fn new(note_prefix: impl Into<String>) -> Self {
        Self {
            note_prefix: note_prefix.into(),
            env_key: GITHUB_PAT_ENV.to_string(),
            minted: OnceCell::new(),
        }
    }

    /// Use a different environment variable for the token override
    /// (for custom environments and tests)
    pub fn with_env_key(mut self, env_key: impl Into<String>) -> Self {
        self.env_key = env_key.into();
        self
    }

    /// Resolve a token.
    ///
    /// With `allow_interactive` unset the provider only consults the
    /// environment and the in-process cache and fails otherwise; nothing
    /// is ever prompted.
    pub async fn get_token(&self, allow_interactive: bool) -> Result<SecretString> {
        if let Ok(pat) = std::env::var(&self.env_key) {
            if !pat.is_empty() {
                debug!(
                    "Using GitHub PAT found in environment variable ({})",
                    self.env_key
                );
                return Ok(SecretString::from(pat));
            }
        }

        if !allow_interactive {
            if let Some(token) = self.minted.get() {
                return Ok(token.clone());
            }
            return Err(PipeupError::AuthenticationFailed(
                "no token available and interactive minting is disabled".to_string(),
            ));
        }

        let token = self.minted.get_or_try_init(|| self.mint()).await?;
        Ok(token.clone())
    }

    /// Mint a new personal access token interactively
    async fn mint(&self) -> Result<SecretString> {
        warn!(
            "We need to create a Personal Access Token to communicate with GitHub. \
             A new PAT will be created with scopes - admin:repo_hook, repo, user."
        );
        warn!(
            "You can set the PAT in the environment variable ({}) to avoid getting \
             prompted for username and password.",
            self.env_key
        );
        println!();

        let username =
            prompt::prompt("Enter your GitHub username (leave blank for using an already generated PAT): ")?;
        if username.is_empty() {
            let token = prompt::prompt_not_empty("Enter your GitHub PAT: ")?;
            println!();
            return Ok(SecretString::from(token));
        }
        let password = prompt::prompt_not_empty("Enter your GitHub password: ")?;

        let note = format!("{}_{}", self.note_prefix, Utc::now().format("%Y%m%d%H%M%S"));
        let request = AuthorizationRequest {
            scopes: TOKEN_SCOPES,
            note: &note,
        };

        let http = Client::builder()
            .user_agent(concat!("pipeup/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let post_authorization = |otp: Option<String>| {
            let builder = http
                .post(AUTHORIZATIONS_URL)
                .basic_auth(&username, Some(&password))
                .header(ACCEPT, "application/json")
                .json(&request);
            let builder = match otp {
                Some(code) => builder.header(OTP_HEADER, code),
                None => builder,
            };
            builder.send()
        };

        let mut response = post_authorization(None).await?;
        if response.status() == StatusCode::UNAUTHORIZED && otp_required(&response) {
            let code = prompt::prompt_not_empty("Enter your two factor authentication code: ")?;
            println!();
            response = post_authorization(Some(code)).await?;
        }

        if response.status() == StatusCode::OK || response.status() == StatusCode::CREATED {
            let authorization: AuthorizationResponse = response.json().await?;
            warn!("Created new personal access token with scopes - admin:repo_hook, repo, user.");
            warn!("Name: {note}");
            warn!("You can revoke it from your GitHub settings once the pipeline is no longer required.");
            println!();
            Ok(SecretString::from(authorization.token))
        } else {
            Err(PipeupError::AuthenticationFailed(
                "could not create a Personal Access Token. Check your credentials and try again."
                    .to_string(),
            ))
        }
    }
}

/// The host signals a pending one-time-code challenge through a header
/// starting with `required`
fn otp_required(response: &Response) -> bool {
    response
        .headers()
        .get(OTP_HEADER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("required"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[tokio::test]
    async fn test_env_override_wins() {
        std::env::set_var("PIPEUP_TEST_PAT_A", "env-token");
        let provider = TokenProvider::new("Test").with_env_key("PIPEUP_TEST_PAT_A");
        let token = provider.get_token(false).await.unwrap();
        assert_eq!(token.expose_secret(), "env-token");
        std::env::remove_var("PIPEUP_TEST_PAT_A");
    }

    #[tokio::test]
    async fn test_non_interactive_without_token_fails() {
        let provider = TokenProvider::new("Test").with_env_key("PIPEUP_TEST_PAT_B");
        let result = provider.get_token(false).await;
        assert!(matches!(
            result,
            Err(PipeupError::AuthenticationFailed(_))
        ));
    }
}
