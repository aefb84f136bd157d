//! Repository language statistics
//!
//! The host reports languages ordered by byte count descending; that order
//! is preserved as-is (no independent sorting) and drives template
//! selection.

use reqwest::StatusCode;
use tracing::debug;

use crate::error::{PipeupError, Result};
use crate::github::client::{status_reason, GitHubClient};

/// Languages with a bundled template pack
pub const SUPPORTED_LANGUAGES: &[&str] = &["JavaScript", "Java", "Python"];

/// Language name → byte count, in host-reported order
pub type LanguageStats = serde_json::Map<String, serde_json::Value>;

/// Language statistics handler
pub struct LanguagesHandler<'a> {
    client: &'a GitHubClient,
}

impl<'a> LanguagesHandler<'a> {
    /// Create a new handler
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Fetch the repository's language statistics
    pub async fn list(&self) -> Result<LanguageStats> {
        let url = self.client.repo_url("/languages");
        let response = self.client.get(&url).await?;
        if response.status() != StatusCode::OK {
            return Err(PipeupError::GitHubApi(format!(
                "Get languages failed. Error: ({})",
                status_reason(response.status())
            )));
        }
        let stats: LanguageStats = response.json().await?;
        debug!("Languages detected: {:?}", stats.keys().collect::<Vec<_>>());
        Ok(stats)
    }
}

/// Pick the first of the top three reported languages that has a
/// template pack. Returns `None` when none of them qualifies.
pub fn choose_supported_language(stats: &LanguageStats) -> Option<&str> {
    stats
        .keys()
        .take(3)
        .map(String::as_str)
        .find(|language| SUPPORTED_LANGUAGES.contains(language))
}
