//! Repository identity
//!
//! A repository reference is derived once from the URL handed to the CLI
//! and stays immutable afterwards, apart from the default branch which is
//! filled in from the GitHub API.

use url::Url;

use crate::error::{PipeupError, Result};

/// A GitHub repository, identified as `owner/name`
#[derive(Debug, Clone)]
pub struct RepoRef {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub name: String,
    /// Default branch (usually "main" or "master")
    pub default_branch: String,
}

impl RepoRef {
    /// Parse a repository reference from a GitHub URL.
    ///
    /// Accepts the HTTPS form (`https://github.com/owner/repo[.git]`) and
    /// both SSH forms (`git@github.com:owner/repo[.git]`,
    /// `ssh://git@github.com/owner/repo[.git]`).
    pub fn parse(url: &str) -> Result<Self> {
        let invalid = || PipeupError::InvalidRepositoryUrl(url.to_string());
        let path = repo_path(url).ok_or_else(invalid)?;

        let mut segments = path.trim_end_matches(".git").splitn(3, '/');
        match (segments.next(), segments.next()) {
            (Some(owner), Some(name)) if !owner.is_empty() && !name.is_empty() => Ok(Self {
                owner: owner.to_string(),
                name: name.to_string(),
                // Filled in from the GitHub API once known
                default_branch: "main".to_string(),
            }),
            _ => Err(invalid()),
        }
    }

    /// Get the full repository name (owner/name)
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Update the default branch from the GitHub API response
    pub fn set_default_branch(&mut self, branch: String) {
        self.default_branch = branch;
    }
}

/// Extract the `owner/name[...]` path portion of a GitHub URL
fn repo_path(url: &str) -> Option<String> {
    // The scp-like SSH shorthand is not a URL the url crate accepts
    if let Some(rest) = url.strip_prefix("git@github.com:") {
        return Some(rest.to_string());
    }
    let parsed = Url::parse(url).ok()?;
    if parsed.host_str() != Some("github.com") {
        return None;
    }
    Some(parsed.path().trim_start_matches('/').to_string())
}
