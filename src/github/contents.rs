//! Repository contents operations
//!
//! Files are committed one at a time through the create-contents endpoint;
//! the repository API has no atomic multi-file commit primitive.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{PipeupError, Result};
use crate::github::client::GitHubClient;

/// A fully rendered file staged for checkin
#[derive(Debug, Clone)]
pub struct FileCheckin {
    /// Target path inside the repository
    pub path: String,
    /// Rendered file content, never partial
    pub content: String,
}

impl FileCheckin {
    /// Create a new checkin candidate
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CreateFileRequest<'a> {
    message: &'a str,
    branch: &'a str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct CreateFileResponse {
    commit: CommitObject,
}

#[derive(Debug, Deserialize)]
struct CommitObject {
    sha: String,
}

/// Strip leading/trailing `.` and `/` from a checkin path.
///
/// Used for operator-facing messages; the contents endpoint receives the
/// path exactly as staged so that dotted directories like `.github` stay
/// intact.
fn normalize_checkin_path(path: &str) -> String {
    path.trim_matches('.').trim_matches('/').to_string()
}

/// Contents operations handler
pub struct ContentsHandler<'a> {
    client: &'a GitHubClient,
}

impl<'a> ContentsHandler<'a> {
    /// Create a new handler
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Commit every file in `files`, in order, each as its own API call.
    ///
    /// Returns the sha of the LAST file committed; callers must not assume
    /// the sha reflects the whole batch. A failing checkin aborts the batch
    /// but does not roll back files already committed.
    pub async fn commit_files(
        &self,
        files: &[FileCheckin],
        branch: &str,
        message: &str,
    ) -> Result<String> {
        if files.is_empty() {
            return Err(PipeupError::InvalidInput("No files to check in.".to_string()));
        }

        let mut commit_sha = String::new();
        for file in files {
            commit_sha = self.commit_file(file, branch, message).await?;
        }
        Ok(commit_sha)
    }

    /// Commit a single file via the create-contents endpoint
    async fn commit_file(&self, file: &FileCheckin, branch: &str, message: &str) -> Result<String> {
        if file.path.is_empty() || file.content.is_empty() {
            return Err(PipeupError::InvalidInput(
                "File checkin failed. File path or content is empty.".to_string(),
            ));
        }

        let display_path = normalize_checkin_path(&file.path);
        let url = self.client.repo_url(&format!("/contents/{}", file.path));
        let body = CreateFileRequest {
            message,
            branch,
            content: BASE64.encode(file.content.as_bytes()),
        };

        warn!(
            "Checking in file {} in the GitHub repository {}",
            display_path, self.client.repo
        );
        let response = self.client.put(&url, &body).await?;
        let status = response.status();
        if status != StatusCode::CREATED {
            return Err(PipeupError::CheckinFailed {
                path: display_path,
                status: status.as_u16(),
            });
        }

        let created: CreateFileResponse = response.json().await?;
        debug!("Committed {} as {}", display_path, created.commit.sha);
        Ok(created.commit.sha)
    }

    /// Check whether a file already exists at `path`
    pub async fn file_exists(&self, path: &str) -> Result<bool> {
        let url = self.client.repo_url(&format!("/contents/{path}"));
        let response = self.client.get(&url).await?;
        Ok(response.status() == StatusCode::OK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_leading_dot_and_slash() {
        assert_eq!(normalize_checkin_path("./deploy.yml"), "deploy.yml");
        assert_eq!(normalize_checkin_path("/charts/app.yaml"), "charts/app.yaml");
    }

    #[test]
    fn test_normalize_keeps_inner_dots() {
        assert_eq!(normalize_checkin_path("a.yml"), "a.yml");
    }
}
