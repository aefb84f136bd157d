//! Pull request operations

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::{PipeupError, Result};
use crate::github::client::{status_reason, GitHubClient};

/// Parameters for creating a pull request
#[derive(Debug, Clone)]
pub struct CreatePrParams {
    /// Head branch (source branch with changes)
    pub head: String,
    /// Base branch (target branch to merge into)
    pub base: String,
    /// PR title
    pub title: String,
}

/// A created pull request
#[derive(Debug, Clone)]
pub struct PullRequestRef {
    /// URL to view the pull request
    pub url: String,
    /// Source branch
    pub head_branch: String,
    /// Target branch
    pub base_branch: String,
}

#[derive(Debug, Serialize)]
struct CreatePrRequest<'a> {
    title: &'a str,
    head: &'a str,
    base: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreatePrResponse {
    html_url: String,
}

/// Pull request operations handler
pub struct PullRequestHandler<'a> {
    client: &'a GitHubClient,
}

impl<'a> PullRequestHandler<'a> {
    /// Create a new handler
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Open a pull request from `params.head` into `params.base`
    pub async fn create(&self, params: &CreatePrParams) -> Result<PullRequestRef> {
        let url = self.client.repo_url("/pulls");
        let body = CreatePrRequest {
            title: &params.title,
            head: &params.head,
            base: &params.base,
        };

        let response = self.client.post(&url, &body).await?;
        if response.status() != StatusCode::CREATED {
            return Err(PipeupError::PullRequestCreationFailed(status_reason(
                response.status(),
            )));
        }

        let created: CreatePrResponse = response.json().await?;
        Ok(PullRequestRef {
            url: created.html_url,
            head_branch: params.head.clone(),
            base_branch: params.base.clone(),
        })
    }
}
