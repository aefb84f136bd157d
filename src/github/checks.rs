//! Check-run discovery and polling
//!
//! A commit's CI check run is discovered with bounded retries (the host
//! lists check runs with a short lag after the triggering commit), then
//! polled through its queued → in_progress → completed lifecycle.

use std::io::{self, Write};
use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use tokio::time::sleep;
use tracing::debug;

use crate::error::{PipeupError, Result};
use crate::github::client::{status_reason, GitHubClient};

/// App slug identifying check runs spawned by GitHub Actions
const GITHUB_ACTIONS_APP_SLUG: &str = "github-actions";

/// Status of a check run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckRunStatus {
    Queued,
    InProgress,
    Completed,
}

impl std::fmt::Display for CheckRunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Queued => write!(f, "queued"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// Conclusion of a completed check run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckRunConclusion {
    Success,
    Failure,
    /// Any other host-reported conclusion (cancelled, timed_out, ...)
    Other(String),
}

impl std::fmt::Display for CheckRunConclusion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failure => write!(f, "failure"),
            Self::Other(conclusion) => write!(f, "{conclusion}"),
        }
    }
}

fn parse_status(status: &str) -> CheckRunStatus {
    match status {
        "queued" => CheckRunStatus::Queued,
        "in_progress" => CheckRunStatus::InProgress,
        "completed" => CheckRunStatus::Completed,
        other => {
            // Unknown states keep the poll alive
            debug!("Unknown check run status '{other}', treating as queued");
            CheckRunStatus::Queued
        }
    }
}

fn parse_conclusion(conclusion: &str) -> CheckRunConclusion {
    match conclusion {
        "success" => CheckRunConclusion::Success,
        "failure" => CheckRunConclusion::Failure,
        other => CheckRunConclusion::Other(other.to_string()),
    }
}

/// Handle to a check run resolved from a commit sha
#[derive(Debug, Clone)]
pub struct CheckRunHandle {
    /// Check run ID
    pub id: u64,
}

/// Polling intervals and retry bounds
///
/// Kept as explicit configuration rather than constants buried in the
/// poll loops; overridable through the config file.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Wait before each check-runs listing, covering host-side
    /// eventual-consistency lag after the triggering commit
    pub discovery_lag: Duration,
    /// How many times to look for the CI check run before giving up
    pub resolve_attempts: u32,
    /// Wait between resolve attempts
    pub resolve_interval: Duration,
    /// Wait between status polls while the run is active
    pub status_interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            discovery_lag: Duration::from_secs(1),
            resolve_attempts: 4,
            resolve_interval: Duration::from_secs(5),
            status_interval: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CheckRunList {
    total_count: u32,
    check_runs: Vec<CheckRunItem>,
}

#[derive(Debug, Deserialize)]
struct CheckRunItem {
    id: u64,
    app: CheckRunApp,
}

#[derive(Debug, Deserialize)]
struct CheckRunApp {
    slug: String,
}

#[derive(Debug, Deserialize)]
struct CheckRunDetails {
    status: String,
    conclusion: Option<String>,
}

/// Inline progress indicator for the status poll
struct ProgressTicker {
    current: Option<CheckRunStatus>,
}

impl ProgressTicker {
    fn new() -> Self {
        Self { current: None }
    }

    fn step(&mut self, status: CheckRunStatus) {
        if self.current != Some(status) {
            if self.current.is_some() {
                println!();
            }
            let label = match status {
                CheckRunStatus::Queued => "Workflow is in queue",
                CheckRunStatus::InProgress => "Workflow is in progress",
                CheckRunStatus::Completed => return,
            };
            print!("{label}");
            self.current = Some(status);
        }
        print!(".");
        let _ = io::stdout().flush();
    }

    fn finish(&mut self) {
        if self.current.is_some() {
            println!();
            self.current = None;
        }
    }
}

/// Check-run operations handler
pub struct ChecksHandler<'a> {
    client: &'a GitHubClient,
    policy: PollPolicy,
}

impl<'a> ChecksHandler<'a> {
    /// Create a handler with the default poll policy
    pub fn new(client: &'a GitHubClient) -> Self {
        Self {
            client,
            policy: PollPolicy::default(),
        }
    }

    /// Create a handler with an explicit poll policy
    pub fn with_policy(client: &'a GitHubClient, policy: PollPolicy) -> Self {
        Self { client, policy }
    }

    /// Find the GitHub Actions check run spawned for `commit_sha`.
    ///
    /// Retries a bounded number of times; the run may take several
    /// seconds to appear after the commit lands.
    pub async fn resolve(&self, commit_sha: &str) -> Result<CheckRunHandle> {
        for attempt in 0..self.policy.resolve_attempts {
            if attempt > 0 {
                sleep(self.policy.resolve_interval).await;
            }
            let list = self.list_for_commit(commit_sha).await?;
            if list.total_count > 0 {
                for run in list.check_runs {
                    if run.app.slug == GITHUB_ACTIONS_APP_SLUG {
                        return Ok(CheckRunHandle { id: run.id });
                    }
                }
            }
        }
        Err(PipeupError::CheckRunNotFound)
    }

    async fn list_for_commit(&self, commit_sha: &str) -> Result<CheckRunList> {
        sleep(self.policy.discovery_lag).await;
        let url = self
            .client
            .repo_url(&format!("/commits/{commit_sha}/check-runs"));
        let response = self.client.get_preview(&url).await?;
        if response.status() != StatusCode::OK {
            return Err(PipeupError::GitHubApi(format!(
                "Get check runs failed. Error: ({})",
                status_reason(response.status())
            )));
        }
        Ok(response.json().await?)
    }

    /// Read the current status and conclusion of a check run
    async fn status(
        &self,
        handle: &CheckRunHandle,
    ) -> Result<(CheckRunStatus, Option<CheckRunConclusion>)> {
        let url = self.client.repo_url(&format!("/check-runs/{}", handle.id));
        let response = self.client.get_preview(&url).await?;
        if response.status() != StatusCode::OK {
            return Err(PipeupError::GitHubApi(format!(
                "Get check run failed. Error: ({})",
                status_reason(response.status())
            )));
        }
        let details: CheckRunDetails = response.json().await?;
        Ok((
            parse_status(&details.status),
            details.conclusion.as_deref().map(parse_conclusion),
        ))
    }

    /// Poll the run until it reaches `completed`; returns its conclusion.
    ///
    /// Either intermediate state may be skipped if the host already
    /// reports a later one on the first poll.
    pub async fn await_terminal(&self, handle: &CheckRunHandle) -> Result<CheckRunConclusion> {
        let mut ticker = ProgressTicker::new();
        let (mut status, mut conclusion) = self.status(handle).await?;

        while status != CheckRunStatus::Completed {
            ticker.step(status);
            sleep(self.policy.status_interval).await;
            (status, conclusion) = self.status(handle).await?;
        }
        ticker.finish();
        println!("GitHub workflow completed.");

        conclusion.ok_or_else(|| {
            PipeupError::GitHubApi("Check run completed without a conclusion.".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_known_values() {
        assert_eq!(parse_status("queued"), CheckRunStatus::Queued);
        assert_eq!(parse_status("in_progress"), CheckRunStatus::InProgress);
        assert_eq!(parse_status("completed"), CheckRunStatus::Completed);
    }

    #[test]
    fn test_parse_status_unknown_keeps_polling() {
        assert_eq!(parse_status("waiting"), CheckRunStatus::Queued);
    }

    #[test]
    fn test_parse_conclusion() {
        assert_eq!(parse_conclusion("success"), CheckRunConclusion::Success);
        assert_eq!(parse_conclusion("failure"), CheckRunConclusion::Failure);
        assert_eq!(
            parse_conclusion("cancelled"),
            CheckRunConclusion::Other("cancelled".to_string())
        );
    }

    #[test]
    fn test_default_policy_bounds() {
        let policy = PollPolicy::default();
        assert_eq!(policy.resolve_attempts, 4);
        assert_eq!(policy.resolve_interval, Duration::from_secs(5));
        assert_eq!(policy.status_interval, Duration::from_millis(500));
    }
}
