//! Pushing a file set to a repository
//!
//! Either commits straight to an existing branch, or routes through a new
//! branch and a pull request. Steps are strictly sequential: each step's
//! output (a sha, a branch name) feeds the next.

use crate::error::Result;
use crate::github::branch::BranchHandler;
use crate::github::client::GitHubClient;
use crate::github::contents::{ContentsHandler, FileCheckin};
use crate::github::pull_request::{CreatePrParams, PullRequestHandler, PullRequestRef};

/// A successful direct commit
#[derive(Debug, Clone)]
pub struct CommitResult {
    /// Sha of the last file committed in the batch
    pub sha: String,
}

/// Result of pushing a file set
#[derive(Debug, Clone)]
pub enum PushOutcome {
    /// Direct-commit flow; carries only the last file's commit sha
    Commit(CommitResult),
    /// Branch + pull-request flow; yields no usable commit sha
    PullRequest(PullRequestRef),
}

/// Push `files` to the repository.
///
/// With `direct` set, every file is committed to `base_branch` in order.
/// Otherwise a new branch is created off `base_branch` (validating
/// `new_branch_name`, prompting while it is taken), the files are
/// committed there, and a pull request is opened into `base_branch`.
///
/// Re-running the direct flow against paths that already exist fails:
/// the create-contents call does not overwrite. Callers that care must
/// detect pre-existing files first.
pub async fn push_files(
    client: &GitHubClient,
    files: &[FileCheckin],
    base_branch: &str,
    direct: bool,
    new_branch_name: Option<String>,
    message: &str,
) -> Result<PushOutcome> {
    let contents = ContentsHandler::new(client);

    if direct {
        let sha = contents.commit_files(files, base_branch, message).await?;
        return Ok(PushOutcome::Commit(CommitResult { sha }));
    }

    // Pull request flow
    // 1. Create branch
    // 2. Commit files to branch
    // 3. Create PR from new branch
    let branch_name = BranchHandler::new(client)
        .create(base_branch, new_branch_name)
        .await?;
    contents.commit_files(files, &branch_name, message).await?;
    let pr = PullRequestHandler::new(client)
        .create(&CreatePrParams {
            head: branch_name,
            base: base_branch.to_string(),
            title: message.to_string(),
        })
        .await?;

    Ok(PushOutcome::PullRequest(pr))
}
