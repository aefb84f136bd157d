//! Branch and ref operations

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cli::prompt;
use crate::error::{PipeupError, Result};
use crate::github::client::{status_reason, GitHubClient};

/// Outcome of probing a candidate ref name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefProbe {
    /// No ref with this name exists
    Free,
    /// A leaf ref with this exact name exists
    Exists {
        /// Sha of the commit the ref points at
        sha: String,
    },
    /// The name is a prefix of other existing refs (a "folder"),
    /// making it invalid as a leaf branch name
    FolderCollision,
}

#[derive(Debug, Deserialize)]
struct GitRef {
    #[serde(rename = "ref")]
    name: String,
    object: RefObject,
}

#[derive(Debug, Deserialize)]
struct RefObject {
    sha: String,
}

/// The ref-lookup endpoint returns a single object on an exact match and
/// an array when the name is a prefix of several refs.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RefLookup {
    Many(Vec<GitRef>),
    One(GitRef),
}

#[derive(Debug, Serialize)]
struct CreateRefRequest {
    #[serde(rename = "ref")]
    name: String,
    sha: String,
}

#[derive(Debug, Deserialize)]
struct RepoDetails {
    default_branch: String,
}

/// Qualify a branch name as a heads ref
fn ref_heads(name: &str) -> String {
    if name.starts_with("refs/heads/") {
        name.to_string()
    } else {
        format!("refs/heads/{name}")
    }
}

/// Strip the heads-ref prefix back off a branch name
fn branch_name_from_ref(name: &str) -> &str {
    name.strip_prefix("refs/heads/").unwrap_or(name)
}

/// Branch operations handler
pub struct BranchHandler<'a> {
    client: &'a GitHubClient,
}

impl<'a> BranchHandler<'a> {
    /// Create a new handler
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Probe a branch name against the repository's refs
    pub async fn probe(&self, name: &str) -> Result<RefProbe> {
        let head_ref = ref_heads(name);
        let url = self.client.repo_url(&format!("/git/{head_ref}"));
        let response = self.client.get(&url).await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(RefProbe::Free),
            StatusCode::OK => {
                let lookup: RefLookup = response.json().await?;
                match lookup {
                    RefLookup::One(git_ref) if git_ref.name == head_ref => Ok(RefProbe::Exists {
                        sha: git_ref.object.sha,
                    }),
                    RefLookup::One(_) => Err(PipeupError::GitHubApi(format!(
                        "Cannot get branch ({name})."
                    ))),
                    RefLookup::Many(refs) => {
                        let folder_prefix = format!("{head_ref}/");
                        if refs
                            .first()
                            .is_some_and(|r| r.name.starts_with(&folder_prefix))
                        {
                            debug!("Branch name {name} is a folder, hence an invalid branch name.");
                            return Ok(RefProbe::FolderCollision);
                        }
                        // Parse and find the exact branch
                        for git_ref in refs {
                            if git_ref.name == head_ref {
                                return Ok(RefProbe::Exists {
                                    sha: git_ref.object.sha,
                                });
                            }
                        }
                        Ok(RefProbe::Free)
                    }
                }
            }
            status => Err(PipeupError::GitHubApi(format!(
                "Cannot get branch ({name}). Error: ({})",
                status_reason(status)
            ))),
        }
    }

    /// Reject a candidate name that is taken or shadows a ref namespace
    async fn validate_candidate(&self, name: &str) -> Result<()> {
        match self.probe(name).await? {
            RefProbe::Free => Ok(()),
            _ => Err(PipeupError::BranchNameInvalid(name.to_string())),
        }
    }

    /// Create a new branch off `source`
    ///
    /// The candidate name is validated first; a taken name or a ref
    /// namespace collision re-prompts until an unused name is entered.
    /// Returns the plain branch name of the created ref.
    pub async fn create(&self, source: &str, candidate: Option<String>) -> Result<String> {
        let mut name = match candidate {
            Some(name) => name,
            None => prompt::prompt_not_empty("Enter new branch name to create: ")?,
        };

        loop {
            match self.validate_candidate(&name).await {
                Ok(()) => break,
                Err(PipeupError::BranchNameInvalid(_)) => {
                    warn!("Not a valid branch name.");
                    name = prompt::prompt_not_empty("Enter new branch name to create: ")?;
                }
                Err(e) => return Err(e),
            }
        }

        // The source branch must resolve to a leaf ref
        let source_sha = match self.probe(source).await? {
            RefProbe::Exists { sha } => sha,
            _ => return Err(PipeupError::BranchNotFound(source.to_string())),
        };

        let url = self.client.repo_url("/git/refs");
        let body = CreateRefRequest {
            name: ref_heads(&name),
            sha: source_sha,
        };
        let response = self.client.post(&url, &body).await?;
        if response.status() != StatusCode::CREATED {
            return Err(PipeupError::BranchCreationFailed(status_reason(
                response.status(),
            )));
        }

        Ok(branch_name_from_ref(&name).to_string())
    }

    /// Look up the repository's default branch
    pub async fn default_branch(&self) -> Result<String> {
        let url = self.client.repo_url("");
        let response = self.client.get(&url).await?;
        if !response.status().is_success() {
            return Err(PipeupError::GitHubApi(format!(
                "Default branch lookup failed. Error: ({})",
                status_reason(response.status())
            )));
        }
        let details: RepoDetails = response.json().await?;
        Ok(details.default_branch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ref_heads_qualifies_plain_name() {
        assert_eq!(ref_heads("deploy"), "refs/heads/deploy");
    }

    #[test]
    fn test_ref_heads_keeps_qualified_name() {
        assert_eq!(ref_heads("refs/heads/deploy"), "refs/heads/deploy");
    }

    #[test]
    fn test_branch_name_from_ref() {
        assert_eq!(branch_name_from_ref("refs/heads/deploy"), "deploy");
        assert_eq!(branch_name_from_ref("deploy"), "deploy");
    }
}
