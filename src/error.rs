//! Custom error types for pipeup
//!
//! User-friendly error messages for all failure scenarios.

use thiserror::Error;

/// Main error type for the pipeup application
#[derive(Error, Debug)]
pub enum PipeupError {
    /// Invalid GitHub repository URL
    #[error("Cannot parse GitHub repository URL: {0}\n\n  → Expected format: https://github.com/owner/repo or git@github.com:owner/repo")]
    InvalidRepositoryUrl(String),

    /// Token minting failed; never retried automatically
    #[error("GitHub authentication failed: {0}\n\n  → Check your credentials and try again.\n  → Set a pre-generated token in the GITHUB_PAT environment variable to skip interactive login.")]
    AuthenticationFailed(String),

    /// A file checkin came back with a non-created status.
    /// Files committed earlier in the same batch stay on the branch.
    #[error("GitHub file checkin failed for file ({path}). Status Code ({status}).")]
    CheckinFailed { path: String, status: u16 },

    /// The candidate branch name is taken or collides with a ref namespace
    #[error("Not a valid branch name: '{0}'.\n\n  → The name is already in use, or is a prefix of existing refs.")]
    BranchNameInvalid(String),

    /// Source branch does not resolve to a leaf ref
    #[error("Branch ({0}) does not exist.")]
    BranchNotFound(String),

    /// Ref creation rejected by the host
    #[error("Branch creation failed. Error: ({0})")]
    BranchCreationFailed(String),

    /// Pull request creation rejected by the host
    #[error("Pull request creation failed. Error: ({0})")]
    PullRequestCreationFailed(String),

    /// No GitHub Actions check run appeared for the commit
    #[error("Couldn't find a GitHub Actions check run.\n\n  → Check the 'Actions' tab in your GitHub repository.")]
    CheckRunNotFound,

    /// The check run completed with a non-success conclusion
    #[error("Workflow status: {0}\n\n  → Inspect the run logs on GitHub; a failed pipeline must be fixed and re-run there.")]
    WorkflowFailed(String),

    /// None of the top reported languages has a template pack
    #[error("The languages in this repository are not yet supported.\n\n  → Supported languages: JavaScript, Java, Python.")]
    UnsupportedLanguage,

    /// The host reported no language statistics at all
    #[error("Language detection failed for this repository.")]
    LanguageDetectionFailed,

    /// Secret provisioning failed; treated as fatal at every call site
    #[error("Secret provisioning failed: {0}\n\n  → Re-run with --skip-secrets to leave repository secrets untouched.")]
    SecretProvisioning(String),

    /// GitHub API error
    #[error("GitHub API request failed: {0}\n\n  → Check your internet connection and token scopes.")]
    GitHubApi(String),

    /// Network request error
    #[error("Network request failed: {0}\n\n  → Check your internet connection.")]
    Network(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("Failed to parse response: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("File operation failed: {0}")]
    Io(#[from] std::io::Error),

    /// TOML serialization/deserialization error
    #[error("Configuration file is invalid: {0}")]
    Toml(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input from user
    #[error("{0}")]
    InvalidInput(String),
}

impl From<toml::de::Error> for PipeupError {
    fn from(err: toml::de::Error) -> Self {
        PipeupError::Toml(err.to_string())
    }
}

impl From<toml::ser::Error> for PipeupError {
    fn from(err: toml::ser::Error) -> Self {
        PipeupError::Toml(err.to_string())
    }
}

/// Result type alias using PipeupError
pub type Result<T> = std::result::Result<T, PipeupError>;
