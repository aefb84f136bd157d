//! pipeup - push-to-deploy onboarding for GitHub repositories
//!
//! Provisions a CI credential, commits a rendered GitHub Actions workflow
//! and deployment manifests (directly or through a branch + pull request),
//! provisions sealed Actions secrets, and polls the resulting check run to
//! completion.

pub mod cli;
pub mod core;
pub mod error;
pub mod github;
pub mod templates;

pub use error::{PipeupError, Result};
