//! CLI command definitions using clap
//!
//! Defines the command structure for the `pipeup` CLI tool.

use clap::{Parser, Subcommand};

use crate::templates::PORT_NUMBER_DEFAULT;

/// pipeup - push-to-deploy onboarding for GitHub repositories
///
/// Commits a build-and-deploy GitHub Actions workflow to a repository,
/// provisions the CI secrets it needs, and tracks the first run.
#[derive(Parser, Debug)]
#[command(name = "pipeup", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Set up a build-and-deploy workflow for a repository
    Up(UpArgs),
}

/// Arguments for the `up` command
#[derive(Parser, Debug)]
pub struct UpArgs {
    /// GitHub repository URL e.g. https://github.com/owner/repo
    #[arg(long, short)]
    pub repository: String,

    /// Name of the container registry the image is pushed to
    #[arg(long)]
    pub registry: String,

    /// Name of the cluster to deploy to
    #[arg(long)]
    pub cluster: String,

    /// Resource group the cluster lives in
    #[arg(long)]
    pub resource_group: String,

    /// Port your application listens on
    #[arg(long, default_value = PORT_NUMBER_DEFAULT)]
    pub port: String,

    /// New branch name to check in files and raise a PR from;
    /// omit to be asked for a commit strategy instead
    #[arg(long)]
    pub branch_name: Option<String>,

    /// Skip provisioning of CI secrets
    #[arg(long)]
    pub skip_secrets: bool,

    /// Do not wait for workflow completion
    #[arg(long)]
    pub do_not_wait: bool,

    // ─────────────────────────────────────────────────────────────────────
    // Secret values, usually supplied through the environment
    // ─────────────────────────────────────────────────────────────────────
    /// Credentials JSON stored as the AZURE_CREDENTIALS secret
    #[arg(
        long,
        env = "AZURE_CREDENTIALS",
        hide_env_values = true,
        required_unless_present = "skip_secrets"
    )]
    pub azure_credentials: Option<String>,

    /// Username stored as the REGISTRY_USERNAME secret
    #[arg(
        long,
        env = "REGISTRY_USERNAME",
        hide_env_values = true,
        required_unless_present = "skip_secrets"
    )]
    pub registry_username: Option<String>,

    /// Password stored as the REGISTRY_PASSWORD secret
    #[arg(
        long,
        env = "REGISTRY_PASSWORD",
        hide_env_values = true,
        required_unless_present = "skip_secrets"
    )]
    pub registry_password: Option<String>,
}
