//! `up` command handler
//!
//! Orchestrates the whole onboarding flow: resolve the repository and a
//! token, detect the language, render the file set, push it, provision CI
//! secrets and track the resulting check run. Every step is sequential;
//! each one's output feeds the next.

use tracing::{debug, warn};

use crate::cli::commands::UpArgs;
use crate::cli::prompt;
use crate::core::config::Config;
use crate::core::credentials::TokenProvider;
use crate::core::repository::RepoRef;
use crate::error::{PipeupError, Result};
use crate::github::branch::BranchHandler;
use crate::github::checks::{CheckRunConclusion, ChecksHandler};
use crate::github::client::GitHubClient;
use crate::github::contents::{ContentsHandler, FileCheckin};
use crate::github::languages::{choose_supported_language, LanguagesHandler};
use crate::github::push::{push_files, PushOutcome};
use crate::github::secrets::SecretsHandler;
use crate::templates;

const TOKEN_NOTE_PREFIX: &str = "PipeupCLI";
const WORKFLOWS_DIR: &str = ".github/workflows/";
const DEFAULT_WORKFLOW_FILE: &str = "main.yml";

/// Handle the `up` command
pub async fn handle_up(args: UpArgs) -> Result<()> {
    let config = Config::load()?;
    let mut repo = RepoRef::parse(&args.repository)?;

    let tokens = TokenProvider::new(format!("{}_{}", TOKEN_NOTE_PREFIX, repo.name));
    let token = tokens.get_token(true).await?;
    let client = GitHubClient::new(repo.full_name(), token)?;

    warn!("Setting up your workflow.");
    let languages = LanguagesHandler::new(&client).list().await?;
    if languages.is_empty() {
        return Err(PipeupError::LanguageDetectionFailed);
    }
    let language = match choose_supported_language(&languages) {
        Some(language) => language.to_string(),
        None => return Err(PipeupError::UnsupportedLanguage),
    };
    warn!("{language} repository detected.");

    let mut files: Vec<FileCheckin> = Vec::new();
    if languages.contains_key("Dockerfile") {
        warn!("Using the Dockerfile found in the repository {}", client.repo);
    } else if let Some(docker_files) = templates::docker_files(&language, &args.port) {
        files.extend(docker_files);
    }
    files.extend(templates::manifest_files(&args.registry, &args.port));

    let contents = ContentsHandler::new(&client);
    let mut workflow_path = format!("{WORKFLOWS_DIR}{DEFAULT_WORKFLOW_FILE}");
    if contents.file_exists(&workflow_path).await? {
        warn!("A yaml file {DEFAULT_WORKFLOW_FILE} already exists in the {WORKFLOWS_DIR} folder.");
        let name = prompt::prompt_not_empty("Enter a new name for the workflow yml file: ")?;
        workflow_path = format!("{}{}", WORKFLOWS_DIR, name.trim_start_matches('/'));
    }
    files.push(templates::workflow_file(
        &workflow_path,
        &args.registry,
        &args.cluster,
        &args.resource_group,
    ));

    for file in &files {
        debug!("Checkin file path: {}", file.path);
    }

    let branches = BranchHandler::new(&client);
    repo.set_default_branch(branches.default_branch().await?);

    let direct = match &args.branch_name {
        Some(_) => false,
        None => {
            let options = vec![
                format!("Commit directly to the {} branch.", repo.default_branch),
                "Create a new branch for this commit and start a pull request.".to_string(),
            ];
            prompt::prompt_choice(
                "How do you want to commit the files to the repository?",
                &options,
            )? == 0
        }
    };

    let outcome = push_files(
        &client,
        &files,
        &repo.default_branch,
        direct,
        args.branch_name.clone(),
        &config.commit_message,
    )
    .await?;

    if !args.skip_secrets {
        provision_secrets(&client, &args).await?;
    }

    match outcome {
        PushOutcome::PullRequest(pr) => {
            println!("Created a Pull Request - {}", pr.url);
        }
        PushOutcome::Commit(commit) => {
            println!("Creating workflow...");
            let checks = ChecksHandler::with_policy(&client, config.poll_policy());
            let run = checks.resolve(&commit.sha).await?;
            println!(
                "GitHub Action workflow has been created - https://github.com/{}/runs/{}",
                client.repo, run.id
            );

            if !args.do_not_wait {
                match checks.await_terminal(&run).await? {
                    CheckRunConclusion::Success => println!("Workflow succeeded"),
                    conclusion => return Err(PipeupError::WorkflowFailed(conclusion.to_string())),
                }
            }
        }
    }

    Ok(())
}

/// Provision the three deployment secrets the workflow expects.
///
/// Failure here is fatal: a missing CI secret surfaces much later as an
/// opaque pipeline failure. `--skip-secrets` is the explicit opt-out.
async fn provision_secrets(client: &GitHubClient, args: &UpArgs) -> Result<()> {
    let secrets = SecretsHandler::new(client);
    // clap guarantees the values are present unless --skip-secrets was given
    let pairs = [
        ("AZURE_CREDENTIALS", args.azure_credentials.as_deref()),
        ("REGISTRY_USERNAME", args.registry_username.as_deref()),
        ("REGISTRY_PASSWORD", args.registry_password.as_deref()),
    ];
    for (name, value) in pairs {
        let value = value.ok_or_else(|| {
            PipeupError::InvalidInput(format!("missing value for secret {name}"))
        })?;
        println!("Creating {name} secret...");
        secrets.ensure_secret(name, value).await?;
    }
    Ok(())
}
