//! CLI surface smoke tests

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_the_up_command() {
    Command::cargo_bin("pipeup")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("up"));
}

#[test]
fn up_requires_secret_values_unless_skipped() {
    Command::cargo_bin("pipeup")
        .unwrap()
        .args([
            "up",
            "--repository",
            "https://github.com/octo/app",
            "--registry",
            "myacr",
            "--cluster",
            "mycluster",
            "--resource-group",
            "my-rg",
        ])
        .env_remove("AZURE_CREDENTIALS")
        .env_remove("REGISTRY_USERNAME")
        .env_remove("REGISTRY_PASSWORD")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--azure-credentials"));
}
