//! Binary tests that run without any AWS endpoint
//!
//! Every case here fails (or succeeds) before a client is built, so no
//! network access is needed.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const AWS_ENV: &[&str] = &[
    "AWS_ACCESS_KEY_ID",
    "AWS_SECRET_ACCESS_KEY",
    "AWS_SESSION_TOKEN",
    "AWS_DEFAULT_PROFILE",
    "AWS_DEFAULT_REGION",
    "AWS_SHARED_CREDENTIALS_FILE",
    "AWS_SECRETS_BUCKET",
    "AWS_KMS_ID",
    "KMSCTL_ENDPOINT",
    "KMSCTL_OUTPUT_DIR",
];

/// kmsctl with an empty config directory and no AWS settings from the host
fn kmsctl(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("kmsctl").unwrap();
    for name in AWS_ENV {
        cmd.env_remove(name);
    }
    cmd.env("KMSCTL_CONFIG_DIR", config_dir.path());
    cmd
}

#[test]
fn help_lists_commands() {
    let dir = TempDir::new().unwrap();
    kmsctl(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("kms"))
        .stdout(predicate::str::contains("buckets"))
        .stdout(predicate::str::contains("edit"));
}

#[test]
fn completions_bash() {
    let dir = TempDir::new().unwrap();
    kmsctl(&dir)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("kmsctl"));
}

#[test]
fn invalid_filter_is_a_usage_error() {
    let dir = TempDir::new().unwrap();
    kmsctl(&dir)
        .args(["--no-color", "get", "-b", "secrets", "--filter", "("])
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::starts_with("[error] the filter: ( is invalid"));
}

#[test]
fn missing_bucket_is_a_usage_error() {
    let dir = TempDir::new().unwrap();
    kmsctl(&dir)
        .args(["--no-color", "list"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("you have not specified the bucket"));
}

#[test]
fn access_key_requires_secret_key() {
    let dir = TempDir::new().unwrap();
    kmsctl(&dir)
        .args(["--no-color", "--access-key", "AKIAEXAMPLE", "list", "-b", "secrets"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("without a secret key"));
}

#[test]
fn put_requires_files() {
    let dir = TempDir::new().unwrap();
    kmsctl(&dir)
        .args(["put", "-b", "secrets", "-k", "alias/team"])
        .assert()
        .code(2);
}

#[test]
fn rejects_bad_format_in_config() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        "schema_version = 1\n\n[defaults]\nformat = \"xml\"\n",
    )
    .unwrap();

    kmsctl(&dir)
        .args(["--no-color", "kms"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unsupported output format: xml"));
}

#[test]
fn rejects_newer_config_schema() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.toml"), "schema_version = 99\n").unwrap();

    kmsctl(&dir)
        .args(["--no-color", "buckets"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("newer than supported"));
}
