//! Integration tests for the kmsctl CLI
//!
//! These tests require S3 and KMS compatible endpoints, such as LocalStack.
//!
//! Run with:
//! ```bash
//! docker run -d --name localstack -p 4566:4566 localstack/localstack
//!
//! TEST_KMSCTL_ENDPOINT=http://localhost:4566 cargo test --features integration
//! ```

#![cfg(feature = "integration")]

use std::path::Path;
use std::process::Output;
use std::time::{SystemTime, UNIX_EPOCH};

use assert_cmd::Command;
use tempfile::TempDir;

/// Endpoint under test, skipping the test when unset
fn endpoint() -> Option<String> {
    std::env::var("TEST_KMSCTL_ENDPOINT").ok()
}

fn unique(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or_default();
    format!("{prefix}-{}-{nanos}", std::process::id())
}

/// Run kmsctl against the test endpoint with JSON output
fn run(endpoint: &str, config_dir: &Path, args: &[&str]) -> Output {
    Command::cargo_bin("kmsctl")
        .unwrap()
        .env("KMSCTL_CONFIG_DIR", config_dir)
        .env_remove("AWS_SECRETS_BUCKET")
        .env_remove("AWS_KMS_ID")
        .args([
            "--endpoint",
            endpoint,
            "--region",
            "us-east-1",
            "--access-key",
            "test",
            "--secret-key",
            "test",
            "--format",
            "json",
        ])
        .args(args)
        .output()
        .unwrap()
}

fn stdout_lines(output: &Output) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn assert_ok(output: &Output) {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Test fixture: a fresh bucket and KMS key, removed on drop
struct Fixture {
    endpoint: String,
    config_dir: TempDir,
    bucket: String,
    key: String,
}

impl Fixture {
    fn new() -> Option<Self> {
        let endpoint = endpoint()?;
        let fixture = Self {
            endpoint,
            config_dir: TempDir::new().ok()?,
            bucket: unique("kmsctl-test"),
            key: unique("kmsctl-key"),
        };

        assert_ok(&fixture.run(&["buckets", "create", "-n", &fixture.bucket]));
        assert_ok(&fixture.run(&["kms", "create", "-n", &fixture.key, "-d", "integration"]));
        Some(fixture)
    }

    fn run(&self, args: &[&str]) -> Output {
        run(&self.endpoint, self.config_dir.path(), args)
    }

    fn alias(&self) -> String {
        format!("alias/{}", self.key)
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        let _ = self.run(&["buckets", "delete", "-n", &self.bucket, "--force"]);
        let _ = self.run(&["kms", "delete", "-n", &self.key]);
    }
}

mod keys {
    use super::*;

    #[test]
    fn test_created_key_is_listed() {
        let Some(fx) = Fixture::new() else {
            eprintln!("Skipping: TEST_KMSCTL_ENDPOINT not set");
            return;
        };

        let output = fx.run(&["kms", "ls"]);
        assert_ok(&output);
        let aliases: Vec<String> = stdout_lines(&output)
            .iter()
            .filter_map(|v| v["alias"].as_str().map(str::to_string))
            .collect();
        assert!(aliases.contains(&fx.alias()));
    }

    #[test]
    fn test_duplicate_key_conflicts() {
        let Some(fx) = Fixture::new() else {
            eprintln!("Skipping: TEST_KMSCTL_ENDPOINT not set");
            return;
        };

        let output = fx.run(&["kms", "create", "-n", &fx.key, "-d", "again"]);
        assert_eq!(output.status.code(), Some(6));
    }
}

mod objects {
    use super::*;

    #[test]
    fn test_put_list_get_cat() {
        let Some(fx) = Fixture::new() else {
            eprintln!("Skipping: TEST_KMSCTL_ENDPOINT not set");
            return;
        };

        let local = TempDir::new().unwrap();
        let app = local.path().join("app");
        std::fs::create_dir_all(app.join("nested")).unwrap();
        std::fs::write(app.join("db.yaml"), "password: hunter2\n").unwrap();
        std::fs::write(app.join("nested/api.json"), "{}").unwrap();

        let output = Command::cargo_bin("kmsctl")
            .unwrap()
            .current_dir(local.path())
            .env("KMSCTL_CONFIG_DIR", fx.config_dir.path())
            .args([
                "--endpoint",
                &fx.endpoint,
                "--region",
                "us-east-1",
                "--access-key",
                "test",
                "--secret-key",
                "test",
                "--format",
                "json",
                "put",
                "-b",
                &fx.bucket,
                "-k",
                &fx.alias(),
                "app",
            ])
            .output()
            .unwrap();
        assert_ok(&output);
        assert_eq!(stdout_lines(&output).len(), 2);

        let output = fx.run(&["ls", "-b", &fx.bucket, "--recursive=false", "app/"]);
        assert_ok(&output);
        let keys: Vec<_> = stdout_lines(&output)
            .iter()
            .filter_map(|v| v["key"].as_str().map(str::to_string))
            .collect();
        assert_eq!(keys, vec!["app/db.yaml".to_string()]);

        let out_dir = TempDir::new().unwrap();
        let output = fx.run(&[
            "get",
            "-b",
            &fx.bucket,
            "-d",
            out_dir.path().to_str().unwrap(),
            "-r",
            "--filter",
            r"\.json$",
        ]);
        assert_ok(&output);
        assert!(out_dir.path().join("app/nested/api.json").exists());
        assert!(!out_dir.path().join("app/db.yaml").exists());

        let output = fx.run(&["cat", "-b", &fx.bucket, "app/db.yaml"]);
        assert_ok(&output);
        assert_eq!(String::from_utf8_lossy(&output.stdout), "password: hunter2\n");
    }

    #[test]
    fn test_put_to_missing_bucket() {
        let Some(endpoint) = endpoint() else {
            eprintln!("Skipping: TEST_KMSCTL_ENDPOINT not set");
            return;
        };
        let config_dir = TempDir::new().unwrap();

        let output = run(
            &endpoint,
            config_dir.path(),
            &["put", "-b", &unique("missing"), "-k", "alias/none", "Cargo.toml"],
        );
        assert_eq!(output.status.code(), Some(5));
    }

    #[test]
    fn test_delete_non_empty_bucket_requires_force() {
        let Some(fx) = Fixture::new() else {
            eprintln!("Skipping: TEST_KMSCTL_ENDPOINT not set");
            return;
        };

        let local = TempDir::new().unwrap();
        let file = local.path().join("token");
        std::fs::write(&file, "abc").unwrap();
        assert_ok(&fx.run(&[
            "put",
            "-b",
            &fx.bucket,
            "-k",
            &fx.alias(),
            "--flatten",
            file.to_str().unwrap(),
        ]));

        let output = fx.run(&["buckets", "rm", "-n", &fx.bucket]);
        assert_eq!(output.status.code(), Some(6));
    }
}
