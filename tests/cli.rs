mod common;

use assert_cmd::Command;
use common::project;
use predicates::str::contains;
use std::path::Path;

fn cmd(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("lzctl").unwrap();
    cmd.env("HOME", home)
        .env("LZCTL_AWS_BINARY", "/nonexistent/aws")
        .env_remove("LZCTL_ROOT")
        .env_remove("LZCTL_TERRAFORM_BINARY")
        .env_remove("LZCTL_ENVIRONMENT_SET")
        .env_remove("LZCTL_DEFAULT_REGION");
    cmd
}

#[test]
fn version_flag() {
    let home = tempfile::tempdir().unwrap();
    cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn names_as_json() {
    let home = tempfile::tempdir().unwrap();
    let dir = project();
    cmd(home.path())
        .arg("--dir")
        .arg(dir.path())
        .args(["names", "sbx"])
        .assert()
        .success()
        .stdout(contains("\"id\": \"df-unique-sbx-euc2\""))
        .stdout(contains("s3-df-unique-x-euc2"))
        .stdout(contains("/df/unique/sbx"));
}

#[test]
fn names_for_another_layer() {
    let home = tempfile::tempdir().unwrap();
    let dir = project();
    cmd(home.path())
        .arg("--dir")
        .arg(dir.path())
        .args(["names", "sbx", "--layer", "04-data-ai"])
        .assert()
        .success()
        .stdout(contains("\"layer:Name\": \"data-and-ai\""));
}

#[test]
fn names_rejects_bad_moniker() {
    let home = tempfile::tempdir().unwrap();
    let dir = project();
    let tfvars = dir
        .path()
        .join("01-bootstrap/environments/sbx/terraform.tfvars");
    let content = std::fs::read_to_string(&tfvars)
        .unwrap()
        .replace("org_moniker      = \"df\"", "org_moniker      = \"Dragonfly\"");
    std::fs::write(&tfvars, content).unwrap();

    cmd(home.path())
        .arg("--dir")
        .arg(dir.path())
        .args(["names", "sbx"])
        .assert()
        .failure()
        .stderr(contains("org_moniker"));
}

#[test]
fn names_without_identity() {
    let home = tempfile::tempdir().unwrap();
    let dir = project();
    cmd(home.path())
        .arg("--dir")
        .arg(dir.path())
        .args(["names", "prod"])
        .assert()
        .failure()
        .stderr(contains("No identity variables for prod"));
}

#[test]
fn generate_writes_every_layer() {
    let home = tempfile::tempdir().unwrap();
    let dir = project();
    cmd(home.path())
        .arg("--dir")
        .arg(dir.path())
        .args(["generate", "sbx"])
        .assert()
        .success()
        .stdout(contains("Backend configs written: 6, layers skipped: 0"));

    let compute = std::fs::read_to_string(
        dir.path()
            .join("05-compute/environments/sbx/backend.conf"),
    )
    .unwrap();
    assert!(compute.contains("bucket       = \"s3-df-unique-x-euc2-tfstate\""));
    assert!(compute.contains("key          = \"compute/terraform.tfstate\""));
}

#[test]
fn scaffold_fills_missing_templates() {
    let home = tempfile::tempdir().unwrap();
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("01-bootstrap")).unwrap();
    std::fs::create_dir_all(dir.path().join("05-compute")).unwrap();

    cmd(home.path())
        .arg("--dir")
        .arg(dir.path())
        .arg("scaffold")
        .assert()
        .success()
        .stdout(contains("Templates created: 2"));
    assert!(dir.path().join("05-compute/backend.conf.template").exists());
}

#[test]
fn bootstrap_needs_terraform() {
    let home = tempfile::tempdir().unwrap();
    let dir = project();
    cmd(home.path())
        .env("LZCTL_TERRAFORM_BINARY", "/nonexistent/terraform")
        .arg("--dir")
        .arg(dir.path())
        .args(["bootstrap", "sbx", "--auto-approve"])
        .assert()
        .failure()
        .stderr(contains("Terraform binary not found"));
}

#[test]
fn invalid_config_file() {
    let home = tempfile::tempdir().unwrap();
    let config = home.path().join("config.json");
    std::fs::write(&config, "{ not json").unwrap();
    cmd(home.path())
        .arg("--config")
        .arg(&config)
        .args(["names", "sbx"])
        .assert()
        .failure()
        .stderr(contains("Invalid config"));
}
